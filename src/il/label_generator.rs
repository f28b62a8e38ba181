use super::Label;

/// Mints labels from a counter scoped to one compilation.
pub struct LabelGenerator {
    index: usize,
}
impl LabelGenerator {
    pub fn new() -> Self {
        Self { index: 0 }
    }

    /// Generates a new unique label.
    pub fn next_label(&mut self) -> Label {
        let label = Label::new(self.index);
        self.index += 1;
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_label_generates_ascending_labels() {
        let mut lbl_gen = LabelGenerator::new();

        assert_eq!("_L0", lbl_gen.next_label().to_string());
        assert_eq!("_L1", lbl_gen.next_label().to_string());
    }

    #[test]
    fn generators_are_independent() {
        let mut one = LabelGenerator::new();
        let mut two = LabelGenerator::new();

        one.next_label();
        one.next_label();

        assert_eq!("_L0", two.next_label().to_string());
        assert_eq!("_L2", one.next_label().to_string());
    }
}
