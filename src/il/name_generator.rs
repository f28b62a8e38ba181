/// Names temporaries from a counter scoped to one compilation.
pub struct NameGenerator {
    index: usize,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self { index: 0 }
    }

    /// Generates a new unique temporary name.
    pub fn next_temp(&mut self) -> String {
        let name = format!("_t{}", self.index);
        self.index += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_temp_generates_ascending_temp_values() {
        let mut name_gen = NameGenerator::new();

        assert_eq!("_t0", name_gen.next_temp());
        assert_eq!("_t1", name_gen.next_temp());
    }
}
