//! Useful character extensions.
pub trait CharExt {
    fn is_non_newline_whitespace(&self) -> bool;

    fn is_linebreak(&self) -> bool;

    fn is_not_linebreak(&self) -> bool {
        !self.is_linebreak()
    }

    fn is_identifier_start(&self) -> bool;

    fn is_identifier_continue(&self) -> bool;
}
impl CharExt for char {
    fn is_non_newline_whitespace(&self) -> bool {
        self.is_whitespace() && !self.is_linebreak()
    }

    fn is_linebreak(&self) -> bool {
        *self == '\n' || *self == '\r'
    }

    fn is_identifier_start(&self) -> bool {
        self.is_ascii_alphabetic() || *self == '_'
    }

    fn is_identifier_continue(&self) -> bool {
        self.is_ascii_alphanumeric() || *self == '_'
    }
}
