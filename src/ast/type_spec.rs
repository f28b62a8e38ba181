//! Type tags recorded by the semantic pass.
use std::fmt::{self, Display, Formatter};

/// The type of an identifier, as far as the back end cares about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    Number,
    Bool,
    /// The name of an `enum` declaration.
    EnumType,
    /// A variable whose type is some enum.
    EnumVar,
}
impl Display for TypeSpec {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            TypeSpec::Number => "num",
            TypeSpec::Bool => "bool",
            TypeSpec::EnumType => "<enum type>",
            TypeSpec::EnumVar => "<enum>",
        })
    }
}
