use miette::Diagnostic;
use thiserror::Error;

/// Result type for C construct operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] Box<lazycode_core::Error>),

    #[error("cannot parse variable declaration `{decl}`")]
    #[diagnostic(
        code(lazycode_c::invalid_declaration),
        help("expected `[storage...] [type] name[[size]] [= initializer]`, e.g. `static int x[3]`")
    )]
    InvalidDeclaration { decl: String },

    #[error("{compound} member must be a variable or a declaration, found {found}")]
    #[diagnostic(
        code(lazycode_c::invalid_member),
        help("pass a `Var` or declaration text such as `int x`")
    )]
    InvalidMember {
        compound: &'static str,
        found: &'static str,
    },

    #[error("no C type can be inferred for member `{member}` holding {found}")]
    #[diagnostic(
        code(lazycode_c::untyped_member),
        help("initialize the member with a number, text, a char, a bool or a nested initializer")
    )]
    UntypedMember { member: String, found: &'static str },
}

impl Error {
    /// Create an invalid declaration error for the rejected text
    pub fn invalid_declaration(decl: impl Into<String>) -> Self {
        Error::InvalidDeclaration { decl: decl.into() }
    }

    pub fn invalid_member(compound: &'static str, found: &'static str) -> Self {
        Error::InvalidMember { compound, found }
    }

    pub fn untyped_member(member: impl Into<String>, found: &'static str) -> Self {
        Error::UntypedMember {
            member: member.into(),
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_declaration_message() {
        let err = Error::invalid_declaration("3x");
        assert_eq!(err.to_string(), "cannot parse variable declaration `3x`");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("lazycode_c::invalid_declaration"));
    }

    #[test]
    fn test_member_errors() {
        let err = Error::invalid_member("struct", "integer");
        assert_eq!(
            err.to_string(),
            "struct member must be a variable or a declaration, found integer"
        );
        let err = Error::untyped_member("pos", "node");
        assert_eq!(
            err.to_string(),
            "no C type can be inferred for member `pos` holding node"
        );
    }

    #[test]
    fn test_core_errors_are_transparent() {
        let err: Error = lazycode_core::Error::missing_content("name").into();
        assert_eq!(err.to_string(), "slot `name` was never bound");
    }
}
