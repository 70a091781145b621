use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::{NodeId, Role};

/// Result type for lazycode operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("cannot coerce {kind} into a `{role}` node")]
    #[diagnostic(
        code(lazycode::unsupported_coercion),
        help("register a coercion rule for `{role}` or pass a node that already satisfies it")
    )]
    UnsupportedCoercion { role: String, kind: String },

    #[error("slot `{slot}` was never bound")]
    #[diagnostic(
        code(lazycode::missing_content),
        help("set the slot before rendering, or use the `empty` or `placeholder` policy")
    )]
    MissingContent { slot: String },

    #[error("invalid {container} operation: {message}")]
    #[diagnostic(code(lazycode::invalid_container_operation))]
    InvalidContainerOperation {
        container: &'static str,
        message: String,
    },

    #[error("node {node} is reachable from itself")]
    #[diagnostic(
        code(lazycode::cyclic_structure),
        help("a container cannot be stored inside one of its own descendants")
    )]
    CyclicStructure { node: NodeId },

    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse render configuration")]
    #[diagnostic(code(lazycode::config_parse))]
    ConfigParse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    /// Create an unsupported coercion error for a value kind and target role
    pub fn unsupported_coercion(role: &Role, kind: impl Into<String>) -> Box<Self> {
        Box::new(Error::UnsupportedCoercion {
            role: role.to_string(),
            kind: kind.into(),
        })
    }

    /// Create a missing content error for an unbound slot
    pub fn missing_content(slot: impl Into<String>) -> Box<Self> {
        Box::new(Error::MissingContent { slot: slot.into() })
    }

    /// Create an invalid container operation error
    pub fn invalid_operation(container: &'static str, message: impl Into<String>) -> Box<Self> {
        Box::new(Error::InvalidContainerOperation {
            container,
            message: message.into(),
        })
    }

    /// Create a cyclic structure error for the re-entered node
    pub fn cyclic(node: NodeId) -> Box<Self> {
        Box::new(Error::CyclicStructure { node })
    }

    /// Create a config parse error from a toml error with source context
    pub fn config_parse(source: toml::de::Error, src: &str, filename: &str) -> Box<Self> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::ConfigParse {
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        })
    }
}
