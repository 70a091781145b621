//! Render configuration.
//!
//! A generator can build a [`RenderConfig`] in code or load one from a
//! TOML file such as:
//!
//! ```toml
//! indent = { spaces = 2 }
//! missing_content = "placeholder"
//! placeholder = "/* FIXME {slot} */"
//! line_width = 100
//! ```

use std::{path::Path, str::FromStr};

use serde::Deserialize;

use crate::{Error, Indent, Result};

/// What to do when a required slot is still unbound at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingContentPolicy {
    /// Render nothing in place of the slot.
    #[default]
    Empty,
    /// Render [`RenderConfig::placeholder`] with `{slot}` replaced by the slot name.
    Placeholder,
    /// Fail the render with [`Error::MissingContent`].
    Error,
}

/// Options consulted while rendering a tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Indentation unit used for freestanding renders.
    pub indent: Indent,
    /// Policy for unbound required slots.
    pub missing_content: MissingContentPolicy,
    /// Placeholder text used by [`MissingContentPolicy::Placeholder`].
    pub placeholder: String,
    /// Preferred maximum line width for constructs that wrap their text.
    pub line_width: usize,
}

impl RenderConfig {
    /// Default file name used in diagnostics when parsing from a string.
    pub const FILENAME: &'static str = "lazycode.toml";

    /// Load a configuration from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source,
            })
        })?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(Self::FILENAME);
        Self::parse(&src, filename)
    }

    fn parse(src: &str, filename: &str) -> Result<Self> {
        toml::from_str(src).map_err(|source| Error::config_parse(source, src, filename))
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_missing_content(mut self, policy: MissingContentPolicy) -> Self {
        self.missing_content = policy;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent: Indent::default(),
            missing_content: MissingContentPolicy::default(),
            placeholder: "/* missing {slot} */".to_string(),
            line_width: 80,
        }
    }
}

impl FromStr for RenderConfig {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, Self::FILENAME)
    }
}
