//! Indentation configuration for rendered code.

use serde::Deserialize;

/// Indentation style for rendered code.
///
/// In TOML this is written either as `indent = "tab"` or
/// `indent = { spaces = 2 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indent {
    /// Spaces with the specified width (e.g., 2 or 4).
    Spaces(u8),
    /// Tab character.
    Tab,
}

impl Indent {
    /// 4-space indentation (C, Rust, Python).
    pub const C: Self = Self::Spaces(4);

    /// 2-space indentation (TypeScript, JavaScript, YAML).
    pub const TYPESCRIPT: Self = Self::Spaces(2);

    /// Tab indentation (Go, kernel-style C).
    pub const GO: Self = Self::Tab;

    /// One indentation unit.
    pub fn unit(&self) -> String {
        match self {
            Self::Spaces(n) => " ".repeat(usize::from(*n)),
            Self::Tab => "\t".to_string(),
        }
    }

    /// The prefix for `level` indentation units.
    pub fn prefix(&self, level: usize) -> String {
        self.unit().repeat(level)
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::C
    }
}
