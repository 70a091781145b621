//! Comments attached to C constructs.

use lazycode_core::{RenderContext, Slot, Value};

use crate::{Result, install, roles};

/// The leading and trailing comment slots every C construct carries.
///
/// The leading comment renders on its own line(s) above the construct's
/// freestanding text. The side comment follows the construct's first line.
#[derive(Debug)]
pub struct Trivia {
    comment: Slot,
    side_comment: Slot,
}

impl Trivia {
    pub fn new() -> Self {
        install();
        Self {
            comment: Slot::new("comment", roles::COMMENT),
            side_comment: Slot::new("side_comment", roles::SIDE_COMMENT),
        }
    }

    pub fn comment(&self) -> &Slot {
        &self.comment
    }

    pub fn side_comment(&self) -> &Slot {
        &self.side_comment
    }

    /// The side comment, rendered inline.
    pub fn side(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        self.side_comment.inline(cx)
    }

    /// Put the leading comment, if any, above `body`.
    pub fn lead(&self, cx: &mut RenderContext<'_>, body: String) -> lazycode_core::Result<String> {
        if !self.comment.is_bound() {
            return Ok(body);
        }
        let comment = self.comment.freestanding(cx)?;
        Ok(format!("{comment}\n{body}"))
    }
}

impl Default for Trivia {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder access to the comments of a C construct.
pub trait Commented: Sized {
    fn trivia(&self) -> &Trivia;

    /// Set the leading comment.
    fn with_comment(self, value: impl Into<Value>) -> Result<Self> {
        self.trivia().comment().set(value)?;
        Ok(self)
    }

    /// Set the side comment.
    fn with_side_comment(self, value: impl Into<Value>) -> Result<Self> {
        self.trivia().side_comment().set(value)?;
        Ok(self)
    }
}
