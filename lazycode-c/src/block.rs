//! Braced statement blocks.

use std::{any::Any, rc::Rc};

use lazycode_core::{Node, NodeId, RenderContext, StatementList, Value, impl_node_value};

use crate::{Commented, Result, Trivia, roles};

/// A new statement list coercing plain values into C statements.
pub(crate) fn statements() -> StatementList {
    crate::install();
    StatementList::with_role(roles::STATEMENT)
}

/// Render `head` on its own line followed by `body` between braces.
///
/// ```text
/// head
/// {
///     body
/// }
/// ```
///
/// An empty `head` is omitted, so the text opens with the brace.
pub(crate) fn braced(
    cx: &mut RenderContext<'_>,
    head: &str,
    body: &StatementList,
) -> lazycode_core::Result<String> {
    let content = cx.nested(|cx| body.render_entries(cx))?;
    Ok(wrap_braces(cx, head, &content))
}

/// Like [`braced`] for content already rendered one level deeper.
pub(crate) fn wrap_braces(cx: &RenderContext<'_>, head: &str, content: &str) -> String {
    let indentation = cx.indentation();
    let mut lines = Vec::with_capacity(4);
    if !head.is_empty() {
        lines.push(format!("{indentation}{head}"));
    }
    lines.push(format!("{indentation}{{"));
    if !content.is_empty() {
        lines.push(content.to_string());
    }
    lines.push(format!("{indentation}}}"));
    lines.join("\n")
}

#[derive(Debug)]
struct Inner {
    id: NodeId,
    body: StatementList,
    trivia: Trivia,
}

/// A `{ ... }` block of statements.
#[derive(Debug, Clone)]
pub struct Block {
    inner: Rc<Inner>,
}

impl Block {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                id: NodeId::fresh(),
                body: statements(),
                trivia: Trivia::new(),
            }),
        }
    }

    /// A block holding `values`, each appended in order.
    pub fn from_values<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let block = Self::new();
        block.inner.body.extend(values)?;
        Ok(block)
    }

    pub fn body(&self) -> &StatementList {
        &self.inner.body
    }

    /// Append a statement to the block.
    pub fn append(&self, value: impl Into<Value>) -> Result<()> {
        Ok(self.inner.body.append(value)?)
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl Commented for Block {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for Block {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "Block"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        Ok(self.freestanding(cx)?.trim_start().to_string())
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let side = self.inner.trivia.side(cx)?;
        let mut text = braced(cx, "", &self.inner.body)?;
        if !side.is_empty() {
            // The side comment follows the opening brace.
            let (open, rest) = text.split_once('\n').unwrap_or((text.as_str(), ""));
            text = format!("{open}{side}\n{rest}");
        }
        self.inner.trivia.lead(cx, text)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(Block);

#[cfg(test)]
mod tests {
    use super::*;
    use lazycode_core::Render;

    use crate::expr;

    #[test]
    fn test_block_indents_body() {
        let block = Block::from_values(["a = 1", "b = 2"]).unwrap();
        insta::assert_snapshot!(block.render_freestanding(0).unwrap(), @r"
        {
            a = 1;
            b = 2;
        }
        ");
    }

    #[test]
    fn test_empty_block() {
        assert_eq!(Block::new().render_freestanding(1).unwrap(), "    {\n    }");
    }

    #[test]
    fn test_nested_blocks() {
        let inner = Block::new();
        let outer = Block::from_values([inner.clone()]).unwrap();
        inner.append(expr("x++")).unwrap();
        assert_eq!(
            outer.render_freestanding(0).unwrap(),
            "{\n    {\n        x++;\n    }\n}"
        );
    }

    #[test]
    fn test_side_comment_follows_brace() {
        let block = Block::from_values(["x = 0"])
            .unwrap()
            .with_side_comment("scope")
            .unwrap();
        assert_eq!(
            block.render_freestanding(0).unwrap(),
            "{ //scope\n    x = 0;\n}"
        );
    }
}
