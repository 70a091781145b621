//! Block and line comments.

use std::{any::Any, cell::Cell, rc::Rc};

use lazycode_core::{Node, NodeId, RenderContext, Result, TokenList, Value, impl_node_value};

#[derive(Debug)]
struct CommentInner {
    id: NodeId,
    text: TokenList,
    wrap: Cell<bool>,
}

/// A `/* ... */` comment.
///
/// Multi-line text keeps its line breaks; continuation lines are aligned
/// with the first one. Lines longer than the configured
/// [`line_width`](lazycode_core::RenderConfig::line_width) are re-wrapped
/// word by word unless wrapping is disabled.
#[derive(Debug, Clone)]
pub struct Comment {
    inner: Rc<CommentInner>,
}

impl Comment {
    pub fn new(text: impl Into<Value>) -> Self {
        Self {
            inner: Rc::new(CommentInner {
                id: NodeId::fresh(),
                text: TokenList::from_value(text),
                wrap: Cell::new(true),
            }),
        }
    }

    /// The comment text, which can still be extended.
    pub fn text(&self) -> &TokenList {
        &self.inner.text
    }

    /// Keep the text's own line breaks only.
    pub fn without_wrap(self) -> Self {
        self.inner.wrap.set(false);
        self
    }
}

impl Node for Comment {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "Comment"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let text = cx.inline(&self.inner.text)?;
        if text.is_empty() {
            return Ok(String::new());
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let first_blank = lines.first().is_none_or(|line| line.trim().is_empty());
        let last_blank = lines.last().is_none_or(|line| line.trim().is_empty());
        let (start, margin) = if first_blank { ("/*", "") } else { ("/* ", "   ") };
        let end = if last_blank { "*/" } else { " */" };

        let indentation = cx.indentation();
        let room = cx
            .config()
            .line_width
            .saturating_sub(start.len() + end.len() + indentation.len())
            .max(1);
        let body = if self.inner.wrap.get() && lines.iter().any(|line| line.chars().count() > room)
        {
            wrap_words(&text, room)
        } else {
            text.clone()
        };

        let joiner = format!("\n{indentation}{margin}");
        Ok(format!("{start}{body}{end}").replace('\n', &joiner))
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let text = self.inline(cx)?;
        if text.is_empty() {
            return Ok(text);
        }
        Ok(format!("{}{text}", cx.indentation()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(Comment);

/// Greedy word wrap of every line of `text` to `width` columns.
///
/// A word longer than `width` gets a line of its own.
fn wrap_words(text: &str, width: usize) -> String {
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        out.push(line);
    }
    out.join("\n")
}

#[derive(Debug)]
struct LineCommentInner {
    id: NodeId,
    text: TokenList,
}

/// A `//` comment, used as the side comment of a construct.
///
/// Inline it renders ` //text`, ready to be appended to a line.
#[derive(Debug, Clone)]
pub struct LineComment {
    inner: Rc<LineCommentInner>,
}

impl LineComment {
    pub fn new(text: impl Into<Value>) -> Self {
        Self {
            inner: Rc::new(LineCommentInner {
                id: NodeId::fresh(),
                text: TokenList::from_value(text),
            }),
        }
    }

    pub fn text(&self) -> &TokenList {
        &self.inner.text
    }
}

impl Node for LineComment {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "LineComment"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        Ok(format!(" //{}", cx.inline(&self.inner.text)?))
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        Ok(format!("{}//{}", cx.indentation(), cx.inline(&self.inner.text)?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(LineComment);

#[cfg(test)]
mod tests {
    use super::*;
    use lazycode_core::{Render, RenderConfig};

    #[test]
    fn test_single_line() {
        let comment = Comment::new("hello");
        assert_eq!(comment.render_inline().unwrap(), "/* hello */");
        assert_eq!(comment.render_freestanding(1).unwrap(), "    /* hello */");
    }

    #[test]
    fn test_empty_comment_renders_nothing() {
        assert_eq!(Comment::new("").render_freestanding(1).unwrap(), "");
    }

    #[test]
    fn test_multi_line_alignment() {
        let comment = Comment::new("first\nsecond");
        assert_eq!(
            comment.render_freestanding(1).unwrap(),
            "    /* first\n       second */"
        );
    }

    #[test]
    fn test_blank_first_line_keeps_markers_apart() {
        let comment = Comment::new("\nbody\n");
        assert_eq!(comment.render_inline().unwrap(), "/*\nbody\n*/");
    }

    #[test]
    fn test_long_text_is_wrapped() {
        let config = RenderConfig::default().with_line_width(20);
        let comment = Comment::new("one two three four five six");
        assert_eq!(
            comment.render_freestanding_with(0, &config).unwrap(),
            "/* one two three\n   four five six */"
        );

        let unwrapped = Comment::new("one two three four five six").without_wrap();
        assert_eq!(
            unwrapped.render_inline_with(&config).unwrap(),
            "/* one two three four five six */"
        );
    }

    #[test]
    fn test_text_stays_mutable() {
        let comment = Comment::new("counts ");
        comment.text().append("apples");
        assert_eq!(comment.render_inline().unwrap(), "/* counts apples */");
    }

    #[test]
    fn test_line_comment() {
        let comment = LineComment::new("note");
        assert_eq!(comment.render_inline().unwrap(), " //note");
        assert_eq!(comment.render_freestanding(1).unwrap(), "    //note");
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(wrap_words("aa bb cc", 5), "aa bb\ncc");
        assert_eq!(wrap_words("toolongword x", 4), "toolongword\nx");
        assert_eq!(wrap_words("a\n\nb", 10), "a\n\nb");
    }
}
