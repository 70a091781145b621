//! C expressions.

use std::{any::Any, ops::Add, rc::Rc};

use lazycode_core::{
    Node, NodeId, RenderContext, Result, TokenList, Value, impl_node_value, values,
};

use crate::{Commented, Trivia};

#[derive(Debug)]
struct Inner {
    id: NodeId,
    tokens: TokenList,
    trivia: Trivia,
}

/// A C expression.
///
/// Inline it renders its tokens; freestanding it is an expression
/// statement, `tokens;` followed by the side comment.
///
/// The helper methods build new expressions around this one without
/// modifying it.
#[derive(Debug, Clone)]
pub struct Expr {
    inner: Rc<Inner>,
}

/// Shorthand for [`Expr::new`].
pub fn expr(value: impl Into<Value>) -> Expr {
    Expr::new(value)
}

impl Expr {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: NodeId::fresh(),
                tokens: TokenList::from_value(value),
                trivia: Trivia::new(),
            }),
        }
    }

    /// The underlying tokens, which can still be extended.
    pub fn tokens(&self) -> &TokenList {
        &self.inner.tokens
    }

    /// Append to the expression in place.
    pub fn append(&self, value: impl Into<Value>) -> &Self {
        self.inner.tokens.append(value);
        self
    }

    /// `self = value`
    pub fn assign(&self, value: impl Into<Value>) -> Expr {
        Expr::new(values![self, " = ", value])
    }

    /// `((ty)(self))`
    pub fn cast(&self, ty: impl Into<Value>) -> Expr {
        Expr::new(values!["((", ty, ")(", self, "))"])
    }

    /// `(*(self))`
    pub fn deref(&self) -> Expr {
        Expr::new(values!["(*(", self, "))"])
    }

    /// `(&(self))`
    pub fn address(&self) -> Expr {
        Expr::new(values!["(&(", self, "))"])
    }

    /// `(self)`
    pub fn paren(&self) -> Expr {
        Expr::new(values!["(", self, ")"])
    }

    /// `self.member`
    pub fn member(&self, member: impl Into<Value>) -> Expr {
        Expr::new(values![self, ".", member])
    }

    /// `self->member`
    pub fn arrow(&self, member: impl Into<Value>) -> Expr {
        Expr::new(values![self, "->", member])
    }

    /// `self[index]`
    pub fn index(&self, index: impl Into<Value>) -> Expr {
        Expr::new(values![self, "[", index, "]"])
    }
}

impl Commented for Expr {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for Expr {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "Expr"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        cx.inline(&self.inner.tokens)
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let text = self.inline(cx)?;
        let side = self.inner.trivia.side(cx)?;
        let line = cx.indent_lines(&format!("{text};{side}"));
        self.inner.trivia.lead(cx, line)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(Expr);

impl<V: Into<Value>> Add<V> for Expr {
    type Output = Expr;

    fn add(self, rhs: V) -> Expr {
        Expr::new(values![self, rhs])
    }
}

impl<V: Into<Value>> Add<V> for &Expr {
    type Output = Expr;

    fn add(self, rhs: V) -> Expr {
        Expr::new(values![self, rhs])
    }
}
