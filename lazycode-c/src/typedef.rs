//! Type aliases and blank lines.

use std::{any::Any, rc::Rc};

use lazycode_core::{Node, NodeId, RenderContext, Role, Slot, Value, impl_node_value};

use crate::{Commented, Result, Trivia, fun::Params};

#[derive(Debug)]
struct Inner {
    id: NodeId,
    old: Slot,
    name: Slot,
    trivia: Trivia,
}

/// `typedef old name;`
///
/// Inline the alias renders its name, so it can be used as a type.
#[derive(Debug, Clone)]
pub struct Typedef {
    inner: Rc<Inner>,
}

impl Typedef {
    pub fn new(old: impl Into<Value>, name: impl Into<Value>) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(Inner {
                id: NodeId::fresh(),
                old: Slot::with_value("old", Role::TOKEN, old)?,
                name: Slot::with_value("name", Role::NAME, name)?,
                trivia: Trivia::new(),
            }),
        })
    }

    pub fn old(&self) -> &Slot {
        &self.inner.old
    }

    pub fn name(&self) -> &Slot {
        &self.inner.name
    }
}

impl Commented for Typedef {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for Typedef {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "Typedef"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        self.inner.name.require(cx)
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let old = self.inner.old.require(cx)?;
        let name = self.inner.name.require(cx)?;
        let side = self.inner.trivia.side(cx)?;
        let line = cx.indent_lines(&format!("typedef {old} {name};{side}"));
        self.inner.trivia.lead(cx, line)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(Typedef);

#[derive(Debug)]
struct FunPtrInner {
    id: NodeId,
    name: Slot,
    return_type: Slot,
    params: Params,
    trivia: Trivia,
}

/// `typedef ret (*name)(params);`
#[derive(Debug, Clone)]
pub struct FunPtrTypedef {
    inner: Rc<FunPtrInner>,
}

impl FunPtrTypedef {
    pub fn new(name: impl Into<Value>, return_type: impl Into<Value>) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(FunPtrInner {
                id: NodeId::fresh(),
                name: Slot::with_value("name", Role::NAME, name)?,
                return_type: Slot::with_value("return_type", Role::TOKEN, return_type)?,
                params: Params::default(),
                trivia: Trivia::new(),
            }),
        })
    }

    /// Add a parameter type. A [`Var`](crate::Var) is rendered through its
    /// declaration.
    pub fn param(self, param: impl Into<Value>) -> Result<Self> {
        self.inner.params.push(param)?;
        Ok(self)
    }

    pub fn name(&self) -> &Slot {
        &self.inner.name
    }

    pub fn return_type(&self) -> &Slot {
        &self.inner.return_type
    }
}

impl Commented for FunPtrTypedef {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for FunPtrTypedef {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "FunPtrTypedef"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        self.inner.name.require(cx)
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let inner = &self.inner;
        let params = inner.params.render(cx)?;
        let return_type = inner.return_type.inline(cx)?;
        let name = inner.name.require(cx)?;
        let side = inner.trivia.side(cx)?;
        let line = cx.indent_lines(&format!(
            "typedef {return_type} (*{name})({params});{side}"
        ));
        inner.trivia.lead(cx, line)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(FunPtrTypedef);

/// A blank line in a statement list.
#[derive(Debug, Clone)]
pub struct NewLine {
    id: NodeId,
}

impl NewLine {
    pub fn new() -> Self {
        Self {
            id: NodeId::fresh(),
        }
    }
}

impl Default for NewLine {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for NewLine {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> &'static str {
        "NewLine"
    }

    fn inline(&self, _cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        Ok("\n".to_string())
    }

    fn freestanding(&self, _cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        Ok(String::new())
    }

    fn blank_line(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(NewLine);
