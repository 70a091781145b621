//! Functions.

use std::{any::Any, cell::RefCell, rc::Rc};

use lazycode_core::{
    Node, NodeId, NodeRef, RenderContext, Role, Slot, StatementList, Value, coerce,
    impl_node_value,
};

use crate::{
    Commented, Expr, Result, Trivia, Var,
    block::{braced, statements},
};

#[derive(Debug)]
struct Inner {
    id: NodeId,
    name: Slot,
    return_type: Slot,
    storage: Slot,
    params: Params,
    body: StatementList,
    trivia: Trivia,
}

/// A C function.
///
/// Inline a function renders its name. Freestanding it renders its
/// definition; [`decl`](Self::decl) gives the prototype and
/// [`call`](Self::call) a call expression. All three follow later changes
/// to the name, the signature and the body.
#[derive(Debug, Clone)]
pub struct Fun {
    inner: Rc<Inner>,
}

impl Fun {
    /// A function returning `void` without parameters.
    pub fn new(name: impl Into<Value>) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(Inner {
                id: NodeId::fresh(),
                name: Slot::with_value("name", Role::NAME, name)?,
                return_type: Slot::with_value("return_type", Role::TOKEN, "void")?,
                storage: Slot::new("storage", Role::TOKEN),
                params: Params::default(),
                body: statements(),
                trivia: Trivia::new(),
            }),
        })
    }

    pub fn returns(self, ty: impl Into<Value>) -> Result<Self> {
        self.inner.return_type.set(ty)?;
        Ok(self)
    }

    pub fn with_storage(self, storage: impl Into<Value>) -> Result<Self> {
        self.inner.storage.set(storage)?;
        Ok(self)
    }

    /// Add a parameter. A [`Var`] is rendered through its declaration.
    pub fn param(self, param: impl Into<Value>) -> Result<Self> {
        self.push_param(param)?;
        Ok(self)
    }

    /// Add a parameter to a function that may already be embedded.
    pub fn push_param(&self, param: impl Into<Value>) -> Result<()> {
        self.inner.params.push(param)
    }

    pub fn name(&self) -> &Slot {
        &self.inner.name
    }

    pub fn return_type(&self) -> &Slot {
        &self.inner.return_type
    }

    pub fn storage(&self) -> &Slot {
        &self.inner.storage
    }

    pub fn body(&self) -> &StatementList {
        &self.inner.body
    }

    /// Append a statement to the body.
    pub fn append(&self, value: impl Into<Value>) -> Result<()> {
        Ok(self.inner.body.append(value)?)
    }

    pub fn defi(&self) -> FunView {
        self.view(FunForm::Defi)
    }

    pub fn decl(&self) -> FunView {
        self.view(FunForm::Decl)
    }

    /// `name(args...)`, following later renames of the function.
    pub fn call<I, V>(&self, args: I) -> Result<Expr>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let call = Expr::new(self.inner.name.proxy());
        call.append("(");
        for (i, arg) in args.into_iter().enumerate() {
            if i > 0 {
                call.append(", ");
            }
            call.append(coerce(arg, &Role::TOKEN)?);
        }
        call.append(")");
        Ok(call)
    }

    fn view(&self, form: FunForm) -> FunView {
        FunView {
            id: NodeId::fresh(),
            fun: self.clone(),
            form,
        }
    }

    /// `storage ret name(params)`
    fn signature(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let inner = &self.inner;
        let params = inner.params.render(cx)?;
        let storage = inner.storage.inline(cx)?;
        let storage = match storage.trim() {
            "" => String::new(),
            storage => format!("{storage} "),
        };
        let return_type = inner.return_type.inline(cx)?;
        let name = inner.name.require(cx)?;
        Ok(format!("{storage}{return_type} {name}({params})"))
    }

    fn render_definition(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let head = self.signature(cx)? + self.inner.trivia.side(cx)?.as_str();
        let text = braced(cx, &head, &self.inner.body)?;
        self.inner.trivia.lead(cx, text)
    }

    fn render_declaration(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let signature = self.signature(cx)?;
        let side = self.inner.trivia.side(cx)?;
        let line = cx.indent_lines(&format!("{signature};{side}"));
        self.inner.trivia.lead(cx, line)
    }
}

/// Parameter list shared by functions and function pointer types.
#[derive(Debug, Default)]
pub(crate) struct Params {
    nodes: RefCell<Vec<NodeRef>>,
}

impl Params {
    /// A [`Var`] is held through its declaration; anything else as tokens.
    pub(crate) fn push(&self, param: impl Into<Value>) -> Result<()> {
        let param = param.into();
        let var = param.as_node().and_then(|node| node.downcast::<Var>());
        let node = match var {
            Some(var) => var.decl().into(),
            None => coerce(param, &Role::TOKEN)?,
        };
        self.nodes.borrow_mut().push(node);
        Ok(())
    }

    /// `a, b`, or `void` when nothing renders.
    pub(crate) fn render(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let nodes = self.nodes.borrow().clone();
        let mut params = Vec::with_capacity(nodes.len());
        for param in &nodes {
            params.push(cx.inline(param)?);
        }
        Ok(match params.join(", ") {
            joined if joined.trim().is_empty() => "void".to_string(),
            joined => joined,
        })
    }
}

impl Commented for Fun {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for Fun {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "Fun"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        self.inner.name.require(cx)
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        self.render_definition(cx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(Fun);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunForm {
    Defi,
    Decl,
}

/// The definition or the prototype of a [`Fun`].
#[derive(Debug, Clone)]
pub struct FunView {
    id: NodeId,
    fun: Fun,
    form: FunForm,
}

impl FunView {
    pub fn fun(&self) -> &Fun {
        &self.fun
    }
}

impl Node for FunView {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> &'static str {
        "FunView"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        match self.form {
            FunForm::Decl => self.fun.signature(cx),
            FunForm::Defi => Ok(self.freestanding(cx)?.trim_start().to_string()),
        }
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        match self.form {
            FunForm::Defi => self.fun.render_definition(cx),
            FunForm::Decl => self.fun.render_declaration(cx),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(FunView);
