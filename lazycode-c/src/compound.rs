//! Structures, unions and enumerations.

use std::{any::Any, cell::Cell, rc::Rc};

use lazycode_core::{
    Node, NodeId, RenderContext, Role, Slot, StatementList, TokenList, Value, impl_node_value,
    values,
};
use tracing::trace;

use crate::{
    Commented, DesignatedInit, Error, Result, Trivia, Var, VarView,
    block::{statements, wrap_braces},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundKind {
    Struct,
    Union,
    Enum,
}

impl CompoundKind {
    pub fn keyword(self) -> &'static str {
        match self {
            CompoundKind::Struct => "struct",
            CompoundKind::Union => "union",
            CompoundKind::Enum => "enum",
        }
    }

    /// Between members of the single-line anonymous form.
    fn separator(self) -> &'static str {
        match self {
            CompoundKind::Enum => ", ",
            CompoundKind::Struct | CompoundKind::Union => "; ",
        }
    }
}

#[derive(Debug)]
struct Inner {
    id: NodeId,
    kind: CompoundKind,
    name: Slot,
    auto_typedef: Cell<bool>,
    members: StatementList,
    trivia: Trivia,
}

/// A `struct`, `union` or `enum` type.
///
/// Members are [`Var`]s. Structure and union members render through their
/// declaration, so an initializer given to a structure member only feeds
/// [`designated_init`](Self::designated_init). Enumerators render as
/// `NAME = value`, comma separated.
///
/// By default the definition is wrapped in a `typedef` giving the type its
/// own name as alias, and inline the type renders as that bare name.
/// [`without_typedef`](Self::without_typedef) keeps the tagged form,
/// rendered inline as `struct name`.
///
/// ```
/// use lazycode_c::CompoundType;
/// use lazycode_core::Render;
///
/// let point = CompoundType::struct_("point")?.member("int x")?.member("int y")?;
/// assert_eq!(
///     point.render_freestanding(0)?,
///     "typedef struct point\n{\n    int x;\n    int y;\n} point;"
/// );
/// assert_eq!(point.anonymous().render_inline()?, "struct {int x; int y;}");
/// # Ok::<(), lazycode_c::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompoundType {
    inner: Rc<Inner>,
}

impl CompoundType {
    pub fn new(kind: CompoundKind, name: impl Into<Value>) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(Inner {
                id: NodeId::fresh(),
                kind,
                name: Slot::with_value("name", Role::NAME, name)?,
                auto_typedef: Cell::new(true),
                members: statements(),
                trivia: Trivia::new(),
            }),
        })
    }

    pub fn struct_(name: impl Into<Value>) -> Result<Self> {
        Self::new(CompoundKind::Struct, name)
    }

    pub fn union(name: impl Into<Value>) -> Result<Self> {
        Self::new(CompoundKind::Union, name)
    }

    pub fn enum_(name: impl Into<Value>) -> Result<Self> {
        Self::new(CompoundKind::Enum, name)
    }

    /// Define the tagged type only, without the `typedef` alias.
    pub fn without_typedef(self) -> Self {
        self.inner.auto_typedef.set(false);
        self
    }

    pub fn kind(&self) -> CompoundKind {
        self.inner.kind
    }

    pub fn name(&self) -> &Slot {
        &self.inner.name
    }

    pub fn auto_typedef(&self) -> bool {
        self.inner.auto_typedef.get()
    }

    /// Add a member. See [`push_member`](Self::push_member).
    pub fn member(self, member: impl Into<Value>) -> Result<Self> {
        self.push_member(member)?;
        Ok(self)
    }

    /// Add a member to a type that may already be embedded and return it.
    ///
    /// Accepts a [`Var`], one of its views, or declaration text parsed with
    /// [`Var::parse`]. Enumerators lose their type and array size.
    pub fn push_member(&self, member: impl Into<Value>) -> Result<Var> {
        let member = member.into();
        let var = match &member {
            Value::Text(decl) => Var::parse(decl)?,
            Value::Node(node) => match node.downcast::<Var>() {
                Some(var) => var,
                None => node
                    .downcast_ref::<VarView>()
                    .map(|view| view.var().clone())
                    .ok_or_else(|| Error::invalid_member(self.inner.kind.keyword(), node.kind()))?,
            },
            other => return Err(Error::invalid_member(self.inner.kind.keyword(), other.kind())),
        };
        if self.inner.kind == CompoundKind::Enum {
            var.ty().clear();
            var.array_size().clear();
        }
        trace!(kind = self.inner.kind.keyword(), "adding member");
        self.inner.members.append(var.decl())?;
        Ok(var)
    }

    /// Members in order.
    pub fn members(&self) -> Vec<Var> {
        self.inner
            .members
            .iter()
            .filter_map(|entry| entry.downcast_ref::<VarView>().map(|view| view.var().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.members.is_empty()
    }

    /// `struct name;`, followed by the `typedef` unless disabled.
    pub fn forward_decl(&self) -> CompoundView {
        self.view(CompoundForm::ForwardDecl)
    }

    /// The type without name on a single line, `struct {int x; int y;}`,
    /// usable as the type of a member.
    pub fn anonymous(&self) -> CompoundView {
        self.view(CompoundForm::Anonymous)
    }

    /// Pointer to this type, for member or variable types.
    pub fn ptr(&self) -> TokenList {
        TokenList::from_value(values![self, "*"])
    }

    /// `{.member=value, ...}` starting from the members' initializers.
    pub fn designated_init(&self) -> DesignatedInit {
        DesignatedInit::with_defaults(self.clone())
    }

    fn view(&self, form: CompoundForm) -> CompoundView {
        CompoundView {
            id: NodeId::fresh(),
            compound: self.clone(),
            form,
        }
    }

    fn render_members(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        if self.inner.kind != CompoundKind::Enum {
            return self.inner.members.render_entries(cx);
        }
        let members = self.members();
        let mut lines = Vec::with_capacity(members.len());
        for (i, member) in members.iter().enumerate() {
            let comma = if i + 1 < members.len() { "," } else { "" };
            let text = cx.inline(&member.defi())?;
            let side = member.trivia().side(cx)?;
            let line = cx.indent_lines(&format!("{text}{comma}{side}"));
            lines.push(member.trivia().lead(cx, line)?);
        }
        Ok(lines.join("\n"))
    }

    fn render_definition(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let keyword = self.inner.kind.keyword();
        let name = self.inner.name.require(cx)?;
        let side = self.inner.trivia.side(cx)?;
        let content = cx.nested(|cx| self.render_members(cx))?;
        let text = if self.auto_typedef() {
            let head = format!("typedef {keyword} {name}");
            format!("{} {name};{side}", wrap_braces(cx, &head, &content))
        } else {
            let head = format!("{keyword} {name}");
            format!("{};{side}", wrap_braces(cx, &head, &content))
        };
        self.inner.trivia.lead(cx, text)
    }
}

impl Commented for CompoundType {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for CompoundType {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "CompoundType"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let name = self.inner.name.require(cx)?;
        if self.auto_typedef() {
            Ok(name)
        } else {
            Ok(format!("{} {name}", self.inner.kind.keyword()))
        }
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        self.render_definition(cx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(CompoundType);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompoundForm {
    ForwardDecl,
    Anonymous,
}

/// The forward declaration or the anonymous form of a [`CompoundType`].
#[derive(Debug, Clone)]
pub struct CompoundView {
    id: NodeId,
    compound: CompoundType,
    form: CompoundForm,
}

impl CompoundView {
    pub fn compound(&self) -> &CompoundType {
        &self.compound
    }

    fn render_anonymous(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let kind = self.compound.kind();
        let mut members = Vec::new();
        for member in self.compound.members() {
            let view = match kind {
                CompoundKind::Enum => member.defi(),
                CompoundKind::Struct | CompoundKind::Union => member.decl(),
            };
            members.push(cx.inline(&view)?);
        }
        let keyword = kind.keyword();
        if members.is_empty() {
            return Ok(format!("{keyword} {{}}"));
        }
        let separator = kind.separator();
        Ok(format!(
            "{keyword} {{{}{}}}",
            members.join(separator),
            separator.trim_end()
        ))
    }

    fn render_forward_decl(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let keyword = self.compound.kind().keyword();
        let name = self.compound.name().require(cx)?;
        let mut lines = vec![format!("{keyword} {name};")];
        if self.compound.auto_typedef() {
            lines.push(format!("typedef {keyword} {name} {name};"));
        }
        Ok(cx.indent_lines(&lines.join("\n")))
    }
}

impl Node for CompoundView {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> &'static str {
        "CompoundView"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        match self.form {
            CompoundForm::Anonymous => self.render_anonymous(cx),
            CompoundForm::ForwardDecl => Ok(self.render_forward_decl(cx)?.trim_start().to_string()),
        }
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        match self.form {
            CompoundForm::ForwardDecl => self.render_forward_decl(cx),
            CompoundForm::Anonymous => {
                let text = self.render_anonymous(cx)?;
                Ok(cx.indent_lines(&text))
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(CompoundView);
