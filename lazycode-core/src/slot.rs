//! Deferred slots: named, role-typed attributes of a node.

use std::{
    any::Any,
    borrow::Cow,
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use crate::{Node, NodeId, NodeRef, RenderContext, Result, Role, Value, coerce::coerce, node::empty};

/// Binding state of a [`Slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Unset,
    Bound,
}

struct Inner {
    name: Cow<'static, str>,
    role: Role,
    node: RefCell<NodeRef>,
    state: Cell<SlotState>,
}

/// A named attribute holding one node.
///
/// Writes coerce the value through the slot's role immediately, so an
/// unsupported value fails where it is assigned. Reads return the bound
/// node itself: mutating it mutates what the owner renders.
///
/// ```
/// use lazycode_core::{Render, Role, Slot, TokenList};
///
/// let name = Slot::new("name", Role::NAME);
/// name.set("foo").unwrap();
///
/// let node: TokenList = name.get().downcast().unwrap();
/// node.append("_bar");
/// assert_eq!(name.get().render_inline().unwrap(), "foo_bar");
/// ```
#[derive(Clone)]
pub struct Slot {
    inner: Rc<Inner>,
}

impl Slot {
    /// An unset slot.
    pub fn new(name: impl Into<Cow<'static, str>>, role: Role) -> Self {
        Self {
            inner: Rc::new(Inner {
                name: name.into(),
                role,
                node: RefCell::new(empty()),
                state: Cell::new(SlotState::Unset),
            }),
        }
    }

    /// A slot bound to `value`.
    pub fn with_value(
        name: impl Into<Cow<'static, str>>,
        role: Role,
        value: impl Into<Value>,
    ) -> Result<Self> {
        let slot = Self::new(name, role);
        slot.set(value)?;
        Ok(slot)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn role(&self) -> &Role {
        &self.inner.role
    }

    /// The bound node, or the empty node while unset.
    pub fn get(&self) -> NodeRef {
        self.inner.node.borrow().clone()
    }

    /// Coerce and bind `value`. Binding `None` resets the slot.
    pub fn set(&self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if value.is_none() {
            self.clear();
            return Ok(());
        }
        let node = coerce(value, &self.inner.role)?;
        *self.inner.node.borrow_mut() = node;
        self.inner.state.set(SlotState::Bound);
        Ok(())
    }

    pub fn clear(&self) {
        *self.inner.node.borrow_mut() = empty();
        self.inner.state.set(SlotState::Unset);
    }

    pub fn state(&self) -> SlotState {
        self.inner.state.get()
    }

    pub fn is_bound(&self) -> bool {
        self.state() == SlotState::Bound
    }

    /// Render the bound node inline; an unset slot renders nothing.
    pub fn inline(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        cx.inline(&self.get())
    }

    /// Render the bound node freestanding; an unset slot renders nothing.
    pub fn freestanding(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        cx.freestanding(&self.get())
    }

    /// Render the bound node inline, applying the missing-content policy
    /// when the slot is unset.
    pub fn require(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        match self.state() {
            SlotState::Bound => self.inline(cx),
            SlotState::Unset => cx.missing_content(&self.inner.name),
        }
    }

    /// A node rendering whatever this slot holds at render time.
    pub fn proxy(&self) -> SlotProxy {
        SlotProxy {
            id: NodeId::fresh(),
            slot: self.clone(),
            required: false,
        }
    }

    /// Like [`proxy`](Self::proxy), applying the missing-content policy
    /// when the slot is unset at render time.
    pub fn required_proxy(&self) -> SlotProxy {
        SlotProxy {
            required: true,
            ..self.proxy()
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.inner.name)
            .field("role", &self.inner.role)
            .field("state", &self.state())
            .field("node", &self.get())
            .finish()
    }
}

/// A node standing for the current content of a [`Slot`].
///
/// Embedding the proxy instead of the slot's node keeps later rebinding
/// visible: `slot.set(...)` after the proxy was stored still changes what
/// renders.
#[derive(Debug, Clone)]
pub struct SlotProxy {
    id: NodeId,
    slot: Slot,
    required: bool,
}

impl SlotProxy {
    pub fn slot(&self) -> &Slot {
        &self.slot
    }
}

impl Node for SlotProxy {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> &'static str {
        "SlotProxy"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        if self.required {
            self.slot.require(cx)
        } else {
            self.slot.inline(cx)
        }
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        if self.required && !self.slot.is_bound() {
            let text = self.slot.require(cx)?;
            return Ok(cx.indent_lines(&text));
        }
        self.slot.freestanding(cx)
    }

    fn nests(&self) -> bool {
        self.slot.get().nests()
    }

    fn blank_line(&self) -> bool {
        self.slot.get().blank_line()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

crate::impl_node_value!(SlotProxy);
crate::impl_node_concat!(SlotProxy);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error, MissingContentPolicy, Render, RenderConfig, StatementList, TokenList, values,
    };

    #[test]
    fn test_unset_slot_holds_empty_node() {
        let slot = Slot::new("body", Role::STATEMENT);
        assert_eq!(slot.state(), SlotState::Unset);
        assert_eq!(slot.get().id(), NodeId::EMPTY);
    }

    #[test]
    fn test_set_coerces_and_binds() {
        let slot = Slot::new("name", Role::NAME);
        slot.set("foo").unwrap();
        assert!(slot.is_bound());
        assert!(slot.get().is::<TokenList>());
    }

    #[test]
    fn test_last_write_wins() {
        let slot = Slot::with_value("name", Role::NAME, "a").unwrap();
        slot.set("b").unwrap();
        assert_eq!(slot.get().render_inline().unwrap(), "b");
    }

    #[test]
    fn test_set_none_resets() {
        let slot = Slot::with_value("name", Role::NAME, "a").unwrap();
        slot.set(Value::None).unwrap();
        assert_eq!(slot.state(), SlotState::Unset);
        assert_eq!(slot.get().render_inline().unwrap(), "");
    }

    #[test]
    fn test_failed_write_keeps_previous_binding() {
        let slot = Slot::with_value("name", Role::NAME, "a").unwrap();
        let err = slot.set(3).unwrap_err();
        assert!(matches!(*err, Error::UnsupportedCoercion { .. }));
        assert_eq!(slot.get().render_inline().unwrap(), "a");
    }

    #[test]
    fn test_bound_node_is_live() {
        let slot = Slot::with_value("name", Role::NAME, "foo").unwrap();
        let name: TokenList = slot.get().downcast().unwrap();
        name.append("_bar");
        assert_eq!(slot.get().render_inline().unwrap(), "foo_bar");
    }

    #[test]
    fn test_proxy_follows_rebinding() {
        let slot = Slot::with_value("name", Role::NAME, "old").unwrap();
        let call = TokenList::from_value(values![slot.proxy(), "()"]);
        slot.set("new").unwrap();
        assert_eq!(call.render_inline().unwrap(), "new()");
    }

    #[test]
    fn test_required_proxy_applies_policy() {
        let slot = Slot::new("name", Role::NAME);
        let call = TokenList::from_value(values![slot.required_proxy(), "()"]);

        let config = RenderConfig::default()
            .with_missing_content(MissingContentPolicy::Placeholder)
            .with_placeholder("<{slot}>");
        assert_eq!(call.render_inline_with(&config).unwrap(), "<name>()");

        let config = RenderConfig::default().with_missing_content(MissingContentPolicy::Error);
        let err = call.render_inline_with(&config).unwrap_err();
        assert!(matches!(*err, Error::MissingContent { .. }));

        slot.set("f").unwrap();
        assert_eq!(call.render_inline_with(&config).unwrap(), "f()");
    }

    #[test]
    fn test_proxy_of_container_nests() {
        let slot = Slot::with_value("body", Role::STATEMENT, StatementList::new()).unwrap();
        let outer = StatementList::new();
        outer.append(slot.proxy()).unwrap();

        let body: StatementList = slot.get().downcast().unwrap();
        body.append("x;").unwrap();
        assert_eq!(outer.render_freestanding(0).unwrap(), "    x;");
    }
}
