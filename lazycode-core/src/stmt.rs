//! Structural containers: ordered statements rendered one per line.

use std::{any::Any, cell::RefCell, fmt, rc::Rc};

use crate::{Error, Node, NodeId, NodeRef, RenderContext, Result, Role, Value, coerce::coerce};

struct Inner {
    id: NodeId,
    role: Role,
    entries: RefCell<Vec<NodeRef>>,
}

/// An ordered, mutable sequence of statement nodes.
///
/// Each entry renders freestanding on its own line(s) at the container's
/// indentation level. An entry that is itself a structural container
/// renders one level deeper. Values that are not nodes are coerced through
/// the container's element role, [`Role::STATEMENT`] unless chosen with
/// [`with_role`](Self::with_role).
///
/// Entries are stored by reference: a container embedded in another one
/// can keep growing, and the outer container shows it at its next render.
#[derive(Clone)]
pub struct StatementList {
    inner: Rc<Inner>,
}

impl StatementList {
    pub fn new() -> Self {
        Self::with_role(Role::STATEMENT)
    }

    /// An empty container coercing its entries through `role`.
    pub fn with_role(role: Role) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: NodeId::fresh(),
                role,
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    /// A container holding `values`, each appended in order.
    pub fn from_values<I, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let list = Self::new();
        list.extend(values)?;
        Ok(list)
    }

    /// Role used to coerce entries.
    pub fn role(&self) -> &Role {
        &self.inner.role
    }

    /// Coerce `value` and add it at the end.
    ///
    /// A list value appends each of its items; `None` appends nothing.
    pub fn append(&self, value: impl Into<Value>) -> Result<()> {
        let nodes = self.coerce_entries(value.into())?;
        self.inner.entries.borrow_mut().extend(nodes);
        Ok(())
    }

    /// Append every value in order.
    pub fn extend<I, V>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        for value in values {
            self.append(value)?;
        }
        Ok(())
    }

    /// Coerce `value` and insert it before the entry at `index`.
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(Error::invalid_operation(
                "statement list",
                format!("cannot insert at index {index} (len {len})"),
            ));
        }
        let nodes = self.coerce_entries(value.into())?;
        self.inner.entries.borrow_mut().splice(index..index, nodes);
        Ok(())
    }

    /// Remove the entry that is `node`, compared by identity.
    pub fn remove<N: Node + ?Sized>(&self, node: &N) -> Result<NodeRef> {
        let id = node.id();
        match self.position(node) {
            Some(index) => Ok(self.inner.entries.borrow_mut().remove(index)),
            None => Err(Error::invalid_operation(
                "statement list",
                format!("node {id} is not an entry"),
            )),
        }
    }

    /// Remove and return the last entry.
    pub fn pop(&self) -> Option<NodeRef> {
        self.inner.entries.borrow_mut().pop()
    }

    pub fn get(&self, index: usize) -> Option<NodeRef> {
        self.inner.entries.borrow().get(index).cloned()
    }

    /// Replace the entry at `index`, returning the previous one.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<NodeRef> {
        let node = coerce(value, &self.inner.role)?;
        let mut entries = self.inner.entries.borrow_mut();
        let len = entries.len();
        match entries.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, node)),
            None => Err(Error::invalid_operation(
                "statement list",
                format!("cannot set index {index} (len {len})"),
            )),
        }
    }

    /// Index of the entry that is `node`.
    pub fn position<N: Node + ?Sized>(&self, node: &N) -> Option<usize> {
        let id = node.id();
        self.inner.entries.borrow().iter().position(|e| e.id() == id)
    }

    pub fn contains<N: Node + ?Sized>(&self, node: &N) -> bool {
        self.position(node).is_some()
    }

    /// Snapshot of the entries. Later mutations of the container do not
    /// affect it; mutations of the entries themselves do.
    pub fn entries(&self) -> Vec<NodeRef> {
        self.inner.entries.borrow().clone()
    }

    pub fn iter(&self) -> std::vec::IntoIter<NodeRef> {
        self.entries().into_iter()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.inner.entries.borrow_mut().clear();
    }

    /// Render every entry freestanding at the context's level, one per line.
    ///
    /// Nesting entries render one level deeper. Entries rendering to nothing
    /// are skipped unless they are [blank lines](Node::blank_line).
    pub fn render_entries(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let mut lines = Vec::with_capacity(self.len());
        for entry in self.entries() {
            let text = if entry.nests() {
                cx.nested(|cx| cx.freestanding(&entry))?
            } else {
                cx.freestanding(&entry)?
            };
            if text.is_empty() && !entry.blank_line() {
                continue;
            }
            lines.push(text);
        }
        Ok(lines.join("\n"))
    }

    fn coerce_entries(&self, value: Value) -> Result<Vec<NodeRef>> {
        match value {
            Value::None => Ok(Vec::new()),
            Value::List(items) => items
                .into_iter()
                .filter(|item| !item.is_none())
                .map(|item| coerce(item, &self.inner.role))
                .collect(),
            other => Ok(vec![coerce(other, &self.inner.role)?]),
        }
    }
}

impl Node for StatementList {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "StatementList"
    }

    /// The freestanding text without its leading blank lines and
    /// indentation, so it can continue a line already placed by the caller.
    fn inline(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let text = self.render_entries(cx)?;
        Ok(text.trim_start().to_string())
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        self.render_entries(cx)
    }

    fn nests(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

crate::impl_node_value!(StatementList);
crate::impl_node_concat!(StatementList);

impl Default for StatementList {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for StatementList {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for StatementList {}

impl fmt::Debug for StatementList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementList")
            .field("id", &self.inner.id)
            .field("role", &self.inner.role)
            .field("len", &self.len())
            .finish()
    }
}

impl IntoIterator for &StatementList {
    type Item = NodeRef;
    type IntoIter = std::vec::IntoIter<NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
