//! The node abstraction shared by every construct.
//!
//! A node renders itself in two contexts:
//!
//! - **inline**: a fragment usable inside a larger expression or line,
//! - **freestanding**: one or more complete lines, indented for the
//!   context's current level.
//!
//! Nodes are handles. Cloning one shares the underlying node, so a node
//! stored in several places is one node, and mutations made through any
//! handle are visible at the next render.

use std::{
    any::Any,
    fmt,
    ops::Add,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use tracing::debug;

use crate::{RenderConfig, RenderContext, Result, TokenList, Value};

/// Identity of a node.
///
/// Allocated once per constructed node; handles cloned from the same node
/// share it. Containers compare entries by identity, and the renderer uses
/// it to detect cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Identity shared by every [`Empty`] node.
    pub const EMPTY: NodeId = NodeId(0);

    /// Allocate a fresh identity.
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capability set implemented by every construct.
///
/// Both render methods are pure functions of the node's current state.
/// Implementations render their children through the context
/// ([`RenderContext::inline`], [`RenderContext::freestanding`]) rather
/// than by calling these methods directly, so that indentation and cycle
/// detection apply to the whole tree.
pub trait Node: Any {
    /// Identity of this node.
    fn id(&self) -> NodeId;

    /// Short type name used in logs and diagnostics.
    fn kind(&self) -> &'static str;

    /// Render as a fragment of a larger line.
    fn inline(&self, cx: &mut RenderContext<'_>) -> Result<String>;

    /// Render as complete lines at the context's indentation level.
    ///
    /// The default indents every line of the inline rendering.
    fn freestanding(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let text = self.inline(cx)?;
        Ok(cx.indent_lines(&text))
    }

    /// Whether this node opens a new indentation level when stored as an
    /// entry of a structural container.
    fn nests(&self) -> bool {
        false
    }

    /// Whether this node stands for a blank line.
    ///
    /// Structural containers drop entries that render to nothing, except
    /// blank lines.
    fn blank_line(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

/// Render entry points available on every node.
pub trait Render {
    /// Render inline with the default configuration.
    fn render_inline(&self) -> Result<String>;

    /// Render inline with the given configuration.
    fn render_inline_with(&self, config: &RenderConfig) -> Result<String>;

    /// Render freestanding at `indent_level` with the default configuration.
    fn render_freestanding(&self, indent_level: usize) -> Result<String>;

    /// Render freestanding at `indent_level` with the given configuration.
    fn render_freestanding_with(&self, indent_level: usize, config: &RenderConfig)
    -> Result<String>;
}

impl<N: Node + ?Sized> Render for N {
    fn render_inline(&self) -> Result<String> {
        self.render_inline_with(&RenderConfig::default())
    }

    fn render_inline_with(&self, config: &RenderConfig) -> Result<String> {
        debug!(node = %self.id(), kind = self.kind(), "rendering inline");
        RenderContext::new(config).inline(self)
    }

    fn render_freestanding(&self, indent_level: usize) -> Result<String> {
        self.render_freestanding_with(indent_level, &RenderConfig::default())
    }

    fn render_freestanding_with(
        &self,
        indent_level: usize,
        config: &RenderConfig,
    ) -> Result<String> {
        debug!(
            node = %self.id(),
            kind = self.kind(),
            indent_level,
            "rendering freestanding"
        );
        RenderContext::at_level(config, indent_level).freestanding(self)
    }
}

/// Conversions shared by every concrete node handle.
pub trait NodeExt: Node + Clone {
    /// Type-erased handle to this node.
    fn to_node(&self) -> NodeRef {
        NodeRef::new(self.clone())
    }

    /// A token list holding this node followed by `other`.
    ///
    /// Neither operand is modified.
    fn concat(&self, other: impl Into<Value>) -> TokenList {
        TokenList::from_value(self.to_node()).concat(other)
    }
}

impl<N: Node + Clone> NodeExt for N {}

/// Type-erased, shared handle to a node.
#[derive(Clone)]
pub struct NodeRef(Rc<dyn Node>);

impl NodeRef {
    pub fn new<N: Node>(node: N) -> Self {
        Self(Rc::new(node))
    }

    /// Whether both handles refer to the same node.
    pub fn same(&self, other: &NodeRef) -> bool {
        self.id() == other.id()
    }

    /// Whether the node is of type `N`.
    pub fn is<N: Node>(&self) -> bool {
        self.0.as_any().is::<N>()
    }

    pub fn downcast_ref<N: Node>(&self) -> Option<&N> {
        self.0.as_any().downcast_ref::<N>()
    }

    /// Typed handle to the node, sharing it.
    pub fn downcast<N: Node + Clone>(&self) -> Option<N> {
        self.downcast_ref::<N>().cloned()
    }
}

impl Node for NodeRef {
    fn id(&self) -> NodeId {
        self.0.id()
    }

    fn kind(&self) -> &'static str {
        self.0.kind()
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        self.0.inline(cx)
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        self.0.freestanding(cx)
    }

    fn nests(&self) -> bool {
        self.0.nests()
    }

    fn blank_line(&self) -> bool {
        self.0.blank_line()
    }

    fn as_any(&self) -> &dyn Any {
        self.0.as_any()
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind(), self.id())
    }
}

impl<V: Into<Value>> Add<V> for NodeRef {
    type Output = TokenList;

    fn add(self, rhs: V) -> TokenList {
        TokenList::from_value(crate::values![self, rhs])
    }
}

impl<V: Into<Value>> Add<V> for &NodeRef {
    type Output = TokenList;

    fn add(self, rhs: V) -> TokenList {
        TokenList::from_value(crate::values![self, rhs])
    }
}

/// The empty node: renders to nothing in both contexts.
///
/// Slots hold it until they are bound, and `Value::None` coerces to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

impl Node for Empty {
    fn id(&self) -> NodeId {
        NodeId::EMPTY
    }

    fn kind(&self) -> &'static str {
        "Empty"
    }

    fn inline(&self, _cx: &mut RenderContext<'_>) -> Result<String> {
        Ok(String::new())
    }

    fn freestanding(&self, _cx: &mut RenderContext<'_>) -> Result<String> {
        Ok(String::new())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

thread_local! {
    static EMPTY: NodeRef = NodeRef::new(Empty);
}

/// Shared handle to the empty node.
pub fn empty() -> NodeRef {
    EMPTY.with(Clone::clone)
}
