//! Type definitions reordered after their dependencies.

use std::{any::Any, rc::Rc};

use indexmap::{IndexMap, IndexSet};
use lazycode_core::{Node, NodeId, RenderContext, StatementList, Value, impl_node_value};
use tracing::debug;

use crate::{CompoundKind, CompoundType, NewLine, Result, block::statements};

#[derive(Debug)]
struct Inner {
    id: NodeId,
    entries: StatementList,
}

/// A statement list that moves structure and union definitions ahead of
/// the definitions using them.
///
/// A member whose type names another structure or union of the list by
/// value is a hard dependency: the type it names is defined first, and a
/// cycle of them fails to render. A member pointing to one is a soft
/// dependency: it is honored when possible, otherwise the pointed type is
/// forward declared. Reordered definitions come first, followed by a blank
/// line and the remaining entries in their original order.
///
/// The order is computed at render time, from the names and member types
/// the definitions have then.
#[derive(Debug, Clone)]
pub struct OrderedTypes {
    inner: Rc<Inner>,
}

impl OrderedTypes {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                id: NodeId::fresh(),
                entries: statements(),
            }),
        }
    }

    pub fn append(&self, value: impl Into<Value>) -> Result<()> {
        Ok(self.inner.entries.append(value)?)
    }

    pub fn extend<I, V>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Ok(self.inner.entries.extend(values)?)
    }

    pub fn entries(&self) -> &StatementList {
        &self.inner.entries
    }

    /// The entries in rendering order, preceded by forward declarations.
    fn arrange(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<StatementList> {
        let entries = self.inner.entries.entries();
        let mut types = IndexMap::new();
        for (index, entry) in entries.iter().enumerate() {
            let Some(compound) = entry.downcast::<CompoundType>() else {
                continue;
            };
            if compound.kind() == CompoundKind::Enum {
                continue;
            }
            let name = compound.name().require(cx)?.trim().to_string();
            types.insert(name, (index, compound));
        }

        let mut graph = Graph::new(types.len());
        let mut pending = Vec::new();
        for (node, (_, compound)) in types.values().enumerate() {
            for member in compound.members() {
                let ty = member.ty().inline(cx)?;
                let ty = strip_tag(ty.trim());
                if let Some(dep) = types.get_index_of(ty) {
                    graph.hard[node].push(dep);
                    pending.push(node);
                } else if let Some(dep) = types.get_index_of(pointee(ty).as_str()) {
                    graph.soft[node].push(dep);
                    pending.push(node);
                }
            }
        }

        let mut visit = Visit::new(types.len());
        let mut forward = IndexSet::new();
        for node in pending {
            if let Err(node) = graph.visit(node, &mut visit, &mut forward) {
                let name = types
                    .get_index(node)
                    .map(|(name, _)| name.as_str())
                    .unwrap_or_default();
                return Err(lazycode_core::Error::invalid_operation(
                    "ordered types",
                    format!("`{name}` contains itself by value through its members"),
                ));
            }
        }
        debug!(
            sorted = visit.sorted.len(),
            forward = forward.len(),
            "ordered type definitions"
        );

        let arranged = statements();
        let mut moved = Vec::with_capacity(visit.sorted.len());
        for &node in &forward {
            if let Some((_, (_, compound))) = types.get_index(node) {
                arranged.append(compound.forward_decl())?;
            }
        }
        for &node in &visit.sorted {
            if let Some((_, (index, compound))) = types.get_index(node) {
                arranged.append(compound)?;
                moved.push(*index);
            }
        }
        if !moved.is_empty() && moved.len() < entries.len() {
            arranged.append(NewLine::new())?;
        }
        for (index, entry) in entries.into_iter().enumerate() {
            if !moved.contains(&index) {
                arranged.append(entry)?;
            }
        }
        Ok(arranged)
    }
}

impl Default for OrderedTypes {
    fn default() -> Self {
        Self::new()
    }
}

/// `struct point` names the same type as `point`.
fn strip_tag(ty: &str) -> &str {
    for tag in ["struct", "union", "enum"] {
        match ty.strip_prefix(tag) {
            Some(rest) if rest.starts_with(char::is_whitespace) => return rest.trim_start(),
            _ => {}
        }
    }
    ty
}

/// `point *` and `(point)*` point to `point`.
fn pointee(ty: &str) -> String {
    ty.chars()
        .filter(|c| !matches!(c, '*' | '(' | ')'))
        .collect::<String>()
        .trim()
        .to_string()
}

struct Graph {
    hard: Vec<Vec<usize>>,
    soft: Vec<Vec<usize>>,
}

#[derive(Clone)]
struct Visit {
    sorted: Vec<usize>,
    open: Vec<bool>,
    done: Vec<bool>,
}

impl Visit {
    fn new(len: usize) -> Self {
        Self {
            sorted: Vec::new(),
            open: vec![false; len],
            done: vec![false; len],
        }
    }
}

impl Graph {
    fn new(len: usize) -> Self {
        Self {
            hard: vec![Vec::new(); len],
            soft: vec![Vec::new(); len],
        }
    }

    /// Depth-first topological sort. `Err` carries a node found on a cycle
    /// of hard dependencies.
    fn visit(
        &self,
        node: usize,
        state: &mut Visit,
        forward: &mut IndexSet<usize>,
    ) -> std::result::Result<(), usize> {
        if state.open[node] {
            return Err(node);
        }
        if state.done[node] {
            return Ok(());
        }
        state.open[node] = true;
        for &dep in &self.hard[node] {
            self.visit(dep, state, forward)?;
        }
        for &dep in &self.soft[node] {
            let saved = state.clone();
            if self.visit(dep, state, forward).is_err() {
                forward.insert(dep);
                *state = saved;
            }
        }
        state.open[node] = false;
        state.done[node] = true;
        state.sorted.push(node);
        Ok(())
    }
}

impl Node for OrderedTypes {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "OrderedTypes"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        Ok(self.freestanding(cx)?.trim_start().to_string())
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let arranged = self.arrange(cx)?;
        arranged.render_entries(cx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(OrderedTypes);

#[cfg(test)]
mod tests {
    use super::*;
    use lazycode_core::Render;

    use crate::Var;

    fn compound(name: &str, members: &[&str]) -> CompoundType {
        let compound = CompoundType::struct_(name).unwrap();
        for member in members {
            compound.push_member(*member).unwrap();
        }
        compound
    }

    #[test]
    fn test_dependencies_come_first() {
        let line = compound("line", &["point from", "point to"]);
        let point = compound("point", &["int x", "int y"]);
        let types = OrderedTypes::new();
        types.append("int before(void)").unwrap();
        types.append(&line).unwrap();
        types.append(&point).unwrap();

        insta::assert_snapshot!(types.render_freestanding(0).unwrap(), @r"
        typedef struct point
        {
            int x;
            int y;
        } point;
        typedef struct line
        {
            point from;
            point to;
        } line;

        int before(void);
        ");
    }

    #[test]
    fn test_pointer_cycle_is_forward_declared() {
        let node = compound("node", &["edge *first"]);
        let edge = compound("edge", &["node *to", "edge *next"]);
        let types = OrderedTypes::new();
        types.extend([&node, &edge]).unwrap();

        insta::assert_snapshot!(types.render_freestanding(0).unwrap(), @r"
        struct node;
        typedef struct node node;
        struct edge;
        typedef struct edge edge;
        typedef struct edge
        {
            node *to;
            edge *next;
        } edge;
        typedef struct node
        {
            edge *first;
        } node;
        ");
    }

    #[test]
    fn test_order_follows_later_changes() {
        let outer = compound("outer", &[]);
        let inner = compound("inner", &["int v"]);
        let types = OrderedTypes::new();
        types.extend([&outer, &inner]).unwrap();
        assert!(types.render_freestanding(0).unwrap().starts_with("typedef struct outer"));

        outer
            .push_member(Var::new("value").unwrap().with_type(&inner).unwrap())
            .unwrap();
        assert!(types.render_freestanding(0).unwrap().starts_with("typedef struct inner"));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(strip_tag("struct point"), "point");
        assert_eq!(strip_tag("structure_t"), "structure_t");
        assert_eq!(pointee("point *"), "point");
        assert_eq!(pointee("(node)*"), "node");
    }

    #[test]
    fn test_value_cycle_fails() {
        let a = compound("a", &["b inner"]);
        let b = compound("b", &["a inner"]);
        let types = OrderedTypes::new();
        types.extend([&a, &b]).unwrap();
        let err = types.render_freestanding(0).unwrap_err();
        assert!(matches!(
            *err,
            lazycode_core::Error::InvalidContainerOperation { .. }
        ));
    }
}
