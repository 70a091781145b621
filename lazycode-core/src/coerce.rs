//! Coercion of plain values into nodes.
//!
//! Every "pass a string or a fully built node" ergonomic goes through this
//! module. A [`Role`] names what a node is used for (a token, a statement,
//! a name, a comment...), and the [`CoercionRule`] registered for that role
//! decides which nodes already satisfy it and how to build one from
//! anything else.
//!
//! Language libraries plug in through [`register_coercion`]:
//!
//! ```
//! use lazycode_core::{coerce, register_coercion, CoercionRule, Render, Role, TokenList};
//!
//! const SHOUT: Role = Role::new("example.shout");
//!
//! register_coercion(
//!     SHOUT,
//!     CoercionRule::new(|value| {
//!         let text = value.as_text().unwrap_or_default().to_uppercase();
//!         Ok(TokenList::from_value(text).into())
//!     }),
//! );
//!
//! let node = coerce("hello", &SHOUT).unwrap();
//! assert_eq!(node.render_inline().unwrap(), "HELLO");
//! ```

use std::{borrow::Cow, cell::RefCell, fmt, rc::Rc};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{Error, Node, NodeRef, Result, Token, TokenList, Value, node::empty};

/// The use a node is put to, which determines how values are coerced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Inline fragment. Any node qualifies; plain values become a [`TokenList`].
    pub const TOKEN: Role = Role::new("token");

    /// Entry of a structural container. Any node qualifies; plain values
    /// become a [`TokenList`] rendered as a line of its own.
    pub const STATEMENT: Role = Role::new("statement");

    /// Identifier. Only token lists qualify; text and characters become a
    /// [`TokenList`], other nodes are wrapped in one, numbers and lists
    /// are rejected.
    pub const NAME: Role = Role::new("name");

    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// A role whose name is only known at runtime.
    pub fn owned(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

type Accepts = dyn Fn(&NodeRef) -> bool;
type Builds = dyn Fn(Value) -> Result<NodeRef>;

/// How to obtain a node for one role.
#[derive(Clone)]
pub struct CoercionRule {
    accepts: Rc<Accepts>,
    build: Rc<Builds>,
}

impl CoercionRule {
    /// A rule accepting every node unchanged and building the rest with `build`.
    pub fn new(build: impl Fn(Value) -> Result<NodeRef> + 'static) -> Self {
        Self {
            accepts: Rc::new(|_| true),
            build: Rc::new(build),
        }
    }

    /// A rule accepting only nodes of type `N` unchanged.
    pub fn for_type<N: Node>(build: impl Fn(Value) -> Result<NodeRef> + 'static) -> Self {
        Self::new(build).accepting(NodeRef::is::<N>)
    }

    /// Replace the predicate deciding which nodes already satisfy the role.
    pub fn accepting(mut self, accepts: impl Fn(&NodeRef) -> bool + 'static) -> Self {
        self.accepts = Rc::new(accepts);
        self
    }

    /// Whether `node` can be used for the role as is.
    pub fn is_satisfied_by(&self, node: &NodeRef) -> bool {
        (self.accepts)(node)
    }

    fn apply(&self, value: Value, role: &Role) -> Result<NodeRef> {
        match value {
            Value::None => Ok(empty()),
            Value::Node(node) if self.is_satisfied_by(&node) => Ok(node),
            other => {
                trace!(%role, kind = other.kind(), "building node");
                (self.build)(other)
            }
        }
    }
}

impl fmt::Debug for CoercionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoercionRule").finish_non_exhaustive()
    }
}

/// Rules indexed by role.
#[derive(Debug, Clone, Default)]
pub struct CoercionRegistry {
    rules: IndexMap<Role, CoercionRule>,
}

impl CoercionRegistry {
    /// A registry without any rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the rules for [`Role::TOKEN`], [`Role::STATEMENT`]
    /// and [`Role::NAME`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Role::TOKEN, CoercionRule::new(build_token_list));
        registry.register(Role::STATEMENT, CoercionRule::new(build_token_list));
        registry.register(Role::NAME, CoercionRule::for_type::<TokenList>(build_name));
        registry
    }

    /// Register `rule` for `role`, returning the rule it replaces.
    pub fn register(&mut self, role: Role, rule: CoercionRule) -> Option<CoercionRule> {
        debug!(%role, "registering coercion rule");
        self.rules.insert(role, rule)
    }

    pub fn rule(&self, role: &Role) -> Option<&CoercionRule> {
        self.rules.get(role)
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.rules.contains_key(role)
    }

    /// Registered roles, in registration order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.rules.keys()
    }

    /// Coerce `value` into a node for `role`.
    ///
    /// A node already satisfying the role is returned unchanged, `None`
    /// becomes the empty node, anything else is handed to the role's
    /// builder.
    pub fn coerce(&self, value: impl Into<Value>, role: &Role) -> Result<NodeRef> {
        let value = value.into();
        match self.rule(role) {
            Some(rule) => rule.apply(value, role),
            None => Err(Error::unsupported_coercion(role, value.kind())),
        }
    }
}

thread_local! {
    static REGISTRY: RefCell<CoercionRegistry> = RefCell::new(CoercionRegistry::with_builtins());
}

/// Register `rule` for `role` in this thread's default registry.
pub fn register_coercion(role: Role, rule: CoercionRule) -> Option<CoercionRule> {
    REGISTRY.with(|registry| registry.borrow_mut().register(role, rule))
}

/// Whether this thread's default registry has a rule for `role`.
pub fn is_registered(role: &Role) -> bool {
    REGISTRY.with(|registry| registry.borrow().contains(role))
}

/// Coerce `value` into a node for `role` using this thread's default registry.
pub fn coerce(value: impl Into<Value>, role: &Role) -> Result<NodeRef> {
    let value = value.into();
    // Builders may coerce recursively, so the registry is not borrowed
    // while one runs.
    let rule = REGISTRY.with(|registry| registry.borrow().rule(role).cloned());
    match rule {
        Some(rule) => rule.apply(value, role),
        None => Err(Error::unsupported_coercion(role, value.kind())),
    }
}

/// Normalize a value into token list entries.
///
/// Scalars become text, nodes are kept as live references, lists are
/// flattened in order and `None` yields nothing.
pub fn to_tokens(value: Value) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_tokens(&mut tokens, value);
    tokens
}

fn push_tokens(tokens: &mut Vec<Token>, value: Value) {
    match value {
        Value::None => {}
        Value::Node(node) => tokens.push(Token::Node(node)),
        Value::List(items) => {
            for item in items {
                push_tokens(tokens, item);
            }
        }
        scalar => tokens.push(Token::Text(scalar.as_text().unwrap_or_default())),
    }
}

fn build_token_list(value: Value) -> Result<NodeRef> {
    Ok(TokenList::from_value(value).into())
}

fn build_name(value: Value) -> Result<NodeRef> {
    match value {
        Value::Text(_) | Value::Char(_) | Value::Node(_) => build_token_list(value),
        other => Err(Error::unsupported_coercion(&Role::NAME, other.kind())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeExt, Render, StatementList};

    #[test]
    fn test_conforming_node_is_returned_unchanged() {
        let node = TokenList::from_value("x").to_node();
        let coerced = coerce(&node, &Role::TOKEN).unwrap();
        assert!(coerced.same(&node));

        let coerced = coerce(&node, &Role::NAME).unwrap();
        assert!(coerced.same(&node));
    }

    #[test]
    fn test_coercion_is_idempotent() {
        let once = coerce(42, &Role::TOKEN).unwrap();
        let twice = coerce(&once, &Role::TOKEN).unwrap();
        assert!(once.same(&twice));
        assert_eq!(twice.render_inline().unwrap(), "42");
    }

    #[test]
    fn test_none_coerces_to_empty() {
        let node = coerce(Value::None, &Role::STATEMENT).unwrap();
        assert_eq!(node.id(), crate::NodeId::EMPTY);
    }

    #[test]
    fn test_name_wraps_foreign_nodes() {
        let list = StatementList::new();
        let coerced = coerce(&list, &Role::NAME).unwrap();
        assert!(coerced.is::<TokenList>());
        assert!(!coerced.same(&list.to_node()));
    }

    #[test]
    fn test_name_rejects_numbers() {
        let err = coerce(3, &Role::NAME).unwrap_err();
        assert!(matches!(
            *err,
            Error::UnsupportedCoercion { ref role, ref kind } if role == "name" && kind == "integer"
        ));
    }

    #[test]
    fn test_unknown_role_fails() {
        let err = coerce("x", &Role::new("nowhere")).unwrap_err();
        assert!(matches!(*err, Error::UnsupportedCoercion { .. }));
    }

    #[test]
    fn test_registry_instance() {
        let mut registry = CoercionRegistry::new();
        assert!(registry.coerce("x", &Role::TOKEN).is_err());

        let role = Role::owned("wrapped");
        registry.register(
            role.clone(),
            CoercionRule::new(|value| {
                Ok(TokenList::from_value(crate::values!["(", value, ")"]).into())
            }),
        );
        let node = registry.coerce("x", &role).unwrap();
        assert_eq!(node.render_inline().unwrap(), "(x)");
        assert_eq!(registry.roles().count(), 1);
    }

    #[test]
    fn test_register_replaces_rule() {
        let role = Role::new("test.replace");
        assert!(register_coercion(role.clone(), CoercionRule::new(build_token_list)).is_none());
        assert!(register_coercion(role.clone(), CoercionRule::new(build_token_list)).is_some());
        assert!(is_registered(&role));
    }

    #[test]
    fn test_builder_may_coerce_recursively() {
        let role = Role::new("test.recursive");
        register_coercion(
            role.clone(),
            CoercionRule::for_type::<StatementList>(|value| {
                let inner = coerce(value, &Role::STATEMENT)?;
                let list = StatementList::new();
                list.append(inner)?;
                Ok(list.into())
            }),
        );
        let node = coerce("a;", &role).unwrap();
        assert!(node.is::<StatementList>());
        assert_eq!(node.render_freestanding(0).unwrap(), "a;");
    }

    #[test]
    fn test_to_tokens_flattens() {
        let tokens = to_tokens(crate::values!["a", crate::values![1, 'b'], Value::None]);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].as_text(), Some("1"));
    }
}
