//! Token containers: ordered sequences rendered like deferred strings.

use std::{
    any::Any,
    cell::RefCell,
    fmt,
    ops::{Add, AddAssign, Mul},
    rc::Rc,
};

use crate::{Error, Node, NodeId, NodeRef, RenderContext, Result, Value, coerce::to_tokens};

/// One entry of a [`TokenList`].
#[derive(Debug, Clone)]
pub enum Token {
    /// Raw text, rendered verbatim.
    Text(String),
    /// A node, rendered inline.
    Node(NodeRef),
}

impl Token {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Text(s) => Some(s),
            Token::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Token::Node(node) => Some(node),
            Token::Text(_) => None,
        }
    }
}

impl From<Token> for Value {
    fn from(token: Token) -> Self {
        match token {
            Token::Text(s) => Value::Text(s),
            Token::Node(node) => Value::Node(node),
        }
    }
}

struct Inner {
    id: NodeId,
    tokens: RefCell<Vec<Token>>,
}

/// An ordered, mutable sequence of text and nodes.
///
/// Rendering concatenates the entries in order: text verbatim, nodes
/// through their inline rendering. Nothing is stringified before render
/// time, so a node appended now and mutated later renders in its final
/// state.
///
/// `TokenList` is a handle: clones share the same sequence.
///
/// ```
/// use lazycode_core::{values, Render, TokenList};
///
/// let assign = TokenList::from_value(values!["x", " = ", 5]);
/// assert_eq!(assign.render_inline().unwrap(), "x = 5");
/// ```
#[derive(Clone)]
pub struct TokenList {
    inner: Rc<Inner>,
}

impl TokenList {
    /// An empty token list.
    pub fn new() -> Self {
        Self::from_tokens(Vec::new())
    }

    /// A token list holding `value`; lists are flattened into entries.
    pub fn from_value(value: impl Into<Value>) -> Self {
        Self::from_tokens(to_tokens(value.into()))
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: NodeId::fresh(),
                tokens: RefCell::new(tokens),
            }),
        }
    }

    /// Append `value` in place.
    ///
    /// A node (including another token list) is stored by reference, so its
    /// later mutations show up in this list's renders.
    pub fn append(&self, value: impl Into<Value>) -> &Self {
        let tokens = to_tokens(value.into());
        self.inner.tokens.borrow_mut().extend(tokens);
        self
    }

    /// Append every value in order.
    pub fn extend<I, V>(&self, values: I) -> &Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        for value in values {
            self.append(value);
        }
        self
    }

    /// A new token list holding this list's entries followed by `other`.
    ///
    /// When `other` is a token list its entries are spliced in; any other
    /// value is normalized as a single value. Neither operand is modified.
    ///
    /// The `+` operator differs: it keeps both operands by reference.
    pub fn concat(&self, other: impl Into<Value>) -> TokenList {
        let mut tokens = self.tokens();
        tokens.extend(splice(other.into()));
        TokenList::from_tokens(tokens)
    }

    /// A new token list holding `other` followed by this list.
    ///
    /// This list is held by reference, so appending to it later shows up in
    /// the result. Neither operand is modified.
    pub fn concat_front(&self, other: impl Into<Value>) -> TokenList {
        let mut tokens = to_tokens(other.into());
        tokens.push(Token::Node(NodeRef::new(self.clone())));
        TokenList::from_tokens(tokens)
    }

    /// Insert `value` before the entry at `index`.
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let mut tokens = self.inner.tokens.borrow_mut();
        if index > tokens.len() {
            return Err(out_of_range("insert at", index, tokens.len()));
        }
        tokens.splice(index..index, to_tokens(value.into()));
        Ok(())
    }

    /// Remove and return the entry at `index`.
    pub fn remove(&self, index: usize) -> Result<Token> {
        let mut tokens = self.inner.tokens.borrow_mut();
        if index >= tokens.len() {
            return Err(out_of_range("remove at", index, tokens.len()));
        }
        Ok(tokens.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<Token> {
        self.inner.tokens.borrow().get(index).cloned()
    }

    /// Snapshot of the entries.
    pub fn tokens(&self) -> Vec<Token> {
        self.inner.tokens.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.tokens.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.tokens.borrow().is_empty()
    }

    /// Remove every entry, keeping the list's identity.
    pub fn clear(&self) {
        self.inner.tokens.borrow_mut().clear();
    }

    /// A new token list rendering this list `times` times.
    pub fn repeat(&self, times: usize) -> TokenList {
        let node = Token::Node(NodeRef::new(self.clone()));
        TokenList::from_tokens((0..times).map(|_| node.clone()).collect())
    }
}

fn splice(value: Value) -> Vec<Token> {
    if let Some(list) = value.as_node().and_then(|node| node.downcast_ref::<TokenList>()) {
        return list.tokens();
    }
    to_tokens(value)
}

fn out_of_range(operation: &str, index: usize, len: usize) -> Box<Error> {
    Error::invalid_operation(
        "token list",
        format!("cannot {operation} index {index} (len {len})"),
    )
}

impl Node for TokenList {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "TokenList"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> Result<String> {
        let mut out = String::new();
        for token in self.tokens() {
            match token {
                Token::Text(text) => out.push_str(&text),
                Token::Node(node) => out.push_str(&cx.inline(&node)?),
            }
        }
        Ok(out)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

crate::impl_node_value!(TokenList);

impl Default for TokenList {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TokenList {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for TokenList {}

impl fmt::Debug for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenList")
            .field("id", &self.inner.id)
            .field("len", &self.len())
            .finish()
    }
}

impl<V: Into<Value>> FromIterator<V> for TokenList {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let list = TokenList::new();
        list.extend(iter);
        list
    }
}

impl<V: Into<Value>> Add<V> for TokenList {
    type Output = TokenList;

    fn add(self, rhs: V) -> TokenList {
        TokenList::from_value(crate::values![self, rhs])
    }
}

impl<V: Into<Value>> Add<V> for &TokenList {
    type Output = TokenList;

    fn add(self, rhs: V) -> TokenList {
        TokenList::from_value(crate::values![self, rhs])
    }
}

impl<V: Into<Value>> AddAssign<V> for TokenList {
    fn add_assign(&mut self, rhs: V) {
        self.append(rhs);
    }
}

impl Add<TokenList> for &str {
    type Output = TokenList;

    fn add(self, rhs: TokenList) -> TokenList {
        rhs.concat_front(self)
    }
}

impl Add<TokenList> for String {
    type Output = TokenList;

    fn add(self, rhs: TokenList) -> TokenList {
        rhs.concat_front(self)
    }
}

impl Mul<usize> for &TokenList {
    type Output = TokenList;

    fn mul(self, times: usize) -> TokenList {
        self.repeat(times)
    }
}

impl Mul<usize> for TokenList {
    type Output = TokenList;

    fn mul(self, times: usize) -> TokenList {
        self.repeat(times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeExt, Render, values};

    #[test]
    fn test_mixed_values_render_in_order() {
        let list = TokenList::from_value(values!["x", " = ", 5]);
        assert_eq!(list.render_inline().unwrap(), "x = 5");
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_empty_renders_empty_string() {
        assert_eq!(TokenList::new().render_inline().unwrap(), "");
        assert_eq!(TokenList::new().render_freestanding(2).unwrap(), "");
    }

    #[test]
    fn test_append_and_extend() {
        let list = TokenList::new();
        list.append("a").extend(["b", "c"]);
        list.append(None::<&str>);
        assert_eq!(list.render_inline().unwrap(), "abc");
    }

    #[test]
    fn test_appended_node_is_live() {
        let name = TokenList::from_value("foo");
        let call = TokenList::from_value(values![&name, "()"]);
        name.append("_bar");
        assert_eq!(call.render_inline().unwrap(), "foo_bar()");
    }

    #[test]
    fn test_concat_does_not_mutate() {
        let a = TokenList::from_value("a");
        let b = TokenList::from_value(values!["b", 1]);
        let ab = a.concat(&b);

        assert_eq!(ab.render_inline().unwrap(), "ab1");
        assert_eq!(ab.len(), 3);
        assert_eq!(a.render_inline().unwrap(), "a");
        assert_eq!(b.render_inline().unwrap(), "b1");
        assert_ne!(ab, a);
    }

    #[test]
    fn test_operators() {
        let x = TokenList::from_value("x");
        let sum = &x + " + " + 1;
        assert_eq!(sum.render_inline().unwrap(), "x + 1");

        let wrapped = "(" + sum.clone() + ")";
        assert_eq!(wrapped.render_inline().unwrap(), "(x + 1)");

        let mut acc = TokenList::new();
        acc += "y";
        acc += values![" = ", &x];
        assert_eq!(acc.render_inline().unwrap(), "y = x");

        assert_eq!((&x * 3).render_inline().unwrap(), "xxx");
    }

    #[test]
    fn test_operator_operands_stay_live() {
        let name = TokenList::from_value("count");
        let init = &name + " = 0";
        let wrapped = "(" + name.clone() + ")";
        let twice = &name * 2;
        let via_node = name.to_node() + " = 0";

        name.append("_total");

        assert_eq!(init.render_inline().unwrap(), "count_total = 0");
        assert_eq!(
            init.render_inline().unwrap(),
            via_node.render_inline().unwrap()
        );
        assert_eq!(wrapped.render_inline().unwrap(), "(count_total)");
        assert_eq!(twice.render_inline().unwrap(), "count_totalcount_total");
    }

    #[test]
    fn test_concat_splices_a_snapshot() {
        let name = TokenList::from_value("count");
        let init = name.concat(" = 0");
        name.append("_total");
        assert_eq!(init.render_inline().unwrap(), "count = 0");
    }

    #[test]
    fn test_insert_and_remove() {
        let list = TokenList::from_value(values!["a", "c"]);
        list.insert(1, "b").unwrap();
        assert_eq!(list.render_inline().unwrap(), "abc");

        let removed = list.remove(0).unwrap();
        assert_eq!(removed.as_text(), Some("a"));
        assert_eq!(list.render_inline().unwrap(), "bc");
    }

    #[test]
    fn test_out_of_range_operations_fail() {
        let list = TokenList::from_value("a");
        let err = list.insert(5, "b").unwrap_err();
        assert!(matches!(*err, Error::InvalidContainerOperation { .. }));
        assert!(list.remove(1).is_err());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_freestanding_indents_each_line() {
        let list = TokenList::from_value("a\nb");
        assert_eq!(list.render_freestanding(1).unwrap(), "    a\n    b");
    }

    #[test]
    fn test_self_reference_is_cyclic() {
        let list = TokenList::from_value("a");
        list.append(list.to_node());
        let err = list.render_inline().unwrap_err();
        assert!(matches!(*err, Error::CyclicStructure { node } if node == list.id()));
    }

    #[test]
    fn test_collect() {
        let list: TokenList = ["a", "b"].into_iter().collect();
        assert_eq!(list.render_inline().unwrap(), "ab");
    }
}
