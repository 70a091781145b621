//! Plain values accepted wherever a node is expected.

use std::fmt;

use crate::NodeRef;

/// A value handed to a construction API.
///
/// Every slot setter and container insertion takes `impl Into<Value>`, so
/// generators can pass a string, a number, an already built node, or a
/// list mixing all of them. The coercion registry turns the value into a
/// node for the target role.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value. Coerces to the empty node.
    #[default]
    None,
    /// Raw source text.
    Text(String),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Single character.
    Char(char),
    /// An already built node.
    Node(NodeRef),
    /// An ordered sequence of values.
    List(Vec<Value>),
}

impl Value {
    /// Short name of the value's kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "nothing",
            Value::Text(_) => "text",
            Value::Int(_) | Value::UInt(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Node(_) => "node",
            Value::List(_) => "list",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Textual form of a scalar value. `None` for nodes, lists and `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::UInt(u) => Some(u.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Char(c) => Some(c.to_string()),
            Value::None | Value::Node(_) | Value::List(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Node(node) => write!(f, "{node:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            other => write!(f, "{}", other.as_text().unwrap_or_default()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($variant:ident as $target:ty: $($ty:ty),+) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v as $target)
            }
        }
    )+};
}

impl_from_int!(Int as i64: i8, i16, i32, i64, isize);
impl_from_int!(UInt as u64: u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<NodeRef> for Value {
    fn from(node: NodeRef) -> Self {
        Value::Node(node)
    }
}

impl From<&NodeRef> for Value {
    fn from(node: &NodeRef) -> Self {
        Value::Node(node.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(values: [T; N]) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

/// Build a [`Value::List`] from heterogeneous items.
///
/// ```
/// use lazycode_core::{values, Value};
///
/// let list = values!["x", " = ", 5];
/// assert!(matches!(list, Value::List(ref items) if items.len() == 3));
/// ```
#[macro_export]
macro_rules! values {
    ($($item:expr),* $(,)?) => {
        $crate::Value::List(vec![$(::core::convert::Into::<$crate::Value>::into($item)),*])
    };
}

/// Implement the conversions that let a node type be passed anywhere a
/// [`Value`] or [`NodeRef`] is expected.
///
/// The type must implement [`Node`](crate::Node) and `Clone`, with clones
/// sharing the same underlying node.
#[macro_export]
macro_rules! impl_node_value {
    ($($ty:ty),+ $(,)?) => {$(
        impl ::core::convert::From<$ty> for $crate::Value {
            fn from(node: $ty) -> Self {
                $crate::Value::Node($crate::NodeRef::new(node))
            }
        }

        impl ::core::convert::From<&$ty> for $crate::Value {
            fn from(node: &$ty) -> Self {
                $crate::Value::Node($crate::NodeRef::new(node.clone()))
            }
        }

        impl ::core::convert::From<$ty> for $crate::NodeRef {
            fn from(node: $ty) -> Self {
                $crate::NodeRef::new(node)
            }
        }
    )+};
}

/// Implement `+` for a node type: the result is a token list holding the
/// node followed by the right-hand operand, both by reference.
#[macro_export]
macro_rules! impl_node_concat {
    ($($ty:ty),+ $(,)?) => {$(
        impl<V: ::core::convert::Into<$crate::Value>> ::core::ops::Add<V> for $ty {
            type Output = $crate::TokenList;

            fn add(self, rhs: V) -> $crate::TokenList {
                $crate::TokenList::from_value($crate::values![self, rhs])
            }
        }

        impl<V: ::core::convert::Into<$crate::Value>> ::core::ops::Add<V> for &$ty {
            type Output = $crate::TokenList;

            fn add(self, rhs: V) -> $crate::TokenList {
                $crate::TokenList::from_value($crate::values![self, rhs])
            }
        }
    )+};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_text() {
        assert_eq!(Value::from(5).as_text().as_deref(), Some("5"));
        assert_eq!(Value::from(7usize).as_text().as_deref(), Some("7"));
        assert_eq!(Value::from('c').as_text().as_deref(), Some("c"));
        assert_eq!(Value::from(true).as_text().as_deref(), Some("true"));
        assert_eq!(Value::from(1.5).as_text().as_deref(), Some("1.5"));
        assert_eq!(Value::None.as_text(), None);
    }

    #[test]
    fn test_option_conversion() {
        assert!(Value::from(None::<&str>).is_none());
        assert_eq!(Value::from(Some("x")).kind(), "text");
    }

    #[test]
    fn test_values_macro() {
        let list = values!["a", 1, 'b'];
        assert_eq!(list.to_string(), "[a, 1, b]");
    }
}
