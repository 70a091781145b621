//! Designated initializers.

use std::{any::Any, cell::RefCell, rc::Rc};

use indexmap::IndexMap;
use lazycode_core::{Node, NodeId, NodeRef, RenderContext, Role, Value, coerce, impl_node_value};

use crate::{CompoundType, Error, Result, Var};

#[derive(Debug, Clone)]
enum Field {
    /// A value and the C type inferred from it, if any.
    Value {
        node: NodeRef,
        ty: Option<&'static str>,
    },
    Nested(DesignatedInit),
}

impl Field {
    fn node(&self) -> NodeRef {
        match self {
            Field::Value { node, .. } => node.clone(),
            Field::Nested(init) => NodeRef::new(init.clone()),
        }
    }
}

#[derive(Debug)]
struct Inner {
    id: NodeId,
    defaults: Option<CompoundType>,
    fields: RefCell<IndexMap<String, Field>>,
}

/// `{.member=value, ...}`
///
/// Fields keep their insertion order. A dotted member path such as
/// `pos.x` goes to a nested initializer created on first use. Fields whose
/// value renders empty are left out.
///
/// ```
/// use lazycode_c::DesignatedInit;
/// use lazycode_core::Render;
///
/// let init = DesignatedInit::new();
/// init.set("id", 7)?;
/// init.set("pos.x", 1.5)?;
/// assert_eq!(init.render_inline()?, "{.id=7, .pos={.x=1.5}}");
/// # Ok::<(), lazycode_c::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DesignatedInit {
    inner: Rc<Inner>,
}

impl DesignatedInit {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// An initializer falling back to the initializers of `compound`'s
    /// members, in member order.
    pub(crate) fn with_defaults(compound: CompoundType) -> Self {
        Self::build(Some(compound))
    }

    fn build(defaults: Option<CompoundType>) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: NodeId::fresh(),
                defaults,
                fields: RefCell::new(IndexMap::new()),
            }),
        }
    }

    /// Set `member`, replacing any previous value in place.
    pub fn set(&self, member: &str, value: impl Into<Value>) -> Result<()> {
        if let Some((head, rest)) = member.split_once('.') {
            let nested = self.nested(head);
            return nested.set(rest, value);
        }

        let value = value.into();
        let nested = value
            .as_node()
            .and_then(|node| node.downcast::<DesignatedInit>());
        let field = match nested {
            Some(init) => Field::Nested(init),
            None => Field::Value {
                ty: c_type(&value),
                node: coerce(value, &Role::TOKEN)?,
            },
        };
        self.inner.fields.borrow_mut().insert(member.to_string(), field);
        Ok(())
    }

    /// The value of `member`, following dotted paths.
    pub fn get(&self, member: &str) -> Option<NodeRef> {
        match member.split_once('.') {
            Some((head, rest)) => match self.inner.fields.borrow().get(head)? {
                Field::Nested(init) => init.get(rest),
                Field::Value { .. } => None,
            },
            None => self.inner.fields.borrow().get(member).map(Field::node),
        }
    }

    /// Remove `member`, keeping the order of the others.
    pub fn remove(&self, member: &str) -> Option<NodeRef> {
        self.inner
            .fields
            .borrow_mut()
            .shift_remove(member)
            .map(|field| field.node())
    }

    /// Member names in order.
    pub fn members(&self) -> Vec<String> {
        self.inner.fields.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.borrow().is_empty()
    }

    /// A structure with one member per field, typed after the field's
    /// value and initialized with it.
    ///
    /// Integers become `int`, floats `float`, text `char *`, chars `char`
    /// and booleans `bool`; nested initializers become anonymous structure
    /// types. Other values have no C type and fail.
    pub fn to_struct(&self, name: impl Into<Value>) -> Result<CompoundType> {
        let compound = CompoundType::struct_(name)?;
        let fields = self.inner.fields.borrow().clone();
        for (member, field) in fields {
            let ty: Value = match &field {
                Field::Nested(init) => init.to_struct(member.as_str())?.anonymous().into(),
                Field::Value { ty: Some(ty), .. } => (*ty).into(),
                Field::Value { node, ty: None } => {
                    return Err(Error::untyped_member(member, node.kind()));
                }
            };
            let var = Var::new(member.as_str())?
                .with_type(ty)?
                .with_initializer(field.node())?;
            compound.push_member(var)?;
        }
        Ok(compound)
    }

    fn nested(&self, member: &str) -> DesignatedInit {
        let mut fields = self.inner.fields.borrow_mut();
        if let Some(Field::Nested(init)) = fields.get(member) {
            return init.clone();
        }
        let init = DesignatedInit::new();
        fields.insert(member.to_string(), Field::Nested(init.clone()));
        init
    }

    fn entries(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<IndexMap<String, NodeRef>> {
        let mut entries = IndexMap::new();
        if let Some(defaults) = &self.inner.defaults {
            for member in defaults.members() {
                let name = member.name().require(cx)?;
                entries.insert(name, member.initializer().get());
            }
        }
        for (member, field) in self.inner.fields.borrow().iter() {
            entries.insert(member.clone(), field.node());
        }
        Ok(entries)
    }
}

impl Default for DesignatedInit {
    fn default() -> Self {
        Self::new()
    }
}

fn c_type(value: &Value) -> Option<&'static str> {
    match value {
        Value::Int(_) | Value::UInt(_) => Some("int"),
        Value::Float(_) => Some("float"),
        Value::Text(_) => Some("char *"),
        Value::Char(_) => Some("char"),
        Value::Bool(_) => Some("bool"),
        Value::None | Value::Node(_) | Value::List(_) => None,
    }
}

impl Node for DesignatedInit {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "DesignatedInit"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let mut fields = Vec::new();
        for (member, node) in self.entries(cx)? {
            let value = cx.inline(&node)?;
            if !value.is_empty() {
                fields.push(format!(".{member}={value}"));
            }
        }
        Ok(format!("{{{}}}", fields.join(", ")))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(DesignatedInit);
