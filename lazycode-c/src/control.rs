//! Control flow statements.

use std::{
    any::Any,
    cell::{Cell, RefCell},
    rc::Rc,
};

use indexmap::IndexMap;
use lazycode_core::{Node, NodeId, RenderContext, Role, Slot, StatementList, Value, impl_node_value};

use crate::{
    Commented, Result, Trivia,
    block::{braced, statements},
};

/// Keyword of a [`Conditional`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondKind {
    If,
    ElseIf,
    Else,
    While,
}

impl CondKind {
    fn head(self, cond: &str) -> String {
        match self {
            CondKind::If => format!("if({cond})"),
            CondKind::ElseIf => format!("else if({cond})"),
            CondKind::Else => "else".to_string(),
            CondKind::While => format!("while({cond})"),
        }
    }
}

#[derive(Debug)]
struct CondInner {
    id: NodeId,
    kind: CondKind,
    cond: Slot,
    body: StatementList,
    trivia: Trivia,
}

/// An `if`, `else if`, `else` or `while` statement with a braced body.
///
/// Chains are plain sequences: append an `if`, then an `else if`, then an
/// `else` to the same statement list.
///
/// ```
/// use lazycode_c::Conditional;
/// use lazycode_core::Render;
///
/// let check = Conditional::if_("x > 0")?;
/// check.append("x--")?;
/// assert_eq!(check.render_freestanding(0)?, "if(x > 0)\n{\n    x--;\n}");
/// # Ok::<(), lazycode_c::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Conditional {
    inner: Rc<CondInner>,
}

impl Conditional {
    pub fn new(kind: CondKind, cond: impl Into<Value>) -> Result<Self> {
        let conditional = Self::empty(kind);
        if kind != CondKind::Else {
            conditional.inner.cond.set(cond)?;
        }
        Ok(conditional)
    }

    fn empty(kind: CondKind) -> Self {
        Self {
            inner: Rc::new(CondInner {
                id: NodeId::fresh(),
                kind,
                cond: Slot::new("cond", Role::TOKEN),
                body: statements(),
                trivia: Trivia::new(),
            }),
        }
    }

    pub fn if_(cond: impl Into<Value>) -> Result<Self> {
        Self::new(CondKind::If, cond)
    }

    pub fn else_if(cond: impl Into<Value>) -> Result<Self> {
        Self::new(CondKind::ElseIf, cond)
    }

    pub fn else_() -> Self {
        Self::empty(CondKind::Else)
    }

    pub fn while_(cond: impl Into<Value>) -> Result<Self> {
        Self::new(CondKind::While, cond)
    }

    pub fn kind(&self) -> CondKind {
        self.inner.kind
    }

    /// The condition, ignored by `else`.
    pub fn cond(&self) -> &Slot {
        &self.inner.cond
    }

    pub fn body(&self) -> &StatementList {
        &self.inner.body
    }

    pub fn append(&self, value: impl Into<Value>) -> Result<()> {
        Ok(self.inner.body.append(value)?)
    }
}

impl Commented for Conditional {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for Conditional {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "Conditional"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        Ok(self.freestanding(cx)?.trim_start().to_string())
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let cond = match self.inner.kind {
            CondKind::Else => String::new(),
            _ => self.inner.cond.require(cx)?,
        };
        let head = self.inner.kind.head(&cond) + self.inner.trivia.side(cx)?.as_str();
        let text = braced(cx, &head, &self.inner.body)?;
        self.inner.trivia.lead(cx, text)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(Conditional);

#[derive(Debug)]
struct ForInner {
    id: NodeId,
    init: Slot,
    cond: Slot,
    action: Slot,
    body: StatementList,
    trivia: Trivia,
}

/// A `for(init; cond; action)` loop.
///
/// To declare the loop variable in `init`, pass the variable's
/// [`defi`](crate::Var::defi) view.
#[derive(Debug, Clone)]
pub struct For {
    inner: Rc<ForInner>,
}

impl For {
    pub fn new(
        init: impl Into<Value>,
        cond: impl Into<Value>,
        action: impl Into<Value>,
    ) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(ForInner {
                id: NodeId::fresh(),
                init: Slot::with_value("init", Role::TOKEN, init)?,
                cond: Slot::with_value("cond", Role::TOKEN, cond)?,
                action: Slot::with_value("action", Role::TOKEN, action)?,
                body: statements(),
                trivia: Trivia::new(),
            }),
        })
    }

    pub fn init(&self) -> &Slot {
        &self.inner.init
    }

    pub fn cond(&self) -> &Slot {
        &self.inner.cond
    }

    pub fn action(&self) -> &Slot {
        &self.inner.action
    }

    pub fn body(&self) -> &StatementList {
        &self.inner.body
    }

    pub fn append(&self, value: impl Into<Value>) -> Result<()> {
        Ok(self.inner.body.append(value)?)
    }
}

impl Commented for For {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for For {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "For"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        Ok(self.freestanding(cx)?.trim_start().to_string())
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let init = self.inner.init.inline(cx)?;
        let cond = self.inner.cond.inline(cx)?;
        let action = self.inner.action.inline(cx)?;
        let side = self.inner.trivia.side(cx)?;
        let head = format!("for({init}; {cond}; {action}){side}");
        let text = braced(cx, &head, &self.inner.body)?;
        self.inner.trivia.lead(cx, text)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(For);

#[derive(Debug)]
struct DoWhileInner {
    id: NodeId,
    cond: Slot,
    body: StatementList,
    trivia: Trivia,
}

/// A `do { ... } while(cond);` loop.
#[derive(Debug, Clone)]
pub struct DoWhile {
    inner: Rc<DoWhileInner>,
}

impl DoWhile {
    pub fn new(cond: impl Into<Value>) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(DoWhileInner {
                id: NodeId::fresh(),
                cond: Slot::with_value("cond", Role::TOKEN, cond)?,
                body: statements(),
                trivia: Trivia::new(),
            }),
        })
    }

    pub fn cond(&self) -> &Slot {
        &self.inner.cond
    }

    pub fn body(&self) -> &StatementList {
        &self.inner.body
    }

    pub fn append(&self, value: impl Into<Value>) -> Result<()> {
        Ok(self.inner.body.append(value)?)
    }
}

impl Commented for DoWhile {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for DoWhile {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "DoWhile"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        Ok(self.freestanding(cx)?.trim_start().to_string())
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let side = self.inner.trivia.side(cx)?;
        let cond = self.inner.cond.require(cx)?;
        let body = braced(cx, &format!("do{side}"), &self.inner.body)?;
        let text = format!("{body}\n{}while({cond});", cx.indentation());
        self.inner.trivia.lead(cx, text)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(DoWhile);

#[derive(Debug)]
struct SwitchInner {
    id: NodeId,
    expr: Slot,
    cases: RefCell<IndexMap<String, StatementList>>,
    auto_break: Cell<bool>,
    trivia: Trivia,
}

/// A `switch` statement.
///
/// Cases are kept in insertion order and addressed by their label text.
/// The label `default` renders as `default:`. Unless disabled, every case
/// ends with a `break;`.
#[derive(Debug, Clone)]
pub struct Switch {
    inner: Rc<SwitchInner>,
}

impl Switch {
    pub const DEFAULT: &'static str = "default";

    pub fn new(expr: impl Into<Value>) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(SwitchInner {
                id: NodeId::fresh(),
                expr: Slot::with_value("expr", Role::TOKEN, expr)?,
                cases: RefCell::new(IndexMap::new()),
                auto_break: Cell::new(true),
                trivia: Trivia::new(),
            }),
        })
    }

    /// Do not end cases with `break;`.
    pub fn without_auto_break(self) -> Self {
        self.inner.auto_break.set(false);
        self
    }

    pub fn expr(&self) -> &Slot {
        &self.inner.expr
    }

    /// The body of the case `label`, created empty at the end if missing.
    pub fn case(&self, label: impl Into<String>) -> StatementList {
        self.inner
            .cases
            .borrow_mut()
            .entry(label.into())
            .or_insert_with(statements)
            .clone()
    }

    /// The body of the `default` case.
    pub fn default_case(&self) -> StatementList {
        self.case(Self::DEFAULT)
    }

    pub fn get(&self, label: &str) -> Option<StatementList> {
        self.inner.cases.borrow().get(label).cloned()
    }

    /// Remove the case `label`, keeping the order of the others.
    pub fn remove(&self, label: &str) -> Option<StatementList> {
        self.inner.cases.borrow_mut().shift_remove(label)
    }

    /// Case labels in order.
    pub fn labels(&self) -> Vec<String> {
        self.inner.cases.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.cases.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.cases.borrow().is_empty()
    }

    fn render_case(
        &self,
        cx: &mut RenderContext<'_>,
        label: &str,
        body: &StatementList,
    ) -> lazycode_core::Result<String> {
        let head = if label == Self::DEFAULT {
            "default:".to_string()
        } else {
            format!("case ({label}):")
        };
        let mut lines = vec![format!("{}{head}", cx.indentation())];
        let auto_break = self.inner.auto_break.get();
        cx.nested(|cx| {
            let content = body.render_entries(cx)?;
            if !content.is_empty() {
                lines.push(content);
            }
            if auto_break {
                lines.push(format!("{}break;", cx.indentation()));
            }
            Ok(())
        })?;
        Ok(lines.join("\n"))
    }
}

impl Commented for Switch {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for Switch {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "Switch"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        Ok(self.freestanding(cx)?.trim_start().to_string())
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let indentation = cx.indentation();
        let expr = self.inner.expr.require(cx)?;
        let side = self.inner.trivia.side(cx)?;
        let cases: Vec<(String, StatementList)> = self
            .inner
            .cases
            .borrow()
            .iter()
            .map(|(label, body)| (label.clone(), body.clone()))
            .collect();

        let mut rendered = Vec::with_capacity(cases.len());
        cx.nested(|cx| {
            for (label, body) in &cases {
                rendered.push(self.render_case(cx, label, body)?);
            }
            Ok(())
        })?;

        let mut text = format!("{indentation}switch({expr}){side}\n{indentation}{{");
        if !rendered.is_empty() {
            text.push('\n');
            text.push_str(&rendered.join("\n\n"));
        }
        text.push_str(&format!("\n{indentation}}}"));
        self.inner.trivia.lead(cx, text)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(Switch);

#[cfg(test)]
mod tests {
    use super::*;
    use lazycode_core::{MissingContentPolicy, Render, RenderConfig};

    #[test]
    fn test_if_else_chain() {
        let chain = StatementList::new();
        let check = Conditional::if_("x > 0").unwrap();
        check.append("x--").unwrap();
        let fallback = Conditional::else_();
        fallback.append("x = 0").unwrap();
        chain.extend([check.clone(), fallback]).unwrap();

        insta::assert_snapshot!(chain.render_freestanding(0).unwrap(), @r"
        if(x > 0)
        {
            x--;
        }
        else
        {
            x = 0;
        }
        ");
    }

    #[test]
    fn test_condition_can_change_after_embedding() {
        let check = Conditional::while_("busy").unwrap();
        let outer = StatementList::new();
        outer.append(&check).unwrap();
        check.cond().set("!done").unwrap();
        assert_eq!(outer.render_freestanding(0).unwrap(), "while(!done)\n{\n}");
    }

    #[test]
    fn test_missing_condition_follows_policy() {
        let check = Conditional::else_if(lazycode_core::Value::None).unwrap();
        let config = RenderConfig::default().with_missing_content(MissingContentPolicy::Error);
        assert!(check.render_freestanding_with(0, &config).is_err());
        assert!(Conditional::else_().render_freestanding_with(0, &config).is_ok());
    }

    #[test]
    fn test_for_loop() {
        let each = For::new("i = 0", "i < n", "i++").unwrap();
        each.append("sum += i").unwrap();
        assert_eq!(
            each.render_freestanding(1).unwrap(),
            "    for(i = 0; i < n; i++)\n    {\n        sum += i;\n    }"
        );
    }

    #[test]
    fn test_do_while() {
        let again = DoWhile::new("retry()").unwrap();
        again.append("step()").unwrap();
        assert_eq!(
            again.render_freestanding(0).unwrap(),
            "do\n{\n    step();\n}\nwhile(retry());"
        );
    }

    #[test]
    fn test_switch() {
        let switch = Switch::new("c").unwrap();
        switch.case("'a'").append("handle_a()").unwrap();
        switch.case("'b'");
        switch.default_case().append("fail()").unwrap();

        insta::assert_snapshot!(switch.render_freestanding(0).unwrap(), @r"
        switch(c)
        {
            case ('a'):
                handle_a();
                break;

            case ('b'):
                break;

            default:
                fail();
                break;
        }
        ");
    }

    #[test]
    fn test_switch_cases_are_addressable() {
        let switch = Switch::new("n").unwrap().without_auto_break();
        switch.case("1").append("one()").unwrap();
        switch.case("2").append("two()").unwrap();
        switch.case("1").append("again()").unwrap();
        assert_eq!(switch.labels(), ["1", "2"]);

        switch.remove("2");
        assert_eq!(
            switch.render_freestanding(0).unwrap(),
            "switch(n)\n{\n    case (1):\n        one();\n        again();\n}"
        );
    }
}
