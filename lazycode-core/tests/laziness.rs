//! Behavior of trees mutated after construction.

use lazycode_core::{
    CoercionRule, Error, Indent, MissingContentPolicy, Node, NodeExt, Render, RenderConfig, Role,
    Slot, StatementList, TokenList, Value, coerce, register_coercion, values,
};

#[test]
fn test_conforming_node_keeps_identity() {
    let node = TokenList::from_value("x").to_node();
    for role in [Role::TOKEN, Role::STATEMENT, Role::NAME] {
        assert!(coerce(&node, &role).unwrap().same(&node));
    }
}

#[test]
fn test_coercion_is_idempotent_for_every_builtin_role() {
    for role in [Role::TOKEN, Role::STATEMENT, Role::NAME] {
        let once = coerce("value", &role).unwrap();
        let twice = coerce(&once, &role).unwrap();
        assert_eq!(
            once.render_inline().unwrap(),
            twice.render_inline().unwrap()
        );
    }
}

#[test]
fn test_append_adds_a_last_line() {
    let list = StatementList::from_values(["a;", "b;"]).unwrap();
    let before = list.render_freestanding(0).unwrap();

    let entry = TokenList::from_value("c;");
    list.append(&entry).unwrap();

    let expected = format!("{before}\n{}", entry.render_freestanding(0).unwrap());
    assert_eq!(list.render_freestanding(0).unwrap(), expected);
}

#[test]
fn test_concat_renders_both_operands() {
    let a = TokenList::from_value(values!["f", "("]);
    let b = TokenList::from_value(values![1, ", ", 'x', ")"]);
    let before_a = a.render_inline().unwrap();
    let before_b = b.render_inline().unwrap();

    let joined = a.concat(&b);
    assert_eq!(
        joined.render_inline().unwrap(),
        format!("{before_a}{before_b}")
    );
    assert_eq!(a.render_inline().unwrap(), before_a);
    assert_eq!(b.render_inline().unwrap(), before_b);
    assert_eq!(a.len(), 2);
}

#[test]
fn test_embedded_container_mutation_is_visible() {
    let body = StatementList::new();
    let function = StatementList::new();
    function.extend(["void f(void)", "{"]).unwrap();
    function.append(&body).unwrap();
    function.append("}").unwrap();

    assert_eq!(
        function.render_freestanding(0).unwrap(),
        "void f(void)\n{\n}"
    );

    body.append("return;").unwrap();
    insta::assert_snapshot!(function.render_freestanding(0).unwrap(), @r"
    void f(void)
    {
        return;
    }
    ");
}

#[test]
fn test_mixed_list_renders_as_expression() {
    let list = TokenList::from_value(values!["x", " = ", 5]);
    assert_eq!(list.render_inline().unwrap(), "x = 5");
}

#[test]
fn test_two_statements_at_level_zero() {
    let list = StatementList::from_values(["a;", "b;"]).unwrap();
    assert_eq!(list.render_freestanding(0).unwrap(), "a;\nb;");
}

#[test]
fn test_slot_name_is_live() {
    let slot = Slot::new("name", Role::NAME);
    slot.set("foo").unwrap();
    let name: TokenList = slot.get().downcast().unwrap();

    let call = TokenList::from_value(values![slot.get(), "();"]);
    name.append("_v2");
    assert_eq!(call.render_inline().unwrap(), "foo_v2();");
}

#[test]
fn test_single_entry_gets_one_indentation_unit() {
    let list = StatementList::from_values(["a;"]).unwrap();
    for indent in [Indent::Spaces(2), Indent::Spaces(4), Indent::Tab] {
        let config = RenderConfig::default().with_indent(indent);
        assert_eq!(
            list.render_freestanding_with(1, &config).unwrap(),
            format!("{}a;", indent.unit())
        );
    }
}

#[test]
fn test_indirect_cycle_is_reported() {
    let outer = StatementList::new();
    let inner = StatementList::new();
    outer.append(&inner).unwrap();
    inner.append(TokenList::from_value(values!["x = ", &outer])).unwrap();

    let err = outer.render_freestanding(0).unwrap_err();
    assert!(matches!(*err, Error::CyclicStructure { node } if node == outer.id()));
}

#[test]
fn test_shared_node_renders_in_every_position() {
    let name = TokenList::from_value("n");
    let list = StatementList::new();
    list.append(&name + " = 0;").unwrap();
    list.append(&name + "++;").unwrap();
    name.append("um");
    assert_eq!(list.render_freestanding(0).unwrap(), "num = 0;\nnum++;");
}

#[test]
fn test_custom_role_through_default_registry() {
    const QUOTED: Role = Role::new("test.quoted");
    register_coercion(
        QUOTED,
        CoercionRule::for_type::<TokenList>(|value| {
            let text = value.as_text().unwrap_or_default();
            Ok(TokenList::from_value(format!("\"{text}\"")).into())
        }),
    );

    let list = StatementList::with_role(QUOTED);
    list.append("hi").unwrap();
    list.append(Value::from(3)).unwrap();
    assert_eq!(list.render_freestanding(0).unwrap(), "\"hi\"\n\"3\"");
}

#[test]
fn test_unbound_required_slot_policies() {
    let slot = Slot::new("ty", Role::NAME);
    let decl = TokenList::from_value(values![slot.required_proxy(), " x;"]);

    assert_eq!(decl.render_inline().unwrap(), " x;");

    let config = RenderConfig::default().with_missing_content(MissingContentPolicy::Placeholder);
    assert_eq!(
        decl.render_inline_with(&config).unwrap(),
        "/* missing ty */ x;"
    );

    let config = RenderConfig::default().with_missing_content(MissingContentPolicy::Error);
    assert!(decl.render_inline_with(&config).is_err());
}
