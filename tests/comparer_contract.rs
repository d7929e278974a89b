/// Comparer contract tests: null handling, structural equality, boundaries,
/// hash agreement, caching and reentrancy.

use std::any::Any;
use std::sync::Arc;

use exprkey::domain::expr::{
    BindingKind, CatchBlock, ElementInit, ExprKind, GotoKind, LabelTarget, MemberBinding, SwitchCase,
};
use exprkey::{are_equal, hash_expr, ComparerConfig, Expr, ExprError, ExprRef, ExpressionEqualityComparer};
use exprkey::{NodeType, Sym, Symbol, Value};

fn int() -> Sym {
    Sym::named("System.Int32")
}

fn param(name: &str) -> ExprRef {
    Expr::parameter(int(), Some(name))
}

fn konst(v: i32) -> ExprRef {
    Expr::constant(v, int())
}

fn bin(node_type: NodeType, l: ExprRef, r: ExprRef) -> ExprRef {
    Expr::binary(node_type, l, r, Some(int())).unwrap()
}

fn comparer() -> ExpressionEqualityComparer {
    ExpressionEqualityComparer::new(&ComparerConfig::default())
}

/// Asserts equality both ways and, when equal, hash agreement.
fn assert_same(a: &ExprRef, b: &ExprRef) {
    let c = comparer();
    assert!(c.equals(Some(a), Some(b)), "expected equal:\n{a:?}\n{b:?}");
    assert!(c.equals(Some(b), Some(a)));
    assert_eq!(c.hash_of(Some(a)).unwrap(), c.hash_of(Some(b)).unwrap());
}

fn assert_differ(a: &ExprRef, b: &ExprRef) {
    let c = comparer();
    assert!(!c.equals(Some(a), Some(b)), "expected unequal:\n{a:?}\n{b:?}");
    assert!(!c.equals(Some(b), Some(a)));
}

// ────────────────────────────────────────────────────────────────────────────
// Basic contract
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_null_arguments() {
    let c = comparer();
    let x = param("x");
    assert!(c.equals(None, None));
    assert!(!c.equals(None, Some(&x)));
    assert!(!c.equals(Some(&x), None));
    let err = c.hash_of(None).unwrap_err();
    assert!(matches!(err, ExprError::NullArgument { .. }));
    assert!(err.to_string().contains("root"));
}

#[test]
fn test_reflexive_on_same_instance() {
    let c = comparer();
    let x = bin(NodeType::Add, param("x"), konst(1));
    assert!(c.equals(Some(&x), Some(&x)));
    assert!(are_equal(&x, &x));
}

#[test]
fn test_independent_construction() {
    let a = bin(NodeType::Add, param("x"), param("y"));
    let b = bin(NodeType::Add, param("x"), param("y"));
    assert!(!Arc::ptr_eq(&a, &b));
    assert_same(&a, &b);
}

#[test]
fn test_operator_mismatch() {
    let add = bin(NodeType::Add, param("x"), param("y"));
    let sub = bin(NodeType::Subtract, param("x"), param("y"));
    assert_differ(&add, &sub);
}

#[test]
fn test_leaf_sensitivity() {
    assert_differ(&konst(1), &konst(2));
    assert_differ(&param("x"), &param("y"));
    assert_differ(&param("x"), &Expr::by_ref_parameter(int(), Some("x")));
    assert_differ(&konst(1), &Expr::constant(1i64, int()));
    assert_same(&Expr::constant(f64::NAN, int()), &Expr::constant(f64::NAN, int()));
}

#[test]
fn test_type_mismatch() {
    let a = Expr::constant(1, int());
    let b = Expr::constant(1, Sym::named("System.Object"));
    assert_differ(&a, &b);
}

#[test]
fn test_trailing_subtree() {
    let short = Expr::block(vec![], vec![konst(1)]);
    let long = Expr::block(vec![], vec![konst(1), konst(2)]);
    assert_differ(&short, &long);

    let call = |args| Expr::call(None, Sym::named("F"), args, Some(int()));
    assert_differ(&call(vec![konst(1)]), &call(vec![konst(1), konst(2)]));
    assert_differ(&call(vec![]), &call(vec![konst(1)]));
}

#[test]
fn test_hash_idempotent_across_caching() {
    let c = comparer();
    let x = bin(NodeType::Multiply, bin(NodeType::Add, param("a"), konst(3)), param("b"));
    let first = c.hash_of(Some(&x)).unwrap();
    let again = c.hash_of(Some(&x)).unwrap();
    c.set_caching(false);
    let uncached = c.hash_of(Some(&x)).unwrap();
    assert_eq!(first, again);
    assert_eq!(first, uncached);
    assert_eq!(first, hash_expr(&x));
}

#[test]
fn test_hash_is_order_sensitive() {
    let xy = bin(NodeType::Subtract, param("x"), param("y"));
    let yx = bin(NodeType::Subtract, param("y"), param("x"));
    assert_ne!(hash_expr(&xy), hash_expr(&yx));
}

// ────────────────────────────────────────────────────────────────────────────
// List boundaries and optional children
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_nested_list_boundaries() {
    // Block[Block[a, b]] against Block[Block[a], b]
    let inner_both = Expr::block(vec![], vec![konst(1), konst(2)]);
    let outer_a = Expr::block(vec![], vec![inner_both]);
    let inner_one = Expr::block(vec![], vec![konst(1)]);
    let outer_b = Expr::block(vec![], vec![inner_one, konst(2)]);
    assert_differ(&outer_a, &outer_b);
    assert_ne!(hash_expr(&outer_a), hash_expr(&outer_b));
}

#[test]
fn test_block_variables_versus_expressions() {
    let v = param("v");
    let with_var = Expr::block(vec![v.clone()], vec![konst(1)]);
    let as_expr = Expr::block(vec![], vec![konst(1), v]);
    assert_differ(&with_var, &as_expr);
}

#[test]
fn test_goto_value_versus_sibling() {
    let target = || LabelTarget::new(Some("L"), Some(int()));
    let with_value = Expr::block(vec![], vec![Expr::goto(GotoKind::Return, target(), Some(konst(1)))]);
    let with_sibling = Expr::block(
        vec![],
        vec![Expr::goto(GotoKind::Return, target(), None), konst(1)],
    );
    assert_differ(&with_value, &with_sibling);
}

#[test]
fn test_loop_labels_compare_by_name_and_type() {
    let make = |brk: Option<Arc<LabelTarget>>, cont: Option<Arc<LabelTarget>>| {
        Expr::new(
            NodeType::Loop,
            None,
            ExprKind::Loop {
                body: Expr::default_value(None),
                break_label: brk,
                continue_label: cont,
            },
        )
        .unwrap()
    };
    let a = make(Some(LabelTarget::new(Some("brk"), None)), None);
    let b = make(Some(LabelTarget::new(Some("brk"), None)), None);
    assert_same(&a, &b);

    // same label in the other slot
    let c = make(None, Some(LabelTarget::new(Some("brk"), None)));
    assert_differ(&a, &c);
    let d = make(Some(LabelTarget::new(Some("brk"), Some(int()))), None);
    assert_differ(&a, &d);
}

#[test]
fn test_unary_without_operand() {
    let rethrow = |operand: Option<ExprRef>| {
        Expr::new(
            NodeType::Throw,
            None,
            ExprKind::Unary {
                operand,
                method: None,
                lifted: false,
                lifted_to_null: false,
            },
        )
        .unwrap()
    };
    assert_same(&rethrow(None), &rethrow(None));
    assert_differ(&rethrow(None), &rethrow(Some(Expr::default_value(Some(Sym::named("System.Exception"))))));
}

// ────────────────────────────────────────────────────────────────────────────
// Auxiliary structures
// ────────────────────────────────────────────────────────────────────────────

fn try_catch(filter: Option<ExprRef>, test: &str) -> ExprRef {
    Expr::new(
        NodeType::Try,
        Some(int()),
        ExprKind::Try {
            body: konst(1),
            handlers: vec![CatchBlock {
                test: Sym::named(test),
                variable: Some(Expr::parameter(Sym::named(test), Some("e"))),
                filter,
                body: konst(0),
            }],
            finally: None,
            fault: None,
        },
    )
    .unwrap()
}

#[test]
fn test_catch_blocks() {
    let bool_ty = Sym::named("System.Boolean");
    let filter = || Some(Expr::constant(true, bool_ty.clone()));
    assert_same(&try_catch(filter(), "System.Exception"), &try_catch(filter(), "System.Exception"));
    assert_differ(&try_catch(filter(), "System.Exception"), &try_catch(None, "System.Exception"));
    assert_differ(&try_catch(None, "System.Exception"), &try_catch(None, "System.IO.IOException"));
}

fn switch(cases: Vec<(Vec<i32>, i32)>, default: Option<i32>) -> ExprRef {
    Expr::new(
        NodeType::Switch,
        Some(int()),
        ExprKind::Switch {
            switch_value: param("x"),
            cases: cases
                .into_iter()
                .map(|(tests, body)| SwitchCase {
                    test_values: tests.into_iter().map(konst).collect(),
                    body: konst(body),
                })
                .collect(),
            default_body: default.map(konst),
            comparison: None,
        },
    )
    .unwrap()
}

#[test]
fn test_switch_cases() {
    assert_same(
        &switch(vec![(vec![1, 2], 10), (vec![3], 20)], Some(0)),
        &switch(vec![(vec![1, 2], 10), (vec![3], 20)], Some(0)),
    );
    assert_differ(
        &switch(vec![(vec![1, 2], 10)], Some(0)),
        &switch(vec![(vec![1], 2), (vec![10], 0)], None),
    );
    assert_differ(&switch(vec![(vec![1], 10)], Some(0)), &switch(vec![(vec![1], 10)], None));
}

fn member_init(kind: BindingKind) -> ExprRef {
    let point = Sym::named("Point");
    Expr::new(
        NodeType::MemberInit,
        Some(point.clone()),
        ExprKind::MemberInit {
            new_expression: Expr::new_object(Sym::named("Point..ctor()"), vec![], point),
            bindings: vec![MemberBinding {
                member: Sym::named("Point.Items"),
                kind,
            }],
        },
    )
    .unwrap()
}

#[test]
fn test_member_bindings() {
    let list = || {
        BindingKind::List(vec![ElementInit {
            add_method: Sym::named("List.Add"),
            arguments: vec![konst(1)],
        }])
    };
    assert_same(&member_init(list()), &member_init(list()));
    assert_differ(&member_init(list()), &member_init(BindingKind::Assignment(konst(1))));
    assert_differ(
        &member_init(BindingKind::Member(vec![])),
        &member_init(BindingKind::List(vec![])),
    );
}

#[test]
fn test_shape_mismatch_is_rejected_at_construction() {
    let err = Expr::new(NodeType::Call, None, ExprKind::Default).unwrap_err();
    assert!(matches!(err, ExprError::ShapeMismatch { node_type: NodeType::Call, .. }));
}

// ────────────────────────────────────────────────────────────────────────────
// Reentrancy
// ────────────────────────────────────────────────────────────────────────────

/// Symbol whose identity is a tree, so comparing two of them compares trees
/// from inside an ongoing comparison.
#[derive(Debug)]
struct TreeSymbol(ExprRef);

impl Symbol for TreeSymbol {
    fn same_symbol(&self, other: &dyn Symbol) -> bool {
        other
            .as_any()
            .downcast_ref::<TreeSymbol>()
            .is_some_and(|other| are_equal(&self.0, &other.0))
    }

    fn symbol_hash(&self) -> u32 {
        hash_expr(&self.0)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn quoted(inner: ExprRef, outer_param: &str) -> ExprRef {
    let boxed = Expr::constant(Value::Object(Sym::new(TreeSymbol(inner))), Sym::named("System.Object"));
    Expr::block(
        vec![],
        vec![bin(NodeType::Add, param(outer_param), konst(5)), boxed, param(outer_param)],
    )
}

#[test]
fn test_reentrant_comparison_keeps_outer_state() {
    let inner = || bin(NodeType::Multiply, param("m"), konst(7));
    let a = quoted(inner(), "x");
    let b = quoted(inner(), "x");
    assert_same(&a, &b);

    // outer trees differ after the nested comparison succeeded
    let c = quoted(inner(), "y");
    assert_differ(&a, &c);

    // nested trees differ
    let d = quoted(bin(NodeType::Multiply, param("m"), konst(8)), "x");
    assert_differ(&a, &d);
}

// ────────────────────────────────────────────────────────────────────────────
// Per-kind fields
// ────────────────────────────────────────────────────────────────────────────

fn binary_with(method: Option<Sym>, lifted: bool, lifted_to_null: bool) -> ExprRef {
    Expr::new(
        NodeType::Add,
        Some(int()),
        ExprKind::Binary {
            left: param("x"),
            right: konst(1),
            method,
            lifted,
            lifted_to_null,
            conversion: None,
        },
    )
    .unwrap()
}

fn unary_with(method: Option<Sym>, lifted: bool, lifted_to_null: bool) -> ExprRef {
    Expr::new(
        NodeType::Negate,
        Some(int()),
        ExprKind::Unary {
            operand: Some(param("x")),
            method,
            lifted,
            lifted_to_null,
        },
    )
    .unwrap()
}

fn lambda_with(name: Option<&str>, return_type: Option<Sym>, tail_call: bool) -> ExprRef {
    Expr::new(
        NodeType::Lambda,
        Some(Sym::named("System.Func`1[System.Int32]")),
        ExprKind::Lambda {
            name: name.map(str::to_string),
            return_type,
            tail_call,
            body: konst(1),
            parameters: vec![],
        },
    )
    .unwrap()
}

fn debug_info_with(file_name: &str, position: [u32; 4], is_clear: bool) -> ExprRef {
    let [start_line, start_column, end_line, end_column] = position;
    Expr::new(
        NodeType::DebugInfo,
        None,
        ExprKind::DebugInfo {
            document: exprkey::domain::expr::SymbolDocument::new(file_name),
            start_line,
            start_column,
            end_line,
            end_column,
            is_clear,
        },
    )
    .unwrap()
}

fn dynamic_with(binder: &str, delegate_type: &str) -> ExprRef {
    Expr::new(
        NodeType::Dynamic,
        Some(Sym::named("System.Object")),
        ExprKind::Dynamic {
            binder: Sym::named(binder),
            delegate_type: Sym::named(delegate_type),
            arguments: vec![param("x")],
        },
    )
    .unwrap()
}

fn index_with(indexer: Option<Sym>) -> ExprRef {
    Expr::new(
        NodeType::Index,
        Some(int()),
        ExprKind::Index {
            object: Some(param("list")),
            indexer,
            arguments: vec![konst(0)],
        },
    )
    .unwrap()
}

fn switch_with(comparison: Option<Sym>) -> ExprRef {
    Expr::new(
        NodeType::Switch,
        Some(int()),
        ExprKind::Switch {
            switch_value: param("x"),
            cases: vec![SwitchCase {
                test_values: vec![konst(1)],
                body: konst(10),
            }],
            default_body: None,
            comparison,
        },
    )
    .unwrap()
}

fn type_is_with(type_operand: &str) -> ExprRef {
    Expr::new(
        NodeType::TypeIs,
        Some(Sym::named("System.Boolean")),
        ExprKind::TypeBinary {
            expression: param("x"),
            type_operand: Sym::named(type_operand),
        },
    )
    .unwrap()
}

fn list_init_with(add_method: &str) -> ExprRef {
    let list = Sym::named("List");
    Expr::new(
        NodeType::ListInit,
        Some(list.clone()),
        ExprKind::ListInit {
            new_expression: Expr::new_object(Sym::named("List..ctor()"), vec![], list),
            initializers: vec![ElementInit {
                add_method: Sym::named(add_method),
                arguments: vec![konst(1)],
            }],
        },
    )
    .unwrap()
}

fn new_with(constructor: Option<Sym>) -> ExprRef {
    Expr::new(
        NodeType::New,
        Some(Sym::named("Point")),
        ExprKind::New {
            constructor,
            arguments: vec![],
            members: None,
        },
    )
    .unwrap()
}

fn member_init_with(member: &str) -> ExprRef {
    let point = Sym::named("Point");
    Expr::new(
        NodeType::MemberInit,
        Some(point.clone()),
        ExprKind::MemberInit {
            new_expression: Expr::new_object(Sym::named("Point..ctor()"), vec![], point),
            bindings: vec![MemberBinding {
                member: Sym::named(member),
                kind: BindingKind::Assignment(konst(1)),
            }],
        },
    )
    .unwrap()
}

#[test]
fn test_each_kind_specific_field_is_compared_and_hashed() {
    let op = || Some(Sym::named("Int32.op_Addition"));
    let doc = |pos: [u32; 4], clear: bool| debug_info_with("a.cs", pos, clear);
    let target = |name: Option<&str>| LabelTarget::new(name, None);

    let cases: Vec<(&str, ExprRef, ExprRef)> = vec![
        ("binary method", binary_with(op(), false, false), binary_with(None, false, false)),
        ("binary lifted", binary_with(None, true, false), binary_with(None, false, false)),
        ("binary lifted_to_null", binary_with(None, false, true), binary_with(None, false, false)),
        ("unary method", unary_with(op(), false, false), unary_with(None, false, false)),
        ("unary lifted", unary_with(None, true, false), unary_with(None, false, false)),
        ("unary lifted_to_null", unary_with(None, false, true), unary_with(None, false, false)),
        ("lambda name", lambda_with(Some("f"), Some(int()), false), lambda_with(None, Some(int()), false)),
        ("lambda return type", lambda_with(None, Some(int()), false), lambda_with(None, None, false)),
        ("lambda tail_call", lambda_with(None, Some(int()), true), lambda_with(None, Some(int()), false)),
        ("debug document", debug_info_with("a.cs", [1, 1, 1, 9], false), debug_info_with("b.cs", [1, 1, 1, 9], false)),
        ("debug start line", doc([1, 1, 1, 9], false), doc([2, 1, 1, 9], false)),
        ("debug start column", doc([1, 1, 1, 9], false), doc([1, 2, 1, 9], false)),
        ("debug end line", doc([1, 1, 1, 9], false), doc([1, 1, 2, 9], false)),
        ("debug end column", doc([1, 1, 1, 9], false), doc([1, 1, 1, 8], false)),
        ("debug is_clear", doc([1, 1, 1, 9], true), doc([1, 1, 1, 9], false)),
        ("dynamic binder", dynamic_with("Add", "Func"), dynamic_with("Sub", "Func")),
        ("dynamic delegate type", dynamic_with("Add", "Func"), dynamic_with("Add", "Action")),
        ("index indexer", index_with(Some(Sym::named("List.Item"))), index_with(None)),
        ("switch comparison", switch_with(Some(Sym::named("String.Equals"))), switch_with(None)),
        (
            "goto kind",
            Expr::goto(GotoKind::Break, target(Some("L")), None),
            Expr::goto(GotoKind::Continue, target(Some("L")), None),
        ),
        ("label null vs empty name", Expr::label(target(None), None), Expr::label(target(Some("")), None)),
        ("type operand", type_is_with("System.String"), type_is_with("System.Object")),
        (
            "call method",
            Expr::call(None, Sym::named("F"), vec![konst(1)], Some(int())),
            Expr::call(None, Sym::named("G"), vec![konst(1)], Some(int())),
        ),
        (
            "member",
            Expr::member(Some(param("p")), Sym::named("P.X"), int()),
            Expr::member(Some(param("p")), Sym::named("P.Y"), int()),
        ),
        ("element init add method", list_init_with("List.Add"), list_init_with("List.Insert")),
        ("new constructor", new_with(Some(Sym::named("Point..ctor()"))), new_with(None)),
        ("binding member", member_init_with("Point.X"), member_init_with("Point.Y")),
    ];

    for (field, a, b) in &cases {
        let c = comparer();
        assert!(!c.equals(Some(a), Some(b)), "{field}: expected unequal");
        assert!(!c.equals(Some(b), Some(a)), "{field}: expected unequal (reversed)");
        assert_ne!(hash_expr(a), hash_expr(b), "{field}: hashes collide");
    }
}
