//! Deterministic generator of structurally distinct trees.
//!
//! Tree `i` comes from template `i % template_count()` parameterised by
//! `k = i / template_count()`, and `k` always ends up in a constant, a name
//! or a source position, so no two indices describe the same tree. Every call
//! builds fresh allocations (symbols included), which makes two corpora of the
//! same size independent constructions of the same trees.

use crate::domain::expr::{
    BindingKind, CatchBlock, ElementInit, Expr, ExprKind, ExprRef, GotoKind, LabelTarget, MemberBinding,
    NodeType, SwitchCase, SymbolDocument,
};
use crate::domain::symbol::Sym;
use crate::domain::value::Value;
use crate::error::ExprError;

type Template = fn(i64) -> Result<ExprRef, ExprError>;

const TEMPLATES: &[Template] = &[
    add,
    subtract,
    multiply_sum,
    negate,
    not_equal_to,
    convert,
    lambda,
    static_call,
    instance_call,
    member_of_new,
    new_object,
    conditional,
    block_with_variable,
    loop_with_break,
    switch,
    try_catch,
    try_finally,
    list_init,
    member_init,
    type_is,
    dynamic,
    debug_info,
    index,
    invocation,
    new_array,
    runtime_variables,
    quote,
    label_with_default,
    block_with_default,
    goto_return,
    string_constant,
    array_length,
];

pub fn template_count() -> usize {
    TEMPLATES.len()
}

/// Tree number `index` of the corpus.
pub fn build(index: usize) -> Result<ExprRef, ExprError> {
    let template = TEMPLATES[index % TEMPLATES.len()];
    let k = i64::try_from(index / TEMPLATES.len()).unwrap_or(i64::MAX);
    template(k)
}

/// The first `count` trees.
pub fn corpus(count: usize) -> Result<Vec<ExprRef>, ExprError> {
    (0..count).map(build).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Building blocks
// ─────────────────────────────────────────────────────────────────────────────

fn long() -> Sym {
    Sym::named("System.Int64")
}

fn boolean() -> Sym {
    Sym::named("System.Boolean")
}

fn string() -> Sym {
    Sym::named("System.String")
}

fn k_const(k: i64) -> ExprRef {
    Expr::constant(k, long())
}

fn var(name: &str) -> ExprRef {
    Expr::parameter(long(), Some(name))
}

fn func_type() -> Sym {
    Sym::named("System.Func`1[System.Int64]")
}

// ─────────────────────────────────────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────────────────────────────────────

fn add(k: i64) -> Result<ExprRef, ExprError> {
    Expr::binary(NodeType::Add, var("x"), k_const(k), Some(long()))
}

fn subtract(k: i64) -> Result<ExprRef, ExprError> {
    Expr::binary(NodeType::Subtract, k_const(k), var("y"), Some(long()))
}

fn multiply_sum(k: i64) -> Result<ExprRef, ExprError> {
    let sum = Expr::binary(NodeType::Add, var("x"), k_const(k), Some(long()))?;
    Expr::binary(NodeType::Multiply, sum, var("y"), Some(long()))
}

fn negate(k: i64) -> Result<ExprRef, ExprError> {
    Expr::unary(NodeType::Negate, k_const(k), Some(long()))
}

fn not_equal_to(k: i64) -> Result<ExprRef, ExprError> {
    let eq = Expr::binary(NodeType::Equal, var("x"), k_const(k), Some(boolean()))?;
    Expr::unary(NodeType::Not, eq, Some(boolean()))
}

fn convert(k: i64) -> Result<ExprRef, ExprError> {
    Expr::unary(NodeType::Convert, k_const(k), Some(Sym::named("System.Int32")))
}

fn lambda(k: i64) -> Result<ExprRef, ExprError> {
    let x = var("x");
    let body = Expr::binary(NodeType::Add, x.clone(), k_const(k), Some(long()))?;
    Ok(Expr::lambda(body, vec![x], Sym::named("System.Func`2[System.Int64,System.Int64]")))
}

fn static_call(k: i64) -> Result<ExprRef, ExprError> {
    Ok(Expr::call(
        None,
        Sym::named("System.Math.Max(Int64, Int64)"),
        vec![var("x"), k_const(k)],
        Some(long()),
    ))
}

fn instance_call(k: i64) -> Result<ExprRef, ExprError> {
    Ok(Expr::call(
        Some(var("x")),
        Sym::named("System.Int64.ToString(String)"),
        vec![Expr::constant(Value::string(format!("D{k}")), string())],
        Some(string()),
    ))
}

fn member_of_new(k: i64) -> Result<ExprRef, ExprError> {
    let text = Expr::new_object(
        Sym::named("System.String..ctor(Char, Int32)"),
        vec![Expr::constant(Value::Char('*'), Sym::named("System.Char")), k_const(k)],
        string(),
    );
    Ok(Expr::member(
        Some(text),
        Sym::named("System.String.Length"),
        Sym::named("System.Int32"),
    ))
}

fn new_object(k: i64) -> Result<ExprRef, ExprError> {
    Ok(Expr::new_object(
        Sym::named("System.TimeSpan..ctor(Int64)"),
        vec![k_const(k)],
        Sym::named("System.TimeSpan"),
    ))
}

fn conditional(k: i64) -> Result<ExprRef, ExprError> {
    let test = Expr::binary(NodeType::GreaterThan, var("x"), k_const(k), Some(boolean()))?;
    Ok(Expr::conditional(test, var("x"), k_const(k), Some(long())))
}

fn block_with_variable(k: i64) -> Result<ExprRef, ExprError> {
    let v = var("v");
    let assign = Expr::binary(NodeType::Assign, v.clone(), k_const(k), Some(long()))?;
    Ok(Expr::block(vec![v.clone()], vec![assign, v]))
}

fn loop_with_break(k: i64) -> Result<ExprRef, ExprError> {
    let exit = LabelTarget::new(Some("exit"), Some(long()));
    let body = Expr::block(vec![], vec![Expr::goto(GotoKind::Break, exit.clone(), Some(k_const(k)))]);
    Expr::new(
        NodeType::Loop,
        Some(long()),
        ExprKind::Loop {
            body,
            break_label: Some(exit),
            continue_label: None,
        },
    )
}

fn switch(k: i64) -> Result<ExprRef, ExprError> {
    Expr::new(
        NodeType::Switch,
        Some(long()),
        ExprKind::Switch {
            switch_value: var("x"),
            cases: vec![SwitchCase {
                test_values: vec![k_const(k)],
                body: k_const(1),
            }],
            default_body: Some(k_const(0)),
            comparison: None,
        },
    )
}

fn try_catch(k: i64) -> Result<ExprRef, ExprError> {
    Expr::new(
        NodeType::Try,
        Some(long()),
        ExprKind::Try {
            body: k_const(k),
            handlers: vec![CatchBlock {
                test: Sym::named("System.Exception"),
                variable: None,
                filter: None,
                body: k_const(0),
            }],
            finally: None,
            fault: None,
        },
    )
}

fn try_finally(k: i64) -> Result<ExprRef, ExprError> {
    Expr::new(
        NodeType::Try,
        Some(long()),
        ExprKind::Try {
            body: k_const(k),
            handlers: vec![],
            finally: Some(Expr::default_value(None)),
            fault: None,
        },
    )
}

fn list_init(k: i64) -> Result<ExprRef, ExprError> {
    let list = Sym::named("System.Collections.Generic.List`1[System.Int64]");
    let new_list = Expr::new_object(Sym::named("List`1..ctor()"), vec![], list.clone());
    Expr::new(
        NodeType::ListInit,
        Some(list),
        ExprKind::ListInit {
            new_expression: new_list,
            initializers: vec![ElementInit {
                add_method: Sym::named("List`1.Add(Int64)"),
                arguments: vec![k_const(k)],
            }],
        },
    )
}

fn member_init(k: i64) -> Result<ExprRef, ExprError> {
    let point = Sym::named("Geometry.Point");
    let new_point = Expr::new_object(Sym::named("Geometry.Point..ctor()"), vec![], point.clone());
    Expr::new(
        NodeType::MemberInit,
        Some(point),
        ExprKind::MemberInit {
            new_expression: new_point,
            bindings: vec![
                MemberBinding {
                    member: Sym::named("Geometry.Point.X"),
                    kind: BindingKind::Assignment(k_const(k)),
                },
                MemberBinding {
                    member: Sym::named("Geometry.Point.Tags"),
                    kind: BindingKind::List(vec![ElementInit {
                        add_method: Sym::named("List`1.Add(String)"),
                        arguments: vec![Expr::constant("origin", string())],
                    }]),
                },
            ],
        },
    )
}

fn type_is(k: i64) -> Result<ExprRef, ExprError> {
    Expr::new(
        NodeType::TypeIs,
        Some(boolean()),
        ExprKind::TypeBinary {
            expression: k_const(k),
            type_operand: Sym::named("System.IComparable"),
        },
    )
}

fn dynamic(k: i64) -> Result<ExprRef, ExprError> {
    Expr::new(
        NodeType::Dynamic,
        Some(Sym::named("System.Object")),
        ExprKind::Dynamic {
            binder: Sym::named("Microsoft.CSharp.RuntimeBinder.BinaryOperation(Add)"),
            delegate_type: Sym::named("System.Func`4[CallSite,Object,Object,Object]"),
            arguments: vec![var("x"), k_const(k)],
        },
    )
}

fn debug_info(k: i64) -> Result<ExprRef, ExprError> {
    let line = u32::try_from(k).unwrap_or(u32::MAX);
    Expr::new(
        NodeType::DebugInfo,
        None,
        ExprKind::DebugInfo {
            document: SymbolDocument::new(format!("generated_{k}.cs")),
            start_line: line,
            start_column: 1,
            end_line: line,
            end_column: 40,
            is_clear: false,
        },
    )
}

fn index(k: i64) -> Result<ExprRef, ExprError> {
    Expr::new(
        NodeType::Index,
        Some(long()),
        ExprKind::Index {
            object: Some(Expr::parameter(Sym::named("System.Int64[]"), Some("values"))),
            indexer: None,
            arguments: vec![k_const(k)],
        },
    )
}

fn invocation(k: i64) -> Result<ExprRef, ExprError> {
    let x = var("x");
    let identity = Expr::lambda(x.clone(), vec![x], Sym::named("System.Func`2[System.Int64,System.Int64]"));
    Expr::new(
        NodeType::Invoke,
        Some(long()),
        ExprKind::Invocation {
            expression: identity,
            arguments: vec![k_const(k)],
        },
    )
}

fn new_array(k: i64) -> Result<ExprRef, ExprError> {
    Expr::new(
        NodeType::NewArrayInit,
        Some(Sym::named("System.Int64[]")),
        ExprKind::NewArray {
            expressions: vec![k_const(k), k_const(k.wrapping_add(1))],
        },
    )
}

fn runtime_variables(k: i64) -> Result<ExprRef, ExprError> {
    Expr::new(
        NodeType::RuntimeVariables,
        Some(Sym::named("System.Runtime.CompilerServices.IRuntimeVariables")),
        ExprKind::RuntimeVariables {
            variables: vec![var("x"), var(&format!("v{k}"))],
        },
    )
}

fn quote(k: i64) -> Result<ExprRef, ExprError> {
    let thunk = Expr::lambda(k_const(k), vec![], func_type());
    Expr::unary(
        NodeType::Quote,
        thunk,
        Some(Sym::named("Expression`1[System.Func`1[System.Int64]]")),
    )
}

fn label_with_default(k: i64) -> Result<ExprRef, ExprError> {
    let target = LabelTarget::new(Some("end"), Some(long()));
    Ok(Expr::label(target, Some(k_const(k))))
}

fn block_with_default(k: i64) -> Result<ExprRef, ExprError> {
    Ok(Expr::block(vec![], vec![Expr::default_value(Some(long())), k_const(k)]))
}

fn goto_return(k: i64) -> Result<ExprRef, ExprError> {
    let ret = LabelTarget::new(Some("return"), Some(long()));
    Ok(Expr::block(
        vec![],
        vec![
            Expr::goto(GotoKind::Return, ret.clone(), Some(k_const(k))),
            Expr::label(ret, Some(Expr::default_value(Some(long())))),
        ],
    ))
}

fn string_constant(k: i64) -> Result<ExprRef, ExprError> {
    Ok(Expr::constant(Value::string(format!("s{k}")), string()))
}

fn array_length(k: i64) -> Result<ExprRef, ExprError> {
    let array = Expr::new(
        NodeType::NewArrayBounds,
        Some(Sym::named("System.Int64[]")),
        ExprKind::NewArray {
            expressions: vec![k_const(k)],
        },
    )?;
    Expr::unary(NodeType::ArrayLength, array, Some(Sym::named("System.Int32")))
}
