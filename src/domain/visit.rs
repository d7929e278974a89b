//! Canonical traversal order.
//!
//! Every traversal in the crate (linearization, comparison, hashing) goes
//! through [`walk_expr`], so the order in which children are visited is
//! defined exactly once. Parents are visited before their children, children
//! left to right in the layout of their shape.

use crate::domain::expr::{
    BindingKind, CatchBlock, ElementInit, Expr, ExprKind, ExprRef, LabelTarget, MemberBinding, SwitchCase,
};

/// Callbacks invoked by [`walk_expr`].
///
/// The `visit_*` methods for nodes with children return whether the walker
/// should descend into them.
pub trait Visitor<'t> {
    fn visit_expr(&mut self, expr: &'t Expr) -> bool;
    fn visit_catch(&mut self, catch: &'t CatchBlock) -> bool;
    fn visit_element_init(&mut self, init: &'t ElementInit) -> bool;
    fn visit_binding(&mut self, binding: &'t MemberBinding) -> bool;
    fn visit_switch_case(&mut self, case: &'t SwitchCase) -> bool;
    /// `None` for an absent optional label (e.g. a loop without a break label).
    fn visit_label_target(&mut self, target: Option<&'t LabelTarget>);
}

pub fn walk_expr<'t, V: Visitor<'t> + ?Sized>(visitor: &mut V, expr: &'t Expr) {
    if !visitor.visit_expr(expr) {
        return;
    }
    match expr.kind() {
        ExprKind::Binary {
            left,
            right,
            conversion,
            ..
        } => {
            walk_expr(visitor, left);
            walk_opt(visitor, conversion.as_deref());
            walk_expr(visitor, right);
        }
        ExprKind::Unary { operand, .. } => walk_opt(visitor, operand.as_deref()),
        ExprKind::Constant { .. }
        | ExprKind::Parameter { .. }
        | ExprKind::DebugInfo { .. }
        | ExprKind::Default => {}
        ExprKind::Member { expression, .. } => walk_opt(visitor, expression.as_deref()),
        ExprKind::Call { object, arguments, .. } => {
            walk_opt(visitor, object.as_deref());
            walk_all(visitor, arguments);
        }
        ExprKind::New { arguments, .. } => walk_all(visitor, arguments),
        ExprKind::Lambda { body, parameters, .. } => {
            walk_expr(visitor, body);
            walk_all(visitor, parameters);
        }
        ExprKind::Conditional {
            test,
            if_true,
            if_false,
        } => {
            walk_expr(visitor, test);
            walk_expr(visitor, if_true);
            walk_expr(visitor, if_false);
        }
        ExprKind::Block {
            variables,
            expressions,
        } => {
            walk_all(visitor, expressions);
            walk_all(visitor, variables);
        }
        ExprKind::Loop {
            body,
            break_label,
            continue_label,
        } => {
            visitor.visit_label_target(break_label.as_deref());
            visitor.visit_label_target(continue_label.as_deref());
            walk_expr(visitor, body);
        }
        ExprKind::Switch {
            switch_value,
            cases,
            default_body,
            ..
        } => {
            walk_expr(visitor, switch_value);
            for case in cases {
                walk_switch_case(visitor, case);
            }
            walk_opt(visitor, default_body.as_deref());
        }
        ExprKind::Goto { target, value, .. } => {
            visitor.visit_label_target(Some(target.as_ref()));
            walk_opt(visitor, value.as_deref());
        }
        ExprKind::Label {
            target,
            default_value,
        } => {
            visitor.visit_label_target(Some(target.as_ref()));
            walk_opt(visitor, default_value.as_deref());
        }
        ExprKind::Try {
            body,
            handlers,
            finally,
            fault,
        } => {
            walk_expr(visitor, body);
            for handler in handlers {
                walk_catch(visitor, handler);
            }
            walk_opt(visitor, finally.as_deref());
            walk_opt(visitor, fault.as_deref());
        }
        ExprKind::ListInit {
            new_expression,
            initializers,
        } => {
            walk_expr(visitor, new_expression);
            for init in initializers {
                walk_element_init(visitor, init);
            }
        }
        ExprKind::MemberInit {
            new_expression,
            bindings,
        } => {
            walk_expr(visitor, new_expression);
            for binding in bindings {
                walk_binding(visitor, binding);
            }
        }
        ExprKind::TypeBinary { expression, .. } => walk_expr(visitor, expression),
        ExprKind::Dynamic { arguments, .. } => walk_all(visitor, arguments),
        ExprKind::Index { object, arguments, .. } => {
            walk_opt(visitor, object.as_deref());
            walk_all(visitor, arguments);
        }
        ExprKind::Invocation {
            expression,
            arguments,
        } => {
            walk_expr(visitor, expression);
            walk_all(visitor, arguments);
        }
        ExprKind::NewArray { expressions } => walk_all(visitor, expressions),
        ExprKind::RuntimeVariables { variables } => walk_all(visitor, variables),
    }
}

fn walk_opt<'t, V: Visitor<'t> + ?Sized>(visitor: &mut V, expr: Option<&'t Expr>) {
    if let Some(expr) = expr {
        walk_expr(visitor, expr);
    }
}

fn walk_all<'t, V: Visitor<'t> + ?Sized>(visitor: &mut V, exprs: &'t [ExprRef]) {
    for expr in exprs {
        walk_expr(visitor, expr);
    }
}

fn walk_catch<'t, V: Visitor<'t> + ?Sized>(visitor: &mut V, catch: &'t CatchBlock) {
    if !visitor.visit_catch(catch) {
        return;
    }
    walk_opt(visitor, catch.variable.as_deref());
    walk_opt(visitor, catch.filter.as_deref());
    walk_expr(visitor, &catch.body);
}

fn walk_element_init<'t, V: Visitor<'t> + ?Sized>(visitor: &mut V, init: &'t ElementInit) {
    if visitor.visit_element_init(init) {
        walk_all(visitor, &init.arguments);
    }
}

fn walk_switch_case<'t, V: Visitor<'t> + ?Sized>(visitor: &mut V, case: &'t SwitchCase) {
    if !visitor.visit_switch_case(case) {
        return;
    }
    walk_all(visitor, &case.test_values);
    walk_expr(visitor, &case.body);
}

fn walk_binding<'t, V: Visitor<'t> + ?Sized>(visitor: &mut V, binding: &'t MemberBinding) {
    if !visitor.visit_binding(binding) {
        return;
    }
    match &binding.kind {
        BindingKind::Assignment(expression) => walk_expr(visitor, expression),
        BindingKind::Member(bindings) => {
            for nested in bindings {
                walk_binding(visitor, nested);
            }
        }
        BindingKind::List(initializers) => {
            for init in initializers {
                walk_element_init(visitor, init);
            }
        }
    }
}

/// Child counts of a node's layout slots: list lengths, and 0/1 for optional
/// children.
///
/// Two flattened trees can coincide even though their list boundaries differ
/// (`Block[Block[a, b]]` against `Block[Block[a], b]`); comparing arities as
/// part of each node removes that ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Arity([u32; 4]);

impl Arity {
    pub fn slots(&self) -> [u32; 4] {
        self.0
    }
}

fn present<T>(slot: &Option<T>) -> u32 {
    u32::from(slot.is_some())
}

fn count<T>(items: &[T]) -> u32 {
    u32::try_from(items.len()).unwrap_or(u32::MAX)
}

impl ExprKind {
    pub fn arity(&self) -> Arity {
        match self {
            ExprKind::Binary { conversion, .. } => Arity([present(conversion), 0, 0, 0]),
            ExprKind::Unary { operand, .. } => Arity([present(operand), 0, 0, 0]),
            ExprKind::Member { expression, .. } => Arity([present(expression), 0, 0, 0]),
            ExprKind::Call { object, arguments, .. } => Arity([present(object), count(arguments), 0, 0]),
            ExprKind::New { arguments, members, .. } => {
                let members = members.as_ref().map_or(0, |m| count(m).saturating_add(1));
                Arity([count(arguments), members, 0, 0])
            }
            ExprKind::Lambda { parameters, .. } => Arity([count(parameters), 0, 0, 0]),
            ExprKind::Block {
                variables,
                expressions,
            } => Arity([count(expressions), count(variables), 0, 0]),
            ExprKind::Switch {
                cases, default_body, ..
            } => Arity([count(cases), present(default_body), 0, 0]),
            ExprKind::Goto { value, .. } => Arity([present(value), 0, 0, 0]),
            ExprKind::Label { default_value, .. } => Arity([present(default_value), 0, 0, 0]),
            ExprKind::Try {
                handlers,
                finally,
                fault,
                ..
            } => Arity([count(handlers), present(finally), present(fault), 0]),
            ExprKind::ListInit { initializers, .. } => Arity([count(initializers), 0, 0, 0]),
            ExprKind::MemberInit { bindings, .. } => Arity([count(bindings), 0, 0, 0]),
            ExprKind::Dynamic { arguments, .. } => Arity([count(arguments), 0, 0, 0]),
            ExprKind::Index { object, arguments, .. } => Arity([present(object), count(arguments), 0, 0]),
            ExprKind::Invocation { arguments, .. } => Arity([count(arguments), 0, 0, 0]),
            ExprKind::NewArray { expressions } => Arity([count(expressions), 0, 0, 0]),
            ExprKind::RuntimeVariables { variables } => Arity([count(variables), 0, 0, 0]),
            ExprKind::Constant { .. }
            | ExprKind::Parameter { .. }
            | ExprKind::Conditional { .. }
            | ExprKind::Loop { .. }
            | ExprKind::TypeBinary { .. }
            | ExprKind::DebugInfo { .. }
            | ExprKind::Default => Arity::default(),
        }
    }
}

impl CatchBlock {
    pub fn arity(&self) -> Arity {
        Arity([present(&self.variable), present(&self.filter), 0, 0])
    }
}

impl ElementInit {
    pub fn arity(&self) -> Arity {
        Arity([count(&self.arguments), 0, 0, 0])
    }
}

impl SwitchCase {
    pub fn arity(&self) -> Arity {
        Arity([count(&self.test_values), 0, 0, 0])
    }
}

impl MemberBinding {
    pub fn arity(&self) -> Arity {
        match &self.kind {
            BindingKind::Assignment(_) => Arity::default(),
            BindingKind::Member(bindings) => Arity([count(bindings), 0, 0, 0]),
            BindingKind::List(initializers) => Arity([count(initializers), 0, 0, 0]),
        }
    }
}
