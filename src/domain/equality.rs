//! Structural equality of two trees.
//!
//! The second tree is flattened into its canonical visit sequence first; the
//! first tree is then walked in the same order, and every node or auxiliary
//! structure must match the next expected entry by marker, node type,
//! declared type, arity and the fields listed per shape in `fields_equal`.

use crate::domain::expr::{CatchBlock, ElementInit, Expr, ExprKind, LabelTarget, MemberBinding, SwitchCase};
use crate::domain::linearize::{linearize_into, Visited};
use crate::domain::visit::{walk_expr, Visitor};

/// Reusable scratch state for comparisons.
///
/// Holds the buffer the second operand is linearized into, so repeated
/// comparisons do not reallocate it.
#[derive(Debug, Default)]
pub struct EqualityScratch {
    expected: Vec<Visited<'static>>,
}

impl EqualityScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `a` and `b` describe the same computation.
    pub fn are_equal(&mut self, a: &Expr, b: &Expr) -> bool {
        let mut expected = recycle(std::mem::take(&mut self.expected));
        linearize_into(b, &mut expected);

        let mut comparison = Comparison {
            expected: &expected,
            cursor: 0,
            equal: true,
        };
        walk_expr(&mut comparison, a);
        // trailing entries mean `b` has structure `a` lacks
        let equal = comparison.equal && comparison.cursor == expected.len();

        self.expected = recycle(expected);
        equal
    }
}

/// Empty the vector and hand its allocation over to a new element lifetime.
/// Keeping the allocation is best-effort: it relies on `collect` reusing the
/// source buffer, and falls back to a fresh vector otherwise.
fn recycle<'a, 'b>(mut buffer: Vec<Visited<'a>>) -> Vec<Visited<'b>> {
    buffer.clear();
    buffer
        .into_iter()
        .map(|_| -> Visited<'b> { unreachable!("buffer was cleared") })
        .collect()
}

struct Comparison<'q, 't> {
    expected: &'q [Visited<'t>],
    cursor: usize,
    equal: bool,
}

impl<'q, 't> Comparison<'q, 't> {
    fn peek(&self) -> Option<Visited<'t>> {
        if self.equal {
            self.expected.get(self.cursor).copied()
        } else {
            None
        }
    }

    /// Consume the head on a match, record the mismatch otherwise.
    fn settle(&mut self, matched: bool) -> bool {
        if matched {
            self.cursor += 1;
        } else {
            self.equal = false;
        }
        matched
    }
}

impl<'a, 'q, 't> Visitor<'a> for Comparison<'q, 't> {
    fn visit_expr(&mut self, expr: &'a Expr) -> bool {
        let matched = match self.peek() {
            Some(Visited::Expr(expected)) => {
                expected.node_type() == expr.node_type()
                    && expected.ty() == expr.ty()
                    && expected.kind().arity() == expr.kind().arity()
                    && fields_equal(expr.kind(), expected.kind())
            }
            _ => false,
        };
        self.settle(matched)
    }

    fn visit_catch(&mut self, catch: &'a CatchBlock) -> bool {
        let matched = match self.peek() {
            Some(Visited::Catch(expected)) => expected.test == catch.test && expected.arity() == catch.arity(),
            _ => false,
        };
        self.settle(matched)
    }

    fn visit_element_init(&mut self, init: &'a ElementInit) -> bool {
        let matched = match self.peek() {
            Some(Visited::ElementInit(expected)) => {
                expected.add_method == init.add_method && expected.arity() == init.arity()
            }
            _ => false,
        };
        self.settle(matched)
    }

    fn visit_binding(&mut self, binding: &'a MemberBinding) -> bool {
        let matched = match self.peek() {
            Some(Visited::Binding(expected)) => {
                expected.binding_type() == binding.binding_type()
                    && expected.member == binding.member
                    && expected.arity() == binding.arity()
            }
            _ => false,
        };
        self.settle(matched)
    }

    fn visit_switch_case(&mut self, case: &'a SwitchCase) -> bool {
        let matched = match self.peek() {
            Some(Visited::SwitchCase(expected)) => expected.arity() == case.arity(),
            _ => false,
        };
        self.settle(matched)
    }

    fn visit_label_target(&mut self, target: Option<&'a LabelTarget>) {
        let matched = match self.peek() {
            Some(Visited::LabelTarget(expected)) => match (target, expected) {
                (None, None) => true,
                (Some(target), Some(expected)) => target == expected,
                _ => false,
            },
            _ => false,
        };
        self.settle(matched);
    }
}

/// Shape-specific field comparison. Node types are already known to match,
/// which fixes the shape of both payloads.
fn fields_equal(a: &ExprKind, b: &ExprKind) -> bool {
    match (a, b) {
        (
            ExprKind::Binary {
                method: m1,
                lifted: l1,
                lifted_to_null: n1,
                ..
            },
            ExprKind::Binary {
                method: m2,
                lifted: l2,
                lifted_to_null: n2,
                ..
            },
        )
        | (
            ExprKind::Unary {
                method: m1,
                lifted: l1,
                lifted_to_null: n1,
                ..
            },
            ExprKind::Unary {
                method: m2,
                lifted: l2,
                lifted_to_null: n2,
                ..
            },
        ) => m1 == m2 && l1 == l2 && n1 == n2,
        (ExprKind::Constant { value: v1 }, ExprKind::Constant { value: v2 }) => v1 == v2,
        (
            ExprKind::Parameter {
                name: n1,
                by_ref: r1,
            },
            ExprKind::Parameter {
                name: n2,
                by_ref: r2,
            },
        ) => n1 == n2 && r1 == r2,
        (ExprKind::Member { member: m1, .. }, ExprKind::Member { member: m2, .. }) => m1 == m2,
        (ExprKind::Call { method: m1, .. }, ExprKind::Call { method: m2, .. }) => m1 == m2,
        (
            ExprKind::New {
                constructor: c1,
                members: s1,
                ..
            },
            ExprKind::New {
                constructor: c2,
                members: s2,
                ..
            },
        ) => c1 == c2 && s1 == s2,
        (
            ExprKind::Lambda {
                name: n1,
                return_type: r1,
                tail_call: t1,
                ..
            },
            ExprKind::Lambda {
                name: n2,
                return_type: r2,
                tail_call: t2,
                ..
            },
        ) => n1 == n2 && r1 == r2 && t1 == t2,
        (ExprKind::Switch { comparison: c1, .. }, ExprKind::Switch { comparison: c2, .. }) => c1 == c2,
        (
            ExprKind::Goto {
                kind: k1,
                target: t1,
                ..
            },
            ExprKind::Goto {
                kind: k2,
                target: t2,
                ..
            },
        ) => k1 == k2 && t1 == t2,
        (ExprKind::Label { target: t1, .. }, ExprKind::Label { target: t2, .. }) => t1 == t2,
        (
            ExprKind::TypeBinary {
                type_operand: t1, ..
            },
            ExprKind::TypeBinary {
                type_operand: t2, ..
            },
        ) => t1 == t2,
        (
            ExprKind::Dynamic {
                binder: b1,
                delegate_type: d1,
                ..
            },
            ExprKind::Dynamic {
                binder: b2,
                delegate_type: d2,
                ..
            },
        ) => b1 == b2 && d1 == d2,
        (
            ExprKind::DebugInfo {
                document: doc1,
                start_line: sl1,
                start_column: sc1,
                end_line: el1,
                end_column: ec1,
                is_clear: c1,
            },
            ExprKind::DebugInfo {
                document: doc2,
                start_line: sl2,
                start_column: sc2,
                end_line: el2,
                end_column: ec2,
                is_clear: c2,
            },
        ) => doc1 == doc2 && sl1 == sl2 && sc1 == sc2 && el1 == el2 && ec1 == ec2 && c1 == c2,
        (ExprKind::Index { indexer: i1, .. }, ExprKind::Index { indexer: i2, .. }) => i1 == i2,
        (ExprKind::Conditional { .. }, ExprKind::Conditional { .. })
        | (ExprKind::Block { .. }, ExprKind::Block { .. })
        | (ExprKind::Loop { .. }, ExprKind::Loop { .. })
        | (ExprKind::Try { .. }, ExprKind::Try { .. })
        | (ExprKind::ListInit { .. }, ExprKind::ListInit { .. })
        | (ExprKind::MemberInit { .. }, ExprKind::MemberInit { .. })
        | (ExprKind::Default, ExprKind::Default)
        | (ExprKind::Invocation { .. }, ExprKind::Invocation { .. })
        | (ExprKind::NewArray { .. }, ExprKind::NewArray { .. })
        | (ExprKind::RuntimeVariables { .. }, ExprKind::RuntimeVariables { .. }) => true,
        (a, b) => unreachable!(
            "matching node types with different shapes: {:?} / {:?}",
            a.shape(),
            b.shape()
        ),
    }
}
