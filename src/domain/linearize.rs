//! Flattening of a tree into canonical visit order.

use crate::domain::expr::{CatchBlock, ElementInit, Expr, LabelTarget, MemberBinding, SwitchCase};
use crate::domain::visit::{walk_expr, Visitor};

/// One entry of a linearized tree: a node or an auxiliary structure.
#[derive(Debug, Clone, Copy)]
pub enum Visited<'t> {
    Expr(&'t Expr),
    Catch(&'t CatchBlock),
    ElementInit(&'t ElementInit),
    Binding(&'t MemberBinding),
    SwitchCase(&'t SwitchCase),
    LabelTarget(Option<&'t LabelTarget>),
}

/// Visitor that records every node and auxiliary structure it meets.
pub struct Linearizer<'b, 't> {
    out: &'b mut Vec<Visited<'t>>,
}

impl<'b, 't> Linearizer<'b, 't> {
    pub fn new(out: &'b mut Vec<Visited<'t>>) -> Self {
        Self { out }
    }
}

impl<'b, 't> Visitor<'t> for Linearizer<'b, 't> {
    fn visit_expr(&mut self, expr: &'t Expr) -> bool {
        self.out.push(Visited::Expr(expr));
        true
    }

    fn visit_catch(&mut self, catch: &'t CatchBlock) -> bool {
        self.out.push(Visited::Catch(catch));
        true
    }

    fn visit_element_init(&mut self, init: &'t ElementInit) -> bool {
        self.out.push(Visited::ElementInit(init));
        true
    }

    fn visit_binding(&mut self, binding: &'t MemberBinding) -> bool {
        self.out.push(Visited::Binding(binding));
        true
    }

    fn visit_switch_case(&mut self, case: &'t SwitchCase) -> bool {
        self.out.push(Visited::SwitchCase(case));
        true
    }

    fn visit_label_target(&mut self, target: Option<&'t LabelTarget>) {
        self.out.push(Visited::LabelTarget(target));
    }
}

/// Append the canonical visit sequence of `root` to `out`.
pub fn linearize_into<'t>(root: &'t Expr, out: &mut Vec<Visited<'t>>) {
    walk_expr(&mut Linearizer::new(out), root);
}

pub fn linearize(root: &Expr) -> Vec<Visited<'_>> {
    let mut out = Vec::new();
    linearize_into(root, &mut out);
    out
}
