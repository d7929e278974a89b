//! Order-sensitive tree hashing.
//!
//! Walks a tree in canonical order and folds, per node, the node type, the
//! declared type, the arity and the same shape-specific fields the equality
//! check compares. Equal trees therefore fold identical sequences.

use crate::domain::expr::{
    CatchBlock, ElementInit, Expr, ExprKind, LabelTarget, MemberBinding, SwitchCase, SymbolDocument,
};
use crate::domain::symbol::{CtorRef, MemberRef, MethodRef, TypeRef};
use crate::domain::visit::{walk_expr, Arity, Visitor};

// FNV-1a parameters, see http://www.isthe.com/chongo/tech/comp/fnv/
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
pub const FNV_PRIME: u32 = 16_777_619;

// Folded in place of an absent reference, one per reference kind.
pub const TYPE_SENTINEL: u32 = 532_106_345;
pub const CONSTRUCTOR_SENTINEL: u32 = 10_397_522;
pub const METHOD_SENTINEL: u32 = 123_864_332;
pub const MEMBER_SENTINEL: u32 = 75_206_420;
pub const LABEL_SENTINEL: u32 = 350_286_420;
pub const OBJECT_SENTINEL: u32 = 875_231_744;

// Marker tags for auxiliary structures; node types occupy the low range.
const CATCH_TAG: u32 = 0x4001_0001;
const ELEMENT_INIT_TAG: u32 = 0x4001_0002;
const BINDING_TAG: u32 = 0x4001_0003;
const SWITCH_CASE_TAG: u32 = 0x4001_0004;
const LABEL_TARGET_TAG: u32 = 0x4001_0005;

/// 32-bit FNV-1a accumulator: `acc = (acc ^ value) * FNV_PRIME`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fnv1a(u32);

impl Fnv1a {
    pub fn new() -> Self {
        Fnv1a(FNV_OFFSET_BASIS)
    }

    pub fn fold(&mut self, value: u32) {
        self.0 = (self.0 ^ value).wrapping_mul(FNV_PRIME);
    }

    pub fn fold_bool(&mut self, value: bool) {
        self.fold(u32::from(value));
    }

    pub fn finish(&self) -> u32 {
        self.0
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte-wise FNV-1a, used for strings so hashes do not depend on a randomly
/// seeded hasher.
pub fn fnv1a_bytes(bytes: &[u8]) -> u32 {
    let mut acc = Fnv1a::new();
    for &b in bytes {
        acc.fold(u32::from(b));
    }
    acc.finish()
}

pub fn fnv1a_str(s: &str) -> u32 {
    fnv1a_bytes(s.as_bytes())
}

/// Hash state of one tree walk. Reset by [`HashComputation::compute`].
#[derive(Debug, Default)]
pub struct HashComputation {
    acc: Fnv1a,
}

impl HashComputation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute(&mut self, root: &Expr) -> u32 {
        self.acc = Fnv1a::new();
        walk_expr(self, root);
        self.acc.finish()
    }

    fn fold_type(&mut self, ty: Option<&TypeRef>) {
        self.acc.fold(ty.map_or(TYPE_SENTINEL, TypeRef::hash_code));
    }

    fn fold_method(&mut self, method: Option<&MethodRef>) {
        self.acc.fold(method.map_or(METHOD_SENTINEL, MethodRef::hash_code));
    }

    fn fold_member(&mut self, member: Option<&MemberRef>) {
        self.acc.fold(member.map_or(MEMBER_SENTINEL, MemberRef::hash_code));
    }

    fn fold_constructor(&mut self, constructor: Option<&CtorRef>) {
        self.acc
            .fold(constructor.map_or(CONSTRUCTOR_SENTINEL, CtorRef::hash_code));
    }

    fn fold_name(&mut self, name: Option<&str>) {
        self.acc.fold(name.map_or(OBJECT_SENTINEL, fnv1a_str));
    }

    fn fold_arity(&mut self, arity: Arity) {
        for slot in arity.slots() {
            self.acc.fold(slot);
        }
    }

    fn fold_label(&mut self, target: Option<&LabelTarget>) {
        match target {
            Some(target) => {
                self.fold_name(target.name.as_deref());
                self.fold_type(target.ty.as_ref());
            }
            None => self.acc.fold(LABEL_SENTINEL),
        }
    }

    fn fold_document(&mut self, document: &SymbolDocument) {
        self.fold_name(Some(document.file_name.as_str()));
        self.fold_name(document.document_type.as_deref());
        self.fold_name(document.language.as_deref());
        self.fold_name(document.language_vendor.as_deref());
    }

    fn fold_fields(&mut self, kind: &ExprKind) {
        match kind {
            ExprKind::Binary {
                method,
                lifted,
                lifted_to_null,
                ..
            }
            | ExprKind::Unary {
                method,
                lifted,
                lifted_to_null,
                ..
            } => {
                self.fold_method(method.as_ref());
                self.acc.fold_bool(*lifted);
                self.acc.fold_bool(*lifted_to_null);
            }
            ExprKind::Constant { value } => self.acc.fold(value.hash_code()),
            ExprKind::Parameter { name, by_ref } => {
                self.fold_name(name.as_deref());
                self.acc.fold_bool(*by_ref);
            }
            ExprKind::Member { member, .. } => self.fold_member(Some(member)),
            ExprKind::Call { method, .. } => self.fold_method(Some(method)),
            ExprKind::New {
                constructor,
                members,
                ..
            } => {
                self.fold_constructor(constructor.as_ref());
                for member in members.iter().flatten() {
                    self.fold_member(Some(member));
                }
            }
            ExprKind::Lambda {
                name,
                return_type,
                tail_call,
                ..
            } => {
                self.fold_name(name.as_deref());
                self.fold_type(return_type.as_ref());
                self.acc.fold_bool(*tail_call);
            }
            ExprKind::Switch { comparison, .. } => self.fold_method(comparison.as_ref()),
            ExprKind::Goto { kind, target, .. } => {
                self.acc.fold(*kind as u32);
                self.fold_label(Some(target));
            }
            ExprKind::Label { target, .. } => self.fold_label(Some(target)),
            ExprKind::TypeBinary { type_operand, .. } => self.fold_type(Some(type_operand)),
            ExprKind::Dynamic {
                binder,
                delegate_type,
                ..
            } => {
                self.acc.fold(binder.hash_code());
                self.fold_type(Some(delegate_type));
            }
            ExprKind::DebugInfo {
                document,
                start_line,
                start_column,
                end_line,
                end_column,
                is_clear,
            } => {
                self.fold_document(document);
                self.acc.fold(*start_line);
                self.acc.fold(*start_column);
                self.acc.fold(*end_line);
                self.acc.fold(*end_column);
                self.acc.fold_bool(*is_clear);
            }
            ExprKind::Index { indexer, .. } => self.fold_member(indexer.as_ref()),
            ExprKind::Conditional { .. }
            | ExprKind::Block { .. }
            | ExprKind::Loop { .. }
            | ExprKind::Try { .. }
            | ExprKind::ListInit { .. }
            | ExprKind::MemberInit { .. }
            | ExprKind::Default
            | ExprKind::Invocation { .. }
            | ExprKind::NewArray { .. }
            | ExprKind::RuntimeVariables { .. } => {}
        }
    }
}

impl<'t> Visitor<'t> for HashComputation {
    fn visit_expr(&mut self, expr: &'t Expr) -> bool {
        self.acc.fold(expr.node_type() as u32);
        self.fold_type(expr.ty());
        self.fold_arity(expr.kind().arity());
        self.fold_fields(expr.kind());
        true
    }

    fn visit_catch(&mut self, catch: &'t CatchBlock) -> bool {
        self.acc.fold(CATCH_TAG);
        self.fold_arity(catch.arity());
        self.fold_type(Some(&catch.test));
        true
    }

    fn visit_element_init(&mut self, init: &'t ElementInit) -> bool {
        self.acc.fold(ELEMENT_INIT_TAG);
        self.fold_arity(init.arity());
        self.fold_method(Some(&init.add_method));
        true
    }

    fn visit_binding(&mut self, binding: &'t MemberBinding) -> bool {
        self.acc.fold(BINDING_TAG);
        self.fold_arity(binding.arity());
        self.acc.fold(binding.binding_type() as u32);
        self.fold_member(Some(&binding.member));
        true
    }

    fn visit_switch_case(&mut self, case: &'t SwitchCase) -> bool {
        self.acc.fold(SWITCH_CASE_TAG);
        self.fold_arity(case.arity());
        true
    }

    fn visit_label_target(&mut self, target: Option<&'t LabelTarget>) {
        self.acc.fold(LABEL_TARGET_TAG);
        self.fold_label(target);
    }
}

/// Hash of a tree using a throwaway accumulator.
pub fn compute_hash(root: &Expr) -> u32 {
    HashComputation::new().compute(root)
}
