// Expression tree data structures for exprkey.
// Trees are built once by the caller and never mutated afterwards.

use std::sync::Arc;

use crate::domain::symbol::{BinderRef, CtorRef, MemberRef, MethodRef, TypeRef};
use crate::domain::value::Value;
use crate::error::ExprError;

/// Shared, immutable handle to a node. Subtrees may be shared between trees.
pub type ExprRef = Arc<Expr>;

/// Operation tag of a node.
///
/// The discriminants are folded into tree hashes, so the order of the
/// variants is part of the hash format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Add,
    AddChecked,
    And,
    AndAlso,
    ArrayLength,
    ArrayIndex,
    Call,
    Coalesce,
    Conditional,
    Constant,
    Convert,
    ConvertChecked,
    Divide,
    Equal,
    ExclusiveOr,
    GreaterThan,
    GreaterThanOrEqual,
    Invoke,
    Lambda,
    LeftShift,
    LessThan,
    LessThanOrEqual,
    ListInit,
    MemberAccess,
    MemberInit,
    Modulo,
    Multiply,
    MultiplyChecked,
    Negate,
    UnaryPlus,
    NegateChecked,
    New,
    NewArrayInit,
    NewArrayBounds,
    Not,
    NotEqual,
    Or,
    OrElse,
    Parameter,
    Power,
    Quote,
    RightShift,
    Subtract,
    SubtractChecked,
    TypeAs,
    TypeIs,
    Assign,
    Block,
    DebugInfo,
    Decrement,
    Dynamic,
    Default,
    Goto,
    Increment,
    Index,
    Label,
    RuntimeVariables,
    Loop,
    Switch,
    Throw,
    Try,
    Unbox,
    AddAssign,
    AndAssign,
    DivideAssign,
    ExclusiveOrAssign,
    LeftShiftAssign,
    ModuloAssign,
    MultiplyAssign,
    OrAssign,
    PowerAssign,
    RightShiftAssign,
    SubtractAssign,
    AddAssignChecked,
    MultiplyAssignChecked,
    SubtractAssignChecked,
    PreIncrementAssign,
    PreDecrementAssign,
    PostIncrementAssign,
    PostDecrementAssign,
    TypeEqual,
    OnesComplement,
    IsTrue,
    IsFalse,
}

/// Payload layout family. Every node type belongs to exactly one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Binary,
    Unary,
    Constant,
    Parameter,
    Member,
    Call,
    New,
    Lambda,
    Conditional,
    Block,
    Loop,
    Switch,
    Goto,
    Label,
    Try,
    ListInit,
    MemberInit,
    TypeBinary,
    Dynamic,
    DebugInfo,
    Default,
    Index,
    Invocation,
    NewArray,
    RuntimeVariables,
}

impl NodeType {
    pub fn shape(self) -> Shape {
        use NodeType::*;
        match self {
            Add | AddChecked | And | AndAlso | ArrayIndex | Coalesce | Divide | Equal
            | ExclusiveOr | GreaterThan | GreaterThanOrEqual | LeftShift | LessThan
            | LessThanOrEqual | Modulo | Multiply | MultiplyChecked | NotEqual | Or | OrElse
            | Power | RightShift | Subtract | SubtractChecked | Assign | AddAssign | AndAssign
            | DivideAssign | ExclusiveOrAssign | LeftShiftAssign | ModuloAssign
            | MultiplyAssign | OrAssign | PowerAssign | RightShiftAssign | SubtractAssign
            | AddAssignChecked | MultiplyAssignChecked | SubtractAssignChecked => Shape::Binary,
            ArrayLength | Convert | ConvertChecked | Negate | UnaryPlus | NegateChecked | Not
            | Quote | TypeAs | Decrement | Increment | Throw | Unbox | PreIncrementAssign
            | PreDecrementAssign | PostIncrementAssign | PostDecrementAssign | OnesComplement
            | IsTrue | IsFalse => Shape::Unary,
            Call => Shape::Call,
            Conditional => Shape::Conditional,
            Constant => Shape::Constant,
            Invoke => Shape::Invocation,
            Lambda => Shape::Lambda,
            ListInit => Shape::ListInit,
            MemberAccess => Shape::Member,
            MemberInit => Shape::MemberInit,
            New => Shape::New,
            NewArrayInit | NewArrayBounds => Shape::NewArray,
            Parameter => Shape::Parameter,
            TypeIs | TypeEqual => Shape::TypeBinary,
            Block => Shape::Block,
            DebugInfo => Shape::DebugInfo,
            Dynamic => Shape::Dynamic,
            Default => Shape::Default,
            Goto => Shape::Goto,
            Index => Shape::Index,
            Label => Shape::Label,
            RuntimeVariables => Shape::RuntimeVariables,
            Loop => Shape::Loop,
            Switch => Shape::Switch,
            Try => Shape::Try,
        }
    }
}

/// Jump flavour of a `Goto` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GotoKind {
    Goto,
    Return,
    Break,
    Continue,
}

/// Jump destination. Referenced (not owned) by `Goto`, `Label` and `Loop`
/// nodes; the same target may appear several times in one tree.
/// Targets compare by name and type, never by identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTarget {
    pub name: Option<String>,
    pub ty: Option<TypeRef>,
}

impl LabelTarget {
    pub fn new(name: Option<&str>, ty: Option<TypeRef>) -> Arc<Self> {
        Arc::new(Self {
            name: name.map(str::to_string),
            ty,
        })
    }
}

/// Source document referenced by `DebugInfo` nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolDocument {
    pub file_name: String,
    pub language: Option<String>,
    pub language_vendor: Option<String>,
    pub document_type: Option<String>,
}

impl SymbolDocument {
    pub fn new(file_name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            file_name: file_name.into(),
            language: None,
            language_vendor: None,
            document_type: None,
        })
    }
}

/// `catch` clause of a `Try` node.
#[derive(Debug, Clone)]
pub struct CatchBlock {
    pub test: TypeRef,
    pub variable: Option<ExprRef>,
    pub filter: Option<ExprRef>,
    pub body: ExprRef,
}

/// One `Add(...)` call of a list initializer.
#[derive(Debug, Clone)]
pub struct ElementInit {
    pub add_method: MethodRef,
    pub arguments: Vec<ExprRef>,
}

/// One arm of a `Switch` node.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub test_values: Vec<ExprRef>,
    pub body: ExprRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberBindingType {
    Assignment,
    MemberBinding,
    ListBinding,
}

/// Member initialisation inside a `MemberInit` node.
#[derive(Debug, Clone)]
pub struct MemberBinding {
    pub member: MemberRef,
    pub kind: BindingKind,
}

#[derive(Debug, Clone)]
pub enum BindingKind {
    /// `Member = expression`
    Assignment(ExprRef),
    /// `Member = { nested bindings }`
    Member(Vec<MemberBinding>),
    /// `Member = { list initializers }`
    List(Vec<ElementInit>),
}

impl MemberBinding {
    pub fn binding_type(&self) -> MemberBindingType {
        match self.kind {
            BindingKind::Assignment(_) => MemberBindingType::Assignment,
            BindingKind::Member(_) => MemberBindingType::MemberBinding,
            BindingKind::List(_) => MemberBindingType::ListBinding,
        }
    }
}

/// Shape-specific payload of a node.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Binary {
        left: ExprRef,
        right: ExprRef,
        method: Option<MethodRef>,
        lifted: bool,
        lifted_to_null: bool,
        conversion: Option<ExprRef>,
    },
    Unary {
        operand: Option<ExprRef>,
        method: Option<MethodRef>,
        lifted: bool,
        lifted_to_null: bool,
    },
    Constant {
        value: Value,
    },
    Parameter {
        name: Option<String>,
        by_ref: bool,
    },
    Member {
        expression: Option<ExprRef>,
        member: MemberRef,
    },
    Call {
        object: Option<ExprRef>,
        method: MethodRef,
        arguments: Vec<ExprRef>,
    },
    New {
        constructor: Option<CtorRef>,
        arguments: Vec<ExprRef>,
        members: Option<Vec<MemberRef>>,
    },
    Lambda {
        name: Option<String>,
        return_type: Option<TypeRef>,
        tail_call: bool,
        body: ExprRef,
        parameters: Vec<ExprRef>,
    },
    Conditional {
        test: ExprRef,
        if_true: ExprRef,
        if_false: ExprRef,
    },
    Block {
        variables: Vec<ExprRef>,
        expressions: Vec<ExprRef>,
    },
    Loop {
        body: ExprRef,
        break_label: Option<Arc<LabelTarget>>,
        continue_label: Option<Arc<LabelTarget>>,
    },
    Switch {
        switch_value: ExprRef,
        cases: Vec<SwitchCase>,
        default_body: Option<ExprRef>,
        comparison: Option<MethodRef>,
    },
    Goto {
        kind: GotoKind,
        target: Arc<LabelTarget>,
        value: Option<ExprRef>,
    },
    Label {
        target: Arc<LabelTarget>,
        default_value: Option<ExprRef>,
    },
    Try {
        body: ExprRef,
        handlers: Vec<CatchBlock>,
        finally: Option<ExprRef>,
        fault: Option<ExprRef>,
    },
    ListInit {
        new_expression: ExprRef,
        initializers: Vec<ElementInit>,
    },
    MemberInit {
        new_expression: ExprRef,
        bindings: Vec<MemberBinding>,
    },
    TypeBinary {
        expression: ExprRef,
        type_operand: TypeRef,
    },
    Dynamic {
        binder: BinderRef,
        delegate_type: TypeRef,
        arguments: Vec<ExprRef>,
    },
    DebugInfo {
        document: Arc<SymbolDocument>,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
        is_clear: bool,
    },
    Default,
    Index {
        object: Option<ExprRef>,
        indexer: Option<MemberRef>,
        arguments: Vec<ExprRef>,
    },
    Invocation {
        expression: ExprRef,
        arguments: Vec<ExprRef>,
    },
    NewArray {
        expressions: Vec<ExprRef>,
    },
    RuntimeVariables {
        variables: Vec<ExprRef>,
    },
}

impl ExprKind {
    pub fn shape(&self) -> Shape {
        match self {
            ExprKind::Binary { .. } => Shape::Binary,
            ExprKind::Unary { .. } => Shape::Unary,
            ExprKind::Constant { .. } => Shape::Constant,
            ExprKind::Parameter { .. } => Shape::Parameter,
            ExprKind::Member { .. } => Shape::Member,
            ExprKind::Call { .. } => Shape::Call,
            ExprKind::New { .. } => Shape::New,
            ExprKind::Lambda { .. } => Shape::Lambda,
            ExprKind::Conditional { .. } => Shape::Conditional,
            ExprKind::Block { .. } => Shape::Block,
            ExprKind::Loop { .. } => Shape::Loop,
            ExprKind::Switch { .. } => Shape::Switch,
            ExprKind::Goto { .. } => Shape::Goto,
            ExprKind::Label { .. } => Shape::Label,
            ExprKind::Try { .. } => Shape::Try,
            ExprKind::ListInit { .. } => Shape::ListInit,
            ExprKind::MemberInit { .. } => Shape::MemberInit,
            ExprKind::TypeBinary { .. } => Shape::TypeBinary,
            ExprKind::Dynamic { .. } => Shape::Dynamic,
            ExprKind::DebugInfo { .. } => Shape::DebugInfo,
            ExprKind::Default => Shape::Default,
            ExprKind::Index { .. } => Shape::Index,
            ExprKind::Invocation { .. } => Shape::Invocation,
            ExprKind::NewArray { .. } => Shape::NewArray,
            ExprKind::RuntimeVariables { .. } => Shape::RuntimeVariables,
        }
    }
}

/// A node of an expression tree.
#[derive(Debug)]
pub struct Expr {
    node_type: NodeType,
    ty: Option<TypeRef>,
    kind: ExprKind,
}

impl Expr {
    /// Build a node, checking that `node_type` belongs to the payload's shape.
    pub fn new(node_type: NodeType, ty: Option<TypeRef>, kind: ExprKind) -> Result<ExprRef, ExprError> {
        let shape = kind.shape();
        if node_type.shape() != shape {
            return Err(ExprError::ShapeMismatch { node_type, shape });
        }
        Ok(Arc::new(Expr { node_type, ty, kind }))
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Declared result type; `None` means void.
    pub fn ty(&self) -> Option<&TypeRef> {
        self.ty.as_ref()
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    // ─────────────────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────────────────

    // Used by constructors whose node type is fixed by the shape.
    fn fixed(node_type: NodeType, ty: Option<TypeRef>, kind: ExprKind) -> ExprRef {
        debug_assert_eq!(node_type.shape(), kind.shape());
        Arc::new(Expr { node_type, ty, kind })
    }

    pub fn constant(value: impl Into<Value>, ty: TypeRef) -> ExprRef {
        Self::fixed(
            NodeType::Constant,
            Some(ty),
            ExprKind::Constant { value: value.into() },
        )
    }

    pub fn parameter(ty: TypeRef, name: Option<&str>) -> ExprRef {
        Self::fixed(
            NodeType::Parameter,
            Some(ty),
            ExprKind::Parameter {
                name: name.map(str::to_string),
                by_ref: false,
            },
        )
    }

    pub fn by_ref_parameter(ty: TypeRef, name: Option<&str>) -> ExprRef {
        Self::fixed(
            NodeType::Parameter,
            Some(ty),
            ExprKind::Parameter {
                name: name.map(str::to_string),
                by_ref: true,
            },
        )
    }

    pub fn binary(
        node_type: NodeType,
        left: ExprRef,
        right: ExprRef,
        ty: Option<TypeRef>,
    ) -> Result<ExprRef, ExprError> {
        Self::new(
            node_type,
            ty,
            ExprKind::Binary {
                left,
                right,
                method: None,
                lifted: false,
                lifted_to_null: false,
                conversion: None,
            },
        )
    }

    pub fn unary(node_type: NodeType, operand: ExprRef, ty: Option<TypeRef>) -> Result<ExprRef, ExprError> {
        Self::new(
            node_type,
            ty,
            ExprKind::Unary {
                operand: Some(operand),
                method: None,
                lifted: false,
                lifted_to_null: false,
            },
        )
    }

    pub fn member(expression: Option<ExprRef>, member: MemberRef, ty: TypeRef) -> ExprRef {
        Self::fixed(
            NodeType::MemberAccess,
            Some(ty),
            ExprKind::Member { expression, member },
        )
    }

    pub fn call(
        object: Option<ExprRef>,
        method: MethodRef,
        arguments: Vec<ExprRef>,
        ty: Option<TypeRef>,
    ) -> ExprRef {
        Self::fixed(
            NodeType::Call,
            ty,
            ExprKind::Call {
                object,
                method,
                arguments,
            },
        )
    }

    pub fn new_object(constructor: CtorRef, arguments: Vec<ExprRef>, ty: TypeRef) -> ExprRef {
        Self::fixed(
            NodeType::New,
            Some(ty),
            ExprKind::New {
                constructor: Some(constructor),
                arguments,
                members: None,
            },
        )
    }

    /// Lambda with delegate type `ty`. The return type is the body's type.
    pub fn lambda(body: ExprRef, parameters: Vec<ExprRef>, ty: TypeRef) -> ExprRef {
        let return_type = body.ty().cloned();
        Self::fixed(
            NodeType::Lambda,
            Some(ty),
            ExprKind::Lambda {
                name: None,
                return_type,
                tail_call: false,
                body,
                parameters,
            },
        )
    }

    pub fn conditional(test: ExprRef, if_true: ExprRef, if_false: ExprRef, ty: Option<TypeRef>) -> ExprRef {
        Self::fixed(
            NodeType::Conditional,
            ty,
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            },
        )
    }

    /// Block whose type is the type of its last expression.
    pub fn block(variables: Vec<ExprRef>, expressions: Vec<ExprRef>) -> ExprRef {
        let ty = expressions.last().and_then(|last| last.ty().cloned());
        Self::fixed(
            NodeType::Block,
            ty,
            ExprKind::Block {
                variables,
                expressions,
            },
        )
    }

    pub fn default_value(ty: Option<TypeRef>) -> ExprRef {
        Self::fixed(NodeType::Default, ty, ExprKind::Default)
    }

    pub fn goto(kind: GotoKind, target: Arc<LabelTarget>, value: Option<ExprRef>) -> ExprRef {
        Self::fixed(NodeType::Goto, None, ExprKind::Goto { kind, target, value })
    }

    pub fn label(target: Arc<LabelTarget>, default_value: Option<ExprRef>) -> ExprRef {
        let ty = target.ty.clone();
        Self::fixed(
            NodeType::Label,
            ty,
            ExprKind::Label {
                target,
                default_value,
            },
        )
    }
}
