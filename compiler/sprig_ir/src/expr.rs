//! Typed expression trees.
//!
//! Each node owns its operands and carries its resolved type. Trees arrive
//! fully type-checked and optimized; nothing downstream re-infers types.
//!
//! Aggregate constructors store their elements in typed form
//! ([`FieldInit`], [`TableEntry`]) instead of generic assignment nodes, so
//! the "every element is an assignment" invariant holds by construction.

use crate::{Ident, TypeId};

/// A typed expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: TypeId,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: TypeId) -> Self {
        Expr { kind, ty }
    }

    /// Reference to an identifier; the node takes the identifier's type.
    pub fn name(id: Ident) -> Self {
        let ty = id.ty;
        Expr::new(ExprKind::Name(id), ty)
    }

    pub fn constant(lit: Literal, ty: TypeId) -> Self {
        Expr::new(ExprKind::Const(lit), ty)
    }

    pub fn unary(op: UnaryOp, operand: Expr, ty: TypeId) -> Self {
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
        )
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, ty: TypeId) -> Self {
        Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        )
    }

    /// Assignment node; its type is the type of the target.
    pub fn assign(lhs: Expr, rhs: Expr) -> Self {
        let ty = lhs.ty;
        Expr::new(
            ExprKind::Assign {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
        )
    }

    pub fn list(elems: Vec<Expr>, ty: TypeId) -> Self {
        Expr::new(ExprKind::List(elems), ty)
    }

    /// Look through a `Ref` wrapper, as found on assignment targets.
    pub fn strip_ref(&self) -> &Expr {
        match &self.kind {
            ExprKind::Ref(inner) => inner.strip_ref(),
            _ => self,
        }
    }

    /// Short name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Expression node kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Name(Ident),
    Const(Literal),
    /// `copy(x)`
    Clone(Box<Expr>),
    /// `++x`
    Incr(Box<Expr>),
    /// `--x`
    Decr(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `c ? a : b`; `cond` may be a vector of bool.
    Cond {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    List(Vec<Expr>),
    /// `elem in container`; `elem` is a `List` for multi-part indices.
    In {
        elem: Box<Expr>,
        container: Box<Expr>,
    },
    /// `r$f`, with the field resolved to its declaration index.
    Field {
        record: Box<Expr>,
        field: usize,
    },
    /// `r?$f`
    HasField {
        record: Box<Expr>,
        field: usize,
    },
    /// `aggr[i, ...]`; two indices on a vector denote a slice.
    Index {
        aggr: Box<Expr>,
        indices: Vec<Expr>,
    },
    Assign {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `lhs += rhs`
    AddTo {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `lhs -= rhs`
    RemoveFrom {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Marks an lvalue position.
    Ref(Box<Expr>),
    /// `|x|`
    Size(Box<Expr>),
    Schedule(ScheduleExpr),
    Lambda(LambdaExpr),
    /// `x is T`
    Is {
        operand: Box<Expr>,
        test_ty: TypeId,
    },
    /// `x as T`, where `T` is the node's type.
    Cast(Box<Expr>),
    ArithCoerce(Box<Expr>),
    RecordCoerce {
        operand: Box<Expr>,
        /// For each destination field, the source field index (or -1).
        map: Vec<i32>,
    },
    TableCoerce(Box<Expr>),
    VectorCoerce(Box<Expr>),
    RecordConstructor(Vec<FieldInit>),
    SetConstructor {
        elems: Vec<Expr>,
        attrs: Vec<Attr>,
    },
    TableConstructor {
        entries: Vec<TableEntry>,
        attrs: Vec<Attr>,
    },
    VectorConstructor(Vec<Expr>),
    /// Kinds that exist only in statement-reduced trees.
    Reduced(ReducedKind),
}

impl ExprKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Name(_) => "name",
            ExprKind::Const(_) => "const",
            ExprKind::Clone(_) => "clone",
            ExprKind::Incr(_) => "incr",
            ExprKind::Decr(_) => "decr",
            ExprKind::Unary { .. } => "unary",
            ExprKind::Binary { .. } => "binary",
            ExprKind::Cond { .. } => "cond",
            ExprKind::Call { .. } => "call",
            ExprKind::List(_) => "list",
            ExprKind::In { .. } => "in",
            ExprKind::Field { .. } => "field",
            ExprKind::HasField { .. } => "has-field",
            ExprKind::Index { .. } => "index",
            ExprKind::Assign { .. } => "assign",
            ExprKind::AddTo { .. } => "add-to",
            ExprKind::RemoveFrom { .. } => "remove-from",
            ExprKind::Ref(_) => "ref",
            ExprKind::Size(_) => "size",
            ExprKind::Schedule(_) => "schedule",
            ExprKind::Lambda(_) => "lambda",
            ExprKind::Is { .. } => "is",
            ExprKind::Cast(_) => "cast",
            ExprKind::ArithCoerce(_) => "arith-coerce",
            ExprKind::RecordCoerce { .. } => "record-coerce",
            ExprKind::TableCoerce(_) => "table-coerce",
            ExprKind::VectorCoerce(_) => "vector-coerce",
            ExprKind::RecordConstructor(_) => "record-constructor",
            ExprKind::SetConstructor { .. } => "set-constructor",
            ExprKind::TableConstructor { .. } => "table-constructor",
            ExprKind::VectorConstructor(_) => "vector-constructor",
            ExprKind::Reduced(kind) => kind.name(),
        }
    }
}

/// Node kinds produced only by statement reduction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReducedKind {
    FieldAssign,
    IndexSliceAssign,
    Inline,
    /// A bare event invocation outside `schedule` or an `event` statement.
    Event,
}

impl ReducedKind {
    pub fn name(self) -> &'static str {
        match self {
            ReducedKind::FieldAssign => "field-assign",
            ReducedKind::IndexSliceAssign => "index-slice-assign",
            ReducedKind::Inline => "inline",
            ReducedKind::Event => "event",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Complement,
    Positive,
    Negate,
}

impl UnaryOp {
    /// C++ operator spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Complement => "~",
            UnaryOp::Positive => "+",
            UnaryOp::Negate => "-",
        }
    }

    /// Suffix of the runtime's elementwise vector primitive.
    pub fn vec_name(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Complement => "comp",
            UnaryOp::Positive => "pos",
            UnaryOp::Negate => "neg",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    AndAnd,
    OrOr,
    Lt,
    Le,
    Ge,
    Gt,
    Eq,
    Ne,
}

impl BinaryOp {
    /// C++ operator spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::AndAnd => "&&",
            BinaryOp::OrOr => "||",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Gt => ">",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
        }
    }

    /// Suffix of the runtime's elementwise vector primitive.
    pub fn vec_name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::BitAnd => "and",
            BinaryOp::BitOr => "or",
            BinaryOp::BitXor => "xor",
            BinaryOp::AndAnd => "andand",
            BinaryOp::OrOr => "oror",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Ge => "ge",
            BinaryOp::Gt => "gt",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }
}

/// Literal values of constant nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Count(u64),
    Double(f64),
    Time(f64),
    Interval(f64),
    /// Port number with its protocol bits already folded in.
    Port(u64),
    Enum(i64),
    String(String),
    Addr(String),
    Subnet(String),
    Pattern(String),
}

/// One `$field = value` initializer of a record constructor.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldInit {
    pub field: String,
    pub value: Expr,
}

impl FieldInit {
    pub fn new(field: impl Into<String>, value: Expr) -> Self {
        FieldInit {
            field: field.into(),
            value,
        }
    }
}

/// One `[index] = value` entry of a table constructor.
///
/// `index` is a `List` for multi-part indices.
#[derive(Clone, Debug, PartialEq)]
pub struct TableEntry {
    pub index: Expr,
    pub value: Expr,
}

/// Attribute tags that can decorate set and table constructors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttrTag {
    Default,
    Redef,
    ReadExpire,
    WriteExpire,
    CreateExpire,
    ExpireFunc,
    OnChange,
}

impl AttrTag {
    /// Name of the runtime's attribute tag constant.
    pub fn cpp_name(self) -> &'static str {
        match self {
            AttrTag::Default => "ATTR_DEFAULT",
            AttrTag::Redef => "ATTR_REDEF",
            AttrTag::ReadExpire => "ATTR_EXPIRE_READ",
            AttrTag::WriteExpire => "ATTR_EXPIRE_WRITE",
            AttrTag::CreateExpire => "ATTR_EXPIRE_CREATE",
            AttrTag::ExpireFunc => "ATTR_EXPIRE_FUNC",
            AttrTag::OnChange => "ATTR_ON_CHANGE",
        }
    }
}

/// An attribute with its optional value expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    pub tag: AttrTag,
    pub value: Option<Expr>,
}

/// `schedule when { handler(args) }`
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleExpr {
    /// Absolute `time` or relative `interval`.
    pub when: Box<Expr>,
    pub handler: String,
    pub args: Vec<Expr>,
}

/// An anonymous function literal.
///
/// The node's type is the lambda's `Func` type, whose capture list (if
/// any) says which outer identifiers are captured by deep copy.
#[derive(Clone, Debug, PartialEq)]
pub struct LambdaExpr {
    /// Unique, deterministic name derived from the lambda's body.
    pub name: String,
    /// Outer identifiers the body refers to, in capture order.
    pub outer_ids: Vec<Ident>,
}
