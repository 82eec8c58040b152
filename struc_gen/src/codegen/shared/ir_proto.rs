use prost::{Message, Oneof};

#[derive(Clone, PartialEq, Message)]
pub struct LayoutIr {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    #[prost(message, repeated, tag = "2")]
    pub plans: Vec<LayoutPlan>,
}

#[derive(Clone, PartialEq, Message)]
pub struct LayoutPlan {
    #[prost(string, tag = "1")]
    pub type_name: String,
    #[prost(string, tag = "2")]
    pub cursor: String,
    #[prost(uint64, tag = "3")]
    pub pack: u64,
    #[prost(message, repeated, tag = "4")]
    pub parameters: Vec<IrParameter>,
    #[prost(uint64, optional, tag = "5")]
    pub static_size: Option<u64>,
    /* arena order; statement ids index into this list */
    #[prost(message, repeated, tag = "6")]
    pub stmts: Vec<Stmt>,
    #[prost(uint32, repeated, tag = "7")]
    pub body: Vec<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub bound_check: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct IrParameter {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, optional, tag = "2")]
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum BinOp {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
    Rem = 4,
    Eq = 5,
    Ne = 6,
    Gt = 7,
}

#[derive(Clone, PartialEq, Message)]
pub struct Expr {
    #[prost(oneof = "expr::Kind", tags = "1, 2, 3, 4")]
    pub kind: Option<expr::Kind>,
}

pub mod expr {
    use super::*;

    #[derive(Clone, PartialEq, Oneof)]
    pub enum Kind {
        #[prost(uint64, tag = "1")]
        Lit(u64),
        #[prost(string, tag = "2")]
        Var(String),
        #[prost(message, tag = "3")]
        Binary(super::BinaryExpr),
        #[prost(message, tag = "4")]
        Parens(super::ParensExpr),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct BinaryExpr {
    #[prost(enumeration = "BinOp", tag = "1")]
    pub op: i32,
    #[prost(message, optional, boxed, tag = "2")]
    pub lhs: Option<Box<Expr>>,
    #[prost(message, optional, boxed, tag = "3")]
    pub rhs: Option<Box<Expr>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ParensExpr {
    #[prost(message, optional, boxed, tag = "1")]
    pub inner: Option<Box<Expr>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Stmt {
    #[prost(oneof = "stmt::Kind", tags = "1, 2, 3, 4, 5, 6")]
    pub kind: Option<stmt::Kind>,
}

pub mod stmt {
    use super::*;

    #[derive(Clone, PartialEq, Oneof)]
    pub enum Kind {
        #[prost(message, tag = "1")]
        AddAssign(super::AddAssignStmt),
        #[prost(message, tag = "2")]
        If(super::IfStmt),
        #[prost(message, tag = "3")]
        Seq(super::SeqStmt),
        #[prost(message, tag = "4")]
        Line(super::MarkerStmt),
        #[prost(message, tag = "5")]
        Placeholder(super::MarkerStmt),
        #[prost(message, tag = "6")]
        BoundCheck(super::BoundCheckStmt),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct AddAssignStmt {
    #[prost(string, tag = "1")]
    pub target: String,
    #[prost(message, optional, tag = "2")]
    pub value: Option<Expr>,
}

#[derive(Clone, PartialEq, Message)]
pub struct IfStmt {
    #[prost(message, optional, tag = "1")]
    pub cond: Option<Expr>,
    #[prost(uint32, repeated, tag = "2")]
    pub body: Vec<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SeqStmt {
    #[prost(uint32, repeated, tag = "1")]
    pub stmts: Vec<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct MarkerStmt {}

#[derive(Clone, PartialEq, Message)]
pub struct BoundCheckStmt {
    #[prost(string, tag = "1")]
    pub cursor: String,
    #[prost(string, tag = "2")]
    pub limit: String,
}
