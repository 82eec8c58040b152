use super::ir::{BinOp, Expr, IrParameter, LayoutIr, LayoutPlan, Stmt, StmtId};
use super::ir_proto;
use prost::Message;
use thiserror::Error;

/// Serialize the layout IR into pretty JSON.
pub fn layout_ir_to_json(layout_ir: &LayoutIr) -> serde_json::Result<String> {
    serde_json::to_string_pretty(layout_ir)
}

/// Serialize the layout IR into YAML.
pub fn layout_ir_to_yaml(layout_ir: &LayoutIr) -> Result<String, IrSerializationError> {
    serde_yml::to_string(layout_ir).map_err(IrSerializationError::from)
}

/// Serialize the layout IR into a protobuf byte vector.
pub fn layout_ir_to_protobuf(layout_ir: &LayoutIr) -> Result<Vec<u8>, IrSerializationError> {
    let proto: ir_proto::LayoutIr = layout_ir.into();
    let mut buf = Vec::with_capacity(proto.encoded_len());
    proto.encode(&mut buf).map_err(IrSerializationError::from)?;
    Ok(buf)
}

#[derive(Debug, Error)]
pub enum IrSerializationError {
    #[error("failed to encode protobuf: {0}")]
    ProtobufEncode(#[from] prost::EncodeError),
    #[error("failed to encode yaml: {0}")]
    Yaml(#[from] serde_yml::Error),
}

impl From<&LayoutIr> for ir_proto::LayoutIr {
    fn from(value: &LayoutIr) -> Self {
        Self {
            version: value.version,
            plans: value.plans.iter().map(ir_proto::LayoutPlan::from).collect(),
        }
    }
}

impl From<&LayoutPlan> for ir_proto::LayoutPlan {
    fn from(value: &LayoutPlan) -> Self {
        Self {
            type_name: value.type_name.clone(),
            cursor: value.cursor.clone(),
            pack: value.pack,
            parameters: value
                .parameters
                .iter()
                .map(ir_proto::IrParameter::from)
                .collect(),
            static_size: value.static_size,
            stmts: value.arena.iter().map(|(_, stmt)| stmt.into()).collect(),
            body: ids(&value.body),
            bound_check: value.bound_check.map(|slot| slot.stmt().0),
        }
    }
}

impl From<&IrParameter> for ir_proto::IrParameter {
    fn from(value: &IrParameter) -> Self {
        Self {
            name: value.name.clone(),
            description: value.description.clone(),
        }
    }
}

impl From<&Stmt> for ir_proto::Stmt {
    fn from(value: &Stmt) -> Self {
        use ir_proto::stmt::Kind;
        let kind = match value {
            Stmt::AddAssign { target, value } => Kind::AddAssign(ir_proto::AddAssignStmt {
                target: target.clone(),
                value: Some(value.into()),
            }),
            Stmt::If { cond, body } => Kind::If(ir_proto::IfStmt {
                cond: Some(cond.into()),
                body: ids(body),
            }),
            Stmt::Seq { stmts } => Kind::Seq(ir_proto::SeqStmt { stmts: ids(stmts) }),
            Stmt::Line => Kind::Line(ir_proto::MarkerStmt {}),
            Stmt::Placeholder => Kind::Placeholder(ir_proto::MarkerStmt {}),
            Stmt::BoundCheck { cursor, limit } => Kind::BoundCheck(ir_proto::BoundCheckStmt {
                cursor: cursor.clone(),
                limit: limit.clone(),
            }),
        };
        Self { kind: Some(kind) }
    }
}

impl From<&Expr> for ir_proto::Expr {
    fn from(value: &Expr) -> Self {
        use ir_proto::expr::Kind;
        let kind = match value {
            Expr::Lit { value } => Kind::Lit(*value),
            Expr::Var { name } => Kind::Var(name.clone()),
            Expr::Binary { op, lhs, rhs } => Kind::Binary(ir_proto::BinaryExpr {
                op: ir_proto::BinOp::from(*op) as i32,
                lhs: Some(Box::new(lhs.as_ref().into())),
                rhs: Some(Box::new(rhs.as_ref().into())),
            }),
            Expr::Parens { inner } => Kind::Parens(ir_proto::ParensExpr {
                inner: Some(Box::new(inner.as_ref().into())),
            }),
        };
        Self { kind: Some(kind) }
    }
}

impl From<BinOp> for ir_proto::BinOp {
    fn from(value: BinOp) -> Self {
        match value {
            BinOp::Add => ir_proto::BinOp::Add,
            BinOp::Sub => ir_proto::BinOp::Sub,
            BinOp::Mul => ir_proto::BinOp::Mul,
            BinOp::Div => ir_proto::BinOp::Div,
            BinOp::Rem => ir_proto::BinOp::Rem,
            BinOp::Eq => ir_proto::BinOp::Eq,
            BinOp::Ne => ir_proto::BinOp::Ne,
            BinOp::Gt => ir_proto::BinOp::Gt,
        }
    }
}

fn ids(stmts: &[StmtId]) -> Vec<u32> {
    stmts.iter().map(|id| id.0).collect()
}
