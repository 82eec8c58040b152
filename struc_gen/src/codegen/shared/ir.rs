//! Statement IR shared by every renderer.
//!
//! Statements live in an append-only [`StmtArena`] and are referred to by
//! [`StmtId`]. Placeholders handed out during layout generation are plain
//! indices into that arena ([`SlotId`]), so a later pass can overwrite a
//! placeholder node without holding a live reference into the statement
//! stream.
//!
//! # Example
//! ```
//! use struc_gen::codegen::shared::ir::*;
//!
//! let mut arena = StmtArena::new();
//! let slot = arena.push_placeholder();
//! arena
//!     .fill(slot, Stmt::BoundCheck { cursor: "m".into(), limit: "buf_len".into() })
//!     .unwrap();
//!
//! assert!(matches!(arena.get(slot.stmt()), Some(Stmt::BoundCheck { .. })));
//! assert!(arena.fill(slot, Stmt::Placeholder).is_err());
//! ```

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Schema version used for every serialized IR export.
pub const IR_SCHEMA_VERSION: u32 = 1;

/// Index of a statement inside a [`StmtArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StmtId(pub u32);

/// Handle to a placeholder statement that may be filled in later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(StmtId);

impl SlotId {
    pub fn stmt(&self) -> StmtId {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Gt,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Gt => ">",
        }
    }
}

/// Integer expression. Grouping is explicit: renderers never insert
/// parentheses on their own, so `Parens` must wrap any operand whose
/// precedence would otherwise change the meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "kebab-case")]
pub enum Expr {
    Lit {
        value: u64,
    },
    Var {
        name: String,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Parens {
        inner: Box<Expr>,
    },
}

impl Expr {
    pub fn lit(value: u64) -> Self {
        Expr::Lit { value }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var { name: name.into() }
    }

    pub fn binary(lhs: Expr, op: BinOp, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn parens(inner: Expr) -> Self {
        Expr::Parens {
            inner: Box::new(inner),
        }
    }
}

/// Infix rendering shared by the Rust and C backends.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Lit { value } => write!(f, "{}", value),
            Expr::Var { name } => f.write_str(name),
            Expr::Binary { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op.symbol(), rhs),
            Expr::Parens { inner } => write!(f, "({})", inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "kebab-case")]
pub enum Stmt {
    /// `target += value`
    AddAssign { target: String, value: Expr },
    If { cond: Expr, body: Vec<StmtId> },
    Seq { stmts: Vec<StmtId> },
    /// Formatting marker, no runtime effect.
    Line,
    /// Empty insertion point. Renders as nothing until filled.
    Placeholder,
    /// Fail when `cursor` exceeds `limit`.
    BoundCheck { cursor: String, limit: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArenaError {
    #[error("statement {0:?} does not exist")]
    UnknownStmt(StmtId),
    #[error("statement {0:?} is not an empty placeholder")]
    NotAPlaceholder(StmtId),
}

/// Append-only statement storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StmtArena {
    nodes: Vec<Stmt>,
}

impl StmtArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(self.nodes.len() as u32);
        self.nodes.push(stmt);
        id
    }

    pub fn push_placeholder(&mut self) -> SlotId {
        SlotId(self.push(Stmt::Placeholder))
    }

    pub fn get(&self, id: StmtId) -> Option<&Stmt> {
        self.nodes.get(id.0 as usize)
    }

    /// Overwrites an empty placeholder. Every slot can be filled once.
    pub fn fill(&mut self, slot: SlotId, stmt: Stmt) -> Result<(), ArenaError> {
        let id = slot.stmt();
        let node = self
            .nodes
            .get_mut(id.0 as usize)
            .ok_or(ArenaError::UnknownStmt(id))?;
        if *node != Stmt::Placeholder {
            return Err(ArenaError::NotAPlaceholder(id));
        }
        *node = stmt;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StmtId, &Stmt)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, stmt)| (StmtId(idx as u32), stmt))
    }
}

/// Runtime input of a generated layout function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrParameter {
    /// Name of the field the value is read from.
    pub name: String,
    /// Optional description for documentation/diagnostics.
    #[serde(default)]
    pub description: Option<String>,
}

/// Cursor-advance program for one structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub type_name: String,
    pub cursor: String,
    pub pack: u64,
    #[serde(default)]
    pub parameters: Vec<IrParameter>,
    /// Total size in bytes when no field depends on runtime values.
    #[serde(default)]
    pub static_size: Option<u64>,
    pub arena: StmtArena,
    pub body: Vec<StmtId>,
    /// Most recent placeholder; every earlier one is already immutable output.
    #[serde(default)]
    pub bound_check: Option<SlotId>,
}

impl LayoutPlan {
    /// Limit variable of the first filled bound check, if any.
    pub fn bound_limit(&self) -> Option<&str> {
        self.arena.iter().find_map(|(_, stmt)| match stmt {
            Stmt::BoundCheck { limit, .. } => Some(limit.as_str()),
            _ => None,
        })
    }
}

/// Container for the plans generated from a set of structure definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutIr {
    /// IR schema version (mirrors `IR_SCHEMA_VERSION`).
    pub version: u32,
    pub plans: Vec<LayoutPlan>,
}

impl LayoutIr {
    /// Creates a new IR container, automatically wiring the schema version.
    pub fn new(plans: Vec<LayoutPlan>) -> Self {
        Self {
            version: IR_SCHEMA_VERSION,
            plans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_only_touches_placeholders() {
        let mut arena = StmtArena::new();
        let first = arena.push_placeholder();
        let assign = arena.push(Stmt::AddAssign {
            target: "m".into(),
            value: Expr::lit(1),
        });
        let second = arena.push_placeholder();
        assert_ne!(first, second);

        arena
            .fill(
                second,
                Stmt::BoundCheck {
                    cursor: "m".into(),
                    limit: "buf_len".into(),
                },
            )
            .expect("fill second slot");
        assert_eq!(arena.get(first.stmt()), Some(&Stmt::Placeholder));
        assert_eq!(
            arena.fill(second, Stmt::Line),
            Err(ArenaError::NotAPlaceholder(second.stmt()))
        );
        assert_eq!(
            arena.fill(SlotId(assign), Stmt::Line),
            Err(ArenaError::NotAPlaceholder(assign))
        );
        assert_eq!(
            arena.fill(SlotId(StmtId(99)), Stmt::Line),
            Err(ArenaError::UnknownStmt(StmtId(99)))
        );
    }

    #[test]
    fn display_keeps_explicit_grouping() {
        let cursor_rem = Expr::parens(Expr::binary(Expr::var("m"), BinOp::Rem, Expr::lit(4)));
        let padding = Expr::parens(Expr::binary(Expr::lit(4), BinOp::Sub, cursor_rem));
        assert_eq!(padding.to_string(), "(4 - (m % 4))");
    }

    #[test]
    fn layout_ir_json_roundtrip() {
        let mut arena = StmtArena::new();
        let stmt = arena.push(Stmt::AddAssign {
            target: "m".into(),
            value: Expr::binary(Expr::lit(16), BinOp::Div, Expr::lit(8)),
        });
        let slot = arena.push_placeholder();
        let ir = LayoutIr::new(vec![LayoutPlan {
            type_name: "Example".into(),
            cursor: "m".into(),
            pack: 0,
            parameters: vec![IrParameter {
                name: "len".into(),
                description: None,
            }],
            static_size: Some(2),
            arena,
            body: vec![stmt, slot.stmt()],
            bound_check: Some(slot),
        }]);

        let json = serde_json::to_string_pretty(&ir).expect("serialize");
        let de: LayoutIr = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(de.version, IR_SCHEMA_VERSION);
        assert_eq!(de, ir);
    }
}
