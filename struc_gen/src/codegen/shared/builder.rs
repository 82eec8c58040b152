use super::ir::{BinOp, Expr, SlotId, Stmt, StmtArena, StmtId};

/// Code-fragment construction primitives.
///
/// The layout accumulator composes generated code exclusively through this
/// trait; how expressions and statements are represented (and later
/// rendered) is up to the implementation.
pub trait FragmentBuilder {
    type Expr: Clone;
    type Stmt;
    /// Handle to a placeholder that can be filled after it was emitted.
    type Slot: Copy + Eq;

    fn lit(&mut self, value: u64) -> Self::Expr;
    fn ident(&mut self, name: &str) -> Self::Expr;
    fn binary(&mut self, lhs: Self::Expr, op: BinOp, rhs: Self::Expr) -> Self::Expr;
    fn parens(&mut self, inner: Self::Expr) -> Self::Expr;

    /// `target += value`
    fn add_assign(&mut self, target: &str, value: Self::Expr) -> Self::Stmt;
    fn if_then(&mut self, cond: Self::Expr, body: Vec<Self::Stmt>) -> Self::Stmt;
    fn sequence(&mut self, stmts: Vec<Self::Stmt>) -> Self::Stmt;
    fn line(&mut self) -> Self::Stmt;
    fn placeholder(&mut self) -> (Self::Stmt, Self::Slot);
}

/// Builds arena-backed IR statements.
#[derive(Debug, Default)]
pub struct IrBuilder {
    arena: StmtArena,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arena(&self) -> &StmtArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut StmtArena {
        &mut self.arena
    }

    pub fn into_arena(self) -> StmtArena {
        self.arena
    }
}

impl FragmentBuilder for IrBuilder {
    type Expr = Expr;
    type Stmt = StmtId;
    type Slot = SlotId;

    fn lit(&mut self, value: u64) -> Expr {
        Expr::lit(value)
    }

    fn ident(&mut self, name: &str) -> Expr {
        Expr::var(name)
    }

    fn binary(&mut self, lhs: Expr, op: BinOp, rhs: Expr) -> Expr {
        Expr::binary(lhs, op, rhs)
    }

    fn parens(&mut self, inner: Expr) -> Expr {
        Expr::parens(inner)
    }

    fn add_assign(&mut self, target: &str, value: Expr) -> StmtId {
        self.arena.push(Stmt::AddAssign {
            target: target.to_string(),
            value,
        })
    }

    fn if_then(&mut self, cond: Expr, body: Vec<StmtId>) -> StmtId {
        self.arena.push(Stmt::If { cond, body })
    }

    fn sequence(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.arena.push(Stmt::Seq { stmts })
    }

    fn line(&mut self) -> StmtId {
        self.arena.push(Stmt::Line)
    }

    fn placeholder(&mut self) -> (StmtId, SlotId) {
        let slot = self.arena.push_placeholder();
        (slot.stmt(), slot)
    }
}
