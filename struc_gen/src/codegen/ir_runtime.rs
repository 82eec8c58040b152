/* IR runtime evaluator.
   Executes a `LayoutPlan` (or any statement list) against a variable environment
   with checked u64 arithmetic, so generated cursor programs can be checked without
   rendering and compiling them. */

use crate::codegen::shared::ir::{BinOp, Expr, LayoutPlan, Stmt, StmtArena, StmtId};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrErrorCode {
    MissingVariable,
    ArithmeticOverflow,
    DivisionByZero,
    UnknownStmt,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code:?}{}", context_suffix(.context))]
pub struct IrError {
    pub code: IrErrorCode,
    pub context: Option<String>,
}

fn context_suffix(context: &Option<String>) -> String {
    context
        .as_deref()
        .map(|c| format!(": {c}"))
        .unwrap_or_default()
}

impl IrError {
    pub fn missing_variable(name: impl Into<String>) -> Self {
        Self {
            code: IrErrorCode::MissingVariable,
            context: Some(name.into()),
        }
    }

    pub fn overflow(op: BinOp) -> Self {
        Self {
            code: IrErrorCode::ArithmeticOverflow,
            context: Some(op.symbol().to_string()),
        }
    }

    pub const fn division_by_zero() -> Self {
        Self {
            code: IrErrorCode::DivisionByZero,
            context: None,
        }
    }

    pub fn unknown_stmt(id: StmtId) -> Self {
        Self {
            code: IrErrorCode::UnknownStmt,
            context: Some(id.0.to_string()),
        }
    }
}

/// How a statement sequence finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// A bound check found the cursor past its limit.
    OutOfBounds { cursor: u64, limit: u64 },
}

pub type Env = IndexMap<String, u64>;

pub fn eval_expr(expr: &Expr, env: &Env) -> Result<u64, IrError> {
    match expr {
        Expr::Lit { value } => Ok(*value),
        Expr::Var { name } => env
            .get(name)
            .copied()
            .ok_or_else(|| IrError::missing_variable(name)),
        Expr::Parens { inner } => eval_expr(inner, env),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval_expr(lhs, env)?;
            let rhs = eval_expr(rhs, env)?;
            apply(*op, lhs, rhs)
        }
    }
}

fn apply(op: BinOp, lhs: u64, rhs: u64) -> Result<u64, IrError> {
    match op {
        BinOp::Add => lhs.checked_add(rhs).ok_or_else(|| IrError::overflow(op)),
        BinOp::Sub => lhs.checked_sub(rhs).ok_or_else(|| IrError::overflow(op)),
        BinOp::Mul => lhs.checked_mul(rhs).ok_or_else(|| IrError::overflow(op)),
        BinOp::Div => lhs.checked_div(rhs).ok_or_else(IrError::division_by_zero),
        BinOp::Rem => lhs.checked_rem(rhs).ok_or_else(IrError::division_by_zero),
        BinOp::Eq => Ok((lhs == rhs) as u64),
        BinOp::Ne => Ok((lhs != rhs) as u64),
        BinOp::Gt => Ok((lhs > rhs) as u64),
    }
}

/// Runs `stmts` in order, mutating `env`.
pub fn exec(arena: &StmtArena, stmts: &[StmtId], env: &mut Env) -> Result<Outcome, IrError> {
    for id in stmts {
        let stmt = arena.get(*id).ok_or_else(|| IrError::unknown_stmt(*id))?;
        let outcome = match stmt {
            Stmt::AddAssign { target, value } => {
                let value = eval_expr(value, env)?;
                let current = env
                    .get(target)
                    .copied()
                    .ok_or_else(|| IrError::missing_variable(target))?;
                let next = apply(BinOp::Add, current, value)?;
                env.insert(target.clone(), next);
                Outcome::Completed
            }
            Stmt::If { cond, body } => {
                if eval_expr(cond, env)? != 0 {
                    exec(arena, body, env)?
                } else {
                    Outcome::Completed
                }
            }
            Stmt::Seq { stmts } => exec(arena, stmts, env)?,
            Stmt::Line | Stmt::Placeholder => Outcome::Completed,
            Stmt::BoundCheck { cursor, limit } => {
                let cursor = eval_expr(&Expr::var(cursor.as_str()), env)?;
                let limit = eval_expr(&Expr::var(limit.as_str()), env)?;
                if cursor > limit {
                    Outcome::OutOfBounds { cursor, limit }
                } else {
                    Outcome::Completed
                }
            }
        };
        if outcome != Outcome::Completed {
            return Ok(outcome);
        }
    }
    Ok(Outcome::Completed)
}

/// Evaluates a whole plan with the cursor starting at `start`.
///
/// Returns `Ok(None)` when a bound check fails, otherwise the final cursor.
pub fn eval_plan(plan: &LayoutPlan, start: u64, params: &Env) -> Result<Option<u64>, IrError> {
    let mut env = params.clone();
    env.insert(plan.cursor.clone(), start);
    match exec(&plan.arena, &plan.body, &mut env)? {
        Outcome::Completed => env
            .get(&plan.cursor)
            .copied()
            .map(Some)
            .ok_or_else(|| IrError::missing_variable(plan.cursor.as_str())),
        Outcome::OutOfBounds { .. } => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_follows_tree_shape() {
        let env = Env::from([("n".to_string(), 3)]);
        let expr = Expr::binary(
            Expr::parens(Expr::binary(Expr::lit(10), BinOp::Add, Expr::var("n"))),
            BinOp::Rem,
            Expr::lit(8),
        );
        assert_eq!(eval_expr(&expr, &env), Ok(5));
    }

    #[test]
    fn underflow_is_reported() {
        let env = Env::new();
        let expr = Expr::binary(Expr::lit(1), BinOp::Sub, Expr::lit(2));
        let err = eval_expr(&expr, &env).unwrap_err();
        assert_eq!(err.code, IrErrorCode::ArithmeticOverflow);
        assert_eq!(err.to_string(), "ArithmeticOverflow: -");
    }

    #[test]
    fn missing_variable_and_zero_divisor() {
        let env = Env::new();
        assert_eq!(
            eval_expr(&Expr::var("len"), &env).unwrap_err().code,
            IrErrorCode::MissingVariable
        );
        let div = Expr::binary(Expr::lit(1), BinOp::Rem, Expr::lit(0));
        assert_eq!(eval_expr(&div, &env), Err(IrError::division_by_zero()));
    }

    #[test]
    fn bound_check_stops_execution() {
        let mut arena = StmtArena::new();
        let advance = arena.push(Stmt::AddAssign {
            target: "m".into(),
            value: Expr::lit(4),
        });
        let check = arena.push(Stmt::BoundCheck {
            cursor: "m".into(),
            limit: "buf_len".into(),
        });
        let after = arena.push(Stmt::AddAssign {
            target: "m".into(),
            value: Expr::lit(100),
        });

        let mut env = Env::from([("m".to_string(), 0), ("buf_len".to_string(), 3)]);
        let outcome = exec(&arena, &[advance, check, after], &mut env).expect("exec");
        assert_eq!(outcome, Outcome::OutOfBounds { cursor: 4, limit: 3 });
        assert_eq!(env["m"], 4);
    }
}
