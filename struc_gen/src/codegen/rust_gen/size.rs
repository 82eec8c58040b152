/* Size function generation for Rust layout code */

use crate::codegen::shared::ir::{LayoutPlan, Stmt, StmtId};
use crate::codegen::shared::naming::{snake_case, upper_snake_case};
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RustEmitError {
    #[error("{type_name}: statement {id} is missing from the arena")]
    UnknownStmt { type_name: String, id: u32 },
}

/// Renders a plan as `fn <type>_size(..)`. Plans carrying a filled bound
/// check become fallible and take the limit as their first argument.
pub struct RustSizeEmitter<'a> {
    plan: &'a LayoutPlan,
    emit_constant: bool,
}

impl<'a> RustSizeEmitter<'a> {
    pub fn new(plan: &'a LayoutPlan, emit_constant: bool) -> Self {
        Self {
            plan,
            emit_constant,
        }
    }

    pub fn emit(&self) -> Result<String, RustEmitError> {
        let plan = self.plan;
        let limit = plan.bound_limit();
        let fn_name = format!("{}_size", snake_case(&plan.type_name));
        let mut output = String::new();

        if let (true, Some(size)) = (self.emit_constant, plan.static_size) {
            writeln!(
                output,
                "pub const {}_SIZE: u64 = {};\n",
                upper_snake_case(&plan.type_name),
                size
            )
            .unwrap();
        }

        let mut params: Vec<String> = Vec::new();
        if let Some(limit) = limit {
            params.push(format!("{}: u64", limit));
        }
        params.extend(plan.parameters.iter().map(|p| format!("{}: u64", p.name)));

        match limit {
            Some(limit) => writeln!(
                output,
                "/// Byte size of `{}`, or `None` when it does not fit in `{}` bytes.",
                plan.type_name, limit
            )
            .unwrap(),
            None => writeln!(output, "/// Byte size of `{}`.", plan.type_name).unwrap(),
        }
        writeln!(output, "#[allow(clippy::identity_op, clippy::erasing_op)]").unwrap();
        let ret = if limit.is_some() { "Option<u64>" } else { "u64" };
        writeln!(output, "pub fn {}({}) -> {} {{", fn_name, params.join(", "), ret).unwrap();
        writeln!(output, "    let mut {}: u64 = 0;", plan.cursor).unwrap();

        self.emit_stmts(&plan.body, 1, &mut output)?;

        if limit.is_some() {
            writeln!(output, "    Some({})", plan.cursor).unwrap();
        } else {
            writeln!(output, "    {}", plan.cursor).unwrap();
        }
        writeln!(output, "}}").unwrap();
        Ok(output)
    }

    fn emit_stmts(&self, stmts: &[StmtId], depth: usize, out: &mut String) -> Result<(), RustEmitError> {
        let indent = "    ".repeat(depth);
        for id in stmts {
            let stmt = self.plan.arena.get(*id).ok_or_else(|| RustEmitError::UnknownStmt {
                type_name: self.plan.type_name.clone(),
                id: id.0,
            })?;
            match stmt {
                Stmt::AddAssign { target, value } => {
                    writeln!(out, "{}{} += {};", indent, target, value).unwrap();
                }
                Stmt::If { cond, body } => {
                    writeln!(out, "{}if {} {{", indent, cond).unwrap();
                    self.emit_stmts(body, depth + 1, out)?;
                    writeln!(out, "{}}}", indent).unwrap();
                }
                Stmt::Seq { stmts } => self.emit_stmts(stmts, depth, out)?,
                Stmt::Line | Stmt::Placeholder => {}
                Stmt::BoundCheck { cursor, limit } => {
                    writeln!(out, "{}if {} > {} {{", indent, cursor, limit).unwrap();
                    writeln!(out, "{}    return None;", indent).unwrap();
                    writeln!(out, "{}}}", indent).unwrap();
                }
            }
        }
        Ok(())
    }
}

pub fn emit_size_fn(plan: &LayoutPlan, emit_constant: bool) -> Result<String, RustEmitError> {
    RustSizeEmitter::new(plan, emit_constant).emit()
}
