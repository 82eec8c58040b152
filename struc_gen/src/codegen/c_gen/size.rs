use crate::codegen::shared::ir::{LayoutPlan, Stmt, StmtId};
use crate::codegen::shared::naming::{snake_case, upper_snake_case};
use std::fmt::Write;
use thiserror::Error;

/// Out-pointer argument of fallible size functions.
pub const OUT_SIZE_PARAM: &str = "out_size";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CEmitError {
    #[error("{type_name}: statement {id} is missing from the arena")]
    UnknownStmt { type_name: String, id: u32 },
}

/* Fallible variant (bound check present):
     static inline int foo_size( uint64_t buf_len, ..., uint64_t * out_size );
   returns 0 on success, -1 when the layout does not fit.
   Infallible variant returns the size directly. */
pub struct CSizeEmitter<'a> {
    plan: &'a LayoutPlan,
}

impl<'a> CSizeEmitter<'a> {
    pub fn new(plan: &'a LayoutPlan) -> Self {
        Self { plan }
    }

    pub fn emit(&self) -> Result<String, CEmitError> {
        let plan = self.plan;
        let limit = plan.bound_limit();
        let fn_name = format!("{}_size", snake_case(&plan.type_name));
        let mut output = String::new();

        if let Some(size) = plan.static_size {
            writeln!(
                output,
                "#define {}_SIZE ((uint64_t){}UL)\n",
                upper_snake_case(&plan.type_name),
                size
            )
            .unwrap();
        }

        let mut params: Vec<String> = Vec::new();
        if let Some(limit) = limit {
            params.push(format!("uint64_t {}", limit));
        }
        params.extend(plan.parameters.iter().map(|p| format!("uint64_t {}", p.name)));

        if limit.is_some() {
            params.push(format!("uint64_t * {}", OUT_SIZE_PARAM));
            writeln!(output, "static inline int").unwrap();
        } else {
            if params.is_empty() {
                params.push("void".to_string());
            }
            writeln!(output, "static inline uint64_t").unwrap();
        }
        writeln!(output, "{}( {} ) {{", fn_name, params.join(", ")).unwrap();
        writeln!(output, "  uint64_t {} = 0UL;", plan.cursor).unwrap();

        self.emit_stmts(&plan.body, 1, &mut output)?;

        if limit.is_some() {
            writeln!(output, "  *{} = {};", OUT_SIZE_PARAM, plan.cursor).unwrap();
            writeln!(output, "  return 0;").unwrap();
        } else {
            writeln!(output, "  return {};", plan.cursor).unwrap();
        }
        writeln!(output, "}}").unwrap();
        Ok(output)
    }

    fn emit_stmts(&self, stmts: &[StmtId], depth: usize, out: &mut String) -> Result<(), CEmitError> {
        let indent = "  ".repeat(depth);
        for id in stmts {
            let stmt = self.plan.arena.get(*id).ok_or_else(|| CEmitError::UnknownStmt {
                type_name: self.plan.type_name.clone(),
                id: id.0,
            })?;
            match stmt {
                Stmt::AddAssign { target, value } => {
                    writeln!(out, "{}{} += {};", indent, target, value).unwrap();
                }
                Stmt::If { cond, body } => {
                    writeln!(out, "{}if( {} ) {{", indent, cond).unwrap();
                    self.emit_stmts(body, depth + 1, out)?;
                    writeln!(out, "{}}}", indent).unwrap();
                }
                Stmt::Seq { stmts } => self.emit_stmts(stmts, depth, out)?,
                Stmt::Line | Stmt::Placeholder => {}
                Stmt::BoundCheck { cursor, limit } => {
                    writeln!(out, "{}if( {} > {} ) return -1;", indent, cursor, limit).unwrap();
                }
            }
        }
        Ok(())
    }
}

pub fn emit_size_fn(plan: &LayoutPlan) -> Result<String, CEmitError> {
    CSizeEmitter::new(plan).emit()
}
