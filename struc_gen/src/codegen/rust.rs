use crate::codegen::rust_gen::{RustEmitError, emit_size_fn};
use crate::codegen::shared::ir::LayoutIr;

pub struct RustCodeGenerator {
    options: RustCodeGeneratorOptions,
}

pub struct RustCodeGeneratorOptions {
    pub package: Option<String>,
    /// Emit `<TYPE>_SIZE` constants for fully static layouts.
    pub emit_constants: bool,
}

impl Default for RustCodeGeneratorOptions {
    fn default() -> Self {
        Self {
            package: None,
            emit_constants: true,
        }
    }
}

impl RustCodeGenerator {
    pub fn new(options: RustCodeGeneratorOptions) -> Self {
        Self { options }
    }

    /// Renders one module containing a size function per plan.
    pub fn emit_code(&self, ir: &LayoutIr) -> Result<String, RustEmitError> {
        let mut output = String::new();
        output.push_str("// Generated by struc-gen. Do not edit.\n");
        if let Some(package) = &self.options.package {
            output.push_str(&format!("// Package: {}\n", package));
        }

        for plan in &ir.plans {
            output.push('\n');
            output.push_str(&emit_size_fn(plan, self.options.emit_constants)?);
        }
        Ok(output)
    }
}
