use crate::codegen::c_gen::{CEmitError, emit_size_fn};
use crate::codegen::shared::ir::LayoutIr;
use crate::codegen::shared::naming::upper_snake_case;

pub struct CCodeGenerator {
    options: CCodeGeneratorOptions,
}

pub struct CCodeGeneratorOptions {
    pub package: Option<String>,
    /// Stem of the header file, used for the include guard.
    pub header_name: String,
}

impl Default for CCodeGeneratorOptions {
    fn default() -> Self {
        Self {
            package: None,
            header_name: "layout".to_string(),
        }
    }
}

impl CCodeGenerator {
    pub fn new(options: CCodeGeneratorOptions) -> Self {
        Self { options }
    }

    /// Renders a self-contained header with one size function per plan.
    pub fn emit_code(&self, ir: &LayoutIr) -> Result<String, CEmitError> {
        let guard = format!("{}_H", upper_snake_case(&self.options.header_name));
        let mut output = String::new();
        output.push_str("/* Generated by struc-gen. Do not edit. */\n");
        if let Some(package) = &self.options.package {
            output.push_str(&format!("/* Package: {} */\n", package));
        }
        output.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n#include <stdint.h>\n"));

        for plan in &ir.plans {
            output.push('\n');
            output.push_str(&emit_size_fn(plan)?);
        }

        output.push_str(&format!("\n#endif /* {guard} */\n"));
        Ok(output)
    }
}
