pub mod accumulator;
pub mod bound_check;
pub mod c;
pub mod c_gen;
pub mod ir_runtime;
pub mod rust;
pub mod rust_gen;
pub mod shared;
pub mod walker;

use crate::codegen::bound_check::apply_bound_check;
use crate::codegen::c_gen::size::OUT_SIZE_PARAM;
use crate::codegen::shared::naming::{is_identifier, is_reserved_word};
use crate::codegen::shared::ir::{ArenaError, LayoutIr, LayoutPlan};
use crate::codegen::walker::{LayoutWalker, WalkError};
use struc_types::{FileOptions, LayoutFile};
use thiserror::Error;
use tracing::info;

/// Settings shared by the walker, the bound-check pass and the renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Name of the runtime byte cursor.
    pub cursor: String,
    /// Pack applied to structs that do not set their own.
    pub pack: u64,
    pub bound_checks: bool,
    /// Name of the buffer length argument of generated functions.
    pub buf_len_param: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            cursor: accumulator::DEFAULT_CURSOR.to_string(),
            pack: 0,
            bound_checks: true,
            buf_len_param: "buf_len".to_string(),
        }
    }
}

impl GeneratorOptions {
    /// File-level options take precedence over these.
    pub fn with_file_options(&self, file: &FileOptions) -> Self {
        let mut options = self.clone();
        if let Some(pack) = file.pack {
            options.pack = pack;
        }
        if let Some(cursor) = &file.cursor {
            options.cursor = cursor.clone();
        }
        options
    }

    /// Checks that the generated variable names are usable and distinct.
    pub fn validate(&self) -> Result<(), GenerateError> {
        for (option, value) in [
            ("cursor", &self.cursor),
            ("buffer length parameter", &self.buf_len_param),
        ] {
            if !is_identifier(value) || is_reserved_word(value) || value == OUT_SIZE_PARAM {
                return Err(GenerateError::InvalidOption {
                    option,
                    value: value.clone(),
                });
            }
        }
        if self.cursor == self.buf_len_param {
            return Err(GenerateError::CursorShadowsLimit {
                name: self.cursor.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{option} '{value}' is not a usable identifier")]
    InvalidOption { option: &'static str, value: String },
    #[error("cursor '{name}' would shadow the buffer length parameter")]
    CursorShadowsLimit { name: String },
    #[error("struct '{name}' is defined more than once")]
    DuplicateStruct { name: String },
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error("{type_name}: {source}")]
    BoundCheck {
        type_name: String,
        #[source]
        source: ArenaError,
    },
}

/// Walks every struct of `file` and runs the bound-check pass over the result.
pub fn build_layout_ir(
    file: &LayoutFile,
    options: &GeneratorOptions,
) -> Result<LayoutIr, GenerateError> {
    let options = options.with_file_options(&file.options);
    options.validate()?;
    let walker = LayoutWalker::new(&options);

    let mut plans: Vec<LayoutPlan> = Vec::with_capacity(file.structs.len());
    for def in &file.structs {
        if plans.iter().any(|plan| plan.type_name == def.name) {
            return Err(GenerateError::DuplicateStruct {
                name: def.name.clone(),
            });
        }
        let mut plan = walker.walk(def)?;
        if options.bound_checks {
            apply_bound_check(&mut plan, &options.buf_len_param).map_err(|source| {
                GenerateError::BoundCheck {
                    type_name: def.name.clone(),
                    source,
                }
            })?;
        }
        plans.push(plan);
    }

    info!(
        structs = plans.len(),
        package = file.package.as_deref().unwrap_or("<none>"),
        "built layout IR"
    );
    Ok(LayoutIr::new(plans))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_options_override_defaults() {
        let base = GeneratorOptions {
            pack: 2,
            ..GeneratorOptions::default()
        };
        let merged = base.with_file_options(&FileOptions {
            pack: Some(8),
            cursor: Some("off".into()),
        });
        assert_eq!(merged.pack, 8);
        assert_eq!(merged.cursor, "off");
        assert!(merged.bound_checks);

        let untouched = base.with_file_options(&FileOptions::default());
        assert_eq!(untouched, base);
    }

    fn one_struct(yaml_options: &str) -> LayoutFile {
        serde_yml::from_str(&format!(
            "{yaml_options}structs:\n  - name: Frame\n    fields:\n      - name: tag\n        field-type: {{ primitive: u8 }}\n"
        ))
        .expect("parse layout")
    }

    #[test]
    fn rejects_cursor_that_shadows_the_limit() {
        let options = GeneratorOptions {
            cursor: "buf_len".into(),
            ..GeneratorOptions::default()
        };
        let err = build_layout_ir(&one_struct(""), &options).unwrap_err();
        assert!(matches!(err, GenerateError::CursorShadowsLimit { ref name } if name == "buf_len"));

        let err = build_layout_ir(
            &one_struct("options:\n  cursor: buf_len\n"),
            &GeneratorOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::CursorShadowsLimit { .. }));
    }

    #[test]
    fn rejects_unusable_cursor_names() {
        for cursor in ["type", "let", "int", "2m", "m-off", "", "out_size"] {
            let options = GeneratorOptions {
                cursor: cursor.into(),
                ..GeneratorOptions::default()
            };
            let err = build_layout_ir(&one_struct(""), &options).unwrap_err();
            assert!(
                matches!(err, GenerateError::InvalidOption { option: "cursor", .. }),
                "{cursor}: {err}"
            );
        }

        let err = build_layout_ir(
            &one_struct("options:\n  cursor: fn\n"),
            &GeneratorOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "cursor 'fn' is not a usable identifier");
    }

    #[test]
    fn rejects_struct_defined_twice_in_one_file() {
        let mut file = one_struct("");
        file.structs.push(file.structs[0].clone());
        let err = build_layout_ir(&file, &GeneratorOptions::default()).unwrap_err();
        assert!(matches!(err, GenerateError::DuplicateStruct { ref name } if name == "Frame"));
    }
}
