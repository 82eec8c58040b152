use super::GeneratorOptions;
use super::accumulator::{BitWidth, Flushed, LayoutAccumulator};
use super::c_gen::size::OUT_SIZE_PARAM;
use super::ir_runtime::{Env, IrError, eval_plan};
use super::shared::builder::{FragmentBuilder, IrBuilder};
use super::shared::ir::{BinOp, Expr, IrParameter, LayoutPlan};
use super::shared::naming::{is_identifier, is_reserved_word};
use indexmap::IndexMap;
use struc_types::{DynamicRunType, FieldKind, StructDef};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalkError {
    #[error("'{type_name}' is not a valid struct name")]
    InvalidTypeName { type_name: String },
    #[error("{type_name}.{field}: field name is used twice")]
    DuplicateField { type_name: String, field: String },
    #[error("{type_name}.{field}: '{name}' is not a valid identifier")]
    InvalidName {
        type_name: String,
        field: String,
        name: String,
    },
    #[error("{type_name}.{field}: '{name}' clashes with a generated variable")]
    ReservedName {
        type_name: String,
        field: String,
        name: String,
    },
    #[error("{type_name}.{field}: bit width {width} is outside 1..=64")]
    InvalidBitWidth {
        type_name: String,
        field: String,
        width: u64,
    },
    #[error("{type_name}.{field}: array count must be non-zero")]
    EmptyArray { type_name: String, field: String },
    #[error("{type_name}.{field}: scale must be non-zero")]
    ZeroScale { type_name: String, field: String },
    #[error("{type_name}.{field}: size-from '{target}' does not name an earlier field")]
    UnknownSizeField {
        type_name: String,
        field: String,
        target: String,
    },
    #[error("{type_name}.{field}: size-from '{target}' is not an integer primitive")]
    SizeFieldNotInteger {
        type_name: String,
        field: String,
        target: String,
    },
    #[error("{type_name}.{field}: field width overflows 64 bits")]
    WidthOverflow { type_name: String, field: String },
    #[error("{type_name}: failed to evaluate static size: {source}")]
    StaticSize {
        type_name: String,
        #[source]
        source: IrError,
    },
}

/// Walks a structure's fields in order, feeding their widths into a
/// [`LayoutAccumulator`] and forcing a flush whenever the next field has to
/// start on a byte boundary.
pub struct LayoutWalker<'a> {
    options: &'a GeneratorOptions,
}

impl<'a> LayoutWalker<'a> {
    pub fn new(options: &'a GeneratorOptions) -> Self {
        Self { options }
    }

    /// Per-struct pack overrides the configured default.
    pub fn resolve_pack(&self, def: &StructDef) -> u64 {
        def.container_attributes.pack.unwrap_or(self.options.pack)
    }

    pub fn walk(&self, def: &StructDef) -> Result<LayoutPlan, WalkError> {
        if !is_identifier(&def.name) {
            return Err(WalkError::InvalidTypeName {
                type_name: def.name.clone(),
            });
        }
        let pack = self.resolve_pack(def);
        let mut builder = IrBuilder::new();
        let mut acc = LayoutAccumulator::new(self.options.cursor.as_str(), pack);
        let mut body = Vec::new();
        let mut seen: IndexMap<&str, &FieldKind> = IndexMap::new();
        let mut parameters: Vec<IrParameter> = Vec::new();
        /* a bit-granular run keeps the region unaligned no matter what
        static_bits says */
        let mut pending_bit_run = false;

        for field in &def.fields {
            let ctx = FieldCtx {
                type_name: &def.name,
                field: &field.name,
            };
            if !is_identifier(&field.name) {
                return Err(ctx.invalid_name(&field.name));
            }
            if seen.contains_key(field.name.as_str()) {
                return Err(WalkError::DuplicateField {
                    type_name: def.name.clone(),
                    field: field.name.clone(),
                });
            }

            if field.field_type.is_byte_aligned() {
                let unaligned = acc.static_bits() % 8 != 0 || pending_bit_run;
                if unaligned || (pack > 0 && !acc.is_empty()) {
                    debug!(
                        type_name = %def.name,
                        field = %field.name,
                        static_bits = acc.static_bits(),
                        "forcing byte boundary"
                    );
                    body.push(acc.flush(&mut builder).fragment);
                    pending_bit_run = false;
                }
            }

            let width = match &field.field_type {
                FieldKind::Bits(width) => {
                    if *width == 0 || *width > 64 {
                        return Err(WalkError::InvalidBitWidth {
                            type_name: def.name.clone(),
                            field: field.name.clone(),
                            width: *width,
                        });
                    }
                    BitWidth::Static(*width)
                }
                FieldKind::Primitive(prim) => BitWidth::Static(prim.bit_width()),
                FieldKind::Array(array) => {
                    if array.count == 0 {
                        return Err(WalkError::EmptyArray {
                            type_name: def.name.clone(),
                            field: field.name.clone(),
                        });
                    }
                    let bits = array
                        .count
                        .checked_mul(array.element.bit_width())
                        .ok_or_else(|| ctx.overflow())?;
                    BitWidth::Static(bits)
                }
                FieldKind::Bytes(run) => {
                    let bits_per_unit = run.scale.checked_mul(8).ok_or_else(|| ctx.overflow())?;
                    BitWidth::Dynamic(self.run_width(
                        &ctx,
                        run,
                        bits_per_unit,
                        &seen,
                        &mut parameters,
                        &mut builder,
                    )?)
                }
                FieldKind::BitRun(run) => {
                    pending_bit_run = true;
                    BitWidth::Dynamic(self.run_width(
                        &ctx,
                        run,
                        run.scale,
                        &seen,
                        &mut parameters,
                        &mut builder,
                    )?)
                }
            };

            if let BitWidth::Static(bits) = &width {
                acc.static_bits()
                    .checked_add(*bits)
                    .ok_or_else(|| ctx.overflow())?;
            }
            acc.add(&mut builder, width);
            seen.insert(field.name.as_str(), &field.field_type);
        }

        let Flushed {
            fragment,
            bound_check,
        } = acc.flush(&mut builder);
        body.push(fragment);

        let mut plan = LayoutPlan {
            type_name: def.name.clone(),
            cursor: self.options.cursor.clone(),
            pack,
            parameters,
            static_size: None,
            arena: builder.into_arena(),
            body,
            bound_check: Some(bound_check),
        };

        if plan.parameters.is_empty() {
            let size = eval_plan(&plan, 0, &Env::new()).map_err(|source| WalkError::StaticSize {
                type_name: def.name.clone(),
                source,
            })?;
            plan.static_size = size;
        }

        debug!(
            type_name = %plan.type_name,
            pack,
            statements = plan.arena.len(),
            static_size = ?plan.static_size,
            "walked struct layout"
        );
        Ok(plan)
    }

    /* Bit count of a run sized by an earlier field: `size_from * bits_per_unit`. */
    fn run_width(
        &self,
        ctx: &FieldCtx<'_>,
        run: &DynamicRunType,
        bits_per_unit: u64,
        seen: &IndexMap<&str, &FieldKind>,
        parameters: &mut Vec<IrParameter>,
        builder: &mut IrBuilder,
    ) -> Result<Expr, WalkError> {
        if run.scale == 0 {
            return Err(WalkError::ZeroScale {
                type_name: ctx.type_name.to_string(),
                field: ctx.field.to_string(),
            });
        }
        let target = run.size_from.as_str();
        match seen.get(target) {
            None => {
                return Err(WalkError::UnknownSizeField {
                    type_name: ctx.type_name.to_string(),
                    field: ctx.field.to_string(),
                    target: target.to_string(),
                });
            }
            Some(FieldKind::Primitive(_)) => {}
            Some(_) => {
                return Err(WalkError::SizeFieldNotInteger {
                    type_name: ctx.type_name.to_string(),
                    field: ctx.field.to_string(),
                    target: target.to_string(),
                });
            }
        }
        /* size-from targets become parameters of the generated function */
        if target == self.options.cursor
            || target == self.options.buf_len_param
            || target == OUT_SIZE_PARAM
            || is_reserved_word(target)
        {
            return Err(WalkError::ReservedName {
                type_name: ctx.type_name.to_string(),
                field: ctx.field.to_string(),
                name: target.to_string(),
            });
        }

        if !parameters.iter().any(|p| p.name == target) {
            parameters.push(IrParameter {
                name: target.to_string(),
                description: Some(format!("length of `{}`", ctx.field)),
            });
        }

        let count = builder.ident(target);
        if bits_per_unit == 1 {
            return Ok(count);
        }
        let unit = builder.lit(bits_per_unit);
        Ok(builder.binary(count, BinOp::Mul, unit))
    }
}

struct FieldCtx<'a> {
    type_name: &'a str,
    field: &'a str,
}

impl FieldCtx<'_> {
    fn overflow(&self) -> WalkError {
        WalkError::WidthOverflow {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
        }
    }

    fn invalid_name(&self, name: &str) -> WalkError {
        WalkError::InvalidName {
            type_name: self.type_name.to_string(),
            field: self.field.to_string(),
            name: name.to_string(),
        }
    }
}
