//! Pending bit consumption for the current byte-aligned region.
//!
//! Fields are folded in as static (known now) or dynamic (known only when the
//! generated code runs) bit counts. [`LayoutAccumulator::flush`] turns the
//! pending total into code that advances the cursor to the next byte
//! boundary, pads to the pack multiple, and leaves a bound-check placeholder
//! behind.

use super::shared::builder::FragmentBuilder;
use super::shared::ir::BinOp;
use tracing::trace;

/// Name of the cursor variable used when nothing else is configured.
pub const DEFAULT_CURSOR: &str = "m";

/// Width contribution of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitWidth<E> {
    Static(u64),
    Dynamic(E),
}

/// Output of a flush: the emitted statements and the placeholder attached at
/// their end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flushed<S, L> {
    pub fragment: S,
    pub bound_check: L,
}

pub struct LayoutAccumulator<B: FragmentBuilder> {
    cursor: String,
    static_bits: u64,
    dynamic_bits: Option<B::Expr>,
    pack: u64,
    check_bound: Option<B::Slot>,
}

impl<B: FragmentBuilder> LayoutAccumulator<B> {
    /// `pack == 0` keeps natural byte packing.
    pub fn new(cursor: impl Into<String>, pack: u64) -> Self {
        Self {
            cursor: cursor.into(),
            static_bits: 0,
            dynamic_bits: None,
            pack,
            check_bound: None,
        }
    }

    pub fn static_bits(&self) -> u64 {
        self.static_bits
    }

    pub fn has_dynamic_bits(&self) -> bool {
        self.dynamic_bits.is_some()
    }

    /// True when nothing is waiting to be flushed.
    pub fn is_empty(&self) -> bool {
        self.static_bits == 0 && self.dynamic_bits.is_none()
    }

    /// The most recently created placeholder. `None` before the first flush.
    pub fn pending_bound_check(&self) -> Option<B::Slot> {
        self.check_bound
    }

    pub fn add(&mut self, builder: &mut B, width: BitWidth<B::Expr>) {
        match width {
            BitWidth::Static(bits) => self.static_bits += bits,
            BitWidth::Dynamic(expr) => {
                self.dynamic_bits = Some(match self.dynamic_bits.take() {
                    Some(prev) => builder.binary(prev, BinOp::Add, expr),
                    None => expr,
                });
            }
        }
    }

    /* Creates an empty placeholder, makes it the pending slot and returns it
    preceded by a line break. */
    fn insert_new_check_bound(&mut self, builder: &mut B) -> (B::Stmt, B::Slot) {
        let (placeholder, slot) = builder.placeholder();
        self.check_bound = Some(slot);
        let line = builder.line();
        (builder.sequence(vec![line, placeholder]), slot)
    }

    /// Emits the cursor advance for everything accumulated so far and resets
    /// the accumulator. After this call the cursor points at the next free
    /// byte (padded to `pack` when set).
    pub fn flush(&mut self, builder: &mut B) -> Flushed<B::Stmt, B::Slot> {
        trace!(
            static_bits = self.static_bits,
            dynamic = self.dynamic_bits.is_some(),
            pack = self.pack,
            "flushing layout accumulator"
        );

        let total = match self.dynamic_bits.take() {
            Some(dynamic) => {
                let fixed = builder.lit(self.static_bits);
                let sum = builder.binary(fixed, BinOp::Add, dynamic);
                builder.parens(sum)
            }
            None => builder.lit(self.static_bits),
        };
        self.static_bits = 0;

        let mut stmts = Vec::new();

        // m += T / 8
        let eight = builder.lit(8);
        let whole_bytes = builder.binary(total.clone(), BinOp::Div, eight);
        stmts.push(builder.add_assign(&self.cursor, whole_bytes));
        stmts.push(builder.line());

        // if T % 8 != 0 { m += 1 }
        let eight = builder.lit(8);
        let rem = builder.binary(total, BinOp::Rem, eight);
        let zero = builder.lit(0);
        let partial = builder.binary(rem, BinOp::Ne, zero);
        let one = builder.lit(1);
        let bump = builder.add_assign(&self.cursor, one);
        stmts.push(builder.if_then(partial, vec![bump]));
        stmts.push(builder.line());

        if self.pack > 0 {
            // if m % P != 0 { m += P - (m % P) }
            let cursor = builder.ident(&self.cursor);
            let pack = builder.lit(self.pack);
            let misalign = builder.binary(cursor, BinOp::Rem, pack);
            let zero = builder.lit(0);
            let misaligned = builder.binary(misalign, BinOp::Ne, zero);

            let cursor = builder.ident(&self.cursor);
            let pack = builder.lit(self.pack);
            let misalign = builder.binary(cursor, BinOp::Rem, pack);
            let misalign = builder.parens(misalign);
            let pack = builder.lit(self.pack);
            let padding = builder.binary(pack, BinOp::Sub, misalign);
            let padding = builder.parens(padding);
            let pad = builder.add_assign(&self.cursor, padding);
            stmts.push(builder.if_then(misaligned, vec![pad]));
            stmts.push(builder.line());
        }

        let (check_bound, bound_check) = self.insert_new_check_bound(builder);
        stmts.push(check_bound);

        Flushed {
            fragment: builder.sequence(stmts),
            bound_check,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::shared::builder::IrBuilder;
    use crate::codegen::shared::ir::{Expr, Stmt};

    /* Renders straight to text; keeps the accumulator honest about only
    using the builder trait. */
    #[derive(Default)]
    struct TextBuilder {
        slots: usize,
    }

    impl FragmentBuilder for TextBuilder {
        type Expr = String;
        type Stmt = String;
        type Slot = usize;

        fn lit(&mut self, value: u64) -> String {
            value.to_string()
        }

        fn ident(&mut self, name: &str) -> String {
            name.to_string()
        }

        fn binary(&mut self, lhs: String, op: BinOp, rhs: String) -> String {
            format!("{} {} {}", lhs, op.symbol(), rhs)
        }

        fn parens(&mut self, inner: String) -> String {
            format!("({})", inner)
        }

        fn add_assign(&mut self, target: &str, value: String) -> String {
            format!("{} += {};", target, value)
        }

        fn if_then(&mut self, cond: String, body: Vec<String>) -> String {
            format!("if {} {{ {} }}", cond, body.join(" "))
        }

        fn sequence(&mut self, stmts: Vec<String>) -> String {
            stmts.concat()
        }

        fn line(&mut self) -> String {
            "\n".to_string()
        }

        fn placeholder(&mut self) -> (String, usize) {
            self.slots += 1;
            (format!("<slot {}>", self.slots), self.slots)
        }
    }

    #[test]
    fn static_flush_emits_divide_then_remainder() {
        let mut builder = TextBuilder::default();
        let mut acc = LayoutAccumulator::new("m", 0);
        acc.add(&mut builder, BitWidth::Static(5));

        let flushed = acc.flush(&mut builder);
        assert_eq!(
            flushed.fragment,
            "m += 5 / 8;\nif 5 % 8 != 0 { m += 1; }\n\n<slot 1>"
        );
        assert_eq!(flushed.bound_check, 1);
    }

    #[test]
    fn dynamic_total_is_parenthesized() {
        let mut builder = TextBuilder::default();
        let mut acc = LayoutAccumulator::new("m", 0);
        acc.add(&mut builder, BitWidth::Static(10));
        acc.add(&mut builder, BitWidth::Dynamic("len * 8".to_string()));
        acc.add(&mut builder, BitWidth::Dynamic("extra".to_string()));

        let flushed = acc.flush(&mut builder);
        assert_eq!(
            flushed.fragment,
            "m += (10 + len * 8 + extra) / 8;\n\
             if (10 + len * 8 + extra) % 8 != 0 { m += 1; }\n\n<slot 1>"
        );
    }

    #[test]
    fn pack_emits_alignment_conditional() {
        let mut builder = TextBuilder::default();
        let mut acc = LayoutAccumulator::new("off", 4);
        acc.add(&mut builder, BitWidth::Static(10));

        let flushed = acc.flush(&mut builder);
        assert_eq!(
            flushed.fragment,
            "off += 10 / 8;\n\
             if 10 % 8 != 0 { off += 1; }\n\
             if off % 4 != 0 { off += (4 - (off % 4)); }\n\n<slot 1>"
        );
    }

    #[test]
    fn flush_resets_pending_state() {
        let mut builder = TextBuilder::default();
        let mut acc = LayoutAccumulator::new("m", 0);
        assert!(acc.pending_bound_check().is_none());

        acc.add(&mut builder, BitWidth::Static(12));
        acc.add(&mut builder, BitWidth::Dynamic("n".to_string()));
        assert!(!acc.is_empty());

        acc.flush(&mut builder);
        assert!(acc.is_empty());
        assert_eq!(acc.static_bits(), 0);
        assert!(!acc.has_dynamic_bits());

        let again = acc.flush(&mut builder);
        assert!(again.fragment.starts_with("m += 0 / 8;"));
        assert_eq!(acc.pending_bound_check(), Some(2));
    }

    #[test]
    fn zero_pack_has_no_alignment_statement() {
        let mut builder = IrBuilder::new();
        let mut acc = LayoutAccumulator::new(DEFAULT_CURSOR, 0);
        acc.add(&mut builder, BitWidth::Static(10));
        acc.flush(&mut builder);

        let conditionals = builder
            .arena()
            .iter()
            .filter(|(_, stmt)| matches!(stmt, Stmt::If { .. }))
            .count();
        assert_eq!(conditionals, 1);

        let cursor_mod = builder.arena().iter().any(|(_, stmt)| match stmt {
            Stmt::If { cond, .. } => format!("{:?}", cond).contains("Var"),
            _ => false,
        });
        assert!(!cursor_mod);
    }

    #[test]
    fn every_flush_hands_out_a_fresh_slot() {
        let mut builder = IrBuilder::new();
        let mut acc = LayoutAccumulator::new(DEFAULT_CURSOR, 2);

        let mut slots = Vec::new();
        for bits in [3, 16, 0, 9] {
            acc.add(&mut builder, BitWidth::Static(bits));
            let flushed = acc.flush(&mut builder);
            assert_eq!(acc.pending_bound_check(), Some(flushed.bound_check));
            slots.push(flushed.bound_check);
        }

        for (idx, slot) in slots.iter().enumerate() {
            assert_eq!(builder.arena().get(slot.stmt()), Some(&Stmt::Placeholder));
            assert!(!slots[idx + 1..].contains(slot));
        }

        builder
            .arena_mut()
            .fill(
                slots[1],
                Stmt::BoundCheck {
                    cursor: "m".into(),
                    limit: "buf_len".into(),
                },
            )
            .expect("fill earlier slot");
        assert_eq!(builder.arena().get(slots[0].stmt()), Some(&Stmt::Placeholder));
        assert_eq!(builder.arena().get(slots[2].stmt()), Some(&Stmt::Placeholder));
    }

    #[test]
    fn static_total_is_a_plain_literal() {
        let mut builder = IrBuilder::new();
        let mut acc = LayoutAccumulator::new(DEFAULT_CURSOR, 0);
        acc.add(&mut builder, BitWidth::Static(16));
        acc.flush(&mut builder);

        let advance = builder.arena().iter().find_map(|(_, stmt)| match stmt {
            Stmt::AddAssign { value, .. } => Some(value.clone()),
            _ => None,
        });
        assert_eq!(
            advance,
            Some(Expr::binary(Expr::lit(16), BinOp::Div, Expr::lit(8)))
        );
    }
}
