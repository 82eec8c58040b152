pub mod size;

/* Re-export main public functions */
pub use size::{RustEmitError, RustSizeEmitter, emit_size_fn};
