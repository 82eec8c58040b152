pub mod size;

pub use size::{CEmitError, CSizeEmitter, emit_size_fn};
