pub mod file;

pub use file::{LayoutSet, LoadError, load_layout_file};
