/* Common utilities shared between analyze and codegen commands */

use crate::layout::LayoutSet;
use anyhow::Context;
use std::path::PathBuf;

/* Load every input file, failing on the first bad one */
pub fn load_inputs(files: &[PathBuf], verbose: bool) -> anyhow::Result<LayoutSet> {
    if verbose {
        println!("[~] Loading layout files...");
    }
    let mut set = LayoutSet::new();
    for path in files {
        let file = set
            .load(path)
            .with_context(|| format!("while loading {}", path.display()))?;
        if verbose {
            println!(
                "    - {} ({} struct(s), package {})",
                path.display(),
                file.structs.len(),
                file.package.as_deref().unwrap_or("<none>")
            );
        }
    }
    if verbose {
        println!("[~] Loaded {} struct(s) from {} file(s)\n", set.struct_count(), set.len());
    }
    Ok(set)
}
