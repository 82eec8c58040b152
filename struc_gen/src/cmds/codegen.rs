/* Codegen command - emit size functions from layout definitions */

use super::common::load_inputs;
use crate::codegen::c::{CCodeGenerator, CCodeGeneratorOptions};
use crate::codegen::rust::{RustCodeGenerator, RustCodeGeneratorOptions};
use crate::codegen::shared::ir::LayoutIr;
use crate::codegen::{GeneratorOptions, build_layout_ir};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Language {
    C,
    Rust,
}

impl Language {
    pub fn extension(&self) -> &'static str {
        match self {
            Language::C => "h",
            Language::Rust => "rs",
        }
    }
}

/* Render one file's IR in the requested language */
pub fn render(
    ir: &LayoutIr,
    language: Language,
    package: Option<String>,
    stem: &str,
) -> anyhow::Result<String> {
    let code = match language {
        Language::Rust => RustCodeGenerator::new(RustCodeGeneratorOptions {
            package,
            ..RustCodeGeneratorOptions::default()
        })
        .emit_code(ir)?,
        Language::C => CCodeGenerator::new(CCodeGeneratorOptions {
            package,
            header_name: stem.to_string(),
        })
        .emit_code(ir)?,
    };
    Ok(code)
}

/* Execute the codegen command */
pub fn run(
    files: Vec<PathBuf>,
    language: Language,
    output_dir: PathBuf,
    options: GeneratorOptions,
    verbose: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    if verbose {
        println!("struc-gen - Layout Code Generation");
        println!("==================================\n");
        println!("[~] Configuration:");
        println!("  Language: {:?}", language);
        println!("  Output directory: {}", output_dir.display());
        println!("  Cursor: {}", options.cursor);
        println!("  Default pack: {}", options.pack);
        println!("  Bound checks: {}", options.bound_checks);
        println!("  Input files: {}", files.len());
        for file in &files {
            println!("    - {}", file.display());
        }
        println!();
    }

    let set = load_inputs(&files, verbose)?;

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut written = Vec::with_capacity(set.len());
    for (path, file) in set.files() {
        let ir = build_layout_ir(file, &options)
            .with_context(|| format!("while generating layouts for {}", path.display()))?;
        let stem = file_stem(path)?;
        let code = render(&ir, language, file.package.clone(), &stem)?;

        let out_path = output_dir.join(format!("{}.{}", stem, language.extension()));
        std::fs::write(&out_path, code)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        info!(output = %out_path.display(), structs = ir.plans.len(), "wrote generated code");
        if verbose {
            println!("[✓] {} -> {}", path.display(), out_path.display());
        }
        written.push(out_path);
    }

    if verbose {
        println!("\n[✓] Generated {} file(s)", written.len());
    }
    Ok(written)
}

fn file_stem(path: &Path) -> anyhow::Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace(['-', '.'], "_"))
        .with_context(|| format!("{} has no file name", path.display()))
}
