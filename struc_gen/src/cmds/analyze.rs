/* Analyze command - per-struct layout report, IR dump and size evaluation */

use super::common::load_inputs;
use crate::codegen::ir_runtime::{Env, eval_plan};
use crate::codegen::shared::ir::{LayoutIr, LayoutPlan};
use crate::codegen::shared::serialization::{
    layout_ir_to_json, layout_ir_to_protobuf, layout_ir_to_yaml,
};
use crate::codegen::{GeneratorOptions, build_layout_ir};
use anyhow::{Context, anyhow};
use clap::ValueEnum;
use std::path::PathBuf;
use tracing::warn;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum IrOutputFormat {
    Json,
    Yaml,
    Protobuf,
}

/* Execute the analyze command */
pub fn run(
    files: Vec<PathBuf>,
    options: GeneratorOptions,
    print_ir: bool,
    ir_format: IrOutputFormat,
    eval: Vec<String>,
    buf_len: Option<u64>,
) -> anyhow::Result<()> {
    println!("struc-gen - Layout Analysis Tool");
    println!("================================\n");

    let set = load_inputs(&files, true)?;

    let mut params = Env::new();
    for assignment in &eval {
        let (name, value) = parse_assignment(assignment)?;
        params.insert(name, value);
    }
    /* without --buf-len every bound check passes */
    params.insert(options.buf_len_param.clone(), buf_len.unwrap_or(u64::MAX));

    for (path, file) in set.files() {
        let ir = build_layout_ir(file, &options)
            .with_context(|| format!("while analyzing {}", path.display()))?;

        println!("[~] {}", path.display());
        for plan in &ir.plans {
            print_plan_summary(plan);
            if !eval.is_empty() || buf_len.is_some() || plan.parameters.is_empty() {
                print_evaluation(plan, &params)?;
            }
        }
        println!();

        if print_ir {
            print_layout_ir(&ir, ir_format)?;
        }
    }

    Ok(())
}

/* NAME=VALUE */
pub fn parse_assignment(raw: &str) -> anyhow::Result<(String, u64)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("missing variable name in '{}'", raw));
    }
    let value = value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("invalid value for '{}'", name))?;
    Ok((name.to_string(), value))
}

fn print_plan_summary(plan: &LayoutPlan) {
    println!("  {}:", plan.type_name);
    println!("    pack: {}", plan.pack);
    println!("    statements: {}", plan.arena.len());
    match plan.static_size {
        Some(size) => println!("    static size: {} byte(s)", size),
        None => {
            let names: Vec<&str> = plan.parameters.iter().map(|p| p.name.as_str()).collect();
            println!("    runtime parameters: {}", names.join(", "));
        }
    }
    if let Some(limit) = plan.bound_limit() {
        println!("    bound check against: {}", limit);
    }
}

fn print_evaluation(plan: &LayoutPlan, params: &Env) -> anyhow::Result<()> {
    let missing: Vec<&str> = plan
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .filter(|name| !params.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        warn!(type_name = %plan.type_name, ?missing, "skipping evaluation");
        println!("    size: skipped (missing {})", missing.join(", "));
        return Ok(());
    }

    match eval_plan(plan, 0, params)
        .with_context(|| format!("failed to evaluate {}", plan.type_name))?
    {
        Some(size) => println!("    size: {} byte(s)", size),
        None => println!("    size: does not fit in the buffer"),
    }
    Ok(())
}

fn print_layout_ir(ir: &LayoutIr, format: IrOutputFormat) -> anyhow::Result<()> {
    match format {
        IrOutputFormat::Json => {
            println!("[~] Layout IR (JSON)");
            println!("====================");
            println!("{}", layout_ir_to_json(ir)?);
        }
        IrOutputFormat::Yaml => {
            println!("[~] Layout IR (YAML)");
            println!("====================");
            println!("{}", layout_ir_to_yaml(ir)?);
        }
        IrOutputFormat::Protobuf => {
            println!("[~] Layout IR (Protobuf)");
            println!("========================");
            println!("(hex-encoded bytes, IR schema v{})", ir.version);
            let bytes = layout_ir_to_protobuf(ir)?;
            println!("{}", hex_encode(&bytes));
        }
    }
    println!();
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
