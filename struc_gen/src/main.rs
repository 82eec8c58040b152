use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use struc_gen::cmds;
use struc_gen::cmds::analyze::IrOutputFormat;
use struc_gen::codegen::GeneratorOptions;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "struc-gen")]
#[command(about = "Byte-cursor code generator for packed bit layouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate size functions from layout definitions */
    Codegen {
        /* Input YAML files containing struct layouts */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Target language for code generation */
        #[arg(short = 'l', long = "language", value_enum)]
        language: Language,

        /* Output directory for generated code */
        #[arg(
            short = 'o',
            long = "output",
            value_name = "DIR",
            default_value = "generated"
        )]
        output_dir: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Report the computed layout of every struct */
    Analyze {
        /* Input YAML files containing struct layouts */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        /* Print the layout IR after analysis */
        #[arg(long = "print-ir")]
        print_ir: bool,

        /* Format to use when printing the layout IR */
        #[arg(long = "ir-format", value_enum, default_value = "json")]
        ir_format: IrOutputFormat,

        /* Runtime parameter values used to evaluate sizes */
        #[arg(long = "eval", value_name = "NAME=VALUE")]
        eval: Vec<String>,

        /* Buffer length checked by the generated bound check */
        #[arg(long = "buf-len", value_name = "N")]
        buf_len: Option<u64>,
    },
}

#[derive(clap::Args)]
struct LayoutArgs {
    /* Default pack for structs that set none (0 = byte packing) */
    #[arg(long = "pack", value_name = "N", default_value_t = 0)]
    pack: u64,

    /* Name of the byte cursor in generated code */
    #[arg(long = "cursor", value_name = "NAME", default_value = "m")]
    cursor: String,

    /* Leave the trailing placeholder empty */
    #[arg(long = "no-bound-checks")]
    no_bound_checks: bool,
}

impl From<LayoutArgs> for GeneratorOptions {
    fn from(args: LayoutArgs) -> Self {
        GeneratorOptions {
            cursor: args.cursor,
            pack: args.pack,
            bound_checks: !args.no_bound_checks,
            ..GeneratorOptions::default()
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum Language {
    /* Generate a C header (.h) */
    C,
    /* Generate a Rust module (.rs) */
    Rust,
}

impl From<Language> for cmds::codegen::Language {
    fn from(lang: Language) -> Self {
        match lang {
            Language::C => cmds::codegen::Language::C,
            Language::Rust => cmds::codegen::Language::Rust,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Codegen {
            files,
            language,
            output_dir,
            layout,
            verbose,
        } => {
            cmds::codegen::run(files, language.into(), output_dir, layout.into(), verbose)?;
        }

        Commands::Analyze {
            files,
            layout,
            print_ir,
            ir_format,
            eval,
            buf_len,
        } => {
            cmds::analyze::run(files, layout.into(), print_ir, ir_format, eval, buf_len)?;
        }
    }

    Ok(())
}
