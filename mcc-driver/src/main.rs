//! MiniC Compiler Driver
//!
//! Reads a JSON-serialized AST, generates the linear IR and lowers it to
//! ARM32 assembly.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use log::info;
use mcc_backend::{lower_module_to_assembly, SelectOptions};
use mcc_frontend::Frontend;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Linear IR dump
    Ir,
    /// ARM32 assembly
    Asm,
    /// IR dump followed by assembly
    Both,
}

#[derive(Parser, Debug)]
#[command(name = "mcc")]
#[command(about = "MiniC Compiler")]
#[command(version = "0.1.0")]
struct Cli {
    /// Input AST in JSON form
    input: PathBuf,

    /// What to produce
    #[arg(long, value_enum, default_value = "asm")]
    emit: Emit,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Interleave the IR as assembly comments
    #[arg(long)]
    ir_comments: bool,

    /// Warn instead of failing on misplaced ARG markers
    #[arg(long)]
    lenient_arg_markers: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let json = fs::read_to_string(&cli.input)?;
    let options = SelectOptions {
        strict_arg_markers: !cli.lenient_arg_markers,
        show_ir_comments: cli.ir_comments,
        ..SelectOptions::default()
    };
    let text = compile(&json, &module_name(&cli.input), cli.emit, &options)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, text)?;
            info!("Output written to {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn module_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "module".to_string())
}

/// Run the pipeline on one AST; diagnostics go to stderr
fn compile(json: &str, module_name: &str, emit: Emit, options: &SelectOptions) -> Result<String> {
    let ast = Frontend::load_ast(json)?;
    let (mut module, result, diagnostics) = Frontend::generate_ir_with_diagnostics(&ast, module_name);
    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic);
    }
    if let Err(e) = result {
        bail!("{}", e);
    }
    info!("Generated IR for {} function(s)", module.defined_functions().count());

    let mut text = String::new();
    if matches!(emit, Emit::Ir | Emit::Both) {
        text.push_str(&module.to_string());
    }
    if matches!(emit, Emit::Asm | Emit::Both) {
        text.push_str(&lower_module_to_assembly(&mut module, options)?);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_frontend::{AstBuilder, BasicType, NodeKind};

    fn sample_json() -> String {
        // int g = 2; int main() { return g * 21; }
        let mut b = AstBuilder::new();
        let two = b.int(2);
        let g = b.var_decl("g", Some(two));
        let gv = b.var("g");
        let k = b.int(21);
        let mul = b.binary(NodeKind::Mul, gv, k);
        let ret = b.return_stmt(Some(mul));
        let body = b.block(vec![ret]);
        let main = b.func_def(BasicType::Int, "main", vec![], body);
        b.compile_unit(vec![g, main]);
        serde_json::to_string(&b.finish()).unwrap()
    }

    #[test]
    fn test_emit_ir_only() {
        let text = compile(&sample_json(), "sample", Emit::Ir, &SelectOptions::default()).unwrap();
        assert!(text.contains("define i32 @main()"));
        assert!(text.contains("declare i32 @g = 2"));
        assert!(!text.contains(".arch"));
    }

    #[test]
    fn test_emit_both() {
        let text = compile(&sample_json(), "sample", Emit::Both, &SelectOptions::default()).unwrap();
        let ir_at = text.find("define i32 @main()").unwrap();
        let asm_at = text.find("\t.arch armv7ve").unwrap();
        assert!(ir_at < asm_at);
        assert!(text.contains("\tmul "));
    }

    #[test]
    fn test_semantic_errors_fail_compilation() {
        // int main() { return missing; }
        let mut b = AstBuilder::new();
        let v = b.var("missing");
        let ret = b.return_stmt(Some(v));
        let body = b.block(vec![ret]);
        let main = b.func_def(BasicType::Int, "main", vec![], body);
        b.compile_unit(vec![main]);
        let json = serde_json::to_string(&b.finish()).unwrap();

        let err = compile(&json, "bad", Emit::Asm, &SelectOptions::default()).unwrap_err();
        assert!(err.to_string().contains("failed"), "{}", err);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(compile("{ not json", "bad", Emit::Asm, &SelectOptions::default()).is_err());
    }

    #[test]
    fn test_module_name_from_path() {
        assert_eq!(module_name(Path::new("dir/prog.json")), "prog");
    }
}
