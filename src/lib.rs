//! Compiler for Midi-chlorian, a small statically typed teaching language,
//! targeting JavaScript.
//!
//! Source text goes through the frontend (lexing and parsing into an AST), the
//! middle (semantic analysis into HIR, then optimization) and finally the
//! backend, which prints JavaScript. [`compile`] runs the pipeline up to the
//! stage selected by an [`OutputKind`].

use backend::targets::{CodeGenerator, Target};
use frontend::{SourceFile, error::SyntaxError, parser::Parser};
use middle::{
    analyzer::Analyzer, error::SemanticError, hir::pretty_print::pretty_print_program,
    optimization::optimize_program,
};

pub mod backend;
pub mod frontend;
pub mod index;
pub mod middle;

/// The compiler stage whose result is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputKind {
    /// The syntax tree as parsed
    #[value(alias = "ast")]
    Tree,
    /// The decorated tree after semantic analysis
    Analyzed,
    /// The decorated tree after optimization
    Optimized,
    /// JavaScript generated from the optimized tree
    #[value(alias = "generated")]
    Js,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

pub fn compile(source_file: &SourceFile, output: OutputKind) -> Result<String, CompileError> {
    log::info!("compiling {}", source_file.origin);

    let ast = Parser::parse_program(source_file)?;

    if output == OutputKind::Tree {
        return Ok(format!("{ast:#?}\n"));
    }

    let program = Analyzer::analyze_program(&ast)?;

    if output == OutputKind::Analyzed {
        return Ok(pretty_print_program(&program));
    }

    let program = optimize_program(program);

    Ok(match output {
        OutputKind::Js => Target::JavaScript
            .get_code_generator()
            .translate(&program),
        _ => pretty_print_program(&program),
    })
}
