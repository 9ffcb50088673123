use tracing::debug;

use crate::codegen_python::{Generator, GeneratorOptions, Symbol};
use crate::error::CoreError;
use crate::lexer::tokenize;
use crate::parser::parse;

/// Library-level configuration for one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub generator: GeneratorOptions,
}

impl CompileOptions {
    /// Options for a named source file, header included.
    pub fn for_source(name: impl Into<String>) -> Self {
        CompileOptions {
            generator: GeneratorOptions {
                header: true,
                source_name: Some(name.into()),
            },
        }
    }

    pub fn without_header(mut self) -> Self {
        self.generator.header = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationArtifact {
    /// Generated Python source.
    pub python: String,
    /// Variables the program declares, in declaration order.
    pub symbols: Vec<Symbol>,
}

pub fn compile(source: &str) -> Result<CompilationArtifact, CoreError> {
    compile_with(source, &CompileOptions::default())
}

pub fn compile_with(
    source: &str,
    options: &CompileOptions,
) -> Result<CompilationArtifact, CoreError> {
    let program = parse(tokenize(source))?;
    debug!(statements = program.statements.len(), "parsed program");

    let mut generator = Generator::new(options.generator.clone());
    let python = generator.generate(program)?;
    debug!(
        bytes = python.len(),
        symbols = generator.symbols().len(),
        "generated python"
    );

    Ok(CompilationArtifact {
        python,
        symbols: generator.into_symbols(),
    })
}

/// Run the whole pipeline and discard the output.
pub fn check(source: &str) -> Result<(), CoreError> {
    compile_with(source, &CompileOptions::default().without_header()).map(|_| ())
}
