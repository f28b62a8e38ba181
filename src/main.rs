use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use backpatch::{
    codegen::{self, StraightLine},
    commandline::{BackendOptions, Operation, Options},
    config::RegisterCapacity,
    reader,
};

fn main() -> Result<()> {
    let options = Options::parse();

    stderrlog::new()
        .module(module_path!())
        .verbosity(usize::from(options.verbose) + 1)
        .init()?;

    match options.operation {
        Operation::Emit { file, backend } => {
            let program = load(&file, &backend)?;
            let code = codegen::emit(&program)?;
            print!("{}", code);
        }
        Operation::Liveness { file, backend } => {
            let program = load(&file, &backend)?;
            print!("{}", codegen::liveness_report(&program));
        }
    }

    Ok(())
}

fn load(file: &str, backend: &BackendOptions) -> Result<StraightLine> {
    let source = fs::read_to_string(file).with_context(|| format!("Unable to read {}", file))?;

    let program = reader::read(&source, RegisterCapacity::default())?;
    let program = match backend.capacity()? {
        Some(capacity) => program.with_capacity(capacity),
        None => program,
    };
    info!(
        "{}: {} instructions, {} registers",
        file,
        program.lines().len(),
        program.capacity()
    );

    Ok(program)
}
