use clap::{Args, Parser, Subcommand};

use crate::{config::RegisterCapacity, error::BackendError};

#[derive(Debug, Parser)]
#[command(about = "Register allocation for straight-line three-address programs")]
pub struct Options {
    #[command(subcommand)]
    pub operation: Operation,
    /// Increase log output; may be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Operation {
    /// Allocate registers and print the target code
    Emit {
        file: String,
        #[command(flatten)]
        backend: BackendOptions,
    },
    /// Print the liveness and next-use sets of every instruction
    Liveness {
        file: String,
        #[command(flatten)]
        backend: BackendOptions,
    },
}

#[derive(Debug, Args)]
pub struct BackendOptions {
    #[arg(short, long)]
    /// Register count, overriding any NumberRegister directive
    registers: Option<usize>,
}

impl BackendOptions {
    pub fn capacity(&self) -> Result<Option<RegisterCapacity>, BackendError> {
        self.registers.map(RegisterCapacity::new).transpose()
    }
}
