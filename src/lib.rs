//! Back end of a small imperative language: three-address code generation
//! with label backpatching, and register allocation for straight-line code.
pub mod ast;
pub mod codegen;
pub mod commandline;
pub mod config;
pub mod error;
pub mod il;
pub mod listing;
pub mod reader;
