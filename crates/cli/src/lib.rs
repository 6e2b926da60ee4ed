//! # Scantrack CLI
//!
//! Wires the presence scanners, matrix builders, clinical source, and the
//! reconciliation engine into the `scantrack` binary.

pub mod commands;
pub mod config;
