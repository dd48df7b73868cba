//! # PyExec
//!
//! A Python snippet execution sandbox built with Rust.
//!
//! ## Features
//!
//! - **Static Guard:** AST-level rejection of snippets that would block on
//!   interactive input (`input()`, `getpass`, GUI toolkits, ...)
//! - **Isolated Evaluation:** each engine owns a dedicated Python worker
//!   process with a persistent namespace and per-call output capture
//! - **Watchdog:** wall-clock deadline per evaluation; the worker is killed
//!   outright when the deadline elapses
//! - **Transcripts:** every outcome renders to readable text, never an
//!   unhandled failure

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod guard;
pub mod sandbox;
pub mod storage;

pub use config::Config;
pub use engine::{Outcome, PythonEngine};
pub use error::{Error, Result};
pub use guard::{StaticGuard, Violation};
pub use sandbox::Sandbox;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
