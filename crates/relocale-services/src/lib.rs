//! High-level operations over the lower-level crates: artifact rewrites,
//! directory mirroring and the orchestrated `configure` run. Used by the CLI.

pub mod mirror;
pub mod prompt;
pub mod rewrite;
pub mod run;

pub use prompt::{Notice, Prompter};
pub use relocale_core::{Result, RelocaleError};
pub use run::{configure, read_status, Outcome, RunOptions};
