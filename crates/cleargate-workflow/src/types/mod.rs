//! Foundational types for node execution.
//!
//! Result maps use `BTreeMap` so serialized outputs are deterministic.
//! Public enums are `#[non_exhaustive]` where new variants are expected.

pub mod execution;
pub mod file;
pub mod http;
pub mod variable;

pub use execution::*;
pub use file::*;
pub use http::*;
pub use variable::*;
