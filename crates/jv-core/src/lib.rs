//! jv-core: Sweep orchestration for jointval.
//!
//! This crate contains the stepped sampler, table output, diagnostic sinks,
//! rig layout resolution and configuration. Exposed as a library for
//! integration testing.

pub mod config;
pub mod format;
pub mod layout;
pub mod prompt;
pub mod sampler;
pub mod sink;
pub mod style;
pub mod table;
