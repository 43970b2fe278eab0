//! The crate's error handling is `anyhow`-based throughout, the way the
//! teacher's `Instance::load` propagates I/O and format errors with `?` and
//! `anyhow::Context` rather than a dedicated `enum` per failure mode. There
//! is no bespoke error type here: every fallible boundary (file I/O, CLI
//! validation) returns `anyhow::Result` and attaches context at the call
//! site.

pub use anyhow::{Context, Result};
