//! Typed builders for the statements the driver issues itself. Values are
//! always sent as bound parameters, never spliced into the CQL text.

pub mod ast;
pub mod builder;
pub mod renderer;

pub use renderer::{Render, Renderer};
