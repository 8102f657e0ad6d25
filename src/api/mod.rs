//! Public API surfaces beyond plain Rust: wasm bindings for browser use.

pub mod wasm;

pub use wasm::BufferRenderer;
