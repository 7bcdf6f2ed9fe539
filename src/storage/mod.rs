//! Storage layer for generated pages.

pub mod atomic;

pub use atomic::write_atomic;
