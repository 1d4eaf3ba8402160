//! Shared infrastructure utilities for repomerge.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)

pub mod atomic_write;

pub use atomic_write::atomic_write;
