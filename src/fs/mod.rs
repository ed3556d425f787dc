//! Filesystem utilities for agentforge.

pub mod atomic;

pub use atomic::atomic_write_file;
