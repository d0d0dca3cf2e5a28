//! Storage abstraction for the graft page engine.
//!
//! This crate provides a [`Storage`] trait for abstracting page-corpus access
//! from the underlying backend. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Backend flexibility** (filesystem today, anything path-shaped later)
//! - **Clean separation** between tree/render logic and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `read()`, `exists()`, `mtime()`, `list()` and a
//!   locale-aware `localize()` resolution helper
//! - [`FsStorage`] implementation for filesystem backends
//! - [`MockStorage`] for testing (behind the `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use graft_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("pages"));
//! let html = storage.read("products/index.html")?;
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{DirEntry, Storage, StorageError, StorageErrorKind};
