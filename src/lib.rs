//! configlink - machine-specific configuration, linked into place
//!
//! Keeps secrets and local overrides outside version control while the build
//! still finds them at fixed paths. A declaration file lists
//! `source -> target` pairs; every target becomes a symbolic link into an
//! external config directory and is recorded in an auto-generated block of
//! `.gitignore`.

pub mod error;
pub mod gitignore;
pub mod linker;
pub mod locator;
pub mod mapping;
pub mod properties;
pub mod sync;

pub use error::{Result, SyncError};
pub use mapping::Mapping;
pub use sync::{SyncOptions, SyncReport, Synchronizer};
