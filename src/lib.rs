#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod entrypoints;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod registration;
pub mod version;

pub use config::ManifestConfig;
pub use entrypoints::{AssetKind, Condition, EntryPoints, EntryRecord, RawEntrypoints};
pub use error::ManifestError;
pub use fs::{FileSystem, LocalFileSystem};
pub use manifest::{JsonStore, Manifest};
pub use registration::{AssetHost, AssetSource, InlinePosition, MemoryHost, Registrar};
pub use version::{ContentRoot, Version, VersionResolver};
