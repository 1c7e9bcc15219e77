//! Parser layer
//! - types.rs: Common types (LockedPackage, PackageSource, DirectDependencies)
//! - error.rs: ParseError
//! - poetry_lock.rs: poetry.lock reader
//! - pyproject_toml.rs: pyproject.toml direct dependency reader

pub mod error;
pub mod poetry_lock;
pub mod pyproject_toml;
pub mod types;

pub use error::ParseError;
pub use poetry_lock::{load_lock_file, parse_lock_file};
pub use pyproject_toml::{load_direct_dependencies, parse_direct_dependencies};
pub use types::{DirectDependencies, LockedPackage, PackageSource, SourceKind};
