//! Version layer: where a package comes from, what its index publishes, and
//! which published version is the latest
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Origin    │────▶│  Registry   │────▶│ Comparator  │
//! │  (resolve)  │     │   (fetch)   │     │  (select)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │ Registries  │
//!                     │(simple,json)│
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`origin`]: Maps a locked package to an index endpoint and response shape
//! - [`registry`]: `IndexClient` trait for fetching published versions
//! - [`registries`]: HTTP client and response parsers (simple API, JSON APIs)
//! - [`comparator`]: Latest-version selection with pre-release policy
//! - [`semver`]: Semver parsing helpers
//! - [`error`]: Client and comparator errors, and the closed `ErrorKind`

pub mod comparator;
pub mod error;
pub mod origin;
pub mod registries;
pub mod registry;
pub mod semver;
