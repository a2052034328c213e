//! Asset discovery and hashed-path mapping.
//!
//! - [`scan`]: references from source documents (HTML, JSON, manifest)
//! - [`mapping`]: pre-hash → hashed paths from the bundler output
//! - [`reconcile`]: copies referenced assets the bundler never emitted

pub mod hash;
mod kind;
mod mapping;
mod reconcile;
mod route;
mod scan;

// Types
pub use hash::HashPattern;
pub use kind::AssetKind;
pub use mapping::AssetMapping;
pub use route::AssetReference;

// Scanning (pure functions)
pub use scan::Scanner;

// Mapping and reconciliation
pub use mapping::build_output_mapping;
pub use reconcile::reconcile;
