//! Path and URL utilities.
//!
//! - [`fs`]: Filesystem paths (`normalize_path`, `to_posix`, `walk_files`)
//! - [`route`]: URL utilities (`is_external_link`, `split_suffix`, `extension_of`)

pub mod fs;
pub mod route;

pub use fs::{normalize_path, posix_relative, to_posix, walk_files};
pub use route::{extension_of, is_external_link, split_suffix, strip_base, trim_leading};
