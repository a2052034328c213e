//! Configuration section definitions.
//!
//! Each module corresponds to a section in `rehash.toml`:
//!
//! | Module   | TOML Section | Purpose                                   |
//! |----------|--------------|-------------------------------------------|
//! | `assets` | `[assets]`   | Source/output trees and the site base URL |
//! | `hash`   | `[hash]`     | Hash suffix recognition                   |
//! | `hook`   | `[hook]`     | Build-phase detection                     |

mod assets;
mod hash;
mod hook;

pub use assets::AssetConfig;
pub use hash::HashConfig;
pub use hook::HookConfig;
