//! Shared helpers: HTML lexing/escaping, raw JSON literals, path and URL handling.

pub mod html;
pub mod json;
pub mod path;
