//! OpenAPI 3 and Swagger 2 documents
//!
//! Loads an API description (JSON or YAML), validates its top-level shape and
//! exposes accessor views over servers, security schemes, paths and schemas.
//!
//! ## Usage
//! ```rust,ignore
//! use dataconnector_generator_parser::openapi::ApiDocument;
//!
//! let api = ApiDocument::load("users-api.json")?;
//! for (path, item) in api.paths() {
//!     println!("{path}");
//! }
//! ```

mod loader;
mod types;

pub use loader::ApiDocument;
pub(crate) use loader::local_name;
pub use types::*;
