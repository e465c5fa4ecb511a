//! Directory attribute mapping documents
//!
//! A mapping names the directory object classes a connector exposes and,
//! for every attribute, the API schema field it is read from.
//!
//! ## Usage
//! ```rust,ignore
//! use dataconnector_generator_parser::mapping::MappingDocument;
//!
//! let mapping = MappingDocument::load("mapping.json")?;
//! for (name, class) in mapping.object_classes() {
//!     println!("{name}: {} attributes", class.attributes.len());
//! }
//! ```

mod loader;
mod types;

pub use loader::MappingDocument;
pub use types::*;
