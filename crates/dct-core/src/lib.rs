//! Dictionary tools: small, predictable transformations over mappings.
//!
//! A mapping is a `serde_json::Map<String, Value>` with insertion order
//! preserved. Every operation takes its inputs by reference and returns a
//! new mapping.
//!
//! # Key Types
//!
//! - [`Mapping`] -- Ordered string-keyed map of JSON values
//! - [`NormalizeConfig`] -- Separator and null handling for flattening
//! - [`DctError`] -- Invalid input, key collisions, and configuration errors
//!
//! # Operations
//!
//! - [`normalize`] / [`normalize_records`] / [`flatten`] / [`unflatten`] -- Flattening nested mappings
//! - [`depth`] -- Nesting depth of a mapping
//! - [`filter_keys`] / [`replace_keys`] / [`swap_keys`] -- Key manipulation
//! - [`flat_aggregate`] / [`nested_aggregate`] / [`mixed_aggregate`] -- Merging with precedence

pub mod aggregate;
pub mod config;
pub mod error;
pub mod keys;
pub mod mapping;
pub mod normalize;

pub use aggregate::{flat_aggregate, mixed_aggregate, nested_aggregate};
pub use config::NormalizeConfig;
pub use error::{DctError, DctResult};
pub use keys::{filter_keys, replace_keys, swap_keys};
pub use mapping::{as_mapping, depth, value_kind, Mapping};
pub use normalize::{flatten, normalize, normalize_records, unflatten};
