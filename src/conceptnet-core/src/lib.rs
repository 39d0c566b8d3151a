//! ConceptNet Core Library
//!
//! This crate turns caller input into ConceptNet API requests, including:
//! - Concept URI and term-list grammar classification
//! - Argument resolution with per-key defaults
//! - Request path construction for the legacy and current APIs
//! - Client connection settings
//!
//! It performs no network I/O; see the `conceptnet-rs` crate for that.

pub mod config;
pub mod error;
pub mod grammar;
pub mod options;
pub mod path;
pub mod resolver;

// Re-export commonly used types
pub use config::{ApiProfile, ClientConfig, ConfigOverrides, FilterPolicy, Scheme};
pub use error::{ArgumentError, ResolveError, ValidationError};
pub use grammar::{is_concept_uri, is_term_list_path, TermList, WeightedTerm};
pub use options::{AssociationOptions, LookupOptions, SearchParams, UriOptions};
pub use path::{build_path, build_target, RequestTarget};
pub use resolver::{Arg, Operation, Resolved, ResolvedRequest};
