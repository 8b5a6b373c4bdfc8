//! Fetch raw feature collections from the upstream layers.
//!
//! The [`FeatureSource`] trait abstracts retrieval of the point and polyline
//! collections surrounding a [`FeatureQuery`](crate::FeatureQuery). The core
//! never performs I/O itself; adapter crates implement the trait over HTTP or
//! local files.

mod error;
mod provider;

pub use error::FeatureSourceError;
pub use provider::FeatureSource;
