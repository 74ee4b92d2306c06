//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use svd_recommender::prelude::*;
//! ```

pub use crate::config::{DuplicatePolicy, Limits, StoreConfig};
pub use crate::error::{EntityKind, RecommendError, Result};
pub use crate::primitives::{Matrix, Vector};
pub use crate::recommend::{ProductRecommendations, ScoredProduct, UserRecommendations};
pub use crate::report::OutputFormat;
pub use crate::store::{ModelParts, ModelStore, ProductRecord, UserRecord};
