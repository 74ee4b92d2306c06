//! SVD recommender: product and user recommendations from precomputed
//! latent factors.
//!
//! A ratings matrix has been factorized upstream into `U · Σ · Vt`, and users
//! and products have been clustered. This crate loads those artifacts into an
//! immutable [`ModelStore`] and answers two lookups:
//!
//! - **products for a user**: the user's reconstructed preference row
//!   `u · Σ · Vt`, ranked by descending score;
//! - **users for a product**: users sharing the product's cluster, in table
//!   order.
//!
//! # Quick Start
//!
//! ```
//! use svd_recommender::prelude::*;
//!
//! let store = ModelStore::from_parts(ModelParts {
//!     user_factors: Matrix::from_vec(1, 2, vec![1.0, 0.0]).unwrap(),
//!     singular_values: Vector::from_slice(&[2.0, 1.0]),
//!     product_factors_t: Matrix::from_vec(2, 3, vec![
//!         1.0, 0.0, 0.0,
//!         0.0, 1.0, 1.0,
//!     ]).unwrap(),
//!     users: vec![UserRecord::new("U1", 5)],
//!     products: vec![
//!         ProductRecord::new("P1", 5),
//!         ProductRecord::new("P2", 5),
//!         ProductRecord::new("P3", 6),
//!     ],
//! })
//! .unwrap();
//!
//! let recs = store.recommend_products("U1", 2).unwrap();
//! assert_eq!(recs.summary_line(), "User ID: U1 | Cluster: 5");
//! assert_eq!(recs.items[0].product_id.to_string(), "P1");
//!
//! let users = store.recommend_users("P2", 10).unwrap();
//! assert_eq!(users.users[0].user_id.to_string(), "U1");
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`store`]: Artifact loading and the validated [`ModelStore`]
//! - [`index`]: Identifier-to-row index maps
//! - [`recommend`]: Product scoring and cluster lookup
//! - [`report`]: Table and JSON rendering
//! - [`config`]: TOML configuration of artifact paths and limits
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod index;
pub mod prelude;
pub mod primitives;
pub mod recommend;
pub mod report;
pub mod store;

pub use error::{RecommendError, Result};
pub use primitives::{Matrix, Vector};
pub use store::ModelStore;
