//! Recommendation lookups over a loaded [`ModelStore`].
//!
//! # Lookups
//!
//! - **User → products**: reconstruct the user's preference row from the
//!   low-rank factors (`u · Σ · Vt`) and rank it.
//! - **Product → users**: list users whose cluster matches the product's
//!   cluster, in table order.
//!
//! Both are pure functions of the immutable store.
//!
//! # Quick Start
//!
//! ```
//! use svd_recommender::primitives::{Matrix, Vector};
//! use svd_recommender::store::{ModelParts, ModelStore, ProductRecord, UserRecord};
//!
//! let store = ModelStore::from_parts(ModelParts {
//!     user_factors: Matrix::from_vec(1, 2, vec![1.0, 0.0]).unwrap(),
//!     singular_values: Vector::from_slice(&[2.0, 1.0]),
//!     product_factors_t: Matrix::from_vec(2, 3, vec![1.0, 0.0, 0.0, 0.0, 1.0, 1.0]).unwrap(),
//!     users: vec![UserRecord::new("U1", 3)],
//!     products: vec![
//!         ProductRecord::new("P1", 3),
//!         ProductRecord::new("P2", 1),
//!         ProductRecord::new("P3", 3),
//!     ],
//! })
//! .unwrap();
//!
//! let recs = store.recommend_products("U1", 2).expect("known user");
//! let ids: Vec<_> = recs.items.iter().map(|p| p.product_id.to_string()).collect();
//! assert_eq!(ids, ["P1", "P2"]);
//!
//! let users = store.recommend_users("P3", 10).expect("known product");
//! assert_eq!(users.users.len(), 1);
//! ```
//!
//! [`ModelStore`]: crate::store::ModelStore

mod products;
mod users;

pub use products::{rank_descending, ProductRecommendations, ScoredProduct};
pub use users::UserRecommendations;

use crate::error::{RecommendError, Result};
use crate::store::ModelStore;

/// Checks `top_n` against the store's limits and clamps it to `available`.
pub(crate) fn effective_top_n(store: &ModelStore, top_n: usize, available: usize) -> Result<usize> {
    let max = store.limits().max_top_n;
    if top_n == 0 || top_n > max {
        return Err(RecommendError::InvalidTopN { value: top_n, max });
    }
    Ok(top_n.min(available))
}
