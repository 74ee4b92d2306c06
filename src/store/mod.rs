//! Model store: latent factors, singular values and cluster tables.
//!
//! A [`ModelStore`] is built in one step, either from artifacts on disk
//! ([`ModelStore::load`]) or from in-memory parts ([`ModelStore::from_parts`]),
//! and is immutable afterwards. Both paths run the same validation, so a
//! store that exists is always dimensionally consistent:
//!
//! - `U` has one row per user record
//! - `Vt` has one column per product record
//! - `U.cols == Vt.rows == len(Σ) == k >= 1`
//! - every factor value is finite
//!
//! # Examples
//!
//! ```
//! use svd_recommender::primitives::{Matrix, Vector};
//! use svd_recommender::store::{ModelParts, ModelStore, ProductRecord, UserRecord};
//!
//! let store = ModelStore::from_parts(ModelParts {
//!     user_factors: Matrix::from_vec(1, 2, vec![1.0, 0.0]).unwrap(),
//!     singular_values: Vector::from_slice(&[2.0, 1.0]),
//!     product_factors_t: Matrix::from_vec(2, 3, vec![1.0, 0.0, 0.0, 0.0, 1.0, 1.0]).unwrap(),
//!     users: vec![UserRecord::new("U1", 0)],
//!     products: vec![
//!         ProductRecord::new("P1", 0),
//!         ProductRecord::new("P2", 1),
//!         ProductRecord::new("P3", 1),
//!     ],
//! })
//! .expect("consistent model");
//!
//! assert_eq!(store.n_products(), 3);
//! assert_eq!(store.latent_dim(), 2);
//! ```

mod safetensors;
mod tables;
mod tensor;

pub use tables::{
    read_table, read_table_from, ClusterLabel, Identifier, Keyed, ProductId, ProductRecord,
    UserId, UserRecord,
};
pub use tensor::RawTensor;

use crate::config::{DuplicatePolicy, Limits, StoreConfig};
use crate::error::{EntityKind, Result, StoreError};
use crate::index::IdIndex;
use crate::primitives::{Matrix, Vector};
use std::collections::BTreeSet;
use std::time::Instant;

/// Unvalidated model components.
#[derive(Debug, Clone)]
pub struct ModelParts {
    /// U: users × k
    pub user_factors: Matrix<f64>,
    /// Diagonal of Σ (length k)
    pub singular_values: Vector<f64>,
    /// Vt: k × products
    pub product_factors_t: Matrix<f64>,
    /// User cluster table in file order
    pub users: Vec<UserRecord>,
    /// Product cluster table in file order
    pub products: Vec<ProductRecord>,
}

/// Immutable, validated recommendation model.
#[derive(Debug, Clone)]
pub struct ModelStore {
    user_factors: Matrix<f64>,
    singular_values: Vector<f64>,
    product_factors_t: Matrix<f64>,
    users: Vec<UserRecord>,
    products: Vec<ProductRecord>,
    user_index: IdIndex<UserId>,
    product_index: IdIndex<ProductId>,
    limits: Limits,
}

impl ModelStore {
    /// Loads every artifact named by `config` and validates them together.
    ///
    /// Either the whole model loads or nothing is returned.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RecommendError::ModelStoreUnavailable`] if any artifact
    /// is missing, unreadable, malformed or inconsistent with the others.
    pub fn load(config: &StoreConfig) -> Result<Self> {
        let start = Instant::now();
        let artifacts = &config.artifacts;

        let load_tensor = |source: &crate::config::TensorSource| {
            let path = config.resolve(&source.path);
            RawTensor::load(&path, source.tensor.as_deref()).map(|t| (t, path))
        };

        let (u, u_path) = load_tensor(&artifacts.user_factors)?;
        let user_factors = u.into_matrix(&u_path)?;

        let (vt, vt_path) = load_tensor(&artifacts.product_factors)?;
        let product_factors_t = vt.into_matrix(&vt_path)?;

        let (sigma, sigma_path) = load_tensor(&artifacts.singular_values)?;
        let singular_values = sigma.into_singular_values(&sigma_path)?;

        let users = read_table(&config.resolve(&artifacts.user_clusters))?;
        let products = read_table(&config.resolve(&artifacts.product_clusters))?;

        let store = Self::from_parts_with(
            ModelParts {
                user_factors,
                singular_values,
                product_factors_t,
                users,
                products,
            },
            config.limits,
            config.duplicate_ids,
        )?;

        tracing::info!(
            users = store.n_users(),
            products = store.n_products(),
            k = store.latent_dim(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "model store loaded"
        );
        Ok(store)
    }

    /// Validates in-memory parts with default limits and the first-wins
    /// duplicate policy.
    ///
    /// # Errors
    ///
    /// See [`ModelStore::from_parts_with`].
    pub fn from_parts(parts: ModelParts) -> Result<Self> {
        Self::from_parts_with(parts, Limits::default(), DuplicatePolicy::default())
    }

    /// Validates in-memory parts.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RecommendError::ModelStoreUnavailable`] on empty
    /// tables, inconsistent dimensions, non-finite values, or duplicate ids
    /// under [`DuplicatePolicy::Reject`].
    pub fn from_parts_with(
        parts: ModelParts,
        limits: Limits,
        policy: DuplicatePolicy,
    ) -> Result<Self> {
        let ModelParts {
            user_factors,
            singular_values,
            product_factors_t,
            users,
            products,
        } = parts;

        if users.is_empty() {
            return Err(StoreError::EmptyTable {
                kind: EntityKind::User,
            }
            .into());
        }
        if products.is_empty() {
            return Err(StoreError::EmptyTable {
                kind: EntityKind::Product,
            }
            .into());
        }

        check_dim("user factor rows (users)", users.len(), user_factors.n_rows())?;
        check_dim(
            "product factor columns (products)",
            products.len(),
            product_factors_t.n_cols(),
        )?;

        let k = user_factors.n_cols();
        if k == 0 {
            return Err(StoreError::DimensionMismatch {
                expected: "k>=1".to_string(),
                actual: "0".to_string(),
            }
            .into());
        }
        check_dim("product factor rows (k)", k, product_factors_t.n_rows())?;
        check_dim("singular values (k)", k, singular_values.len())?;

        check_finite("user factors", &user_factors)?;
        check_finite("product factors", &product_factors_t)?;
        if let Some(col) = singular_values.iter().position(|x| !x.is_finite()) {
            return Err(StoreError::NonFinite {
                artifact: "singular values",
                row: 0,
                col,
            }
            .into());
        }

        let user_index = IdIndex::build(&users, policy)?;
        let product_index = IdIndex::build(&products, policy)?;

        Ok(Self {
            user_factors,
            singular_values,
            product_factors_t,
            users,
            products,
            user_index,
            product_index,
            limits,
        })
    }

    /// U: users × k.
    #[must_use]
    pub fn user_factors(&self) -> &Matrix<f64> {
        &self.user_factors
    }

    /// Diagonal of Σ.
    #[must_use]
    pub fn singular_values(&self) -> &Vector<f64> {
        &self.singular_values
    }

    /// Vt: k × products.
    #[must_use]
    pub fn product_factors_t(&self) -> &Matrix<f64> {
        &self.product_factors_t
    }

    /// User cluster table in file order.
    #[must_use]
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    /// Product cluster table in file order.
    #[must_use]
    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    /// Row of a user id.
    #[must_use]
    pub fn user_position(&self, id: &str) -> Option<usize> {
        self.user_index.get(id)
    }

    /// Column of a product id.
    #[must_use]
    pub fn product_position(&self, id: &str) -> Option<usize> {
        self.product_index.get(id)
    }

    /// Distinct user ids in table order.
    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> + '_ {
        self.users
            .iter()
            .enumerate()
            .filter(|(row, r)| self.user_index.get(r.user_id.as_str()) == Some(*row))
            .map(|(_, r)| &r.user_id)
    }

    /// Distinct product ids in table order.
    pub fn product_ids(&self) -> impl Iterator<Item = &ProductId> + '_ {
        self.products
            .iter()
            .enumerate()
            .filter(|(row, r)| self.product_index.get(r.product_id.as_str()) == Some(*row))
            .map(|(_, r)| &r.product_id)
    }

    /// Number of user rows.
    #[must_use]
    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    /// Number of product rows.
    #[must_use]
    pub fn n_products(&self) -> usize {
        self.products.len()
    }

    /// Latent dimensionality k.
    #[must_use]
    pub fn latent_dim(&self) -> usize {
        self.singular_values.len()
    }

    /// Top-N bounds this store enforces.
    #[must_use]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Counts for display.
    #[must_use]
    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            users: self.n_users(),
            products: self.n_products(),
            latent_dim: self.latent_dim(),
            user_clusters: distinct_clusters(&self.users),
            product_clusters: distinct_clusters(&self.products),
            duplicate_users: self.user_index.duplicates(),
            duplicate_products: self.product_index.duplicates(),
        }
    }
}

fn check_dim(context: &str, expected: usize, actual: usize) -> std::result::Result<(), StoreError> {
    if expected == actual {
        Ok(())
    } else {
        Err(StoreError::dimension_mismatch(context, expected, actual))
    }
}

fn distinct_clusters<R: Keyed>(records: &[R]) -> usize {
    records.iter().map(Keyed::cluster).collect::<BTreeSet<_>>().len()
}

fn check_finite(artifact: &'static str, m: &Matrix<f64>) -> std::result::Result<(), StoreError> {
    match m.first_non_finite() {
        Some((row, col)) => Err(StoreError::NonFinite { artifact, row, col }),
        None => Ok(()),
    }
}

/// Model size overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreSummary {
    /// User rows
    pub users: usize,
    /// Product rows
    pub products: usize,
    /// k
    pub latent_dim: usize,
    /// Distinct user cluster labels
    pub user_clusters: usize,
    /// Distinct product cluster labels
    pub product_clusters: usize,
    /// User rows shadowed by an earlier duplicate
    pub duplicate_users: usize,
    /// Product rows shadowed by an earlier duplicate
    pub duplicate_products: usize,
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
