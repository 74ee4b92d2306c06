//! User → product scoring.

use super::effective_top_n;
use crate::error::{EntityKind, RecommendError, Result};
use crate::primitives::Vector;
use crate::store::{ClusterLabel, ModelStore, ProductId, UserId};
use serde::Serialize;
use std::cmp::Ordering;

/// One ranked product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProduct {
    /// Product identifier
    #[serde(rename = "productid")]
    pub product_id: ProductId,
    /// Product cluster
    #[serde(rename = "product_cluster")]
    pub cluster: ClusterLabel,
    /// Reconstructed preference, for ranking only
    #[serde(skip)]
    pub score: f64,
    /// Column in the product factors
    #[serde(skip)]
    pub position: usize,
}

/// Ranked products for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecommendations {
    /// Requesting user
    #[serde(rename = "userid")]
    pub user_id: UserId,
    /// The user's own cluster, from the user table
    pub user_cluster: ClusterLabel,
    /// Products in descending score order
    pub items: Vec<ScoredProduct>,
}

impl ProductRecommendations {
    /// One-line cluster summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!("User ID: {} | Cluster: {}", self.user_id, self.user_cluster)
    }
}

/// Orders positions by descending score; ties keep ascending position.
///
/// Returns the first `n` positions.
///
/// ```
/// use svd_recommender::recommend::rank_descending;
///
/// assert_eq!(rank_descending(&[2.0, 0.0, 0.0, 5.0], 3), vec![3, 0, 1]);
/// ```
#[must_use]
pub fn rank_descending(scores: &[f64], n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order.truncate(n);
    order
}

impl ModelStore {
    /// Reconstructed preference scores of user row `row` over every product.
    ///
    /// # Panics
    ///
    /// Panics if `row >= n_users()`.
    #[must_use]
    pub fn score_row(&self, row: usize) -> Vector<f64> {
        let vt = self.product_factors_t();
        let mut scores = vec![0.0; vt.n_cols()];
        // scores = Σ_j (u_j · σ_j) · Vt[j, :]
        for (j, (&u, &sigma)) in self
            .user_factors()
            .row_slice(row)
            .iter()
            .zip(self.singular_values().iter())
            .enumerate()
        {
            let weight = u * sigma;
            for (s, &v) in scores.iter_mut().zip(vt.row_slice(j)) {
                *s += weight * v;
            }
        }
        Vector::from_vec(scores)
    }

    /// Reconstructed preference scores of `user_id` over every product.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::UnknownIdentifier`] for an unknown user.
    pub fn scores_for_user(&self, user_id: &str) -> Result<Vector<f64>> {
        let row = self
            .user_position(user_id)
            .ok_or_else(|| RecommendError::unknown(EntityKind::User, user_id))?;
        Ok(self.score_row(row))
    }

    /// Top-N products for a user, ranked by `u · Σ · Vt`.
    ///
    /// `top_n` above the product count returns every product.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::UnknownIdentifier`] for an unknown user and
    /// [`RecommendError::InvalidTopN`] for `top_n` outside `1..=max_top_n`.
    pub fn recommend_products(&self, user_id: &str, top_n: usize) -> Result<ProductRecommendations> {
        let row = self
            .user_position(user_id)
            .ok_or_else(|| RecommendError::unknown(EntityKind::User, user_id))?;
        let n = effective_top_n(self, top_n, self.n_products())?;

        let scores = self.score_row(row);
        let products = self.products();
        let items: Vec<ScoredProduct> = rank_descending(scores.as_slice(), n)
            .into_iter()
            .map(|position| ScoredProduct {
                product_id: products[position].product_id.clone(),
                cluster: products[position].cluster,
                score: scores[position],
                position,
            })
            .collect();

        let user = &self.users()[row];
        tracing::debug!(user = user_id, top_n, returned = items.len(), "recommended products");

        Ok(ProductRecommendations {
            user_id: user.user_id.clone(),
            user_cluster: user.cluster,
            items,
        })
    }
}
