//! Product → user cluster lookup.

use super::effective_top_n;
use crate::error::{EntityKind, RecommendError, Result};
use crate::store::{ClusterLabel, Keyed, ModelStore, ProductId, UserRecord};
use serde::Serialize;

/// Users sharing a product's cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecommendations {
    /// Requested product
    #[serde(rename = "productid")]
    pub product_id: ProductId,
    /// The product's cluster
    pub product_cluster: ClusterLabel,
    /// Matching users in table order
    pub users: Vec<UserRecord>,
    /// Matching users before truncation
    pub total_members: usize,
}

impl UserRecommendations {
    /// One-line cluster summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Product ID: {} | Cluster: {}",
            self.product_id, self.product_cluster
        )
    }
}

impl ModelStore {
    /// First `top_n` users whose cluster equals the product's cluster.
    ///
    /// Users keep user-table order. Duplicate user rows are returned as they
    /// appear in the table. An empty list is a valid result.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::UnknownIdentifier`] for an unknown product
    /// and [`RecommendError::InvalidTopN`] for `top_n` outside
    /// `1..=max_top_n`.
    pub fn recommend_users(&self, product_id: &str, top_n: usize) -> Result<UserRecommendations> {
        let column = self
            .product_position(product_id)
            .ok_or_else(|| RecommendError::unknown(EntityKind::Product, product_id))?;
        let product = &self.products()[column];
        let cluster = product.cluster();

        let members: Vec<&UserRecord> = self
            .users()
            .iter()
            .filter(|u| u.cluster() == cluster)
            .collect();
        let n = effective_top_n(self, top_n, members.len())?;
        let total_members = members.len();
        let users: Vec<UserRecord> = members.into_iter().take(n).cloned().collect();

        tracing::debug!(
            product = product_id,
            %cluster,
            total_members,
            returned = users.len(),
            "recommended users"
        );

        Ok(UserRecommendations {
            product_id: product.product_id.clone(),
            product_cluster: cluster,
            users,
            total_members,
        })
    }
}
