//! Identifier-to-row index over a cluster table.
//!
//! Built once right after the table is read and never mutated. The row
//! position doubles as the row of `U` (users) or the column of `Vt`
//! (products).

use crate::config::DuplicatePolicy;
use crate::error::StoreError;
use crate::store::{Identifier, Keyed};
use std::collections::HashMap;

/// Maps raw identifiers to zero-based table rows.
#[derive(Debug, Clone)]
pub struct IdIndex<K: Identifier> {
    positions: HashMap<K, usize>,
    duplicates: usize,
}

impl<K: Identifier> IdIndex<K> {
    /// Indexes `records` in table order.
    ///
    /// Under [`DuplicatePolicy::FirstWins`] a repeated identifier keeps the
    /// row of its first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateIdentifier`] for a repeated identifier
    /// under [`DuplicatePolicy::Reject`].
    pub fn build<R>(records: &[R], policy: DuplicatePolicy) -> Result<Self, StoreError>
    where
        R: Keyed<Id = K>,
    {
        let mut positions = HashMap::with_capacity(records.len());
        let mut duplicates = 0;

        for (row, record) in records.iter().enumerate() {
            let id = record.id();
            if let Some(&first) = positions.get(id.as_str()) {
                match policy {
                    DuplicatePolicy::Reject => {
                        return Err(StoreError::DuplicateIdentifier {
                            kind: K::KIND,
                            id: id.to_string(),
                            first,
                            second: row,
                        });
                    }
                    DuplicatePolicy::FirstWins => {
                        tracing::warn!(
                            kind = %K::KIND,
                            id = %id,
                            first,
                            skipped = row,
                            "duplicate identifier, keeping first row"
                        );
                        duplicates += 1;
                    }
                }
                continue;
            }
            positions.insert(id.clone(), row);
        }

        Ok(Self {
            positions,
            duplicates,
        })
    }

    /// Row of `id`, if known.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Rows skipped because their identifier was already indexed.
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
