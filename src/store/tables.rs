//! Cluster tables: typed `{identifier, cluster}` records read from CSV.

use crate::error::{EntityKind, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// A raw identifier from one of the cluster tables.
pub trait Identifier: Clone + Eq + std::hash::Hash + Borrow<str> + fmt::Display {
    /// Table this identifier belongs to.
    const KIND: EntityKind;

    /// The identifier text.
    fn as_str(&self) -> &str;
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an identifier string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl Identifier for $name {
            const KIND: EntityKind = $kind;

            fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

identifier!(
    /// User identifier (`userid` column).
    UserId,
    EntityKind::User
);

identifier!(
    /// Product identifier (`productid` column).
    ProductId,
    EntityKind::Product
);

/// Cluster label assigned upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterLabel(pub i64);

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the user cluster table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User identifier
    #[serde(rename = "userid")]
    pub user_id: UserId,
    /// User cluster
    pub cluster: ClusterLabel,
}

impl UserRecord {
    /// Convenience constructor.
    pub fn new(user_id: impl Into<String>, cluster: i64) -> Self {
        Self {
            user_id: UserId::new(user_id),
            cluster: ClusterLabel(cluster),
        }
    }
}

/// One row of the product cluster table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product identifier
    #[serde(rename = "productid")]
    pub product_id: ProductId,
    /// Product cluster
    #[serde(rename = "product_cluster")]
    pub cluster: ClusterLabel,
}

impl ProductRecord {
    /// Convenience constructor.
    pub fn new(product_id: impl Into<String>, cluster: i64) -> Self {
        Self {
            product_id: ProductId::new(product_id),
            cluster: ClusterLabel(cluster),
        }
    }
}

/// A record keyed by an identifier.
pub trait Keyed {
    /// Identifier type of the key column.
    type Id: Identifier;

    /// The record's identifier.
    fn id(&self) -> &Self::Id;

    /// The record's cluster.
    fn cluster(&self) -> ClusterLabel;
}

impl Keyed for UserRecord {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.user_id
    }

    fn cluster(&self) -> ClusterLabel {
        self.cluster
    }
}

impl Keyed for ProductRecord {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.product_id
    }

    fn cluster(&self) -> ClusterLabel {
        self.cluster
    }
}

/// Reads a cluster table from a CSV file.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be opened,
/// [`StoreError::Csv`] on malformed rows or missing columns and
/// [`StoreError::EmptyTable`] if there are no data rows.
pub fn read_table<T>(path: &Path) -> Result<Vec<T>, StoreError>
where
    T: Keyed + DeserializeOwned,
{
    let file = std::fs::File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_table_from(file, path)?;
    tracing::debug!(path = %path.display(), rows = records.len(), "read cluster table");
    Ok(records)
}

/// Reads a cluster table from any reader; `path` is only used in errors.
///
/// # Errors
///
/// See [`read_table`].
pub fn read_table_from<T, R>(reader: R, path: &Path) -> Result<Vec<T>, StoreError>
where
    T: Keyed + DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = reader
        .deserialize::<T>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    if records.is_empty() {
        return Err(StoreError::EmptyTable {
            kind: <T::Id as Identifier>::KIND,
        });
    }
    Ok(records)
}
