//! Numeric artifact loading.
//!
//! Each artifact is a single dense tensor. The container format follows the
//! file extension: `.safetensors` or `.json`.

use super::safetensors;
use crate::error::StoreError;
use crate::primitives::{Matrix, Vector};
use serde::Deserialize;
use std::path::Path;

/// A decoded tensor before it is given a role.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTensor {
    /// Name inside the container, if it has one
    pub name: Option<String>,
    /// Source dtype (`F64`, `F32`, or `json`)
    pub dtype: String,
    /// Shape, outermost dimension first
    pub shape: Vec<usize>,
    /// Row-major values
    pub data: Vec<f64>,
}

/// Accepted JSON layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTensor {
    /// `{"rows": R, "cols": C, "data": [...]}`
    Dense {
        rows: usize,
        cols: usize,
        data: Vec<f64>,
    },
    /// `[1.0, 2.0, ...]`
    Flat(Vec<f64>),
    /// `[[...], [...]]`, as produced by `ndarray.tolist()`
    Nested(Vec<Vec<f64>>),
}

impl RawTensor {
    /// Reads a tensor from disk, picking the format from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read and
    /// [`StoreError::Format`] if its contents are not a valid tensor.
    pub fn load(path: &Path, tensor: Option<&str>) -> Result<Self, StoreError> {
        let bytes = std::fs::read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let parsed = match extension.as_deref() {
            Some("safetensors") => safetensors::read_tensor(&bytes, tensor),
            Some("json") => Self::from_json(&bytes),
            other => Err(format!(
                "unsupported artifact extension {:?}, expected .safetensors or .json",
                other.unwrap_or("")
            )),
        };

        let tensor = parsed.map_err(|message| StoreError::format(path, message))?;
        tracing::debug!(
            path = %path.display(),
            name = tensor.name.as_deref().unwrap_or("-"),
            dtype = %tensor.dtype,
            shape = ?tensor.shape,
            "read artifact"
        );
        Ok(tensor)
    }

    fn from_json(bytes: &[u8]) -> Result<Self, String> {
        let parsed: JsonTensor =
            serde_json::from_slice(bytes).map_err(|e| format!("JSON parsing failed: {e}"))?;

        let (shape, data) = match parsed {
            JsonTensor::Dense { rows, cols, data } => {
                if rows.checked_mul(cols) != Some(data.len()) {
                    return Err(format!(
                        "rows * cols = {rows} * {cols} but data has {} values",
                        data.len()
                    ));
                }
                (vec![rows, cols], data)
            }
            JsonTensor::Flat(data) => (vec![data.len()], data),
            JsonTensor::Nested(rows) => {
                let cols = rows.first().map_or(0, Vec::len);
                if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
                    return Err(format!(
                        "ragged rows: row 0 has {cols} values, row {bad} has {}",
                        rows[bad].len()
                    ));
                }
                (vec![rows.len(), cols], rows.into_iter().flatten().collect())
            }
        };

        Ok(Self {
            name: None,
            dtype: "json".to_string(),
            shape,
            data,
        })
    }

    /// Interprets the tensor as a 2-D matrix.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Format`] unless the tensor is 2-D.
    pub fn into_matrix(self, path: &Path) -> Result<Matrix<f64>, StoreError> {
        let &[rows, cols] = self.shape.as_slice() else {
            return Err(StoreError::format(
                path,
                format!("expected a 2-D tensor, found shape {:?}", self.shape),
            ));
        };
        Matrix::from_vec(rows, cols, self.data).map_err(|e| StoreError::format(path, e))
    }

    /// Interprets the tensor as singular values: a length-k vector or a
    /// k×k diagonal matrix.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotDiagonal`] for a matrix with off-diagonal
    /// entries and [`StoreError::Format`] for any other shape.
    pub fn into_singular_values(self, path: &Path) -> Result<Vector<f64>, StoreError> {
        match self.shape.len() {
            1 => Ok(Vector::from_vec(self.data)),
            2 => {
                let matrix = self.into_matrix(path)?;
                if !matrix.is_diagonal() {
                    let (rows, cols) = matrix.shape();
                    return Err(StoreError::NotDiagonal { rows, cols });
                }
                Ok(matrix.diagonal())
            }
            _ => Err(StoreError::format(
                path,
                format!(
                    "singular values must be 1-D or 2-D, found shape {:?}",
                    self.shape
                ),
            )),
        }
    }
}
