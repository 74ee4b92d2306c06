//! `SafeTensors` reader for latent-factor artifacts.
//!
//! ```text
//! [8-byte header: u64 metadata length (little-endian)]
//! [JSON metadata: tensor names, dtypes, shapes, data_offsets]
//! [Raw tensor data: F64 or F32 values in little-endian]
//! ```
//!
//! Only the dtypes an SVD export produces are accepted. Offsets are
//! relative to the start of the data section.

use super::tensor::RawTensor;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Metadata for a single tensor.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TensorMetadata {
    /// Data type (`"F64"` or `"F32"`)
    pub dtype: String,
    /// Tensor shape
    pub shape: Vec<usize>,
    /// `[start, end)` byte range in the data section
    pub data_offsets: [usize; 2],
}

/// Tensor name to metadata, sorted for deterministic error messages.
pub(crate) type SafeTensorsMetadata = BTreeMap<String, TensorMetadata>;

pub(crate) fn validate_and_read_header(bytes: &[u8]) -> Result<usize, String> {
    if bytes.len() < 8 {
        return Err(format!(
            "file is {} bytes, need at least 8 bytes for header",
            bytes.len()
        ));
    }

    let mut header = [0u8; 8];
    header.copy_from_slice(&bytes[..8]);
    let metadata_len = usize::try_from(u64::from_le_bytes(header))
        .map_err(|_| "metadata length does not fit in memory".to_string())?;

    if metadata_len == 0 {
        return Err("metadata length is 0".to_string());
    }

    if metadata_len > bytes.len() - 8 {
        return Err(format!("metadata length {metadata_len} exceeds file size"));
    }

    Ok(metadata_len)
}

pub(crate) fn parse_metadata(
    bytes: &[u8],
    metadata_len: usize,
) -> Result<SafeTensorsMetadata, String> {
    let metadata_str = std::str::from_utf8(&bytes[8..8 + metadata_len])
        .map_err(|e| format!("metadata is not valid UTF-8: {e}"))?;

    let raw: serde_json::Value =
        serde_json::from_str(metadata_str).map_err(|e| format!("JSON parsing failed: {e}"))?;

    let serde_json::Value::Object(map) = raw else {
        return Err("metadata is not a JSON object".to_string());
    };

    let mut metadata = SafeTensorsMetadata::new();
    for (key, value) in map {
        if key.starts_with("__") {
            continue;
        }
        let tensor_meta = serde_json::from_value::<TensorMetadata>(value)
            .map_err(|e| format!("invalid metadata for tensor '{key}': {e}"))?;
        metadata.insert(key, tensor_meta);
    }
    Ok(metadata)
}

/// Picks the named tensor, or the only tensor when no name is given.
fn select<'m>(
    metadata: &'m SafeTensorsMetadata,
    name: Option<&str>,
) -> Result<(&'m str, &'m TensorMetadata), String> {
    match name {
        Some(name) => metadata
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| {
                format!(
                    "tensor '{name}' not found, available: {:?}",
                    metadata.keys().collect::<Vec<_>>()
                )
            }),
        None => {
            let mut iter = metadata.iter();
            match (iter.next(), iter.next()) {
                (Some((k, v)), None) => Ok((k.as_str(), v)),
                (None, _) => Err("file contains no tensors".to_string()),
                (Some(_), Some(_)) => Err(format!(
                    "file contains {} tensors, name one of {:?}",
                    metadata.len(),
                    metadata.keys().collect::<Vec<_>>()
                )),
            }
        }
    }
}

/// Decodes one tensor from an in-memory `SafeTensors` file.
pub(crate) fn read_tensor(bytes: &[u8], name: Option<&str>) -> Result<RawTensor, String> {
    let metadata_len = validate_and_read_header(bytes)?;
    let metadata = parse_metadata(bytes, metadata_len)?;
    let (name, meta) = select(&metadata, name)?;

    let raw_data = &bytes[8 + metadata_len..];
    let [start, end] = meta.data_offsets;
    if start > end || end > raw_data.len() {
        return Err(format!(
            "tensor '{name}' data offsets [{start}, {end}) exceed data size {}",
            raw_data.len()
        ));
    }
    let tensor_bytes = &raw_data[start..end];

    let data = match meta.dtype.as_str() {
        "F64" => extract_f64(tensor_bytes)?,
        "F32" => extract_f32(tensor_bytes)?
            .into_iter()
            .map(f64::from)
            .collect(),
        other => {
            return Err(format!(
                "tensor '{name}' has unsupported dtype {other}, expected F64 or F32"
            ))
        }
    };

    let expected = meta
        .shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| format!("tensor '{name}' shape {:?} overflows usize", meta.shape))?;
    if expected != data.len() {
        return Err(format!(
            "tensor '{name}' shape {:?} needs {expected} values, found {}",
            meta.shape,
            data.len()
        ));
    }

    Ok(RawTensor {
        name: Some(name.to_string()),
        dtype: meta.dtype.clone(),
        shape: meta.shape.clone(),
        data,
    })
}

fn extract_f64(tensor_bytes: &[u8]) -> Result<Vec<f64>, String> {
    if tensor_bytes.len() % 8 != 0 {
        return Err(format!(
            "F64 tensor data size {} is not a multiple of 8 bytes",
            tensor_bytes.len()
        ));
    }
    Ok(tensor_bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            f64::from_le_bytes(buf)
        })
        .collect())
}

fn extract_f32(tensor_bytes: &[u8]) -> Result<Vec<f32>, String> {
    if tensor_bytes.len() % 4 != 0 {
        return Err(format!(
            "F32 tensor data size {} is not a multiple of 4 bytes",
            tensor_bytes.len()
        ));
    }
    Ok(tensor_bytes
        .chunks_exact(4)
        .map(|chunk| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(chunk);
            f32::from_le_bytes(buf)
        })
        .collect())
}
