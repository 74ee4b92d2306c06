//! Shared fixtures: model directories in the default artifact layout.

#![allow(dead_code)]

use std::path::Path;
use tempfile::TempDir;

/// Encodes one F64 tensor as a SafeTensors file.
pub fn safetensors_f64(name: &str, shape: &[usize], values: &[f64]) -> Vec<u8> {
    let mut map = serde_json::Map::new();
    map.insert(
        name.to_string(),
        serde_json::json!({
            "dtype": "F64",
            "shape": shape,
            "data_offsets": [0, values.len() * 8],
        }),
    );
    let header = serde_json::Value::Object(map).to_string();
    let mut out = (header.len() as u64).to_le_bytes().to_vec();
    out.extend_from_slice(header.as_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Row-major factors plus cluster tables.
pub struct Fixture {
    pub users: Vec<(String, i64)>,
    pub products: Vec<(String, i64)>,
    pub k: usize,
    pub u: Vec<f64>,
    pub sigma: Vec<f64>,
    pub vt: Vec<f64>,
}

impl Fixture {
    /// Two users, three products, k = 2:
    /// U1 = [1, 0], U2 = [0, 1], Σ = diag(2, 1), Vt = [[1,0,0],[0,1,1]].
    pub fn small() -> Self {
        Self {
            users: vec![("U1".into(), 3), ("U2".into(), 1)],
            products: vec![("P1".into(), 3), ("P2".into(), 1), ("P3".into(), 3)],
            k: 2,
            u: vec![1.0, 0.0, 0.0, 1.0],
            sigma: vec![2.0, 1.0],
            vt: vec![1.0, 0.0, 0.0, 0.0, 1.0, 1.0],
        }
    }

    /// Writes every artifact under `root` in the default layout.
    pub fn write(&self, root: &Path) {
        let n_users = self.users.len();
        let n_products = self.products.len();
        let models = root.join("models");
        std::fs::create_dir_all(&models).expect("models dir");

        let mut sigma_matrix = vec![0.0; self.k * self.k];
        for (i, s) in self.sigma.iter().enumerate() {
            sigma_matrix[i * self.k + i] = *s;
        }

        std::fs::write(
            models.join("user_latent_features.safetensors"),
            safetensors_f64("U", &[n_users, self.k], &self.u),
        )
        .expect("write U");
        std::fs::write(
            models.join("product_latent_features.safetensors"),
            safetensors_f64("Vt", &[self.k, n_products], &self.vt),
        )
        .expect("write Vt");
        std::fs::write(
            models.join("sigma_matrix.safetensors"),
            safetensors_f64("sigma", &[self.k, self.k], &sigma_matrix),
        )
        .expect("write sigma");

        let mut users = String::from("userid,cluster\n");
        for (id, c) in &self.users {
            users.push_str(&format!("{id},{c}\n"));
        }
        std::fs::write(root.join("user_clusters.csv"), users).expect("write users");

        let mut products = String::from("productid,product_cluster\n");
        for (id, c) in &self.products {
            products.push_str(&format!("{id},{c}\n"));
        }
        std::fs::write(root.join("product_clusters.csv"), products).expect("write products");
    }

    /// Writes the fixture into a fresh temporary directory.
    pub fn temp_dir(&self) -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        self.write(dir.path());
        dir
    }
}
