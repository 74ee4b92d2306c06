pub(crate) use super::*;
use crate::config::TensorSource;
use crate::error::RecommendError;
use crate::store::safetensors::test_support::encode;
use tempfile::TempDir;

fn small_parts() -> ModelParts {
    ModelParts {
        user_factors: Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 1.0]).expect("2x2"),
        singular_values: Vector::from_slice(&[2.0, 1.0]),
        product_factors_t: Matrix::from_vec(2, 3, vec![1.0, 0.0, 0.0, 0.0, 1.0, 1.0])
            .expect("2x3"),
        users: vec![UserRecord::new("U1", 0), UserRecord::new("U2", 1)],
        products: vec![
            ProductRecord::new("P1", 0),
            ProductRecord::new("P2", 1),
            ProductRecord::new("P3", 1),
        ],
    }
}

fn store_error(result: Result<ModelStore>) -> StoreError {
    match result {
        Err(RecommendError::ModelStoreUnavailable(e)) => e,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected the store to be rejected"),
    }
}

#[test]
fn test_from_parts_valid() {
    let store = ModelStore::from_parts(small_parts()).expect("consistent");
    assert_eq!(store.n_users(), 2);
    assert_eq!(store.n_products(), 3);
    assert_eq!(store.latent_dim(), 2);
    assert_eq!(store.user_position("U2"), Some(1));
    assert_eq!(store.product_position("P3"), Some(2));
    assert_eq!(store.product_position("P9"), None);
    assert_eq!(store.limits(), Limits::default());
}

#[test]
fn test_user_row_count_mismatch() {
    let mut parts = small_parts();
    parts.users.push(UserRecord::new("U3", 0));
    let err = store_error(ModelStore::from_parts(parts));
    assert!(matches!(err, StoreError::DimensionMismatch { .. }));
    assert!(err.to_string().contains("users"), "{err}");
}

#[test]
fn test_product_column_count_mismatch() {
    let mut parts = small_parts();
    parts.products.pop();
    let err = store_error(ModelStore::from_parts(parts));
    assert!(err.to_string().contains("products"), "{err}");
}

#[test]
fn test_inner_dimension_mismatch() {
    let mut parts = small_parts();
    parts.singular_values = Vector::from_slice(&[2.0, 1.0, 0.5]);
    let err = store_error(ModelStore::from_parts(parts));
    assert!(err.to_string().contains("singular values"), "{err}");

    let mut parts = small_parts();
    parts.product_factors_t = Matrix::from_vec(1, 3, vec![1.0, 0.0, 0.0]).expect("1x3");
    let err = store_error(ModelStore::from_parts(parts));
    assert!(err.to_string().contains("product factor rows"), "{err}");
}

#[test]
fn test_zero_latent_dim_rejected() {
    let parts = ModelParts {
        user_factors: Matrix::from_vec(1, 0, vec![]).expect("1x0"),
        singular_values: Vector::from_vec(vec![]),
        product_factors_t: Matrix::from_vec(0, 1, vec![]).expect("0x1"),
        users: vec![UserRecord::new("U1", 0)],
        products: vec![ProductRecord::new("P1", 0)],
    };
    let err = store_error(ModelStore::from_parts(parts));
    assert!(err.to_string().contains("k>=1"), "{err}");
}

#[test]
fn test_empty_tables_rejected() {
    let mut parts = small_parts();
    parts.users.clear();
    assert!(matches!(
        store_error(ModelStore::from_parts(parts)),
        StoreError::EmptyTable {
            kind: EntityKind::User
        }
    ));
}

#[test]
fn test_non_finite_factor_rejected() {
    let mut parts = small_parts();
    parts.product_factors_t =
        Matrix::from_vec(2, 3, vec![1.0, 0.0, 0.0, 0.0, f64::NAN, 1.0]).expect("2x3");
    let err = store_error(ModelStore::from_parts(parts));
    assert!(matches!(
        err,
        StoreError::NonFinite {
            artifact: "product factors",
            row: 1,
            col: 1
        }
    ));

    let mut parts = small_parts();
    parts.singular_values = Vector::from_slice(&[2.0, f64::INFINITY]);
    assert!(matches!(
        store_error(ModelStore::from_parts(parts)),
        StoreError::NonFinite { col: 1, .. }
    ));
}

#[test]
fn test_duplicate_policy() {
    let mut parts = small_parts();
    parts.users[1] = UserRecord::new("U1", 1);

    let store = ModelStore::from_parts(parts.clone()).expect("first wins");
    assert_eq!(store.user_position("U1"), Some(0));
    assert_eq!(store.user_ids().count(), 1);
    assert_eq!(store.summary().duplicate_users, 1);

    let err = store_error(ModelStore::from_parts_with(
        parts,
        Limits::default(),
        DuplicatePolicy::Reject,
    ));
    assert!(matches!(err, StoreError::DuplicateIdentifier { .. }));
}

#[test]
fn test_ids_in_table_order() {
    let store = ModelStore::from_parts(small_parts()).expect("consistent");
    let users: Vec<&str> = store.user_ids().map(Identifier::as_str).collect();
    assert_eq!(users, vec!["U1", "U2"]);
    let products: Vec<&str> = store.product_ids().map(Identifier::as_str).collect();
    assert_eq!(products, vec!["P1", "P2", "P3"]);
}

#[test]
fn test_summary() {
    let store = ModelStore::from_parts(small_parts()).expect("consistent");
    let summary = store.summary();
    assert_eq!(summary.users, 2);
    assert_eq!(summary.products, 3);
    assert_eq!(summary.latent_dim, 2);
    assert_eq!(summary.user_clusters, 2);
    assert_eq!(summary.product_clusters, 2);
    assert_eq!(summary.duplicate_users, 0);
    assert_eq!(summary.duplicate_products, 0);
}

#[test]
fn test_store_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ModelStore>();
}

// ----------------------------------------------------------------------------
// Loading from disk
// ----------------------------------------------------------------------------

fn write_model_dir(dir: &TempDir) {
    let root = dir.path();
    std::fs::create_dir_all(root.join("models")).expect("models dir");
    std::fs::write(
        root.join("models/user_latent_features.safetensors"),
        encode(&[("U", "F64", vec![2, 2], vec![1.0, 0.0, 0.0, 1.0])]),
    )
    .expect("write U");
    std::fs::write(
        root.join("models/product_latent_features.safetensors"),
        encode(&[(
            "Vt",
            "F32",
            vec![2, 3],
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 1.0],
        )]),
    )
    .expect("write Vt");
    std::fs::write(
        root.join("models/sigma_matrix.safetensors"),
        encode(&[("sigma", "F64", vec![2, 2], vec![2.0, 0.0, 0.0, 1.0])]),
    )
    .expect("write sigma");
    std::fs::write(root.join("user_clusters.csv"), "userid,cluster\nU1,0\nU2,1\n")
        .expect("write users");
    std::fs::write(
        root.join("product_clusters.csv"),
        "productid,product_cluster\nP1,0\nP2,1\nP3,1\n",
    )
    .expect("write products");
}

#[test]
fn test_load_default_layout() {
    let dir = TempDir::new().expect("temp dir");
    write_model_dir(&dir);

    let config = StoreConfig::default().with_base_dir(dir.path());
    let store = ModelStore::load(&config).expect("complete model");
    assert_eq!(store.n_users(), 2);
    assert_eq!(store.n_products(), 3);
    assert_eq!(store.singular_values().as_slice(), &[2.0, 1.0]);
    assert!((store.product_factors_t().get(1, 2) - 1.0).abs() < 1e-12);
}

#[test]
fn test_load_json_artifacts() {
    let dir = TempDir::new().expect("temp dir");
    write_model_dir(&dir);
    let root = dir.path();
    std::fs::write(root.join("u.json"), "[[1, 0], [0, 1]]").expect("write");
    std::fs::write(root.join("sigma.json"), "[2, 1]").expect("write");

    let mut config = StoreConfig::default().with_base_dir(root);
    config.artifacts.user_factors = TensorSource::new("u.json");
    config.artifacts.singular_values = TensorSource::new("sigma.json");
    let store = ModelStore::load(&config).expect("mixed formats");
    assert_eq!(store.latent_dim(), 2);
}

#[test]
fn test_load_fails_when_any_artifact_missing() {
    let dir = TempDir::new().expect("temp dir");
    write_model_dir(&dir);
    std::fs::remove_file(dir.path().join("product_clusters.csv")).expect("remove");

    let config = StoreConfig::default().with_base_dir(dir.path());
    let err = store_error(ModelStore::load(&config));
    assert!(matches!(err, StoreError::Io { .. }));
    assert!(err.to_string().contains("product_clusters.csv"));
}

#[test]
fn test_load_fails_on_inconsistent_tables() {
    let dir = TempDir::new().expect("temp dir");
    write_model_dir(&dir);
    std::fs::write(
        dir.path().join("user_clusters.csv"),
        "userid,cluster\nU1,0\nU2,1\nU3,1\n",
    )
    .expect("rewrite users");

    let config = StoreConfig::default().with_base_dir(dir.path());
    let err = store_error(ModelStore::load(&config));
    assert!(matches!(err, StoreError::DimensionMismatch { .. }));
}

#[test]
fn test_load_uses_configured_limits() {
    let dir = TempDir::new().expect("temp dir");
    write_model_dir(&dir);

    let mut config = StoreConfig::default().with_base_dir(dir.path());
    config.limits = Limits {
        default_top_n: 2,
        max_top_n: 5,
    };
    let store = ModelStore::load(&config).expect("complete model");
    assert_eq!(store.limits().max_top_n, 5);
}
