pub(crate) use super::*;

#[test]
fn test_from_vec() {
    let m = Matrix::from_vec(2, 3, vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    assert_eq!(m.shape(), (2, 3));
    assert!((m.get(0, 0) - 1.0).abs() < 1e-12);
    assert!((m.get(1, 2) - 6.0).abs() < 1e-12);
}

#[test]
fn test_from_vec_error() {
    let result = Matrix::from_vec(2, 3, vec![1.0_f64, 2.0, 3.0]);
    assert!(result.is_err());
}

#[test]
fn test_from_vec_overflowing_shape() {
    let result = Matrix::from_vec(usize::MAX, 2, vec![1.0_f64]);
    assert!(result.is_err());
}

#[test]
fn test_from_diagonal() {
    let m = Matrix::from_diagonal(&Vector::from_slice(&[2.0, 3.0]));
    assert_eq!(m.shape(), (2, 2));
    assert!((m.get(0, 0) - 2.0).abs() < 1e-12);
    assert!((m.get(1, 1) - 3.0).abs() < 1e-12);
    assert!(m.get(0, 1).abs() < 1e-12);
    assert!(m.is_diagonal());
    assert_eq!(m.diagonal().as_slice(), &[2.0, 3.0]);
}

#[test]
fn test_is_diagonal_rejects_off_diagonal_and_non_square() {
    let m = Matrix::from_vec(2, 2, vec![1.0, 0.5, 0.0, 1.0]).expect("2x2");
    assert!(!m.is_diagonal());

    let rect = Matrix::from_vec(1, 2, vec![1.0, 0.0]).expect("1x2");
    assert!(!rect.is_diagonal());
}

#[test]
fn test_row_slice() {
    let m = Matrix::from_vec(2, 3, vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    assert_eq!(m.row_slice(0), &[1.0, 2.0, 3.0]);
    assert_eq!(m.row_slice(1), &[4.0, 5.0, 6.0]);
}

#[test]
fn test_matmul() {
    // 2x3 * 3x2 = 2x2
    let a = Matrix::from_vec(2, 3, vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    let b = Matrix::from_vec(3, 2, vec![7.0_f64, 8.0, 9.0, 10.0, 11.0, 12.0])
        .expect("test data has correct dimensions: 3*2=6 elements");
    let c = a
        .matmul(&b)
        .expect("matrix dimensions are compatible for multiplication: 2x3 * 3x2");

    assert_eq!(c.shape(), (2, 2));
    // c[0,0] = 1*7 + 2*9 + 3*11 = 58
    assert!((c.get(0, 0) - 58.0).abs() < 1e-12);
    // c[0,1] = 1*8 + 2*10 + 3*12 = 64
    assert!((c.get(0, 1) - 64.0).abs() < 1e-12);
}

#[test]
fn test_matmul_dimension_error() {
    let a = Matrix::from_vec(2, 3, vec![1.0_f64; 6]).expect("2x3");
    let b = Matrix::from_vec(2, 2, vec![1.0_f64; 4]).expect("2x2");
    assert!(a.matmul(&b).is_err());
}

#[test]
fn test_first_non_finite() {
    let ok = Matrix::from_vec(2, 2, vec![1.0_f64, 2.0, 3.0, 4.0]).expect("2x2");
    assert_eq!(ok.first_non_finite(), None);

    let bad = Matrix::from_vec(2, 2, vec![1.0_f64, 2.0, f64::NAN, 4.0]).expect("2x2");
    assert_eq!(bad.first_non_finite(), Some((1, 0)));
}
