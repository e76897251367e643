use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_reductions() {
    let tensor = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    assert_eq!(tensor.sum(), 10.);
    assert_eq!(tensor.mean(), 2.5);
    assert_abs_diff_eq!(tensor.std(), 1.118_034, epsilon = 1e-6);
    assert_eq!(tensor.min(), 1.);
    assert_eq!(tensor.max(), 4.);
}

#[test]
fn test_map_and_zip_map() {
    let a = Tensor::new(&[1., 4., 9.], &[3]);
    assert_eq!(a.sqrt().as_slice(), &[1., 2., 3.]);
    assert_eq!(a.map(|x| -x).as_slice(), &[-1., -4., -9.]);

    let b = Tensor::new(&[1., 1., 1.], &[3]);
    assert_eq!(a.zip_map(&b, |x, y| x.max(y * 5.)).as_slice(), &[5., 5., 9.]);
}

#[test]
fn test_fill() {
    let mut a = Tensor::ones(&[2, 3]);
    a.fill(0.0);
    assert_eq!(a, Tensor::zeros(&[2, 3]));
}
