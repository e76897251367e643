use crate::tensor::Tensor;

#[test]
fn test_tensor_with_tensor() {
    let a = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    let b = Tensor::new(&[4., 3., 2., 1.], &[2, 2]);
    assert_eq!((&a + &b).as_slice(), &[5., 5., 5., 5.]);
    assert_eq!((&a - &b).as_slice(), &[-3., -1., 1., 3.]);
    assert_eq!((&a * &b).as_slice(), &[4., 6., 6., 4.]);
    assert_eq!((a.clone() / b.clone()).as_slice(), &[0.25, 2. / 3., 1.5, 4.]);
}

#[test]
fn test_tensor_with_number() {
    let a = Tensor::new(&[1., 2.], &[2]);
    assert_eq!((&a + 1.0).as_slice(), &[2., 3.]);
    assert_eq!((&a - 1.0).as_slice(), &[0., 1.]);
    assert_eq!((&a * 2.0).as_slice(), &[2., 4.]);
    assert_eq!((2.0 * &a).as_slice(), &[2., 4.]);
    assert_eq!((a / 2.0).as_slice(), &[0.5, 1.]);
}

#[test]
fn test_assign_ops() {
    let mut a = Tensor::new(&[1., 2.], &[2]);
    a += &Tensor::new(&[1., 1.], &[2]);
    assert_eq!(a.as_slice(), &[2., 3.]);
    a *= 0.5;
    assert_eq!(a.as_slice(), &[1., 1.5]);
}

#[test]
#[should_panic(expected = "形状不一致")]
fn test_add_with_mismatched_shapes() {
    let _ = Tensor::zeros(&[2, 2]) + Tensor::zeros(&[4]);
}

#[test]
#[should_panic(expected = "形状不一致")]
fn test_add_assign_does_not_broadcast() {
    let mut a = Tensor::zeros(&[2, 2]);
    a += &Tensor::zeros(&[2]);
}
