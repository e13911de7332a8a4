use crate::assert_err;
use crate::errors::TensorError;
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_new_and_from_vec() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    assert_eq!(tensor.shape(), &[2, 3]);
    assert_eq!(tensor.dimension(), 2);
    assert_eq!(tensor.size(), 6);
    assert_eq!(tensor.batch_size(), 2);

    assert_err!(
        Tensor::from_vec(vec![1., 2., 3.], &[2, 2]),
        TensorError::DataShapeMismatch { len: 3, .. }
    );
}

#[test]
fn test_reshape() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let reshaped = tensor.reshape(&[3, 2]).unwrap();
    assert_eq!(reshaped.shape(), &[3, 2]);
    // 元素顺序（行优先）不变
    assert_eq!(reshaped.to_vec(), tensor.to_vec());

    assert_err!(
        tensor.reshape(&[4, 2]),
        TensorError::IncompatibleShape { from, to } if from == &[2, 3] && to == &[4, 2]
    );
}

#[test]
fn test_flatten_batch() {
    let tensor = Tensor::zeros(&[4, 1, 28, 28]);
    let flat = tensor.flatten_batch().unwrap();
    assert_eq!(flat.shape(), &[4, 784]);
}

#[test]
fn test_view2_and_view4() {
    let matrix = Tensor::zeros(&[2, 3]);
    assert!(matrix.view2().is_ok());
    assert_err!(
        matrix.view4(),
        TensorError::DimensionMismatch {
            expected: 4,
            got: 2,
            ..
        }
    );

    let images = Tensor::zeros(&[2, 1, 4, 4]);
    assert_eq!(images.view4().unwrap().dim(), (2, 1, 4, 4));
}

#[test]
fn test_random_tensor_with_seed() {
    let mut rng_1 = StdRng::seed_from_u64(7);
    let mut rng_2 = StdRng::seed_from_u64(7);
    let a = Tensor::normal(0.0, 1.0, &[16, 100], &mut rng_1);
    let b = Tensor::normal(0.0, 1.0, &[16, 100], &mut rng_2);
    assert_eq!(a, b);
    assert_eq!(a.shape(), &[16, 100]);
    // 1600个标准正态样本的均值应接近0
    assert!(a.mean().abs() < 0.15);

    let u = Tensor::uniform(-0.5, 0.5, &[1000], &mut rng_1);
    assert!(u.max_abs() <= 0.5);
}
