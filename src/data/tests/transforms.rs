use approx::assert_abs_diff_eq;

use crate::data::transforms::{denormalize_pixels, normalize_pixels};
use crate::tensor::Tensor;

#[test]
fn test_normalize_pixels() {
    let pixels = Tensor::new(&[0., 127.5, 255.], &[3]);
    let normalized = normalize_pixels(&pixels);
    assert_eq!(normalized, Tensor::new(&[-1., 0., 1.], &[3]));
}

#[test]
fn test_denormalize_pixels_clamps() {
    let values = Tensor::new(&[-1., 0., 1., 1.5, -3.], &[5]);
    let pixels = denormalize_pixels(&values);
    let expected = [0., 127.5, 255., 255., 0.];
    for (got, want) in pixels.to_vec().into_iter().zip(expected) {
        assert_abs_diff_eq!(got, want);
    }
}

#[test]
fn test_normalize_then_denormalize() {
    let pixels = Tensor::new(&[0., 3., 100., 254., 255.], &[5]);
    let restored = denormalize_pixels(&normalize_pixels(&pixels));
    for (got, want) in restored.to_vec().into_iter().zip(pixels.to_vec()) {
        assert_abs_diff_eq!(got, want, epsilon = 1e-4);
    }
}
