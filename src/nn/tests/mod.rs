
use approx::assert_abs_diff_eq;

use crate::tensor::Tensor;

/// 用中心差分估计标量函数 L(x) = Σ(f(x) ⊙ r) 对 x 每个元素的梯度，
/// 其中 r 即反向传播时的上游梯度
fn numeric_grad<F: Fn(&Tensor) -> Tensor>(f: F, x: &Tensor, upstream: &Tensor, eps: f32) -> Tensor {
    let base = x.to_vec();
    let grads: Vec<f32> = (0..base.len())
        .map(|i| {
            let mut plus = base.clone();
            plus[i] += eps;
            let mut minus = base.clone();
            minus[i] -= eps;
            let loss_plus = (f(&Tensor::new(&plus, x.shape())) * upstream).sum();
            let loss_minus = (f(&Tensor::new(&minus, x.shape())) * upstream).sum();
            (loss_plus - loss_minus) / (2.0 * eps)
        })
        .collect();
    Tensor::new(&grads, x.shape())
}

fn assert_tensor_close(actual: &Tensor, expected: &Tensor, tolerance: f32) {
    assert_eq!(actual.shape(), expected.shape());
    for (a, e) in actual.to_vec().iter().zip(expected.to_vec()) {
        assert_abs_diff_eq!(*a, e, epsilon = tolerance);
    }
}
