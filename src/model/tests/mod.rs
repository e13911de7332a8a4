mod discriminator;
mod generator;

use crate::tensor::Tensor;

/// 把张量按行优先的第`index`个元素加上`delta`
fn nudge(tensor: &mut Tensor, index: usize, delta: f32) {
    if let Some(v) = tensor.view_mut().iter_mut().nth(index) {
        *v += delta;
    }
}

/// Σ(output ⊙ upstream)，用 f64 累加以免求和误差淹没差分
fn weighted_sum(output: &Tensor, upstream: &Tensor) -> f64 {
    output
        .to_vec()
        .into_iter()
        .zip(upstream.to_vec())
        .map(|(o, u)| f64::from(o) * f64::from(u))
        .sum()
}

/// 中心差分结果与解析梯度对照
fn assert_grad_close(analytic: f32, numeric: f64) {
    let tolerance = 5e-3 + 5e-2 * numeric.abs();
    assert!(
        (f64::from(analytic) - numeric).abs() <= tolerance,
        "解析梯度 {analytic} 与数值梯度 {numeric} 不一致"
    );
}
