/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 生成器单元测试
 */

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{assert_grad_close, nudge, weighted_sum};
use crate::assert_err;
use crate::model::Generator;
use crate::nn::{Mode, Module, NnError};
use crate::tensor::Tensor;

#[test]
fn test_generator_zero_input_shape() {
    let mut rng = StdRng::seed_from_u64(0);
    let generator = Generator::new(100, 0.3, &mut rng);

    let (images, _) = generator.forward(&Tensor::zeros(&[2, 100]), Mode::Train).unwrap();

    assert_eq!(images.shape(), &[2, 1, 28, 28]);
    // 无偏置的全连接层把零输入映射为零，之后每层都保持为零
    assert_eq!(images.max_abs(), 0.0);
}

#[test]
fn test_generator_output_range() {
    let mut rng = StdRng::seed_from_u64(1);
    let generator = Generator::new(100, 0.3, &mut rng);
    let z = Tensor::normal(0.0, 1.0, &[4, 100], &mut rng);

    let (images, _) = generator.forward(&z, Mode::Train).unwrap();

    assert!(images.is_finite());
    assert!(images.max_abs() < 1.0);
    assert!(images.max_abs() > 0.0);
}

#[test]
fn test_generator_num_params() {
    let mut rng = StdRng::seed_from_u64(2);
    let generator = Generator::new(100, 0.3, &mut rng);

    assert_eq!(generator.num_params(), 2_305_472);
    assert_eq!(generator.parameters().len(), 10);
}

#[test]
fn test_generator_rejects_wrong_latent_dim() {
    let mut rng = StdRng::seed_from_u64(3);
    let generator = Generator::new(100, 0.3, &mut rng);

    assert_err!(
        generator.forward(&Tensor::zeros(&[2, 64]), Mode::Train),
        NnError::ShapeMismatch { expected, .. } if expected == &[2, 100]
    );
}

#[test]
fn test_generator_generate_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(4);
    let generator = Generator::new(16, 0.3, &mut rng);
    let z = Tensor::normal(0.0, 1.0, &[3, 16], &mut rng);

    let first = generator.generate(&z).unwrap();
    let second = generator.generate(&z).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.shape(), &[3, 1, 28, 28]);
}

#[test]
fn test_generator_update_moving_stats() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut generator = Generator::new(8, 0.3, &mut rng);
    let z = Tensor::normal(0.0, 1.0, &[4, 8], &mut rng);
    let before = generator.clone();

    let (_, tape) = generator.forward(&z, Mode::Train).unwrap();
    // 前向本身不修改网络
    assert_eq!(generator, before);

    generator.update_moving_stats(&tape).unwrap();

    for (bn, old) in generator.batch_norms().iter().zip(before.batch_norms()) {
        assert_ne!(bn.moving_mean(), old.moving_mean());
    }
    // 可训练参数不受影响
    assert_eq!(generator.parameters(), before.parameters());
}

#[test]
fn test_generator_gradients_match_numeric() {
    let mut rng = StdRng::seed_from_u64(6);
    let generator = Generator::new(4, 0.3, &mut rng);
    let z = Tensor::normal(0.0, 1.0, &[3, 4], &mut rng);
    let (images, tape) = generator.forward(&z, Mode::Train).unwrap();
    let upstream = Tensor::normal(0.0, 1.0, images.shape(), &mut rng);

    let grads = generator.backward(&tape, &upstream).unwrap();
    assert_eq!(grads.len(), generator.parameters().len());
    for (grad, param) in grads.iter().zip(generator.parameters()) {
        assert_eq!(grad.shape(), param.shape());
    }

    // 最后一个转置卷积核（下标 9）之后只有 tanh，差分不会跨过 LeakyReLU 的折点
    check_numeric(&generator, &z, &upstream, &grads, &[(9, 0), (9, 37), (9, 1200)]);
}

#[test]
fn test_generator_deep_gradients_match_numeric() {
    // 斜率为 1 时 LeakyReLU 退化为恒等映射，可以对更靠前的层做差分
    let mut rng = StdRng::seed_from_u64(7);
    let generator = Generator::new(4, 1.0, &mut rng);
    let z = Tensor::normal(0.0, 1.0, &[3, 4], &mut rng);
    let (images, tape) = generator.forward(&z, Mode::Train).unwrap();
    let upstream = Tensor::normal(0.0, 1.0, images.shape(), &mut rng);

    let grads = generator.backward(&tape, &upstream).unwrap();

    // bn0 的 β、deconv1 的核、bn2 的 γ
    check_numeric(&generator, &z, &upstream, &grads, &[(2, 100), (3, 5000), (7, 10)]);
}

fn check_numeric(
    generator: &Generator,
    z: &Tensor,
    upstream: &Tensor,
    grads: &[Tensor],
    checked: &[(usize, usize)],
) {
    let eps = 5e-2;
    for &(param_index, element) in checked {
        let loss_at = |delta: f32| {
            let mut perturbed = generator.clone();
            nudge(perturbed.parameters_mut()[param_index], element, delta);
            weighted_sum(&perturbed.forward(z, Mode::Train).unwrap().0, upstream)
        };
        let numeric = (loss_at(eps) - loss_at(-eps)) / (2.0 * f64::from(eps));
        assert_grad_close(grads[param_index].to_vec()[element], numeric);
    }
}
