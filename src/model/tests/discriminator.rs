/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 判别器单元测试
 */

use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{assert_grad_close, nudge, weighted_sum};
use crate::assert_err;
use crate::model::Discriminator;
use crate::nn::{Mode, Module, NnError};
use crate::tensor::Tensor;

#[test]
fn test_discriminator_zero_input_shape() {
    let mut rng = StdRng::seed_from_u64(0);
    let discriminator = Discriminator::new(0.3, 0.3, &mut rng).unwrap();

    let (logits, _) = discriminator
        .forward(&Tensor::zeros(&[3, 1, 28, 28]), Mode::Train, &mut rng)
        .unwrap();

    assert_eq!(logits.shape(), &[3, 1]);
    // 偏置初始化为 0，零输入得到零打分
    assert_eq!(logits.max_abs(), 0.0);
}

#[test]
fn test_discriminator_num_params() {
    let mut rng = StdRng::seed_from_u64(1);
    let discriminator = Discriminator::new(0.3, 0.3, &mut rng).unwrap();

    assert_eq!(discriminator.num_params(), 212_865);
    assert_eq!(discriminator.parameters().len(), 6);
}

#[test]
fn test_discriminator_rejects_wrong_shapes() {
    let mut rng = StdRng::seed_from_u64(2);
    let discriminator = Discriminator::new(0.3, 0.3, &mut rng).unwrap();

    assert_err!(
        discriminator.forward(&Tensor::zeros(&[2, 1, 14, 14]), Mode::Eval, &mut rng),
        NnError::ShapeMismatch { expected, .. } if expected == &[2, 1, 28, 28]
    );
    assert_err!(
        discriminator.decide(&Tensor::zeros(&[2, 28, 28])),
        NnError::ShapeMismatch { .. }
    );
    assert_err!(Discriminator::new(0.3, 1.5, &mut rng), NnError::InvalidOperation(_));
}

#[test]
fn test_discriminator_dropout_only_in_train_mode() {
    let mut rng = StdRng::seed_from_u64(3);
    let discriminator = Discriminator::new(0.3, 0.3, &mut rng).unwrap();
    let images = Tensor::uniform(-1.0, 1.0, &[2, 1, 28, 28], &mut rng);

    let eval_a = discriminator.decide(&images).unwrap();
    let eval_b = discriminator.decide(&images).unwrap();
    assert_eq!(eval_a, eval_b);
    let (eval_forward, _) = discriminator.forward(&images, Mode::Eval, &mut rng).unwrap();
    assert_eq!(eval_a, eval_forward);

    let (train_a, _) = discriminator.forward(&images, Mode::Train, &mut rng).unwrap();
    let (train_b, _) = discriminator.forward(&images, Mode::Train, &mut rng).unwrap();
    assert_ne!(train_a, train_b);
}

#[test]
fn test_discriminator_backward_shapes() {
    let mut rng = StdRng::seed_from_u64(4);
    let discriminator = Discriminator::new(0.3, 0.3, &mut rng).unwrap();
    let images = Tensor::uniform(-1.0, 1.0, &[2, 1, 28, 28], &mut rng);
    let (logits, tape) = discriminator.forward(&images, Mode::Train, &mut rng).unwrap();

    let grads = discriminator.backward(&tape, &Tensor::ones(logits.shape())).unwrap();
    for (grad, param) in grads.iter().zip(discriminator.parameters()) {
        assert_eq!(grad.shape(), param.shape());
    }
    // 全连接层偏置的梯度 = 上游梯度之和
    assert_abs_diff_eq!(grads[5].to_vec()[0], 2.0, epsilon = 1e-6);

    let input_grad = discriminator.input_grad(&tape, &Tensor::ones(logits.shape())).unwrap();
    assert_eq!(input_grad.shape(), images.shape());

    assert_err!(
        discriminator.backward(&tape, &Tensor::ones(&[3, 1])),
        NnError::ShapeMismatch { .. }
    );
}

#[test]
fn test_discriminator_gradients_match_numeric() {
    // 推理模式 + 斜率 1：前向是确定的线性映射，中心差分精确
    let mut rng = StdRng::seed_from_u64(5);
    let discriminator = Discriminator::new(1.0, 0.3, &mut rng).unwrap();
    let images = Tensor::uniform(-1.0, 1.0, &[2, 1, 28, 28], &mut rng);
    let upstream = Tensor::new(&[1.0, -0.5], &[2, 1]);
    let (_, tape) = discriminator.forward(&images, Mode::Eval, &mut rng).unwrap();

    let input_grad = discriminator.input_grad(&tape, &upstream).unwrap();
    let grads = discriminator.backward(&tape, &upstream).unwrap();

    let eps = 5e-2;
    let loss_of = |d: &Discriminator, x: &Tensor| weighted_sum(&d.decide(x).unwrap(), &upstream);

    for pixel in [100, 406, 1000] {
        let mut plus = images.clone();
        nudge(&mut plus, pixel, eps);
        let mut minus = images.clone();
        nudge(&mut minus, pixel, -eps);
        let numeric =
            (loss_of(&discriminator, &plus) - loss_of(&discriminator, &minus)) / (2.0 * f64::from(eps));
        assert_grad_close(input_grad.to_vec()[pixel], numeric);
    }

    for (param_index, element) in [(0, 3), (2, 1000), (4, 77)] {
        let loss_at = |delta: f32| {
            let mut perturbed = discriminator.clone();
            nudge(perturbed.parameters_mut()[param_index], element, delta);
            loss_of(&perturbed, &images)
        };
        let numeric = (loss_at(eps) - loss_at(-eps)) / (2.0 * f64::from(eps));
        assert_grad_close(grads[param_index].to_vec()[element], numeric);
    }
}
