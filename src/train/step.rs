/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 一步训练中的两个纯梯度函数
 *
 * 两个函数都只读网络、只读前向磁带，返回 (损失, 参数梯度)；
 * 参数更新由调用方（`TrainingSession::train_step`）在两者都算完之后进行，
 * 因此生成器梯度穿过的是本步更新前的判别器。
 */

use crate::model::{Discriminator, DiscriminatorTape, Generator, GeneratorTape};
use crate::nn::{BceWithLogitsLoss, NnError};
use crate::tensor::Tensor;

use super::loss::{DiscriminatorLoss, FAKE_LABEL, REAL_LABEL, discriminator_loss, generator_loss};

/// 单步训练的统计量
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepStats {
    pub generator_loss: f32,
    pub discriminator_loss: DiscriminatorLoss,
    /// 真实样本 logits 的均值
    pub real_score: f32,
    /// 生成样本 logits 的均值
    pub fake_score: f32,
}

/// 生成器梯度
///
/// 生成器损失先穿过判别器（只求对输入图像的梯度，判别器参数的梯度不计算），
/// 再穿过生成器，得到生成器全部参数的梯度。
///
/// # 参数
/// - `generator_tape`: 生成这批图像时的生成器磁带
/// - `fake_tape`/`fake_logits`: 判别器对这批生成图像的前向结果
pub fn generator_gradients(
    generator: &Generator,
    discriminator: &Discriminator,
    generator_tape: &GeneratorTape,
    fake_tape: &DiscriminatorTape,
    fake_logits: &Tensor,
) -> Result<(f32, Vec<Tensor>), NnError> {
    let loss = generator_loss(fake_logits)?;
    let d_logits = BceWithLogitsLoss.backward(fake_logits, REAL_LABEL)?;
    let d_images = discriminator.input_grad(fake_tape, &d_logits)?;
    let grads = generator.backward(generator_tape, &d_images)?;
    Ok((loss, grads))
}

/// 判别器梯度
///
/// 真实批次与生成批次的梯度分别求出后相加；生成批次被视为常量，梯度不会流入生成器。
pub fn discriminator_gradients(
    discriminator: &Discriminator,
    real_tape: &DiscriminatorTape,
    real_logits: &Tensor,
    fake_tape: &DiscriminatorTape,
    fake_logits: &Tensor,
) -> Result<(DiscriminatorLoss, Vec<Tensor>), NnError> {
    let loss = discriminator_loss(real_logits, fake_logits)?;
    let criterion = BceWithLogitsLoss;

    let real_grads = discriminator.backward(real_tape, &criterion.backward(real_logits, REAL_LABEL)?)?;
    let fake_grads = discriminator.backward(fake_tape, &criterion.backward(fake_logits, FAKE_LABEL)?)?;

    let grads = real_grads
        .into_iter()
        .zip(fake_grads)
        .map(|(real, fake)| real + fake)
        .collect();
    Ok((loss, grads))
}
