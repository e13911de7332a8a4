//! GAN 的两个损失，均基于带 logits 的二元交叉熵

use crate::nn::{BceWithLogitsLoss, NnError};
use crate::tensor::Tensor;

/// 真实样本的目标值
pub(crate) const REAL_LABEL: f32 = 1.0;
/// 生成样本的目标值
pub(crate) const FAKE_LABEL: f32 = 0.0;

/// 判别器损失的各个组成部分
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DiscriminatorLoss {
    /// 把真实样本判为真的损失
    pub real: f32,
    /// 把生成样本判为假的损失
    pub fake: f32,
    /// real + fake
    pub total: f32,
}

/// 判别器损失：bce(real_logits, 1) + bce(fake_logits, 0)
pub fn discriminator_loss(
    real_logits: &Tensor,
    fake_logits: &Tensor,
) -> Result<DiscriminatorLoss, NnError> {
    let criterion = BceWithLogitsLoss;
    let real = criterion.forward(real_logits, REAL_LABEL)?;
    let fake = criterion.forward(fake_logits, FAKE_LABEL)?;
    Ok(DiscriminatorLoss {
        real,
        fake,
        total: real + fake,
    })
}

/// 生成器损失：bce(fake_logits, 1)，即希望判别器把生成样本判为真
pub fn generator_loss(fake_logits: &Tensor) -> Result<f32, NnError> {
    BceWithLogitsLoss.forward(fake_logits, REAL_LABEL)
}
