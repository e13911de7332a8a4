/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 损失函数
 */

use crate::nn::NnError;
use crate::nn::functional::sigmoid;
use crate::tensor::Tensor;

/// 带 logits 的二元交叉熵损失（内置 Sigmoid，数值稳定）
///
/// 对每个 logit x 与目标 z：
/// ```text
/// loss(x, z) = max(x, 0) - x·z + ln(1 + e^(-|x|))
/// ```
/// 返回所有元素的均值。所有样本共用同一个目标值
/// （GAN 中真实样本为 1、生成样本为 0）。
///
/// # 使用示例
/// ```ignore
/// let criterion = BceWithLogitsLoss;
/// let loss = criterion.forward(&fake_logits, 1.0)?;
/// let d_logits = criterion.backward(&fake_logits, 1.0)?;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BceWithLogitsLoss;

impl BceWithLogitsLoss {
    pub fn forward(&self, logits: &Tensor, target: f32) -> Result<f32, NnError> {
        Self::check_non_empty(logits)?;
        let total: f32 = logits
            .data()
            .iter()
            .map(|&x| x.max(0.0) - x * target + (-x.abs()).exp().ln_1p())
            .sum();
        Ok(total / logits.size() as f32)
    }

    /// 均值损失对 logits 的梯度：(σ(x) - z) / n
    pub fn backward(&self, logits: &Tensor, target: f32) -> Result<Tensor, NnError> {
        Self::check_non_empty(logits)?;
        let n = logits.size() as f32;
        Ok((sigmoid(logits) - target) / n)
    }

    fn check_non_empty(logits: &Tensor) -> Result<(), NnError> {
        if logits.size() == 0 {
            return Err(NnError::InvalidOperation(
                "BceWithLogitsLoss: logits 不能为空".to_string(),
            ));
        }
        Ok(())
    }
}
