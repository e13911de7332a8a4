/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Dropout 层（inverted dropout）
 *
 * 训练模式下每个元素以概率 rate 置零，保留的元素乘以 1/(1-rate)，
 * 使推理模式（恒等映射）下的期望输出与训练时一致。
 */

use ndarray::{ArrayD, IxDyn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::nn::{Mode, NnError, check_shape};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dropout {
    rate: f32,
}

/// 前向缓存：训练模式下保存缩放后的掩码
#[derive(Debug, Clone)]
pub struct DropoutCache {
    mask: Option<Tensor>,
}

impl Dropout {
    /// `rate`须在 [0, 1) 区间内
    pub fn new(rate: f32) -> Result<Self, NnError> {
        if !(0.0..1.0).contains(&rate) {
            return Err(NnError::InvalidOperation(format!(
                "Dropout: 丢弃率须在 [0, 1) 区间内，实际为 {rate}"
            )));
        }
        Ok(Self { rate })
    }

    pub fn forward<R: Rng + ?Sized>(
        &self,
        x: &Tensor,
        mode: Mode,
        rng: &mut R,
    ) -> (Tensor, DropoutCache) {
        if !mode.is_train() || self.rate == 0.0 {
            return (x.clone(), DropoutCache { mask: None });
        }

        let keep = 1.0 - self.rate;
        let mask = Tensor::from(ArrayD::from_shape_simple_fn(IxDyn(x.shape()), || {
            if rng.r#gen::<f32>() < keep { 1.0 / keep } else { 0.0 }
        }));
        (x * &mask, DropoutCache { mask: Some(mask) })
    }

    pub fn backward(&self, cache: &DropoutCache, grad: &Tensor) -> Result<Tensor, NnError> {
        match &cache.mask {
            Some(mask) => {
                check_shape(grad, mask.shape(), "Dropout 上游梯度")?;
                Ok(grad * mask)
            }
            None => Ok(grad.clone()),
        }
    }

    pub const fn rate(&self) -> f32 {
        self.rate
    }
}
