/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Adam优化器实现
 */

use serde::{Deserialize, Serialize};

use super::base::Optimizer;
use crate::nn::NnError;
use crate::tensor::Tensor;

/// Adam优化器
///
/// 累积状态（一阶/二阶矩与时间步）可以序列化，随检查点一起保存，
/// 恢复后继续训练与未中断时完全一致。
///
/// 偏差修正并入步长，ε 加在未修正的 √v 上（与 Keras 相同）：
/// `θ -= lr · √(1 - β2ᵗ) / (1 - β1ᵗ) · m / (√v + ε)`。
/// 与 PyTorch 的 `m̂ / (√v̂ + ε)` 相比，ε 的实际作用被放大了 `1 / √(1 - β2ᵗ)` 倍，
/// 只在训练最初几步、梯度很小时有可见差别。
///
/// GAN 训练需要分别为 G 和 D 创建优化器：
/// ```ignore
/// let mut optimizer_g = Adam::new_default(1e-4);
/// let mut optimizer_d = Adam::new_default(1e-4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// 一阶矩估计（与参数按下标对应）
    m: Vec<Tensor>,
    /// 二阶矩估计
    v: Vec<Tensor>,
    /// 时间步
    t: usize,
}

impl Adam {
    /// 创建新的Adam优化器
    pub const fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }

    /// 使用默认参数创建Adam优化器（β1=0.9，β2=0.999，ε=1e-7）
    pub const fn new_default(learning_rate: f32) -> Self {
        Self::new(learning_rate, 0.9, 0.999, 1e-7)
    }

    /// 已执行的更新步数
    pub const fn time_step(&self) -> usize {
        self.t
    }

    pub const fn beta1(&self) -> f32 {
        self.beta1
    }

    pub const fn beta2(&self) -> f32 {
        self.beta2
    }

    pub const fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// 首次更新前按梯度形状初始化矩估计；之后检查参数数量与形状是否保持不变
    fn ensure_state(&mut self, params: &[&mut Tensor], grads: &[Tensor]) -> Result<(), NnError> {
        if params.len() != grads.len() {
            return Err(NnError::ParameterCountMismatch {
                expected: params.len(),
                got: grads.len(),
            });
        }
        for (param, grad) in params.iter().zip(grads) {
            if !param.is_same_shape(grad) {
                return Err(NnError::ShapeMismatch {
                    expected: param.shape().to_vec(),
                    got: grad.shape().to_vec(),
                    message: "Adam: 梯度与参数形状不一致".to_string(),
                });
            }
        }

        if self.m.is_empty() {
            self.m = grads.iter().map(Tensor::zeros_like).collect();
            self.v = grads.iter().map(Tensor::zeros_like).collect();
        } else if self.m.len() != grads.len() {
            return Err(NnError::ParameterCountMismatch {
                expected: self.m.len(),
                got: grads.len(),
            });
        } else if let Some(stale) = self.m.iter().zip(grads).find(|(m, g)| !m.is_same_shape(g)) {
            return Err(NnError::ShapeMismatch {
                expected: stale.0.shape().to_vec(),
                got: stale.1.shape().to_vec(),
                message: "Adam: 参数形状与累积状态不一致".to_string(),
            });
        }
        Ok(())
    }
}

impl Optimizer for Adam {
    fn step(&mut self, mut params: Vec<&mut Tensor>, grads: &[Tensor]) -> Result<(), NnError> {
        self.ensure_state(&params, grads)?;
        self.t += 1;

        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);
        let step_size = self.learning_rate * bias_correction2.sqrt() / bias_correction1;

        for (i, gradient) in grads.iter().enumerate() {
            // 原地更新一阶矩估计: m = β1 * m + (1 - β1) * g
            let m = &mut self.m[i];
            *m *= self.beta1;
            *m += &(gradient * (1.0 - self.beta1));

            // 原地更新二阶矩估计: v = β2 * v + (1 - β2) * g²
            let v = &mut self.v[i];
            *v *= self.beta2;
            *v += &(gradient.square() * (1.0 - self.beta2));

            // 参数更新: θ = θ - step_size * m / (√v + ε)
            let update = &self.m[i] / &(self.v[i].sqrt() + self.epsilon);
            *params[i] -= &(update * step_size);
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}
