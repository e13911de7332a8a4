/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : BatchNorm (批归一化) 层
 *
 * 支持两种输入：
 * - [batch_size, C]：对每个特征归一化
 * - [batch_size, C, H, W]：对每个通道在 batch 与空间维上归一化
 *
 * 训练模式：y = γ · (x - μ_B) / sqrt(σ²_B + ε) + β，μ_B/σ²_B 为当前批次的统计量（有偏方差）
 * 推理模式：用滑动统计量代替批次统计量
 *
 * 滑动统计量不在`forward`中更新，而是由调用方在一步训练结束后调用
 * `update_moving_stats`，这样同一次前向可以被多次求梯度而不产生副作用。
 */

use ndarray::{Array1, Array3, ArrayView1, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::nn::{Mode, Module, NnError, check_shape};
use crate::tensor::Tensor;

/// BatchNorm (批归一化) 层
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchNorm {
    /// 缩放参数 γ [C]
    gamma: Tensor,
    /// 平移参数 β [C]
    beta: Tensor,
    /// 滑动均值 [C]（不可训练）
    moving_mean: Tensor,
    /// 滑动方差 [C]（不可训练）
    moving_var: Tensor,
    num_features: usize,
    momentum: f32,
    epsilon: f32,
}

/// 前向缓存
#[derive(Debug, Clone)]
pub struct BatchNormCache {
    /// 归一化后的输入，按 [N, C, H*W] 排列
    x_hat: Array3<f32>,
    inv_std: Array1<f32>,
    /// 训练模式下的批次 (均值, 方差)
    batch_stats: Option<(Array1<f32>, Array1<f32>)>,
    input_shape: Vec<usize>,
}

impl BatchNorm {
    /// 默认动量（滑动统计量中旧值的权重）
    pub const DEFAULT_MOMENTUM: f32 = 0.99;
    pub const DEFAULT_EPSILON: f32 = 1e-3;

    /// 创建新的 BatchNorm 层：γ=1，β=0，滑动均值=0，滑动方差=1
    pub fn new(num_features: usize) -> Self {
        Self::with_params(num_features, Self::DEFAULT_MOMENTUM, Self::DEFAULT_EPSILON)
    }

    pub fn with_params(num_features: usize, momentum: f32, epsilon: f32) -> Self {
        Self {
            gamma: Tensor::ones(&[num_features]),
            beta: Tensor::zeros(&[num_features]),
            moving_mean: Tensor::zeros(&[num_features]),
            moving_var: Tensor::ones(&[num_features]),
            num_features,
            momentum,
            epsilon,
        }
    }

    pub fn forward(&self, x: &Tensor, mode: Mode) -> Result<(Tensor, BatchNormCache), NnError> {
        let x3 = self.as_channels(x)?;
        let x3 = x3.view3()?;
        let (batch_size, _, spatial) = x3.dim();

        let (mean, var, batch_stats) = match mode {
            Mode::Train => {
                if batch_size * spatial == 0 {
                    return Err(NnError::InvalidOperation(
                        "BatchNorm: 训练模式下批次不能为空".to_string(),
                    ));
                }
                let (mean, var) = channel_moments(x3);
                (mean.clone(), var.clone(), Some((mean, var)))
            }
            Mode::Eval => (
                self.moving_mean.view1()?.to_owned(),
                self.moving_var.view1()?.to_owned(),
                None,
            ),
        };

        let inv_std = var.mapv(|v| 1.0 / (v + self.epsilon).sqrt());
        let x_hat = (&x3 - &broadcast(mean.view())) * &broadcast(inv_std.view());
        let y = &x_hat * &broadcast(self.gamma.view1()?) + &broadcast(self.beta.view1()?);

        let output = Tensor::from(y.into_dyn()).reshape(x.shape())?;
        let cache = BatchNormCache {
            x_hat,
            inv_std,
            batch_stats,
            input_shape: x.shape().to_vec(),
        };
        Ok((output, cache))
    }

    /// 反向传播，返回 (dL/dx, [dL/dγ, dL/dβ])
    pub fn backward(
        &self,
        cache: &BatchNormCache,
        grad: &Tensor,
    ) -> Result<(Tensor, Vec<Tensor>), NnError> {
        check_shape(grad, &cache.input_shape, "BatchNorm 上游梯度")?;
        let dy3 = self.as_channels(grad)?;
        let dy = dy3.view3()?;
        let (batch_size, _, spatial) = dy.dim();

        let d_beta = sum_per_channel(dy.to_owned());
        let d_gamma = sum_per_channel(&dy * &cache.x_hat);

        let scale = &self.gamma.view1()? * &cache.inv_std;
        let dx = if cache.batch_stats.is_some() {
            // 批次统计量同样依赖 x：dx = γ/(σ·M) · (M·dy - Σdy - x̂·Σ(dy·x̂))
            let m = (batch_size * spatial) as f32;
            let centered = (&dy * m - &broadcast(d_beta.view()))
                - &cache.x_hat * &broadcast(d_gamma.view());
            centered * &broadcast(scale.view()) / m
        } else {
            &dy * &broadcast(scale.view())
        };

        let dx = Tensor::from(dx.into_dyn()).reshape(&cache.input_shape)?;
        let grads = vec![
            Tensor::from(d_gamma.into_dyn()),
            Tensor::from(d_beta.into_dyn()),
        ];
        Ok((dx, grads))
    }

    /// 用训练模式前向得到的批次统计量更新滑动统计量：
    /// moving = moving * momentum + batch * (1 - momentum)
    ///
    /// 推理模式的缓存不含批次统计量，此时什么都不做。
    pub fn update_moving_stats(&mut self, cache: &BatchNormCache) -> Result<(), NnError> {
        let Some((mean, var)) = &cache.batch_stats else {
            return Ok(());
        };
        let momentum = self.momentum;
        let blend = |moving: ArrayView1<f32>, batch: &Array1<f32>| {
            Tensor::from((&moving * momentum + batch * (1.0 - momentum)).into_dyn())
        };
        self.moving_mean = blend(self.moving_mean.view1()?, mean);
        self.moving_var = blend(self.moving_var.view1()?, var);
        Ok(())
    }

    /// 把 [N, C] 或 [N, C, H, W] 的输入整理成 [N, C, S]
    fn as_channels(&self, x: &Tensor) -> Result<Tensor, NnError> {
        let shape = x.shape();
        let valid = matches!(shape.len(), 2 | 4) && shape[1] == self.num_features;
        if !valid {
            let mut expected = vec![x.batch_size(), self.num_features];
            expected.extend(shape.iter().skip(2));
            return Err(NnError::ShapeMismatch {
                expected,
                got: shape.to_vec(),
                message: "BatchNorm 输入须为 [N, C] 或 [N, C, H, W]".to_string(),
            });
        }
        let spatial = shape[2..].iter().product();
        Ok(x.reshape(&[shape[0], self.num_features, spatial])?)
    }

    pub const fn num_features(&self) -> usize {
        self.num_features
    }

    pub const fn momentum(&self) -> f32 {
        self.momentum
    }

    pub const fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn moving_mean(&self) -> &Tensor {
        &self.moving_mean
    }

    pub fn moving_var(&self) -> &Tensor {
        &self.moving_var
    }
}

impl Module for BatchNorm {
    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.gamma, &self.beta]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.gamma, &mut self.beta]
    }
}

/// 每个通道在 batch 与空间维上的 (均值, 有偏方差)
fn channel_moments(x: ArrayView3<f32>) -> (Array1<f32>, Array1<f32>) {
    let (batch_size, _, spatial) = x.dim();
    let count = (batch_size * spatial) as f32;
    let mean = sum_per_channel(x.to_owned()) / count;
    let centered = &x - &broadcast(mean.view());
    let var = sum_per_channel(centered.mapv(|v| v * v)) / count;
    (mean, var)
}

fn sum_per_channel(x: Array3<f32>) -> Array1<f32> {
    x.sum_axis(Axis(2)).sum_axis(Axis(0))
}

/// [C] -> [1, C, 1]，便于与 [N, C, S] 广播
fn broadcast(v: ArrayView1<f32>) -> ArrayView3<f32> {
    v.insert_axis(Axis(0)).insert_axis(Axis(2))
}
