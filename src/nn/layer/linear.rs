/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Linear (全连接) 层
 *
 * 计算：output = x @ W + b
 * - 输入：[batch_size, in_features]
 * - 输出：[batch_size, out_features]
 */

use ndarray::Axis;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::nn::{Init, Module, NnError, check_shape};
use crate::tensor::Tensor;

/// Linear (全连接) 层
///
/// # 使用示例
/// ```ignore
/// let fc = Linear::new(100, 7 * 7 * 256, false, &mut rng);
/// let (h, cache) = fc.forward(&z)?;
/// let (dz, grads) = fc.backward(&cache, &dh)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    /// 权重参数 [in_features, out_features]
    weights: Tensor,
    /// 偏置参数 [out_features]（可选）
    bias: Option<Tensor>,
    in_features: usize,
    out_features: usize,
}

/// 前向缓存：反向传播需要的输入
#[derive(Debug, Clone)]
pub struct LinearCache {
    input: Tensor,
}

impl Linear {
    /// 创建新的 Linear 层，权重使用 Glorot 均匀分布初始化，偏置初始化为 0
    pub fn new<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        use_bias: bool,
        rng: &mut R,
    ) -> Self {
        let weights = Init::GlorotUniform {
            fan_in: in_features,
            fan_out: out_features,
        }
        .generate(&[in_features, out_features], rng);
        let bias = use_bias.then(|| Tensor::zeros(&[out_features]));
        Self {
            weights,
            bias,
            in_features,
            out_features,
        }
    }

    pub fn forward(&self, x: &Tensor) -> Result<(Tensor, LinearCache), NnError> {
        let batch_size = x.batch_size();
        check_shape(x, &[batch_size, self.in_features], "Linear 输入")?;

        let mut y = x.view2()?.dot(&self.weights.view2()?);
        if let Some(bias) = &self.bias {
            y += &bias.view1()?;
        }

        let cache = LinearCache { input: x.clone() };
        Ok((Tensor::from(y.into_dyn()), cache))
    }

    /// 反向传播，返回 (dL/dx, [dL/dW, dL/db])
    pub fn backward(
        &self,
        cache: &LinearCache,
        grad: &Tensor,
    ) -> Result<(Tensor, Vec<Tensor>), NnError> {
        Ok((self.input_grad(cache, grad)?, self.param_grads(cache, grad)?))
    }

    /// 只计算对输入的梯度：dL/dx = dL/dy @ Wᵀ
    pub fn input_grad(&self, cache: &LinearCache, grad: &Tensor) -> Result<Tensor, NnError> {
        self.check_grad(cache, grad)?;
        let dx = grad.view2()?.dot(&self.weights.view2()?.t());
        Ok(Tensor::from(dx.into_dyn()))
    }

    /// 只计算参数梯度，顺序与`parameters()`一致
    pub fn param_grads(&self, cache: &LinearCache, grad: &Tensor) -> Result<Vec<Tensor>, NnError> {
        self.check_grad(cache, grad)?;
        let dy = grad.view2()?;
        let dw = cache.input.view2()?.t().dot(&dy);

        let mut grads = vec![Tensor::from(dw.into_dyn())];
        if self.bias.is_some() {
            grads.push(Tensor::from(dy.sum_axis(Axis(0)).into_dyn()));
        }
        Ok(grads)
    }

    fn check_grad(&self, cache: &LinearCache, grad: &Tensor) -> Result<(), NnError> {
        check_shape(
            grad,
            &[cache.input.batch_size(), self.out_features],
            "Linear 上游梯度",
        )
    }

    pub const fn in_features(&self) -> usize {
        self.in_features
    }

    pub const fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }
}

impl Module for Linear {
    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = vec![&self.weights];
        params.extend(self.bias.as_ref());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = vec![&mut self.weights];
        params.extend(self.bias.as_mut());
        params
    }
}
