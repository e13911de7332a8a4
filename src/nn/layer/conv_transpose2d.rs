/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : ConvTranspose2d (2D 转置卷积) 层
 *
 * 转置卷积即普通卷积对输入的梯度：把本层的输出看作某个卷积的输入，
 * 本层的输入看作该卷积的输出，两者共用同一个卷积核。
 *
 * 输入/输出形状：
 * - 输入：[batch_size, in_channels, H, W]
 * - 输出：[batch_size, out_channels, H', W']
 *
 * 与 Conv2d 一样使用 same 填充：H' = H * stride
 */

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{add_channel_bias, channel_bias_grad};
use crate::nn::functional::{
    ConvGeometry, conv2d, conv2d_input_grad, conv2d_kernel_grad, same_padding,
};
use crate::nn::{Init, Module, NnError, check_shape};
use crate::tensor::Tensor;

/// ConvTranspose2d (2D 转置卷积) 层
///
/// # 使用示例
/// ```ignore
/// let deconv = ConvTranspose2d::new(128, 64, 5, 2, false, &mut rng);
/// let (h, cache) = deconv.forward(&x)?;  // [N, 128, 7, 7] -> [N, 64, 14, 14]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvTranspose2d {
    /// 卷积核参数 [in_channels, out_channels, kernel, kernel]
    kernel: Tensor,
    /// 偏置参数 [out_channels]（可选）
    bias: Option<Tensor>,
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
}

/// 前向缓存
#[derive(Debug, Clone)]
pub struct ConvTranspose2dCache {
    input: Tensor,
    geometry: ConvGeometry,
    out_hw: (usize, usize),
}

impl ConvTranspose2d {
    /// 创建新的 ConvTranspose2d 层，参数含义同 [`super::Conv2d::new`]
    pub fn new<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        use_bias: bool,
        rng: &mut R,
    ) -> Self {
        let receptive_field = kernel_size * kernel_size;
        let kernel = Init::GlorotUniform {
            fan_in: out_channels * receptive_field,
            fan_out: in_channels * receptive_field,
        }
        .generate(&[in_channels, out_channels, kernel_size, kernel_size], rng);
        let bias = use_bias.then(|| Tensor::zeros(&[out_channels]));
        Self {
            kernel,
            bias,
            in_channels,
            out_channels,
            kernel_size,
            stride: stride.max(1),
        }
    }

    /// 计算输出尺寸，以及对应的（以本层输出为输入的）卷积几何参数
    ///
    /// 对长度为`H * stride`的输入做 same 卷积，输出长度恰为`H`。
    fn geometry(&self, in_hw: (usize, usize)) -> (ConvGeometry, (usize, usize)) {
        let (k, s) = (self.kernel_size, self.stride);
        let out_hw = (in_hw.0 * s, in_hw.1 * s);
        let (_, pad_h) = same_padding(out_hw.0, k, s);
        let (_, pad_w) = same_padding(out_hw.1, k, s);
        let geometry = ConvGeometry {
            kernel: k,
            stride: s,
            pad: (pad_h, pad_w),
        };
        (geometry, out_hw)
    }

    pub fn forward(&self, x: &Tensor) -> Result<(Tensor, ConvTranspose2dCache), NnError> {
        let x4 = x.view4()?;
        let (batch_size, _, in_h, in_w) = x4.dim();
        check_shape(
            x,
            &[batch_size, self.in_channels, in_h, in_w],
            "ConvTranspose2d 输入",
        )?;

        let (geometry, out_hw) = self.geometry((in_h, in_w));
        let mut y = conv2d_input_grad(x4, self.kernel.view4()?, geometry, out_hw);
        if let Some(bias) = &self.bias {
            add_channel_bias(&mut y, bias)?;
        }

        let cache = ConvTranspose2dCache {
            input: x.clone(),
            geometry,
            out_hw,
        };
        Ok((Tensor::from(y.into_dyn()), cache))
    }

    /// 反向传播，返回 (dL/dx, [dL/dK, dL/db])
    pub fn backward(
        &self,
        cache: &ConvTranspose2dCache,
        grad: &Tensor,
    ) -> Result<(Tensor, Vec<Tensor>), NnError> {
        Ok((self.input_grad(cache, grad)?, self.param_grads(cache, grad)?))
    }

    /// 只计算对输入的梯度（即对上游梯度做一次普通卷积）
    pub fn input_grad(
        &self,
        cache: &ConvTranspose2dCache,
        grad: &Tensor,
    ) -> Result<Tensor, NnError> {
        self.check_grad(cache, grad)?;
        let input_shape = cache.input.shape();
        let dx = conv2d(
            grad.view4()?,
            self.kernel.view4()?,
            cache.geometry,
            (input_shape[2], input_shape[3]),
        );
        Ok(Tensor::from(dx.into_dyn()))
    }

    /// 只计算参数梯度，顺序与`parameters()`一致
    pub fn param_grads(
        &self,
        cache: &ConvTranspose2dCache,
        grad: &Tensor,
    ) -> Result<Vec<Tensor>, NnError> {
        self.check_grad(cache, grad)?;
        let dy = grad.view4()?;
        // 对应卷积的输入是上游梯度，输出是本层输入
        let dk = conv2d_kernel_grad(dy, cache.input.view4()?, cache.geometry);

        let mut grads = vec![Tensor::from(dk.into_dyn())];
        if self.bias.is_some() {
            grads.push(channel_bias_grad(dy));
        }
        Ok(grads)
    }

    fn check_grad(&self, cache: &ConvTranspose2dCache, grad: &Tensor) -> Result<(), NnError> {
        check_shape(
            grad,
            &[
                cache.input.batch_size(),
                self.out_channels,
                cache.out_hw.0,
                cache.out_hw.1,
            ],
            "ConvTranspose2d 上游梯度",
        )
    }

    pub const fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub const fn out_channels(&self) -> usize {
        self.out_channels
    }

    pub fn kernel(&self) -> &Tensor {
        &self.kernel
    }
}

impl Module for ConvTranspose2d {
    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = vec![&self.kernel];
        params.extend(self.bias.as_ref());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = vec![&mut self.kernel];
        params.extend(self.bias.as_mut());
        params
    }
}
