/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Conv2d (2D 卷积) 层
 *
 * 输入/输出形状：
 * - 输入：[batch_size, in_channels, H, W]
 * - 输出：[batch_size, out_channels, H', W']
 *
 * 统一使用 same 填充：H' = ceil(H / stride)，
 * 需要补的零按 顶部/左侧 = 总数 / 2、其余补在底部/右侧 分配。
 *
 * 计算：output = conv2d(x, K) + b
 */

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{add_channel_bias, channel_bias_grad};
use crate::nn::functional::{
    ConvGeometry, conv2d, conv2d_input_grad, conv2d_kernel_grad, same_padding,
};
use crate::nn::{Init, Module, NnError, check_shape};
use crate::tensor::Tensor;

/// Conv2d (2D 卷积) 层
///
/// # 使用示例
/// ```ignore
/// let conv = Conv2d::new(1, 64, 5, 2, true, &mut rng);
/// let (h, cache) = conv.forward(&x)?;  // [N, 1, 28, 28] -> [N, 64, 14, 14]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conv2d {
    /// 卷积核参数 [out_channels, in_channels, kernel, kernel]
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
pub struct Conv2dCache {
    input: Tensor,
    geometry: ConvGeometry,
    out_hw: (usize, usize),
}

impl Conv2d {
    /// 创建新的 Conv2d 层
    ///
    /// # 参数
    /// - `in_channels`: 输入通道数
    /// - `out_channels`: 输出通道数
    /// - `kernel_size`: 正方形卷积核边长
    /// - `stride`: 两个空间维度共用的步长（须大于 0）
    /// - `use_bias`: 是否使用偏置
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
            fan_in: in_channels * receptive_field,
            fan_out: out_channels * receptive_field,
        }
        .generate(&[out_channels, in_channels, kernel_size, kernel_size], rng);
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

    /// 根据输入的空间尺寸计算卷积几何参数与输出尺寸
    fn geometry(&self, in_hw: (usize, usize)) -> (ConvGeometry, (usize, usize)) {
        let (out_h, pad_h) = same_padding(in_hw.0, self.kernel_size, self.stride);
        let (out_w, pad_w) = same_padding(in_hw.1, self.kernel_size, self.stride);
        let geometry = ConvGeometry {
            kernel: self.kernel_size,
            stride: self.stride,
            pad: (pad_h, pad_w),
        };
        (geometry, (out_h, out_w))
    }

    pub fn forward(&self, x: &Tensor) -> Result<(Tensor, Conv2dCache), NnError> {
        let x4 = x.view4()?;
        let (batch_size, _, in_h, in_w) = x4.dim();
        check_shape(x, &[batch_size, self.in_channels, in_h, in_w], "Conv2d 输入")?;

        let (geometry, out_hw) = self.geometry((in_h, in_w));
        let mut y = conv2d(x4, self.kernel.view4()?, geometry, out_hw);
        if let Some(bias) = &self.bias {
            add_channel_bias(&mut y, bias)?;
        }

        let cache = Conv2dCache {
            input: x.clone(),
            geometry,
            out_hw,
        };
        Ok((Tensor::from(y.into_dyn()), cache))
    }

    /// 反向传播，返回 (dL/dx, [dL/dK, dL/db])
    pub fn backward(
        &self,
        cache: &Conv2dCache,
        grad: &Tensor,
    ) -> Result<(Tensor, Vec<Tensor>), NnError> {
        Ok((self.input_grad(cache, grad)?, self.param_grads(cache, grad)?))
    }

    /// 只计算对输入的梯度
    pub fn input_grad(&self, cache: &Conv2dCache, grad: &Tensor) -> Result<Tensor, NnError> {
        self.check_grad(cache, grad)?;
        let input_shape = cache.input.shape();
        let dx = conv2d_input_grad(
            grad.view4()?,
            self.kernel.view4()?,
            cache.geometry,
            (input_shape[2], input_shape[3]),
        );
        Ok(Tensor::from(dx.into_dyn()))
    }

    /// 只计算参数梯度，顺序与`parameters()`一致
    pub fn param_grads(&self, cache: &Conv2dCache, grad: &Tensor) -> Result<Vec<Tensor>, NnError> {
        self.check_grad(cache, grad)?;
        let dy = grad.view4()?;
        let dk = conv2d_kernel_grad(cache.input.view4()?, dy, cache.geometry);

        let mut grads = vec![Tensor::from(dk.into_dyn())];
        if self.bias.is_some() {
            grads.push(channel_bias_grad(dy));
        }
        Ok(grads)
    }

    fn check_grad(&self, cache: &Conv2dCache, grad: &Tensor) -> Result<(), NnError> {
        check_shape(
            grad,
            &[
                cache.input.batch_size(),
                self.out_channels,
                cache.out_hw.0,
                cache.out_hw.1,
            ],
            "Conv2d 上游梯度",
        )
    }

    pub const fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub const fn out_channels(&self) -> usize {
        self.out_channels
    }

    pub const fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    pub const fn stride(&self) -> usize {
        self.stride
    }

    pub fn kernel(&self) -> &Tensor {
        &self.kernel
    }
}

impl Module for Conv2d {
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
