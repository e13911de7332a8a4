/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 判别器：把图像 [N, 1, 28, 28] 映射为未经 Sigmoid 的打分 [N, 1]
 *
 * 网络结构（括号内为单个样本的输出形状）：
 * Conv(5x5, 步长 2, same) → LeakyReLU → Dropout   (64, 14, 14)
 * → Conv(5x5, 步长 2, same) → LeakyReLU → Dropout (128, 7, 7)
 * → Flatten → Linear(6272 → 1)                    (1)
 */

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{IMAGE_SHAPE, KERNEL_SIZE, image_batch_shape};
use crate::nn::functional::{leaky_relu, leaky_relu_backward};
use crate::nn::{
    Conv2d, Conv2dCache, Dropout, DropoutCache, Linear, LinearCache, Mode, Module, NnError,
    check_shape,
};
use crate::tensor::Tensor;

const FEATURE_SHAPE: [usize; 3] = [128, 7, 7];
const FEATURES: usize = FEATURE_SHAPE[0] * FEATURE_SHAPE[1] * FEATURE_SHAPE[2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discriminator {
    leaky_slope: f32,
    conv1: Conv2d,
    dropout1: Dropout,
    conv2: Conv2d,
    dropout2: Dropout,
    fc: Linear,
}

/// 判别器一次前向传播的磁带
#[derive(Debug, Clone)]
pub struct DiscriminatorTape {
    conv1: Conv2dCache,
    pre_act1: Tensor,
    dropout1: DropoutCache,
    conv2: Conv2dCache,
    pre_act2: Tensor,
    dropout2: DropoutCache,
    fc: LinearCache,
    batch_size: usize,
}

impl Discriminator {
    pub fn new<R: Rng + ?Sized>(
        leaky_slope: f32,
        dropout_rate: f32,
        rng: &mut R,
    ) -> Result<Self, NnError> {
        Ok(Self {
            leaky_slope,
            conv1: conv(IMAGE_SHAPE[0], 64, rng),
            dropout1: Dropout::new(dropout_rate)?,
            conv2: conv(64, FEATURE_SHAPE[0], rng),
            dropout2: Dropout::new(dropout_rate)?,
            fc: Linear::new(FEATURES, 1, true, rng),
        })
    }

    /// 前向传播
    ///
    /// # 参数
    /// - `images`: [N, 1, 28, 28]
    /// - `mode`: 训练模式下 Dropout 生效
    /// - `rng`: Dropout 的随机源
    ///
    /// # 返回
    /// (logits [N, 1]；磁带)
    pub fn forward<R: Rng + ?Sized>(
        &self,
        images: &Tensor,
        mode: Mode,
        rng: &mut R,
    ) -> Result<(Tensor, DiscriminatorTape), NnError> {
        let n = images.batch_size();
        check_shape(images, &image_batch_shape(n), "判别器输入")?;

        let (h, conv1) = self.conv1.forward(images)?;
        check_shape(&h, &[n, 64, 14, 14], "判别器第 1 个卷积输出")?;
        let pre_act1 = h;
        let (h, dropout1) = self
            .dropout1
            .forward(&leaky_relu(&pre_act1, self.leaky_slope), mode, rng);

        let (h, conv2) = self.conv2.forward(&h)?;
        check_shape(
            &h,
            &[n, FEATURE_SHAPE[0], FEATURE_SHAPE[1], FEATURE_SHAPE[2]],
            "判别器第 2 个卷积输出",
        )?;
        let pre_act2 = h;
        let (h, dropout2) = self
            .dropout2
            .forward(&leaky_relu(&pre_act2, self.leaky_slope), mode, rng);

        let h = h.flatten_batch()?;
        let (logits, fc) = self.fc.forward(&h)?;

        let tape = DiscriminatorTape {
            conv1,
            pre_act1,
            dropout1,
            conv2,
            pre_act2,
            dropout2,
            fc,
            batch_size: n,
        };
        Ok((logits, tape))
    }

    /// 推理：Dropout 为恒等映射，不需要随机源，也不记录磁带
    pub fn decide(&self, images: &Tensor) -> Result<Tensor, NnError> {
        let n = images.batch_size();
        check_shape(images, &image_batch_shape(n), "判别器输入")?;

        let (h, _) = self.conv1.forward(images)?;
        let (h, _) = self.conv2.forward(&leaky_relu(&h, self.leaky_slope))?;
        let h = leaky_relu(&h, self.leaky_slope).flatten_batch()?;
        Ok(self.fc.forward(&h)?.0)
    }

    /// 反向传播，只返回按`parameters()`顺序排列的参数梯度
    pub fn backward(&self, tape: &DiscriminatorTape, grad: &Tensor) -> Result<Vec<Tensor>, NnError> {
        let d_fc = self.fc.param_grads(&tape.fc, grad)?;
        let g = self.features_grad(tape, grad)?;
        let (g, d_conv2) = self.conv2.backward(&tape.conv2, &g)?;
        let g = self.conv1_output_grad(tape, &g)?;
        let d_conv1 = self.conv1.param_grads(&tape.conv1, &g)?;

        Ok([d_conv1, d_conv2, d_fc].into_iter().flatten().collect())
    }

    /// 反向传播，只返回对输入图像的梯度（不计算任何参数梯度）
    ///
    /// 训练生成器时梯度需要穿过判别器，但判别器本身不更新。
    pub fn input_grad(&self, tape: &DiscriminatorTape, grad: &Tensor) -> Result<Tensor, NnError> {
        let g = self.features_grad(tape, grad)?;
        let g = self.conv2.input_grad(&tape.conv2, &g)?;
        let g = self.conv1_output_grad(tape, &g)?;
        self.conv1.input_grad(&tape.conv1, &g)
    }

    /// logits 的梯度 → 第 2 个卷积输出的梯度
    fn features_grad(&self, tape: &DiscriminatorTape, grad: &Tensor) -> Result<Tensor, NnError> {
        check_shape(grad, &[tape.batch_size, 1], "判别器上游梯度")?;
        let g = self.fc.input_grad(&tape.fc, grad)?;
        let g = g.reshape(&[
            tape.batch_size,
            FEATURE_SHAPE[0],
            FEATURE_SHAPE[1],
            FEATURE_SHAPE[2],
        ])?;
        let g = self.dropout2.backward(&tape.dropout2, &g)?;
        Ok(leaky_relu_backward(&tape.pre_act2, &g, self.leaky_slope))
    }

    /// 第 2 个卷积输入的梯度 → 第 1 个卷积输出的梯度
    fn conv1_output_grad(&self, tape: &DiscriminatorTape, grad: &Tensor) -> Result<Tensor, NnError> {
        let g = self.dropout1.backward(&tape.dropout1, grad)?;
        Ok(leaky_relu_backward(&tape.pre_act1, &g, self.leaky_slope))
    }

    pub const fn leaky_slope(&self) -> f32 {
        self.leaky_slope
    }

    pub const fn dropout_rate(&self) -> f32 {
        self.dropout1.rate()
    }
}

/// 5x5、步长 2、same 填充、带偏置的卷积
fn conv<R: Rng + ?Sized>(in_channels: usize, out_channels: usize, rng: &mut R) -> Conv2d {
    Conv2d::new(in_channels, out_channels, KERNEL_SIZE, 2, true, rng)
}

impl Module for Discriminator {
    fn parameters(&self) -> Vec<&Tensor> {
        [
            self.conv1.parameters(),
            self.conv2.parameters(),
            self.fc.parameters(),
        ]
        .concat()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.conv1.parameters_mut();
        params.extend(self.conv2.parameters_mut());
        params.extend(self.fc.parameters_mut());
        params
    }
}
