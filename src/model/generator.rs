/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 生成器：把潜在向量 [N, latent_dim] 映射为图像 [N, 1, 28, 28]
 *
 * 网络结构（括号内为单个样本的输出形状）：
 * Linear(latent_dim → 7*7*256, 无偏置) → BatchNorm → LeakyReLU       (12544)
 * → Reshape                                                          (256, 7, 7)
 * → ConvTranspose(5x5, 步长 1, same, 无偏置) → BatchNorm → LeakyReLU (128, 7, 7)
 * → ConvTranspose(5x5, 步长 2, same, 无偏置) → BatchNorm → LeakyReLU (64, 14, 14)
 * → ConvTranspose(5x5, 步长 2, same, 无偏置) → Tanh                  (1, 28, 28)
 */

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{KERNEL_SIZE, image_batch_shape};
use crate::nn::functional::{leaky_relu, leaky_relu_backward, tanh, tanh_backward};
use crate::nn::{
    BatchNorm, BatchNormCache, ConvTranspose2d, ConvTranspose2dCache, Linear, LinearCache, Mode,
    Module, NnError, check_shape,
};
use crate::tensor::Tensor;

const SEED_CHANNELS: usize = 256;
const SEED_SIDE: usize = 7;
const SEED_FEATURES: usize = SEED_CHANNELS * SEED_SIDE * SEED_SIDE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generator {
    latent_dim: usize,
    leaky_slope: f32,
    fc: Linear,
    bn0: BatchNorm,
    deconv1: ConvTranspose2d,
    bn1: BatchNorm,
    deconv2: ConvTranspose2d,
    bn2: BatchNorm,
    deconv3: ConvTranspose2d,
}

/// 生成器一次前向传播的磁带
#[derive(Debug, Clone)]
pub struct GeneratorTape {
    fc: LinearCache,
    bn0: BatchNormCache,
    pre_act0: Tensor,
    deconv1: ConvTranspose2dCache,
    bn1: BatchNormCache,
    pre_act1: Tensor,
    deconv2: ConvTranspose2dCache,
    bn2: BatchNormCache,
    pre_act2: Tensor,
    deconv3: ConvTranspose2dCache,
    output: Tensor,
}

impl Generator {
    pub fn new<R: Rng + ?Sized>(latent_dim: usize, leaky_slope: f32, rng: &mut R) -> Self {
        Self {
            latent_dim,
            leaky_slope,
            fc: Linear::new(latent_dim, SEED_FEATURES, false, rng),
            bn0: BatchNorm::new(SEED_FEATURES),
            deconv1: deconv(SEED_CHANNELS, 128, 1, rng),
            bn1: BatchNorm::new(128),
            deconv2: deconv(128, 64, 2, rng),
            bn2: BatchNorm::new(64),
            deconv3: deconv(64, 1, 2, rng),
        }
    }

    /// 前向传播
    ///
    /// # 参数
    /// - `z`: 潜在向量 [N, latent_dim]
    /// - `mode`: 训练模式下 BatchNorm 使用批次统计量
    ///
    /// # 返回
    /// (图像 [N, 1, 28, 28]，值域 (-1, 1)；磁带)
    pub fn forward(&self, z: &Tensor, mode: Mode) -> Result<(Tensor, GeneratorTape), NnError> {
        let n = z.batch_size();
        check_shape(z, &[n, self.latent_dim], "生成器输入")?;

        let (h, fc) = self.fc.forward(z)?;
        let (pre_act0, bn0) = self.bn0.forward(&h, mode)?;
        let h = leaky_relu(&pre_act0, self.leaky_slope);

        let h = h.reshape(&[n, SEED_CHANNELS, SEED_SIDE, SEED_SIDE])?;
        check_shape(&h, &[n, SEED_CHANNELS, SEED_SIDE, SEED_SIDE], "生成器 Reshape 输出")?;

        let (h, deconv1) = self.deconv1.forward(&h)?;
        check_shape(&h, &[n, 128, SEED_SIDE, SEED_SIDE], "生成器第 1 个转置卷积输出")?;
        let (pre_act1, bn1) = self.bn1.forward(&h, mode)?;
        let h = leaky_relu(&pre_act1, self.leaky_slope);

        let (h, deconv2) = self.deconv2.forward(&h)?;
        check_shape(&h, &[n, 64, 14, 14], "生成器第 2 个转置卷积输出")?;
        let (pre_act2, bn2) = self.bn2.forward(&h, mode)?;
        let h = leaky_relu(&pre_act2, self.leaky_slope);

        let (h, deconv3) = self.deconv3.forward(&h)?;
        check_shape(&h, &image_batch_shape(n), "生成器第 3 个转置卷积输出")?;
        let output = tanh(&h);

        let tape = GeneratorTape {
            fc,
            bn0,
            pre_act0,
            deconv1,
            bn1,
            pre_act1,
            deconv2,
            bn2,
            pre_act2,
            deconv3,
            output: output.clone(),
        };
        Ok((output, tape))
    }

    /// 推理：BatchNorm 使用滑动统计量，丢弃磁带
    pub fn generate(&self, z: &Tensor) -> Result<Tensor, NnError> {
        Ok(self.forward(z, Mode::Eval)?.0)
    }

    /// 反向传播，返回按`parameters()`顺序排列的参数梯度
    ///
    /// 潜在向量不需要梯度，因此第一层只计算参数梯度。
    pub fn backward(&self, tape: &GeneratorTape, grad: &Tensor) -> Result<Vec<Tensor>, NnError> {
        check_shape(grad, tape.output.shape(), "生成器上游梯度")?;
        let slope = self.leaky_slope;

        let g = tanh_backward(&tape.output, grad);
        let (g, d_deconv3) = self.deconv3.backward(&tape.deconv3, &g)?;

        let g = leaky_relu_backward(&tape.pre_act2, &g, slope);
        let (g, d_bn2) = self.bn2.backward(&tape.bn2, &g)?;
        let (g, d_deconv2) = self.deconv2.backward(&tape.deconv2, &g)?;

        let g = leaky_relu_backward(&tape.pre_act1, &g, slope);
        let (g, d_bn1) = self.bn1.backward(&tape.bn1, &g)?;
        let (g, d_deconv1) = self.deconv1.backward(&tape.deconv1, &g)?;

        let g = g.reshape(&[g.batch_size(), SEED_FEATURES])?;
        let g = leaky_relu_backward(&tape.pre_act0, &g, slope);
        let (g, d_bn0) = self.bn0.backward(&tape.bn0, &g)?;
        let d_fc = self.fc.param_grads(&tape.fc, &g)?;

        Ok([d_fc, d_bn0, d_deconv1, d_bn1, d_deconv2, d_bn2, d_deconv3]
            .into_iter()
            .flatten()
            .collect())
    }

    /// 用训练模式前向得到的批次统计量更新三个 BatchNorm 的滑动统计量
    pub fn update_moving_stats(&mut self, tape: &GeneratorTape) -> Result<(), NnError> {
        self.bn0.update_moving_stats(&tape.bn0)?;
        self.bn1.update_moving_stats(&tape.bn1)?;
        self.bn2.update_moving_stats(&tape.bn2)
    }

    pub const fn latent_dim(&self) -> usize {
        self.latent_dim
    }

    pub const fn leaky_slope(&self) -> f32 {
        self.leaky_slope
    }

    /// 所有 BatchNorm 层（用于检查滑动统计量）
    pub fn batch_norms(&self) -> [&BatchNorm; 3] {
        [&self.bn0, &self.bn1, &self.bn2]
    }
}

/// 5x5、same 填充、无偏置的转置卷积
fn deconv<R: Rng + ?Sized>(
    in_channels: usize,
    out_channels: usize,
    stride: usize,
    rng: &mut R,
) -> ConvTranspose2d {
    ConvTranspose2d::new(in_channels, out_channels, KERNEL_SIZE, stride, false, rng)
}

impl Module for Generator {
    fn parameters(&self) -> Vec<&Tensor> {
        [
            self.fc.parameters(),
            self.bn0.parameters(),
            self.deconv1.parameters(),
            self.bn1.parameters(),
            self.deconv2.parameters(),
            self.bn2.parameters(),
            self.deconv3.parameters(),
        ]
        .concat()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.fc.parameters_mut();
        params.extend(self.bn0.parameters_mut());
        params.extend(self.deconv1.parameters_mut());
        params.extend(self.bn1.parameters_mut());
        params.extend(self.deconv2.parameters_mut());
        params.extend(self.bn2.parameters_mut());
        params.extend(self.deconv3.parameters_mut());
        params
    }
}
