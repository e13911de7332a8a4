/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 网络层
 */

mod batch_norm;
mod conv2d;
mod conv_transpose2d;
mod dropout;
mod linear;

pub use batch_norm::{BatchNorm, BatchNormCache};
pub use conv2d::{Conv2d, Conv2dCache};
pub use conv_transpose2d::{ConvTranspose2d, ConvTranspose2dCache};
pub use dropout::{Dropout, DropoutCache};
pub use linear::{Linear, LinearCache};

use ndarray::{Array4, ArrayView4, Axis};

use crate::tensor::Tensor;

/// 给 [N, C, H, W] 的每个通道加上对应的偏置
fn add_channel_bias(y: &mut Array4<f32>, bias: &Tensor) -> Result<(), crate::nn::NnError> {
    for (c, &b) in bias.view1()?.iter().enumerate() {
        let mut channel = y.index_axis_mut(Axis(1), c);
        channel += b;
    }
    Ok(())
}

/// 通道偏置的梯度：对 batch 与空间维求和，得到 [C]
fn channel_bias_grad(grad: ArrayView4<f32>) -> Tensor {
    let summed = grad
        .sum_axis(Axis(3))
        .sum_axis(Axis(2))
        .sum_axis(Axis(0));
    Tensor::from(summed.into_dyn())
}
