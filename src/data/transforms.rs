//! 数据变换函数
//!
//! 像素值[0, 255]与网络使用的[-1, 1]区间之间的互相转换。
//! 生成器最后一层是 tanh，所以真实样本也要归一化到同一区间。

use crate::tensor::Tensor;

/// 像素中值：`(p - 127.5) / 127.5` 把[0, 255]映射到[-1, 1]
pub const PIXEL_HALF_RANGE: f32 = 127.5;

/// 将 0-255 像素值归一化到 [-1, 1]
pub fn normalize_pixels(tensor: &Tensor) -> Tensor {
    (tensor - PIXEL_HALF_RANGE) / PIXEL_HALF_RANGE
}

/// 将 [-1, 1] 区间的值还原为 0-255 像素值（越界的值会被截断）
pub fn denormalize_pixels(tensor: &Tensor) -> Tensor {
    (tensor * PIXEL_HALF_RANGE + PIXEL_HALF_RANGE).clamp(0.0, 255.0)
}
