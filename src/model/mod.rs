/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : MNIST DCGAN 的生成器与判别器
 *
 * 两个网络都只提供纯函数式的前向/反向接口：
 * - `forward`返回输出与一条“磁带”（tape，各层的前向缓存）
 * - `backward`消耗磁带与上游梯度，返回按`parameters()`顺序排列的参数梯度
 *
 * 网络状态只在两处被修改：优化器更新参数，以及生成器在每步训练后更新 BatchNorm 的滑动统计量。
 */

mod discriminator;
mod generator;

#[cfg(test)]
mod tests;

pub use discriminator::{Discriminator, DiscriminatorTape};
pub use generator::{Generator, GeneratorTape};

/// 单张图像的形状 [C, H, W]
pub const IMAGE_SHAPE: [usize; 3] = [1, 28, 28];
/// 两个网络共用的卷积核边长
pub const KERNEL_SIZE: usize = 5;
/// LeakyReLU 负半轴斜率的默认值
pub const DEFAULT_LEAKY_SLOPE: f32 = 0.3;

/// 一批图像的形状 [N, C, H, W]
pub fn image_batch_shape(batch_size: usize) -> [usize; 4] {
    [batch_size, IMAGE_SHAPE[0], IMAGE_SHAPE[1], IMAGE_SHAPE[2]]
}
