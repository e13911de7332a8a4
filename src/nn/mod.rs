/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 神经网络模块：层、激活函数、损失函数与优化器。
 *
 * 每个带参数的层都提供两步接口：
 * - `forward(&self, ...)` 不修改层本身，返回输出以及反向传播所需的缓存；
 * - `backward(&self, cache, upstream_grad)` 返回对输入的梯度以及按`parameters()`顺序排列的参数梯度。
 * 这样同一个网络可以对多个批次分别前向（如判别器分别处理真实图像与生成图像），
 * 各自的缓存互不干扰。
 */

mod criterion;
mod error;
pub mod functional;
mod init;
pub mod layer;
mod mode;
mod module;
pub mod optimizer;

#[cfg(test)]
mod tests;

pub use criterion::BceWithLogitsLoss;
pub use error::{NnError, check_shape};
pub use init::Init;
pub use layer::{
    BatchNorm, BatchNormCache, Conv2d, Conv2dCache, ConvTranspose2d, ConvTranspose2dCache,
    Dropout, DropoutCache, Linear, LinearCache,
};
pub use mode::Mode;
pub use module::Module;
pub use optimizer::{Adam, Optimizer};
