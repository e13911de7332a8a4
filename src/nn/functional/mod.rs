//! 无状态的数值内核：卷积、激活函数及其反向传播
//!
//! 层（`crate::nn::layer`）负责参数与形状检查，这里只做计算，
//! 调用方需保证传入的数组形状彼此一致。

mod activation;
mod conv;

pub use activation::{leaky_relu, leaky_relu_backward, sigmoid, tanh, tanh_backward};
pub use conv::{ConvGeometry, conv2d, conv2d_input_grad, conv2d_kernel_grad, same_padding};
