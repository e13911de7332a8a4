//! # MNIST DCGAN
//!
//! 用纯rust实现的深度卷积生成对抗网络（DCGAN）：在MNIST手写数字上训练生成器与判别器，
//! 每轮保存固定种子的样本图，定期保存检查点，训练结束后把样本图合成为动图。
//!
//! - [`tensor`]: 基于`ndarray`的张量
//! - [`nn`]: 层、激活、损失与Adam优化器（每层显式实现反向传播）
//! - [`model`]: 生成器与判别器
//! - [`data`]: MNIST 加载与批处理
//! - [`train`]: 损失、单步梯度、训练会话与检查点
//! - [`vision`]: 样本网格图与动图导出
//! - [`app`]: 按运行模式组装以上各部分

pub mod app;
pub mod data;
pub mod errors;
pub mod model;
pub mod nn;
pub mod tensor;
pub mod train;
pub mod utils;
pub mod vision;
