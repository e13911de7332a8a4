//! 数据加载模块
//!
//! 提供 MNIST 图像的加载、归一化和按轮打乱的批处理。
//!
//! # 主要组件
//!
//! - [`DataLoader`]: 每次迭代重新打乱的图像批量加载器
//! - [`MnistDataset`]: MNIST 手写数字数据集（只取图像，丢弃标签）
//! - [`transforms`]: 像素与 [-1, 1] 区间之间的互相转换
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use mnist_dcgan::data::{DataLoader, MnistDataset};
//!
//! let dataset = MnistDataset::load(None, true)?;
//! let loader = DataLoader::new(dataset.into_images(), 256)?.shuffle(true);
//!
//! for real_batch in loader.iter(&mut rng) {
//!     session.train_step(&real_batch)?;
//! }
//! ```

mod dataloader;
pub mod datasets;
pub mod download;
pub mod error;
pub mod transforms;

#[cfg(test)]
mod tests;

// Re-exports
pub use dataloader::{DataLoader, DataLoaderIterator};
pub use datasets::{MnistDataset, default_data_dir};
pub use error::DataError;
