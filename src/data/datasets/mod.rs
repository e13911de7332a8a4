//! 内置数据集：MNIST 手写数字

mod mnist;

pub use mnist::{MnistDataset, default_data_dir};
