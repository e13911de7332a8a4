use std::path::PathBuf;

use thiserror::Error;

use crate::errors::TensorError;

/// 图像导出相关错误
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("目录 {0} 中没有可用于合成动图的样本图")]
    NoFrames(PathBuf),
    #[error("无效的图像张量: {0}")]
    InvalidImages(String),
    #[error("图像编解码失败: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tensor(#[from] TensorError),
}
