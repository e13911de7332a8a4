//! MNIST 手写数字数据集（训练集）
//!
//! 支持：
//! - IDX 二进制格式解析（支持 .gz 压缩）
//! - 像素归一化 (0-255 → [-1, 1])
//! - 可选自动下载（含 MD5 校验）
//!
//! GAN 训练只需要图像，标签文件不会被读取。

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use ndarray::Axis;
use tracing::info;

use crate::data::download::download_file;
use crate::data::error::DataError;
use crate::data::transforms::normalize_pixels;
use crate::tensor::Tensor;

/// MNIST 下载地址（使用 AWS S3 镜像，原官网 yann.lecun.com 不稳定）
const MNIST_BASE_URL: &str = "https://ossci-datasets.s3.amazonaws.com/mnist/";

/// 训练集图像文件名
const TRAIN_IMAGES_FILE: &str = "train-images-idx3-ubyte";
/// 训练集图像 .gz 包的 MD5
const TRAIN_IMAGES_MD5: &str = "f68b3c2dcbeaaa9fbdd348bbdeb94873";

/// IDX 图像文件的 magic number
const IDX_IMAGES_MAGIC: u32 = 2051;

/// 图像边长
pub const IMAGE_SIDE: usize = 28;

/// MNIST 手写数字数据集
///
/// 训练集 60,000 张，每张是 28x28 的灰度图像。
#[derive(Debug, Clone)]
pub struct MnistDataset {
    /// 图像数据 [N, 1, 28, 28]，值域 [-1, 1]
    images: Tensor,
    /// 样本数量
    len: usize,
}

impl MnistDataset {
    /// 加载训练集图像
    ///
    /// # 参数
    /// - `root`: 数据目录，None 则使用默认 (~/.cache/mnist_dcgan/datasets/mnist)
    /// - `download`: true=自动下载缺失文件
    ///
    /// # 返回
    /// 加载后的 MnistDataset，图像形状为 [N, 1, 28, 28]
    pub fn load(root: Option<&Path>, download: bool) -> Result<Self, DataError> {
        let data_dir = root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_data_dir().join("mnist"));

        let images_path = ensure_file(&data_dir, TRAIN_IMAGES_FILE, TRAIN_IMAGES_MD5, download)?;
        let (pixels, len) = parse_idx_images(&images_path)?;

        // 归一化像素值 [0, 255] -> [-1, 1]，并重塑为 [N, 1, 28, 28] (NCHW 格式)
        let raw = Tensor::from_vec(pixels, &[len, 1, IMAGE_SIDE, IMAGE_SIDE])
            .map_err(|e| DataError::FormatError(e.to_string()))?;
        let images = normalize_pixels(&raw);

        info!("已加载 MNIST 训练集: {len} 张图像");
        Ok(Self { images, len })
    }

    /// 只保留前`n`张图像（`n`不小于样本数时不变）
    pub fn take(self, n: usize) -> Self {
        if n >= self.len {
            return self;
        }
        let indices: Vec<usize> = (0..n).collect();
        let images = Tensor::from(self.images.data().select(Axis(0), &indices));
        Self { images, len: n }
    }

    /// 返回数据集中的样本数量
    pub fn len(&self) -> usize {
        self.len
    }

    /// 数据集是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 取出所有图像
    pub fn into_images(self) -> Tensor {
        self.images
    }
}

/// 获取默认数据目录
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mnist_dcgan")
        .join("datasets")
}

/// 确保文件存在，必要时下载
fn ensure_file(
    data_dir: &Path,
    base_name: &str,
    md5: &str,
    download: bool,
) -> Result<PathBuf, DataError> {
    // 优先检查解压后的文件
    let uncompressed_path = data_dir.join(base_name);
    if uncompressed_path.exists() {
        return Ok(uncompressed_path);
    }

    // 检查 .gz 文件
    let gz_name = format!("{base_name}.gz");
    let gz_path = data_dir.join(&gz_name);
    if gz_path.exists() {
        return Ok(gz_path);
    }

    // 文件不存在，尝试下载
    if download {
        std::fs::create_dir_all(data_dir)?;
        download_file(&format!("{MNIST_BASE_URL}{gz_name}"), &gz_path, Some(md5))?;
        Ok(gz_path)
    } else {
        Err(DataError::FileNotFound(uncompressed_path))
    }
}

/// 解析 IDX 图像文件，返回像素（0-255 的 f32）与图像数量
///
/// IDX 格式：
/// - [0-3] magic number (0x00000803 = 2051)
/// - [4-7] number of images
/// - [8-11] number of rows
/// - [12-15] number of columns
/// - [16+] pixel data (unsigned byte)
fn parse_idx_images(path: &Path) -> Result<(Vec<f32>, usize), DataError> {
    let file = File::open(path).map_err(|_| DataError::FileNotFound(path.to_path_buf()))?;
    let mut reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut header = [0u8; 16];
    reader
        .read_exact(&mut header)
        .map_err(|e| DataError::FormatError(format!("读取头部失败: {e}")))?;

    // 解析头部（大端序）
    let read_u32 = |i: usize| {
        u32::from_be_bytes([header[i], header[i + 1], header[i + 2], header[i + 3]])
    };
    let magic = read_u32(0);
    if magic != IDX_IMAGES_MAGIC {
        return Err(DataError::FormatError(format!(
            "无效的 magic number: {magic} (期望 {IDX_IMAGES_MAGIC})"
        )));
    }

    let num_images = read_u32(4) as usize;
    let num_rows = read_u32(8) as usize;
    let num_cols = read_u32(12) as usize;

    if num_rows != IMAGE_SIDE || num_cols != IMAGE_SIDE {
        return Err(DataError::FormatError(format!(
            "无效的图像尺寸: {num_rows}x{num_cols} (期望 28x28)"
        )));
    }

    let mut pixels = vec![0u8; num_images * IMAGE_SIDE * IMAGE_SIDE];
    reader
        .read_exact(&mut pixels)
        .map_err(|e| DataError::FormatError(format!("读取像素数据失败: {e}")))?;

    let data = pixels.into_iter().map(f32::from).collect();
    Ok((data, num_images))
}
