//! 样本网格图

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use tracing::debug;

use super::{Vision, VisionError};
use crate::data::transforms::denormalize_pixels;
use crate::tensor::Tensor;

/// 逐轮样本图的文件名前缀，动图只收集以此开头的文件
pub const EPOCH_IMAGE_PREFIX: &str = "image_at_epoch_";
/// 相邻图像之间（以及四周）的黑色间隔，单位为放大后的像素
const GUTTER: u32 = 2;
/// 最近邻放大倍数
const UPSCALE: u32 = 4;

/// 四位编号能表示的最大轮数；超过后文件名的字典序与轮数顺序不再一致
pub const MAX_EPOCH: usize = 9999;

/// 第`epoch`轮样本图的路径：`image_at_epoch_{epoch:04}.png`
pub fn epoch_image_path(dir: &Path, epoch: usize) -> PathBuf {
    dir.join(format!("{EPOCH_IMAGE_PREFIX}{epoch:04}.png"))
}

impl Vision {
    /// 把一批 [N, 1, H, W]、值域 [-1, 1] 的图像拼成一张灰度网格图
    ///
    /// # 参数
    /// - `images`: 图像张量，像素按`p * 127.5 + 127.5`还原并截断到 [0, 255]
    /// - `columns`: 每行的图像数量，行数按需向上取整
    pub fn to_grid_image(images: &Tensor, columns: usize) -> Result<GrayImage, VisionError> {
        let (n, channels, height, width) = images.view4()?.dim();
        if n == 0 || channels != 1 || columns == 0 {
            return Err(VisionError::InvalidImages(format!(
                "期望形状为 [N>0, 1, H, W] 的灰度图像、每行至少 1 张，实际形状 {:?}、每行 {columns} 张",
                images.shape()
            )));
        }

        let pixels = denormalize_pixels(images);
        let pixels = pixels.view4()?;
        let rows = n.div_ceil(columns);
        let cell_w = width as u32 * UPSCALE;
        let cell_h = height as u32 * UPSCALE;
        let canvas_w = columns as u32 * (cell_w + GUTTER) + GUTTER;
        let canvas_h = rows as u32 * (cell_h + GUTTER) + GUTTER;

        let mut canvas = GrayImage::new(canvas_w, canvas_h);
        for i in 0..n {
            let left = GUTTER + (i % columns) as u32 * (cell_w + GUTTER);
            let top = GUTTER + (i / columns) as u32 * (cell_h + GUTTER);
            for y in 0..height {
                for x in 0..width {
                    let luma = Luma([pixels[[i, 0, y, x]].round() as u8]);
                    for dy in 0..UPSCALE {
                        for dx in 0..UPSCALE {
                            let px = left + x as u32 * UPSCALE + dx;
                            let py = top + y as u32 * UPSCALE + dy;
                            canvas.put_pixel(px, py, luma);
                        }
                    }
                }
            }
        }
        Ok(canvas)
    }

    /// 把网格图保存为 PNG（必要时创建父目录）
    pub fn save_image_grid(
        images: &Tensor,
        columns: usize,
        path: &Path,
    ) -> Result<(), VisionError> {
        let canvas = Self::to_grid_image(images, columns)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        canvas.save(path)?;
        debug!("已保存样本图 {}", path.display());
        Ok(())
    }
}
