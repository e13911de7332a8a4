/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 本模块提供生成结果的可视化：把一批图像张量拼成样本网格图（PNG），
 *                 以及把逐轮的样本图合成为循环播放的动图（GIF）。
 *                 在本模块中，不严谨地说，“灰度”（图）等同于英文中luma、gray的概念。
 */

mod animation;
mod error;
mod grid;


pub use animation::{collect_epoch_images, select_frames, write_animation};
pub use error::VisionError;
pub use grid::{EPOCH_IMAGE_PREFIX, MAX_EPOCH, epoch_image_path};

pub struct Vision;
