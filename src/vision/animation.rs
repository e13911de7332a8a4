/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 把逐轮样本图合成为循环播放的 GIF
 *
 * 训练早期每轮的变化大，后期变化小，因此帧按平方根间隔抽取：
 * 保留第 i 张当且仅当 round(2·√i) > round(2·√上一张保留的下标)，
 * 最后一张再重复一次，作为停留的结尾帧。
 */

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use tracing::info;

use super::{EPOCH_IMAGE_PREFIX, VisionError};

/// 每帧的停留时间
const FRAME_DELAY_MS: u32 = 100;

/// 从`count`个按顺序排列的帧中选出要保留的下标（不含重复的结尾帧）
///
/// 例如`count = 11`时保留 {0, 1, 2, 4, 6, 8}。
pub fn select_frames(count: usize) -> Vec<usize> {
    let mut last: i64 = -1;
    let mut kept = Vec::new();
    for i in 0..count {
        let frame = (2.0 * (i as f64).sqrt()).round() as i64;
        if frame > last {
            kept.push(i);
            last = frame;
        }
    }
    kept
}

/// 收集目录中所有`image_at_epoch_*.png`，按文件名排序
pub fn collect_epoch_images(dir: &Path) -> Result<Vec<PathBuf>, VisionError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(EPOCH_IMAGE_PREFIX) && name.ends_with(".png"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// 用`image_dir`中的逐轮样本图合成无限循环的 GIF
///
/// # 返回
/// 写入的帧数（含重复的结尾帧）
pub fn write_animation(image_dir: &Path, output: &Path) -> Result<usize, VisionError> {
    let files = collect_epoch_images(image_dir)?;
    let Some(last_file) = files.last() else {
        return Err(VisionError::NoFrames(image_dir.to_path_buf()));
    };

    let mut frames: Vec<&PathBuf> = select_frames(files.len())
        .into_iter()
        .map(|i| &files[i])
        .collect();
    frames.push(last_file);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut encoder = GifEncoder::new(BufWriter::new(File::create(output)?));
    encoder.set_repeat(Repeat::Infinite)?;
    for path in &frames {
        let buffer = image::open(path)?.to_rgba8();
        let delay = Delay::from_numer_denom_ms(FRAME_DELAY_MS, 1);
        encoder.encode_frame(Frame::from_parts(buffer, 0, 0, delay))?;
    }

    info!("已用 {} 帧生成动图 {}", frames.len(), output.display());
    Ok(frames.len())
}
