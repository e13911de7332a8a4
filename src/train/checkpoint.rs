/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 检查点的保存与恢复
 *
 * 目录布局：
 * - `ckpt-{n}.bin`：完整训练状态（bincode），n 从 1 开始递增
 * - `checkpoint`：JSON 索引，记录最近一个与全部检查点的文件名
 * - `config.json`：本次训练的配置
 */

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::TrainingConfig;
use crate::model::{Discriminator, Generator};
use crate::nn::Adam;
use crate::tensor::Tensor;

const INDEX_FILE: &str = "checkpoint";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("检查点 IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("检查点编解码失败: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("检查点索引或配置文件无效: {0}")]
    Index(#[from] serde_json::Error),
    #[error("目录 {0} 中没有检查点")]
    NotFound(PathBuf),
    #[error("检查点与当前配置不兼容: {0}")]
    Incompatible(String),
}

/// 一次完整的训练状态：两个网络（含 BatchNorm 滑动统计）、两个优化器、轮数与固定种子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// 已完成的轮数
    pub epoch: usize,
    pub generator: Generator,
    pub discriminator: Discriminator,
    pub generator_optimizer: Adam,
    pub discriminator_optimizer: Adam,
    /// 每轮样本图使用的固定隐向量 [num_examples, latent_dim]
    pub sample_seed: Tensor,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CheckpointIndex {
    latest: Option<String>,
    all: Vec<String>,
}

/// 检查点目录管理器
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 以下一个编号保存检查点并更新索引，返回写入的文件路径
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<PathBuf, CheckpointError> {
        fs::create_dir_all(&self.dir)?;
        let mut index = self.read_index()?;
        let name = format!("ckpt-{}.bin", index.all.len() + 1);
        let path = self.dir.join(&name);

        let mut writer = BufWriter::new(File::create(&path)?);
        bincode::serialize_into(&mut writer, checkpoint)?;
        writer.flush()?;

        index.latest = Some(name.clone());
        index.all.push(name);
        fs::write(self.dir.join(INDEX_FILE), serde_json::to_string_pretty(&index)?)?;

        info!("第 {} 轮检查点已保存到 {}", checkpoint.epoch, path.display());
        Ok(path)
    }

    /// 最近一个检查点的路径，目录或索引不存在时返回 None
    pub fn latest_path(&self) -> Result<Option<PathBuf>, CheckpointError> {
        Ok(self
            .read_index()?
            .latest
            .map(|name| self.dir.join(name))
            .filter(|path| path.exists()))
    }

    pub fn load(&self, path: &Path) -> Result<Checkpoint, CheckpointError> {
        let reader = BufReader::new(File::open(path)?);
        let checkpoint = bincode::deserialize_from(reader)?;
        debug!("已读取检查点 {}", path.display());
        Ok(checkpoint)
    }

    /// 读取最近一个检查点
    pub fn load_latest(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        self.latest_path()?
            .map(|path| self.load(&path))
            .transpose()
    }

    /// 读取最近一个检查点，没有则报错
    pub fn require_latest(&self) -> Result<Checkpoint, CheckpointError> {
        self.load_latest()?
            .ok_or_else(|| CheckpointError::NotFound(self.dir.clone()))
    }

    /// 把训练配置写入`config.json`
    pub fn save_config(&self, config: &TrainingConfig) -> Result<PathBuf, CheckpointError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(config)?)?;
        Ok(path)
    }

    fn read_index(&self) -> Result<CheckpointIndex, CheckpointError> {
        let path = self.dir.join(INDEX_FILE);
        if !path.exists() {
            return Ok(CheckpointIndex::default());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}
