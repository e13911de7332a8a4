/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : DataLoader - 图像批量加载器
 *
 * 提供统一的数据迭代 API，支持：
 * - 自动分批 (batch_size)
 * - 每次调用 iter() 都重新打乱 (shuffle)
 * - 保留最后一个不完整的批次
 */

use ndarray::Axis;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::data::DataError;
use crate::tensor::Tensor;

/// DataLoader - 图像批量加载器
///
/// 与训练循环的约定：每轮（epoch）调用一次 [`DataLoader::iter`]，
/// 打乱使用调用方传入的随机源，因此同一种子下整个训练过程可复现。
///
/// # 示例
/// ```ignore
/// let loader = DataLoader::new(images, 256)?.shuffle(true);
/// for epoch in 0..epochs {
///     for batch in loader.iter(&mut rng) {
///         session.train_step(&batch)?;
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DataLoader {
    images: Tensor,
    len: usize,
    batch_size: usize,
    shuffle: bool,
}

impl DataLoader {
    /// 创建新的 DataLoader
    ///
    /// # 参数
    /// - `images`: 图像张量，第一维为样本数
    /// - `batch_size`: 批大小，必须大于 0
    pub fn new(images: Tensor, batch_size: usize) -> Result<Self, DataError> {
        if batch_size == 0 {
            return Err(DataError::InvalidArgument(
                "DataLoader: batch_size 必须大于 0".to_string(),
            ));
        }
        if images.dimension() == 0 {
            return Err(DataError::InvalidArgument(
                "DataLoader: 图像张量至少需要 1 个维度".to_string(),
            ));
        }
        let len = images.batch_size();
        Ok(Self {
            images,
            len,
            batch_size,
            shuffle: false,
        })
    }

    /// 设置是否打乱数据
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 获取批次数量
    pub fn num_batches(&self) -> usize {
        self.len.div_ceil(self.batch_size)
    }

    /// 获取数据集大小
    pub fn len(&self) -> usize {
        self.len
    }

    /// 检查是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 创建一轮的迭代器，需要打乱时会用`rng`重新生成样本顺序
    pub fn iter<R: Rng + ?Sized>(&self, rng: &mut R) -> DataLoaderIterator<'_> {
        let mut indices: Vec<usize> = (0..self.len).collect();
        if self.shuffle {
            indices.shuffle(rng);
        }

        DataLoaderIterator {
            loader: self,
            indices,
            current_batch: 0,
        }
    }
}

/// DataLoader 迭代器
pub struct DataLoaderIterator<'a> {
    loader: &'a DataLoader,
    indices: Vec<usize>,
    current_batch: usize,
}

impl Iterator for DataLoaderIterator<'_> {
    type Item = Tensor;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.loader.len;
        let batch_size = self.loader.batch_size;
        let start = self.current_batch * batch_size;

        if start >= n {
            return None;
        }

        let end = (start + batch_size).min(n);
        self.current_batch += 1;

        let batch_indices = &self.indices[start..end];
        Some(Tensor::from(
            self.loader.images.data().select(Axis(0), batch_indices),
        ))
    }
}
