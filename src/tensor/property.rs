/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 本类仅包含一些属性及形状相关的方法，不包含任何运算方法
 */

use super::Tensor;
use crate::errors::TensorError;
use ndarray::{
    ArrayD, ArrayView1, ArrayView2, ArrayView3, ArrayView4, ArrayViewD, ArrayViewMutD, Ix1, Ix2,
    Ix3, Ix4,
};

impl Tensor {
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓快照/view(_mut)↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }
    pub fn view_mut(&mut self) -> ArrayViewMutD<'_, f32> {
        self.data.view_mut()
    }

    /// 以向量视图访问，张量必须是1维
    pub fn view1(&self) -> Result<ArrayView1<'_, f32>, TensorError> {
        self.data
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|_| self.dimension_mismatch(1))
    }

    /// 以矩阵视图访问，张量必须是2维
    pub fn view2(&self) -> Result<ArrayView2<'_, f32>, TensorError> {
        self.data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| self.dimension_mismatch(2))
    }

    pub fn view3(&self) -> Result<ArrayView3<'_, f32>, TensorError> {
        self.data
            .view()
            .into_dimensionality::<Ix3>()
            .map_err(|_| self.dimension_mismatch(3))
    }

    /// 以[batch, C, H, W]视图访问，张量必须是4维
    pub fn view4(&self) -> Result<ArrayView4<'_, f32>, TensorError> {
        self.data
            .view()
            .into_dimensionality::<Ix4>()
            .map_err(|_| self.dimension_mismatch(4))
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑快照/view(_mut)↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub fn into_array(self) -> ArrayD<f32> {
        self.data
    }

    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]。
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的维（dim）数、阶（rank）数
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 计算张量中所有元素的数量
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 判断两个张量的形状是否严格一致。如：形状为 [1, 4]，[1, 4]和[4]是不一致的，会返回false
    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 首个维度的长度（即batch大小），标量返回0
    pub fn batch_size(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    /// 重塑为新形状，元素总数必须一致
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let incompatible = || TensorError::IncompatibleShape {
            from: self.shape().to_vec(),
            to: shape.to_vec(),
        };
        if self.size() != shape.iter().product::<usize>() {
            return Err(incompatible());
        }
        // 非标准内存布局（如转置后的视图）需先整理成连续内存
        let data = self.data.as_standard_layout().into_owned();
        data.into_shape(shape)
            .map(|data| Self { data })
            .map_err(|_| incompatible())
    }

    /// 保留首个维度，其余维度展平：[batch, ...] -> [batch, rest]
    pub fn flatten_batch(&self) -> Result<Self, TensorError> {
        let batch = self.batch_size();
        let rest = if batch == 0 { 0 } else { self.size() / batch };
        self.reshape(&[batch, rest])
    }

    /// 转为按行优先排列的一维`Vec`
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    fn dimension_mismatch(&self, expected: usize) -> TensorError {
        TensorError::DimensionMismatch {
            expected,
            got: self.dimension(),
            shape: self.shape().to_vec(),
        }
    }
}

impl From<ArrayD<f32>> for Tensor {
    fn from(data: ArrayD<f32>) -> Self {
        Self { data }
    }
}
