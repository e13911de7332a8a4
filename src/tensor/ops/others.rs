use crate::tensor::Tensor;

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1]`的张量
    fn from(scalar: f32) -> Self {
        Self::new(&[scalar], &[1])
    }
}

impl Tensor {
    /// 对每个元素执行`f`，返回新张量
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Self {
        Self {
            data: self.data.mapv(f),
        }
    }

    /// 对每个元素原地执行`f`
    pub fn map_inplace<F: Fn(f32) -> f32>(&mut self, f: F) {
        self.data.mapv_inplace(f);
    }

    /// 对张量中的所有元素求和
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 所有元素的均值，空张量返回0
    pub fn mean(&self) -> f32 {
        self.data.mean().unwrap_or(0.0)
    }

    pub fn sqrt(&self) -> Self {
        self.map(f32::sqrt)
    }

    pub fn square(&self) -> Self {
        self.map(|x| x * x)
    }

    /// 绝对值最大的元素的绝对值
    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0, |acc, &x| acc.max(x.abs()))
    }

    /// 是否所有元素都是有限值（非NaN、非无穷）
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// 把每个元素限制在[min, max]闭区间内
    pub fn clamp(&self, min: f32, max: f32) -> Self {
        self.map(|x| x.clamp(min, max))
    }
}
