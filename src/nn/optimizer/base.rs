/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 优化器基础 trait
 */

use crate::nn::NnError;
use crate::tensor::Tensor;

/// 优化器核心 trait
pub trait Optimizer {
    /// 参数更新（使用已计算好的梯度）
    ///
    /// 训练循环：
    /// ```ignore
    /// let (loss, grads) = compute_gradients(&model, &batch)?;
    /// optimizer.step(model.parameters_mut(), &grads)?;
    /// ```
    ///
    /// `params`与`grads`按下标一一对应，数量和每个张量的形状都必须一致，
    /// 且每次调用时参数的顺序不能改变（优化器按下标保存累积状态）。
    fn step(&mut self, params: Vec<&mut Tensor>, grads: &[Tensor]) -> Result<(), NnError>;

    /// 获取学习率
    fn learning_rate(&self) -> f32;
}
