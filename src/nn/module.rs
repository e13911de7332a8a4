/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : Module trait 定义
 */

use crate::tensor::Tensor;

/// 模块 trait
///
/// # 设计原则
/// - `forward()`/`backward()` **不是** trait 方法（签名各异：有的需要运行模式，有的需要随机源）
/// - `parameters()`与`parameters_mut()`的顺序必须一致，
///   且与`backward()`返回的梯度顺序一致，优化器按下标把梯度对应到参数上
/// - 不可训练的状态（如 BatchNorm 的滑动均值）不属于参数
pub trait Module {
    /// 获取所有可训练参数
    fn parameters(&self) -> Vec<&Tensor>;

    /// 获取所有可训练参数的可变引用（供优化器更新）
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// 获取参数（标量）总数
    fn num_params(&self) -> usize {
        self.parameters().iter().map(|p| p.size()).sum()
    }
}
