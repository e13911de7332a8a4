/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 张量的四则运算，实现了两个张量“逐元素”（或张量与纯数）运算，并返回一个新的张量。
 *                 该运算支持以下情况：
 *                 1. 其中一个操作数为纯数而另一个为张量：则返回的张量形状与该张量相同。
 *                 2. 两个操作数均为张量：支持 NumPy 风格的广播（broadcasting）。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

macro_rules! impl_tensor_binary_op {
    ($trait:ident, $method:ident, $op:tt, $operator:expr) => {
        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 op （不）带引用的张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl<'b> $trait<&'b Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: &'b Tensor) -> Tensor {
                assert_broadcastable(self, other, $operator);
                Tensor {
                    data: &self.data $op &other.data,
                }
            }
        }
        impl $trait<Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                &self $op &other
            }
        }
        impl<'b> $trait<&'b Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: &'b Tensor) -> Tensor {
                &self $op other
            }
        }
        impl $trait<Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                self $op &other
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 op （不）带引用的张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓张量与纯数↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl $trait<f32> for &Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                Tensor {
                    data: &self.data $op scalar,
                }
            }
        }
        impl $trait<f32> for Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                Tensor {
                    data: self.data $op scalar,
                }
            }
        }
        impl<'a> $trait<&'a Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: &'a Tensor) -> Tensor {
                Tensor {
                    data: self $op &tensor.data,
                }
            }
        }
        impl $trait<Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: Tensor) -> Tensor {
                self $op &tensor
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑张量与纯数↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
    };
}

impl_tensor_binary_op!(Add, add, +, Operator::Add);
impl_tensor_binary_op!(Sub, sub, -, Operator::Sub);
impl_tensor_binary_op!(Mul, mul, *, Operator::Mul);
impl_tensor_binary_op!(Div, div, /, Operator::Div);

// 自运算要求两个张量形状严格一致
impl<'a> AddAssign<&'a Tensor> for Tensor {
    fn add_assign(&mut self, other: &'a Tensor) {
        assert_same_shape(self, other, Operator::AddAssign);
        self.data += &other.data;
    }
}
impl<'a> SubAssign<&'a Tensor> for Tensor {
    fn sub_assign(&mut self, other: &'a Tensor) {
        assert_same_shape(self, other, Operator::SubAssign);
        self.data -= &other.data;
    }
}
impl MulAssign<f32> for Tensor {
    fn mul_assign(&mut self, scalar: f32) {
        self.data *= scalar;
    }
}
impl DivAssign<f32> for Tensor {
    fn div_assign(&mut self, scalar: f32) {
        self.data /= scalar;
    }
}

/// 广播规则：从右向左对齐维度，每个维度必须相等或其中一个为1
fn can_broadcast(shape_1: &[usize], shape_2: &[usize]) -> bool {
    shape_1
        .iter()
        .rev()
        .zip(shape_2.iter().rev())
        .all(|(&a, &b)| a == b || a == 1 || b == 1)
}

fn assert_broadcastable(tensor_1: &Tensor, tensor_2: &Tensor, operator: Operator) {
    assert!(
        can_broadcast(tensor_1.shape(), tensor_2.shape()),
        "{}",
        TensorError::OperatorError {
            operator,
            tensor1_shape: tensor_1.shape().to_vec(),
            tensor2_shape: tensor_2.shape().to_vec(),
        }
    );
}

fn assert_same_shape(tensor_1: &Tensor, tensor_2: &Tensor, operator: Operator) {
    assert!(
        tensor_1.is_same_shape(tensor_2),
        "{}",
        TensorError::OperatorError {
            operator,
            tensor1_shape: tensor_1.shape().to_vec(),
            tensor2_shape: tensor_2.shape().to_vec(),
        }
    );
}
