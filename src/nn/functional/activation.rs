//! 逐元素激活函数及其梯度

use ndarray::Zip;

use crate::tensor::Tensor;

/// LeakyReLU: x > 0 时为 x，否则为 slope * x
pub fn leaky_relu(x: &Tensor, slope: f32) -> Tensor {
    x.map(|v| if v > 0.0 { v } else { slope * v })
}

/// LeakyReLU 的反向传播，`x`为前向时的输入
pub fn leaky_relu_backward(x: &Tensor, grad: &Tensor, slope: f32) -> Tensor {
    let mut dx = grad.data().clone();
    Zip::from(&mut dx)
        .and(x.data())
        .for_each(|g, &v| {
            if v <= 0.0 {
                *g *= slope;
            }
        });
    Tensor::from(dx)
}

pub fn tanh(x: &Tensor) -> Tensor {
    x.map(f32::tanh)
}

/// tanh 的反向传播，`y`为前向时的输出：dx = dy * (1 - y²)
pub fn tanh_backward(y: &Tensor, grad: &Tensor) -> Tensor {
    let mut dx = grad.data().clone();
    Zip::from(&mut dx)
        .and(y.data())
        .for_each(|g, &v| *g *= 1.0 - v * v);
    Tensor::from(dx)
}

/// 数值稳定的 sigmoid
pub fn sigmoid(x: &Tensor) -> Tensor {
    x.map(|v| {
        if v >= 0.0 {
            1.0 / (1.0 + (-v).exp())
        } else {
            let e = v.exp();
            e / (1.0 + e)
        }
    })
}
