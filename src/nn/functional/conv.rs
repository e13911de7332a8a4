/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 2D 卷积的三个基本内核（im2col + 矩阵乘，batch 维用 Rayon 并行）
 *
 * 记卷积为 y = conv(x, K)，x: [N, C, H, W]，K: [O, C, k, k]，y: [N, O, OH, OW]：
 * - `conv2d`:            y = conv(x, K)
 * - `conv2d_input_grad`:  dL/dx，已知 dL/dy 与 K
 * - `conv2d_kernel_grad`: dL/dK，已知 x 与 dL/dy（跨 batch 累加）
 *
 * 转置卷积恰好是卷积对输入的梯度，因此 ConvTranspose2d 也复用这三个内核。
 */

use ndarray::{Array2, Array3, Array4, ArrayView2, ArrayView3, ArrayView4, Axis};
use rayon::prelude::*;

/// 卷积的几何参数（两个空间维度共用同一个核大小与步长）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvGeometry {
    pub kernel: usize,
    pub stride: usize,
    /// 顶部/左侧的填充量 (pad_h, pad_w)；底部/右侧的填充隐含在输出尺寸中
    pub pad: (usize, usize),
}

/// "same" 填充：输出尺寸为 ceil(input / stride)
///
/// 总填充量 max((out - 1) * stride + kernel - input, 0)，
/// 不能均分时多出的一格放在底部/右侧。
///
/// # 返回
/// (输出尺寸, 顶部/左侧填充量)
pub fn same_padding(input: usize, kernel: usize, stride: usize) -> (usize, usize) {
    let out = input.div_ceil(stride);
    let needed = (out.saturating_sub(1) * stride + kernel).saturating_sub(input);
    (out, needed / 2)
}

/// 前向卷积（不含偏置）
///
/// # 参数
/// - `x`: [N, C, H, W]
/// - `kernel`: [O, C, k, k]
/// - `out_hw`: 输出的空间尺寸
pub fn conv2d(
    x: ArrayView4<f32>,
    kernel: ArrayView4<f32>,
    geometry: ConvGeometry,
    out_hw: (usize, usize),
) -> Array4<f32> {
    let batch_size = x.len_of(Axis(0));
    let out_c = kernel.len_of(Axis(0));
    let w = kernel_matrix(kernel);

    let batch_results: Vec<Array2<f32>> = (0..batch_size)
        .into_par_iter()
        .map(|b| {
            let cols = im2col(x.index_axis(Axis(0), b), geometry, out_hw);
            w.dot(&cols)
        })
        .collect();

    stack_samples(&batch_results, out_c, out_hw)
}

/// 卷积对输入的梯度
///
/// # 参数
/// - `grad`: dL/dy，[N, O, OH, OW]
/// - `kernel`: [O, C, k, k]
/// - `in_hw`: 卷积输入的空间尺寸
///
/// # 返回
/// dL/dx，[N, C, H, W]
pub fn conv2d_input_grad(
    grad: ArrayView4<f32>,
    kernel: ArrayView4<f32>,
    geometry: ConvGeometry,
    in_hw: (usize, usize),
) -> Array4<f32> {
    let (batch_size, out_c, out_h, out_w) = grad.dim();
    let in_c = kernel.len_of(Axis(1));
    let w_t = kernel_matrix(kernel).reversed_axes();

    let batch_results: Vec<Array3<f32>> = (0..batch_size)
        .into_par_iter()
        .map(|b| {
            let g = sample_matrix(grad.index_axis(Axis(0), b), out_c, out_h * out_w);
            let cols = w_t.dot(&g);
            col2im(cols.view(), geometry, (in_c, in_hw.0, in_hw.1), (out_h, out_w))
        })
        .collect();

    let mut dx = Array4::zeros((batch_size, in_c, in_hw.0, in_hw.1));
    for (b, sample) in batch_results.into_iter().enumerate() {
        dx.index_axis_mut(Axis(0), b).assign(&sample);
    }
    dx
}

/// 卷积对卷积核的梯度（所有样本累加）
///
/// # 参数
/// - `x`: 卷积输入，[N, C, H, W]
/// - `grad`: dL/dy，[N, O, OH, OW]
///
/// # 返回
/// dL/dK，[O, C, k, k]
pub fn conv2d_kernel_grad(
    x: ArrayView4<f32>,
    grad: ArrayView4<f32>,
    geometry: ConvGeometry,
) -> Array4<f32> {
    let (batch_size, out_c, out_h, out_w) = grad.dim();
    let in_c = x.len_of(Axis(1));
    let k = geometry.kernel;

    // dK 需要跨 batch 累加，使用 map-reduce 模式
    let total = (0..batch_size)
        .into_par_iter()
        .map(|b| {
            let cols = im2col(x.index_axis(Axis(0), b), geometry, (out_h, out_w));
            let g = sample_matrix(grad.index_axis(Axis(0), b), out_c, out_h * out_w);
            g.dot(&cols.t())
        })
        .reduce(|| Array2::zeros((out_c, in_c * k * k)), |a, b| a + b);

    Array4::from_shape_fn((out_c, in_c, k, k), |(o, c, kh, kw)| {
        total[[o, (c * k + kh) * k + kw]]
    })
}

/// 把 [O, C, k, k] 的卷积核展开成 [O, C*k*k] 的矩阵
fn kernel_matrix(kernel: ArrayView4<f32>) -> Array2<f32> {
    let (out_c, in_c, k, _) = kernel.dim();
    Array2::from_shape_fn((out_c, in_c * k * k), |(o, j)| {
        kernel[[o, j / (k * k), (j / k) % k, j % k]]
    })
}

/// 把单个样本 [C, H, W] 按行优先展开成 [C, H*W] 的矩阵
fn sample_matrix(sample: ArrayView3<f32>, rows: usize, cols: usize) -> Array2<f32> {
    let width = sample.len_of(Axis(2));
    Array2::from_shape_fn((rows, cols), |(r, c)| sample[[r, c / width, c % width]])
}

/// 把单个样本展开成列矩阵 [C*k*k, OH*OW]，越界（填充）位置为 0
fn im2col(x: ArrayView3<f32>, geometry: ConvGeometry, out_hw: (usize, usize)) -> Array2<f32> {
    let (in_c, in_h, in_w) = x.dim();
    let (out_h, out_w) = out_hw;
    let k = geometry.kernel;
    let mut cols = Array2::zeros((in_c * k * k, out_h * out_w));

    for ci in 0..in_c {
        for kh in 0..k {
            for kw in 0..k {
                let row = (ci * k + kh) * k + kw;
                for oh in 0..out_h {
                    let Some(ih) = source_index(oh, kh, geometry.stride, geometry.pad.0, in_h)
                    else {
                        continue;
                    };
                    for ow in 0..out_w {
                        if let Some(iw) =
                            source_index(ow, kw, geometry.stride, geometry.pad.1, in_w)
                        {
                            cols[[row, oh * out_w + ow]] = x[[ci, ih, iw]];
                        }
                    }
                }
            }
        }
    }
    cols
}

/// `im2col`的逆过程：把列矩阵累加回 [C, H, W]
fn col2im(
    cols: ArrayView2<f32>,
    geometry: ConvGeometry,
    in_shape: (usize, usize, usize),
    out_hw: (usize, usize),
) -> Array3<f32> {
    let (in_c, in_h, in_w) = in_shape;
    let (out_h, out_w) = out_hw;
    let k = geometry.kernel;
    let mut x = Array3::zeros(in_shape);

    for ci in 0..in_c {
        for kh in 0..k {
            for kw in 0..k {
                let row = (ci * k + kh) * k + kw;
                for oh in 0..out_h {
                    let Some(ih) = source_index(oh, kh, geometry.stride, geometry.pad.0, in_h)
                    else {
                        continue;
                    };
                    for ow in 0..out_w {
                        if let Some(iw) =
                            source_index(ow, kw, geometry.stride, geometry.pad.1, in_w)
                        {
                            x[[ci, ih, iw]] += cols[[row, oh * out_w + ow]];
                        }
                    }
                }
            }
        }
    }
    x
}

/// 输出位置`out`、核偏移`offset`对应的输入下标；落在填充区时返回 None
fn source_index(
    out: usize,
    offset: usize,
    stride: usize,
    pad: usize,
    len: usize,
) -> Option<usize> {
    (out * stride + offset)
        .checked_sub(pad)
        .filter(|&i| i < len)
}

/// 把每个样本的 [O, OH*OW] 结果拼成 [N, O, OH, OW]
fn stack_samples(samples: &[Array2<f32>], out_c: usize, out_hw: (usize, usize)) -> Array4<f32> {
    let (out_h, out_w) = out_hw;
    let mut y = Array4::zeros((samples.len(), out_c, out_h, out_w));
    for (b, sample) in samples.iter().enumerate() {
        for ((o, pos), &v) in sample.indexed_iter() {
            y[[b, o, pos / out_w, pos % out_w]] = v;
        }
    }
    y
}
