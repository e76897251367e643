/*
 * @Author       : 老董
 * @Date         : 2025-12-22
 * @Description  : Conv2d (2D 卷积) 层（无偏置）
 *
 * 输入/输出形状：
 * - 输入：[batch_size, in_channels, H, W]
 * - 卷积核：[out_channels, in_channels, k, k]
 * - 输出：[batch_size, out_channels, H', W']
 *
 * 输出尺寸计算：
 * H' = (H + 2*padding - k) / stride + 1
 *
 * 计算：对每个样本 y = K·im2col(x)，使用 Rayon 在 batch 维度并行
 */

use super::im2col::ConvGeometry;
use super::{TraitLayer, accumulate_grads, expect_4d, expect_grad_shape};
use crate::context::Context;
use crate::nn::NnError;
use crate::nn::init::{Init, InitTarget};
use crate::tensor::Tensor;
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

/// 反向传播所需的缓存
struct Conv2dCache {
    geometry: ConvGeometry,
    /// 每个样本的展开矩阵 [C_in*k*k, H'*W']
    cols: Vec<Array2<f32>>,
    output_shape: Vec<usize>,
}

pub struct Conv2d {
    name: String,
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
    padding: usize,
    /// 卷积核参数 [out_channels, in_channels, k, k]
    weight: Tensor,
    cache: Option<Conv2dCache>,
}

impl Conv2d {
    /// 创建新的 Conv2d 层，卷积核使用 Kaiming 初始化
    ///
    /// # 参数
    /// - `ctx`: 执行上下文（提供随机数源）
    /// - `in_channels`/`out_channels`: 输入/输出通道数
    /// - `kernel_size`: 方形卷积核边长
    /// - `stride`/`padding`: 步长/零填充
    /// - `name`: 层名称
    pub fn new(
        ctx: &mut Context,
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
        name: &str,
    ) -> Self {
        let weight = Init::Kaiming.generate(
            &[out_channels, in_channels, kernel_size, kernel_size],
            ctx.rng(),
        );
        Self {
            name: name.to_string(),
            in_channels,
            out_channels,
            kernel_size,
            stride,
            padding,
            weight,
            cache: None,
        }
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn weight_mut(&mut self) -> &mut Tensor {
        &mut self.weight
    }

    pub const fn stride(&self) -> usize {
        self.stride
    }

    pub const fn padding(&self) -> usize {
        self.padding
    }

    /// 卷积核展平为 [out_channels, in_channels*k*k]
    fn weight_matrix(&self) -> Result<ArrayView2<'_, f32>, NnError> {
        let rows = self.out_channels;
        let cols = self.in_channels * self.kernel_size * self.kernel_size;
        ArrayView2::from_shape((rows, cols), self.weight.as_slice()).map_err(|_| {
            NnError::InvalidOperation(format!("{}的卷积核无法展平为{rows}x{cols}", self.name))
        })
    }
}

impl TraitLayer for Conv2d {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, _ctx: &Context, input: &Tensor) -> Result<Tensor, NnError> {
        let (batch_size, _, height, width) = expect_4d(&self.name, input, self.in_channels)?;
        let geometry = ConvGeometry::new(
            self.in_channels,
            height,
            width,
            self.kernel_size,
            self.stride,
            self.padding,
        )?;

        let kernel = self.weight_matrix()?;
        let sample_len = geometry.image_len();
        let data = input.as_slice();

        let batch_results: Vec<(Array2<f32>, Array2<f32>)> = (0..batch_size)
            .into_par_iter()
            .map(|b| {
                let cols = geometry.im2col(&data[b * sample_len..(b + 1) * sample_len]);
                let out = kernel.dot(&cols);
                (cols, out)
            })
            .collect();

        let output_shape = vec![batch_size, self.out_channels, geometry.out_h, geometry.out_w];
        let mut output = Vec::with_capacity(output_shape.iter().product());
        let mut cols = Vec::with_capacity(batch_size);
        for (sample_cols, out) in batch_results {
            output.extend(out.iter());
            cols.push(sample_cols);
        }

        self.cache = Some(Conv2dCache {
            geometry,
            cols,
            output_shape: output_shape.clone(),
        });
        Ok(Tensor::from_vec(output, &output_shape))
    }

    fn backward(
        &mut self,
        grad_output: &Tensor,
        param_grads: &mut [Tensor],
    ) -> Result<Tensor, NnError> {
        let cache = self
            .cache
            .as_ref()
            .ok_or_else(|| NnError::BackwardBeforeForward(self.name.clone()))?;
        expect_grad_shape(&self.name, grad_output, &cache.output_shape)?;

        let geometry = cache.geometry;
        let kernel = self.weight_matrix()?;
        let out_channels = self.out_channels;
        let out_len = out_channels * geometry.col_cols();
        let grad = grad_output.as_slice();

        let batch_results: Vec<(Array2<f32>, Vec<f32>)> = cache
            .cols
            .par_iter()
            .enumerate()
            .map(|(b, cols)| {
                let g = ArrayView2::from_shape(
                    (out_channels, geometry.col_cols()),
                    &grad[b * out_len..(b + 1) * out_len],
                )
                .expect("输出梯度切片长度已校验");
                let grad_kernel = g.dot(&cols.t());
                let grad_cols = kernel.t().dot(&g);
                (grad_kernel, geometry.col2im(grad_cols.view()))
            })
            .collect();

        let batch_size = cache.cols.len();
        let mut grad_kernel = Array2::<f32>::zeros(kernel.dim());
        let mut grad_input = Vec::with_capacity(batch_size * geometry.image_len());
        for (sample_grad_kernel, sample_grad_input) in batch_results {
            grad_kernel += &sample_grad_kernel;
            grad_input.extend(sample_grad_input);
        }

        let grad_weight = Tensor::from_vec(grad_kernel.into_raw_vec(), self.weight.shape());
        accumulate_grads(&self.name, param_grads, &[grad_weight])?;

        Ok(Tensor::from_vec(
            grad_input,
            &[batch_size, self.in_channels, geometry.height, geometry.width],
        ))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weight]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight]
    }

    fn init_target(&mut self) -> InitTarget<'_> {
        InitTarget::Convolution {
            weight: &mut self.weight,
        }
    }
}
