/*
 * @Description  : ConvTranspose2d (2D 转置卷积) 层（无偏置），用于生成器中的上采样
 *
 * 输入/输出形状：
 * - 输入：[batch_size, in_channels, H, W]
 * - 卷积核：[in_channels, out_channels, k, k]
 * - 输出：[batch_size, out_channels, H_out, W_out]
 *
 * 输出尺寸计算：
 * H_out = (H - 1) * stride - 2*padding + k
 *
 * 转置卷积是卷积对其输入的梯度：对每个样本 y = col2im(Kᵀ·x)，
 * 其中 col2im 的几何信息取“以y为输入、以x为输出”的那个卷积。
 */

use super::im2col::ConvGeometry;
use super::{TraitLayer, accumulate_grads, expect_4d, expect_grad_shape};
use crate::context::Context;
use crate::nn::NnError;
use crate::nn::init::{Init, InitTarget};
use crate::tensor::Tensor;
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

struct ConvTranspose2dCache {
    geometry: ConvGeometry,
    input: Tensor,
    output_shape: Vec<usize>,
}

pub struct ConvTranspose2d {
    name: String,
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    stride: usize,
    padding: usize,
    /// 卷积核参数 [in_channels, out_channels, k, k]
    weight: Tensor,
    cache: Option<ConvTranspose2dCache>,
}

impl ConvTranspose2d {
    /// 创建新的 ConvTranspose2d 层，卷积核使用 Kaiming 初始化
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
            &[in_channels, out_channels, kernel_size, kernel_size],
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

    /// 给定输入尺寸，计算输出尺寸
    pub fn output_size(&self, input_size: usize) -> Result<usize, NnError> {
        ((input_size.max(1) - 1) * self.stride + self.kernel_size)
            .checked_sub(2 * self.padding)
            .filter(|&size| size > 0 && input_size > 0)
            .ok_or_else(|| {
                NnError::InvalidOperation(format!(
                    "{}的输出尺寸无效：输入尺寸{input_size}，核{}，步长{}，填充{}",
                    self.name, self.kernel_size, self.stride, self.padding
                ))
            })
    }

    /// 卷积核展平为 [in_channels, out_channels*k*k]
    fn weight_matrix(&self) -> Result<ArrayView2<'_, f32>, NnError> {
        let rows = self.in_channels;
        let cols = self.out_channels * self.kernel_size * self.kernel_size;
        ArrayView2::from_shape((rows, cols), self.weight.as_slice()).map_err(|_| {
            NnError::InvalidOperation(format!("{}的卷积核无法展平为{rows}x{cols}", self.name))
        })
    }
}

impl TraitLayer for ConvTranspose2d {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, _ctx: &Context, input: &Tensor) -> Result<Tensor, NnError> {
        let (batch_size, _, height, width) = expect_4d(&self.name, input, self.in_channels)?;
        let out_h = self.output_size(height)?;
        let out_w = self.output_size(width)?;
        let geometry = ConvGeometry::new(
            self.out_channels,
            out_h,
            out_w,
            self.kernel_size,
            self.stride,
            self.padding,
        )?;
        debug_assert_eq!((geometry.out_h, geometry.out_w), (height, width));

        let kernel = self.weight_matrix()?;
        let in_channels = self.in_channels;
        let sample_len = in_channels * height * width;
        let data = input.as_slice();

        let batch_results: Vec<Vec<f32>> = (0..batch_size)
            .into_par_iter()
            .map(|b| {
                let x = ArrayView2::from_shape(
                    (in_channels, height * width),
                    &data[b * sample_len..(b + 1) * sample_len],
                )
                .expect("输入切片长度已校验");
                let cols = kernel.t().dot(&x);
                geometry.col2im(cols.view())
            })
            .collect();

        let output_shape = vec![batch_size, self.out_channels, out_h, out_w];
        let output: Vec<f32> = batch_results.into_iter().flatten().collect();

        self.cache = Some(ConvTranspose2dCache {
            geometry,
            input: input.clone(),
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
        let in_channels = self.in_channels;
        let batch_size = cache.output_shape[0];
        let in_len = in_channels * geometry.col_cols();
        let out_len = geometry.image_len();
        let input = cache.input.as_slice();
        let grad = grad_output.as_slice();

        let batch_results: Vec<(Array2<f32>, Array2<f32>)> = (0..batch_size)
            .into_par_iter()
            .map(|b| {
                let grad_cols = geometry.im2col(&grad[b * out_len..(b + 1) * out_len]);
                let x = ArrayView2::from_shape(
                    (in_channels, geometry.col_cols()),
                    &input[b * in_len..(b + 1) * in_len],
                )
                .expect("输入切片长度已校验");
                let grad_kernel = x.dot(&grad_cols.t());
                let grad_input = kernel.dot(&grad_cols);
                (grad_kernel, grad_input)
            })
            .collect();

        let mut grad_kernel = Array2::<f32>::zeros(kernel.dim());
        let mut grad_input = Vec::with_capacity(batch_size * in_len);
        for (sample_grad_kernel, sample_grad_input) in batch_results {
            grad_kernel += &sample_grad_kernel;
            grad_input.extend(sample_grad_input.iter());
        }

        let grad_weight = Tensor::from_vec(grad_kernel.into_raw_vec(), self.weight.shape());
        accumulate_grads(&self.name, param_grads, &[grad_weight])?;

        Ok(Tensor::from_vec(grad_input, cache.input.shape()))
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
