/*
 * @Description  : BatchNorm2d（批归一化）层
 *
 * 对输入[N, C, H, W]的每个通道，在(N, H, W)上归一化：
 *   x̂ = (x - μ) / √(σ² + eps)，y = γ·x̂ + β
 * - 训练模式：μ、σ²取当前批次（有偏方差），并以动量更新滑动均值/方差（滑动方差用无偏估计）；
 * - 推理模式：μ、σ²取滑动统计量。
 * γ（scale）、β（shift）为可训练参数；滑动统计量不是参数，不参与梯度更新。
 */

use super::{TraitLayer, accumulate_grads, expect_4d, expect_grad_shape};
use crate::context::Context;
use crate::nn::NnError;
use crate::nn::init::InitTarget;
use crate::tensor::Tensor;

struct BatchNorm2dCache {
    /// 归一化后的输入 x̂，形状同输入
    normalized: Tensor,
    /// 每个通道的 1/√(σ² + eps)
    inv_std: Vec<f32>,
    /// 前向时是否使用了批次统计量
    batch_stats: bool,
}

pub struct BatchNorm2d {
    name: String,
    num_features: usize,
    eps: f32,
    momentum: f32,
    /// γ [C]
    scale: Tensor,
    /// β [C]
    shift: Tensor,
    running_mean: Tensor,
    running_var: Tensor,
    cache: Option<BatchNorm2dCache>,
}

impl BatchNorm2d {
    /// 以默认的 eps=1e-5、momentum=0.1 创建，γ=1、β=0
    pub fn new(num_features: usize, name: &str) -> Self {
        Self::new_with_params(num_features, 1e-5, 0.1, name)
    }

    pub fn new_with_params(num_features: usize, eps: f32, momentum: f32, name: &str) -> Self {
        Self {
            name: name.to_string(),
            num_features,
            eps,
            momentum,
            scale: Tensor::ones(&[num_features]),
            shift: Tensor::zeros(&[num_features]),
            running_mean: Tensor::zeros(&[num_features]),
            running_var: Tensor::ones(&[num_features]),
            cache: None,
        }
    }

    pub fn scale(&self) -> &Tensor {
        &self.scale
    }

    pub fn shift(&self) -> &Tensor {
        &self.shift
    }

    pub fn running_mean(&self) -> &Tensor {
        &self.running_mean
    }

    pub fn running_var(&self) -> &Tensor {
        &self.running_var
    }

    /// 计算每个通道在(N, H, W)上的均值与有偏方差
    fn batch_statistics(&self, data: &[f32], batch: usize, spatial: usize) -> (Vec<f32>, Vec<f32>) {
        let count = (batch * spatial) as f32;
        let mut mean = vec![0.0f32; self.num_features];
        let mut var = vec![0.0f32; self.num_features];
        let channels = self.num_features;
        let plane = |n: usize, c: usize| {
            let start = (n * channels + c) * spatial;
            &data[start..start + spatial]
        };
        for n in 0..batch {
            for (c, m) in mean.iter_mut().enumerate() {
                *m += plane(n, c).iter().sum::<f32>();
            }
        }
        mean.iter_mut().for_each(|m| *m /= count);
        for n in 0..batch {
            for (c, v) in var.iter_mut().enumerate() {
                *v += plane(n, c).iter().map(|&x| (x - mean[c]) * (x - mean[c])).sum::<f32>();
            }
        }
        var.iter_mut().for_each(|v| *v /= count);
        (mean, var)
    }
}

impl TraitLayer for BatchNorm2d {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, ctx: &Context, input: &Tensor) -> Result<Tensor, NnError> {
        let (batch, channels, height, width) = expect_4d(&self.name, input, self.num_features)?;
        let spatial = height * width;
        let data = input.as_slice();
        let batch_stats = ctx.is_training();

        let (mean, var) = if batch_stats {
            let (mean, var) = self.batch_statistics(data, batch, spatial);
            let count = (batch * spatial) as f32;
            let m = self.momentum;
            let running_mean = self.running_mean.as_slice_mut();
            for (rm, &bm) in running_mean.iter_mut().zip(&mean) {
                *rm = (1.0 - m) * *rm + m * bm;
            }
            let running_var = self.running_var.as_slice_mut();
            for (rv, &bv) in running_var.iter_mut().zip(&var) {
                let unbiased = if count > 1.0 {
                    bv * count / (count - 1.0)
                } else {
                    bv
                };
                *rv = (1.0 - m) * *rv + m * unbiased;
            }
            (mean, var)
        } else {
            (
                self.running_mean.as_slice().to_vec(),
                self.running_var.as_slice().to_vec(),
            )
        };

        let inv_std: Vec<f32> = var.iter().map(|&v| 1.0 / (v + self.eps).sqrt()).collect();
        let scale = self.scale.as_slice();
        let shift = self.shift.as_slice();

        let mut normalized = Vec::with_capacity(data.len());
        let mut output = Vec::with_capacity(data.len());
        for n in 0..batch {
            for c in 0..channels {
                let start = (n * channels + c) * spatial;
                for &x in &data[start..start + spatial] {
                    let x_hat = (x - mean[c]) * inv_std[c];
                    normalized.push(x_hat);
                    output.push(scale[c] * x_hat + shift[c]);
                }
            }
        }

        self.cache = Some(BatchNorm2dCache {
            normalized: Tensor::from_vec(normalized, input.shape()),
            inv_std,
            batch_stats,
        });
        Ok(Tensor::from_vec(output, input.shape()))
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
        let shape = cache.normalized.shape();
        expect_grad_shape(&self.name, grad_output, shape)?;

        let (batch, channels) = (shape[0], shape[1]);
        let spatial = shape[2] * shape[3];
        let count = (batch * spatial) as f32;
        let dy = grad_output.as_slice();
        let x_hat = cache.normalized.as_slice();
        let scale = self.scale.as_slice();

        // 每个通道的 Σdy 与 Σdy·x̂，即 β 与 γ 的梯度
        let mut sum_dy = vec![0.0f32; channels];
        let mut sum_dy_xhat = vec![0.0f32; channels];
        for n in 0..batch {
            for c in 0..channels {
                let start = (n * channels + c) * spatial;
                for i in start..start + spatial {
                    sum_dy[c] += dy[i];
                    sum_dy_xhat[c] += dy[i] * x_hat[i];
                }
            }
        }

        let mut grad_input = vec![0.0f32; dy.len()];
        for n in 0..batch {
            for c in 0..channels {
                let start = (n * channels + c) * spatial;
                let k = scale[c] * cache.inv_std[c];
                for i in start..start + spatial {
                    grad_input[i] = if cache.batch_stats {
                        k * (dy[i] - sum_dy[c] / count - x_hat[i] * sum_dy_xhat[c] / count)
                    } else {
                        k * dy[i]
                    };
                }
            }
        }

        accumulate_grads(
            &self.name,
            param_grads,
            &[
                Tensor::from_vec(sum_dy_xhat, &[channels]),
                Tensor::from_vec(sum_dy, &[channels]),
            ],
        )?;

        Ok(Tensor::from_vec(grad_input, shape))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.scale, &self.shift]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.scale, &mut self.shift]
    }

    fn init_target(&mut self) -> InitTarget<'_> {
        InitTarget::Normalization {
            scale: &mut self.scale,
            shift: &mut self.shift,
        }
    }
}
