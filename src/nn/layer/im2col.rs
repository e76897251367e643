/*
 * @Description  : im2col / col2im：卷积与转置卷积共用的展开与折叠
 *
 * 对单个样本[C, H, W]，以k×k卷积核、步长s、填充p滑窗：
 * - im2col 得到矩阵[C*k*k, H'*W']，第(c*k+i)*k+j行、第oy*W'+ox列
 *   对应输入位置(c, oy*s+i-p, ox*s+j-p)，越界处（填充区）为0；
 * - col2im 为其伴随运算：把矩阵元素累加回[C, H, W]，落入填充区的部分丢弃。
 *
 * 卷积：y = K·im2col(x)；其对x的梯度为 col2im(Kᵀ·dy)。
 * 转置卷积恰好交换二者：y = col2im(Kᵀ·x)，dx = K·im2col(dy)。
 */

use crate::nn::NnError;
use ndarray::{Array2, ArrayView2};

/// 单样本卷积的几何信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConvGeometry {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub kernel: usize,
    pub stride: usize,
    pub padding: usize,
    pub out_h: usize,
    pub out_w: usize,
}

impl ConvGeometry {
    /// 输出尺寸：H' = (H + 2p - k) / s + 1
    pub fn new(
        channels: usize,
        height: usize,
        width: usize,
        kernel: usize,
        stride: usize,
        padding: usize,
    ) -> Result<Self, NnError> {
        if stride == 0 || kernel == 0 {
            return Err(NnError::InvalidOperation(format!(
                "卷积核大小与步长必须大于0：kernel={kernel}，stride={stride}"
            )));
        }
        if height + 2 * padding < kernel || width + 2 * padding < kernel {
            return Err(NnError::InvalidOperation(format!(
                "卷积输出尺寸无效：输入 {height}x{width}，核 {kernel}x{kernel}，步长 {stride}，填充 {padding}"
            )));
        }
        let out_h = (height + 2 * padding - kernel) / stride + 1;
        let out_w = (width + 2 * padding - kernel) / stride + 1;
        Ok(Self {
            channels,
            height,
            width,
            kernel,
            stride,
            padding,
            out_h,
            out_w,
        })
    }

    /// 每个样本在输入侧的元素个数 C*H*W
    pub fn image_len(&self) -> usize {
        self.channels * self.height * self.width
    }

    /// 展开矩阵的行数 C*k*k
    pub fn col_rows(&self) -> usize {
        self.channels * self.kernel * self.kernel
    }

    /// 展开矩阵的列数 H'*W'
    pub fn col_cols(&self) -> usize {
        self.out_h * self.out_w
    }

    /// 输入位置（可能落在填充区，此时返回None）
    #[inline]
    fn source_index(&self, c: usize, i: usize, j: usize, oy: usize, ox: usize) -> Option<usize> {
        let y = (oy * self.stride + i).checked_sub(self.padding)?;
        let x = (ox * self.stride + j).checked_sub(self.padding)?;
        if y >= self.height || x >= self.width {
            return None;
        }
        Some((c * self.height + y) * self.width + x)
    }

    pub fn im2col(&self, image: &[f32]) -> Array2<f32> {
        debug_assert_eq!(image.len(), self.image_len());
        let k = self.kernel;
        let mut cols = Array2::<f32>::zeros((self.col_rows(), self.col_cols()));
        for c in 0..self.channels {
            for i in 0..k {
                for j in 0..k {
                    let row = (c * k + i) * k + j;
                    let mut col_row = cols.row_mut(row);
                    for oy in 0..self.out_h {
                        for ox in 0..self.out_w {
                            if let Some(src) = self.source_index(c, i, j, oy, ox) {
                                col_row[oy * self.out_w + ox] = image[src];
                            }
                        }
                    }
                }
            }
        }
        cols
    }

    pub fn col2im(&self, cols: ArrayView2<'_, f32>) -> Vec<f32> {
        debug_assert_eq!(cols.dim(), (self.col_rows(), self.col_cols()));
        let k = self.kernel;
        let mut image = vec![0.0f32; self.image_len()];
        for c in 0..self.channels {
            for i in 0..k {
                for j in 0..k {
                    let row = (c * k + i) * k + j;
                    let col_row = cols.row(row);
                    for oy in 0..self.out_h {
                        for ox in 0..self.out_w {
                            if let Some(dst) = self.source_index(c, i, j, oy, ox) {
                                image[dst] += col_row[oy * self.out_w + ox];
                            }
                        }
                    }
                }
            }
        }
        image
    }
}
