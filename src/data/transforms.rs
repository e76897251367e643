//! 数据变换函数
//!
//! 图像样本的预处理：缩放到固定尺寸、转为[C, H, W]浮点张量、按通道归一化。

use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::tensor::Tensor;

/// 将 0-255 像素值归一化到 0-1
pub fn normalize_pixels(tensor: &Tensor) -> Tensor {
    tensor / 255.0
}

/// 将 RGB 图像转为 [3, H, W] 张量，值范围 [0, 1]
pub fn to_chw_tensor(image: &RgbImage) -> Tensor {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let mut data = vec![0.0f32; 3 * h * w];
    for (x, y, pixel) in image.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            data[(c * h + y) * w + x] = f32::from(pixel[c]);
        }
    }
    normalize_pixels(&Tensor::from_vec(data, &[3, h, w]))
}

/// 图像变换：双线性缩放到`size`×`size`，再逐元素做`(x - mean) / std`
///
/// 默认参数把[0, 1]映射到[-1, 1]，与生成器的tanh输出范围一致。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageTransform {
    pub size: u32,
    pub mean: f32,
    pub std: f32,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            size: 64,
            mean: 0.5,
            std: 0.5,
        }
    }
}

impl ImageTransform {
    pub const fn new(size: u32, mean: f32, std: f32) -> Self {
        Self { size, mean, std }
    }

    /// 返回 [3, size, size] 的张量
    pub fn apply(&self, image: &RgbImage) -> Tensor {
        let tensor = if image.dimensions() == (self.size, self.size) {
            to_chw_tensor(image)
        } else {
            let resized = imageops::resize(image, self.size, self.size, FilterType::Triangle);
            to_chw_tensor(&resized)
        };
        let (mean, std) = (self.mean, self.std);
        tensor.map(|x| (x - mean) / std)
    }
}
