/*
 * @Author       : 老董
 * @Date         : 2023-08-30 19:16:48
 * @LastEditors  : 老董
 * @LastEditTime : 2026-01-17
 * @Description  : 本模块提供计算机视觉相关的功能：
 *                 把一批[B, 3, H, W]的图像张量拼成网格图，并保存为PNG。
 */

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use thiserror::Error;
use tracing::debug;

use crate::tensor::Tensor;

#[cfg(test)]
mod tests;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("输出目录不存在: {0:?}")]
    DirectoryNotFound(PathBuf),
    #[error("图像张量的形状必须为[B, 3, H, W]且B>0，实际为{0:?}")]
    InvalidShape(Vec<usize>),
    #[error("图像编码失败: {0}")]
    Image(#[from] image::ImageError),
}

/// 网格图选项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    /// 每行的图像个数
    pub nrow: usize,
    /// 图像之间（及四周）的间隔像素，填充值为0
    pub padding: usize,
    /// 是否先把整批数据按最小/最大值线性映射到[0, 1]
    pub normalize: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            nrow: 8,
            padding: 2,
            normalize: true,
        }
    }
}

pub struct Vision;

impl Vision {
    /// 把[B, 3, H, W]的张量拼成网格图
    ///
    /// 网格共`min(nrow, B)`列、`ceil(B / 列数)`行，
    /// 宽 = 列数*(W+padding)+padding，高 = 行数*(H+padding)+padding。
    /// 只有一张图像时不加间隔，直接输出该图像（与 torchvision 的`make_grid`一致）。
    /// 像素值按`x*255+0.5`截断到[0, 255]转为8位。
    pub fn make_grid(batch: &Tensor, options: &GridOptions) -> Result<RgbImage, VisionError> {
        let shape = batch.shape();
        if shape.len() != 4 || shape[1] != 3 || shape[0] == 0 {
            return Err(VisionError::InvalidShape(shape.to_vec()));
        }
        let (count, height, width) = (shape[0], shape[2], shape[3]);

        let values = if options.normalize {
            let (min, max) = (batch.min(), batch.max());
            let range = (max - min).max(1e-5);
            batch.map(|x| (x - min) / range)
        } else {
            batch.clone()
        };
        let data = values.as_slice();

        let pad = if count == 1 { 0 } else { options.padding };
        let columns = options.nrow.max(1).min(count);
        let rows = count.div_ceil(columns);
        let grid_w = columns * (width + pad) + pad;
        let grid_h = rows * (height + pad) + pad;

        let mut grid = RgbImage::new(grid_w as u32, grid_h as u32);
        let plane = height * width;
        for index in 0..count {
            let (row, col) = (index / columns, index % columns);
            let top = row * (height + pad) + pad;
            let left = col * (width + pad) + pad;
            let image = &data[index * 3 * plane..(index + 1) * 3 * plane];
            for y in 0..height {
                for x in 0..width {
                    let offset = y * width + x;
                    let pixel = Rgb([
                        to_u8(image[offset]),
                        to_u8(image[plane + offset]),
                        to_u8(image[2 * plane + offset]),
                    ]);
                    grid.put_pixel((left + x) as u32, (top + y) as u32, pixel);
                }
            }
        }
        Ok(grid)
    }

    /// 把[B, 3, H, W]的张量拼成网格图并保存到`path`（格式由扩展名决定，通常为PNG）
    ///
    /// 输出目录必须已存在，本函数不会创建目录。
    pub fn save_image_grid(
        batch: &Tensor,
        path: &Path,
        options: &GridOptions,
    ) -> Result<(), VisionError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.is_dir() {
            return Err(VisionError::DirectoryNotFound(dir.to_path_buf()));
        }

        let grid = Self::make_grid(batch, options)?;
        grid.save(path)?;
        debug!("已保存 {}x{} 的网格图: {path:?}", grid.width(), grid.height());
        Ok(())
    }
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0 + 0.5).clamp(0.0, 255.0) as u8
}
