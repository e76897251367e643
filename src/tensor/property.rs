/*
 * @Description  : 张量的属性与视图：形状、元素个数、底层数据切片、重塑
 */

use super::Tensor;
use crate::errors::TensorError;
use ndarray::{ArrayViewD, ArrayViewMutD, IxDyn};

impl Tensor {
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMutD<'_, f32> {
        self.data.view_mut()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的维数
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 张量中元素的个数
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 按行优先顺序返回全部元素
    pub fn as_slice(&self) -> &[f32] {
        self.data
            .as_slice()
            .expect("张量内部数组必须保持标准布局")
    }

    pub fn as_slice_mut(&mut self) -> &mut [f32] {
        self.data
            .as_slice_mut()
            .expect("张量内部数组必须保持标准布局")
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data.into_raw_vec()
    }

    /// 在元素总数不变的前提下改变形状
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        self.clone().into_shape(shape)
    }

    /// 同`reshape`，但消耗自身，避免拷贝
    pub fn into_shape(self, shape: &[usize]) -> Result<Self, TensorError> {
        let from = self.shape().to_vec();
        self.data
            .into_shape(IxDyn(shape))
            .map(|data| Self { data })
            .map_err(|_| TensorError::IncompatibleShape {
                from,
                to: shape.to_vec(),
            })
    }
}
