use crate::tensor::Tensor;
use crate::vision::{GridOptions, Vision, VisionError};
use std::path::PathBuf;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("only_dcgan_vision_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓网格尺寸↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
#[test]
fn test_make_grid_dimensions() {
    // 44 张 64x64：8 列 6 行
    let batch = Tensor::zeros(&[44, 3, 64, 64]);
    let grid = Vision::make_grid(&batch, &GridOptions::default()).unwrap();
    assert_eq!(grid.dimensions(), (8 * 66 + 2, 6 * 66 + 2));
    assert_eq!(grid.dimensions(), (530, 398));

    // 不足一行时列数等于图像个数
    let batch = Tensor::zeros(&[3, 3, 4, 5]);
    let grid = Vision::make_grid(&batch, &GridOptions::default()).unwrap();
    assert_eq!(grid.dimensions(), (3 * 7 + 2, 4 + 4));
}

#[test]
fn test_make_grid_single_image_has_no_padding() {
    let batch = Tensor::new(&[0.0, 0.25, 0.5, 1.0, 0.0, 0.25, 0.5, 1.0, 0.0, 0.25, 0.5, 1.0], &[1, 3, 2, 2]);
    let grid = Vision::make_grid(&batch, &GridOptions::default()).unwrap();
    assert_eq!(grid.dimensions(), (2, 2));
    // 左上角即图像本身的第一个像素，而不是间隔
    assert_eq!(grid.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(grid.get_pixel(1, 1).0, [255, 255, 255]);
}

#[test]
fn test_make_grid_rejects_bad_shape() {
    let options = GridOptions::default();
    for shape in [vec![3, 8, 8], vec![2, 1, 8, 8], vec![0, 3, 8, 8]] {
        let err = Vision::make_grid(&Tensor::zeros(&shape), &options).unwrap_err();
        assert!(matches!(err, VisionError::InvalidShape(_)));
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑网格尺寸↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓像素值↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
#[test]
fn test_make_grid_normalizes_whole_batch() {
    // 两张 1x1 图像：第一张全为-1，第二张全为1
    let batch = Tensor::new(&[-1.0, -1.0, -1.0, 1.0, 1.0, 1.0], &[2, 3, 1, 1]);
    let grid = Vision::make_grid(&batch, &GridOptions::default()).unwrap();
    assert_eq!(grid.dimensions(), (8, 5));
    assert_eq!(grid.get_pixel(2, 2).0, [0, 0, 0]);
    assert_eq!(grid.get_pixel(5, 2).0, [255, 255, 255]);
    // 间隔处为0
    assert_eq!(grid.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(grid.get_pixel(4, 2).0, [0, 0, 0]);
}

#[test]
fn test_make_grid_without_normalize_clamps() {
    let batch = Tensor::new(&[0.5, 2.0, -3.0], &[1, 3, 1, 1]);
    let options = GridOptions {
        normalize: false,
        padding: 0,
        ..GridOptions::default()
    };
    let grid = Vision::make_grid(&batch, &options).unwrap();
    assert_eq!(grid.get_pixel(0, 0).0, [128, 255, 0]);
}

#[test]
fn test_make_grid_constant_batch() {
    // 最大值等于最小值时不产生NaN
    let batch = Tensor::full(0.3, &[2, 3, 2, 2]);
    let grid = Vision::make_grid(&batch, &GridOptions::default()).unwrap();
    assert_eq!(grid.get_pixel(2, 2).0, [0, 0, 0]);
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑像素值↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓保存↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
#[test]
fn test_save_image_grid_is_idempotent() {
    let dir = temp_dir("idempotent");
    let path = dir.join("real_samples.png");
    let mut ctx = crate::context::Context::with_seed(42);
    let batch = ctx.randn(&[5, 3, 8, 8]);

    Vision::save_image_grid(&batch, &path, &GridOptions::default()).unwrap();
    let first = image::open(&path).unwrap().to_rgb8();
    Vision::save_image_grid(&batch, &path, &GridOptions::default()).unwrap();
    let second = image::open(&path).unwrap().to_rgb8();

    assert_eq!(first.dimensions(), (5 * 10 + 2, 12));
    assert_eq!(first, second);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_save_image_grid_requires_existing_directory() {
    let path = std::env::temp_dir()
        .join(format!("only_dcgan_missing_{}", std::process::id()))
        .join("fake.png");
    let err = Vision::save_image_grid(&Tensor::zeros(&[1, 3, 4, 4]), &path, &GridOptions::default())
        .unwrap_err();
    assert!(matches!(err, VisionError::DirectoryNotFound(_)));
    assert!(!path.exists());
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑保存↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
