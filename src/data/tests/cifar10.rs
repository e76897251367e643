//! CIFAR-10 数据集单元测试（不联网：用内存中构造的记录）

use std::path::PathBuf;

use crate::data::{Cifar10Dataset, DataError, DataLoader, Dataset, ImageTransform};

const PLANE: usize = 32 * 32;

/// 构造一条记录：标签 + 纯色图像
fn record(label: u8, rgb: [u8; 3]) -> Vec<u8> {
    let mut bytes = vec![label];
    for value in rgb {
        bytes.extend(std::iter::repeat(value).take(PLANE));
    }
    bytes
}

fn temp_root(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("only_dcgan_{name}_{}", std::process::id()))
}

#[test]
fn test_from_bytes_parses_records() {
    let mut bytes = record(3, [255, 0, 0]);
    bytes.extend(record(9, [0, 0, 255]));
    let dataset = Cifar10Dataset::from_bytes(&bytes).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.label(0), Some(3));
    assert_eq!(dataset.label(1), Some(9));
    assert_eq!(dataset.image(0).unwrap().get_pixel(5, 7).0, [255, 0, 0]);
    assert_eq!(dataset.image(1).unwrap().get_pixel(31, 31).0, [0, 0, 255]);
}

#[test]
fn test_from_bytes_planar_layout() {
    // 第一个像素的 R、G、B 分别位于三个平面的开头
    let mut bytes = vec![0u8; 1 + 3 * PLANE];
    bytes[1] = 10;
    bytes[1 + PLANE] = 20;
    bytes[1 + 2 * PLANE] = 30;
    bytes[2] = 99;
    let dataset = Cifar10Dataset::from_bytes(&bytes).unwrap();
    let image = dataset.image(0).unwrap();
    assert_eq!(image.get_pixel(0, 0).0, [10, 20, 30]);
    assert_eq!(image.get_pixel(1, 0).0, [99, 0, 0]);
}

#[test]
fn test_from_bytes_rejects_bad_input() {
    let truncated = vec![0u8; 100];
    assert!(matches!(
        Cifar10Dataset::from_bytes(&truncated),
        Err(DataError::FormatError(_))
    ));

    let bad_label = record(10, [0, 0, 0]);
    assert!(matches!(
        Cifar10Dataset::from_bytes(&bad_label),
        Err(DataError::FormatError(_))
    ));
}

#[test]
fn test_get_applies_transform() {
    let dataset = Cifar10Dataset::from_bytes(&record(1, [255, 0, 0])).unwrap();
    let (image, label) = dataset.get(0).unwrap();
    assert_eq!(image.shape(), &[3, 64, 64]);
    assert_eq!(label.as_slice(), &[1.0]);
    assert!(image.as_slice()[..64 * 64].iter().all(|&v| (v - 1.0).abs() < 1e-6));
    assert!(image.as_slice()[64 * 64..].iter().all(|&v| (v + 1.0).abs() < 1e-6));

    let small = dataset.with_transform(ImageTransform::new(32, 0.5, 0.5));
    assert_eq!(small.get(0).unwrap().0.shape(), &[3, 32, 32]);
}

#[test]
fn test_loader_over_cifar_batches() {
    let bytes: Vec<u8> = (0..5u8).flat_map(|i| record(i, [i * 50, 0, 0])).collect();
    let dataset = Cifar10Dataset::from_bytes(&bytes).unwrap();
    let loader = DataLoader::new(dataset, 2);

    let shapes: Vec<Vec<usize>> = loader
        .iter()
        .map(|batch| batch.unwrap().0.shape().to_vec())
        .collect();
    assert_eq!(
        shapes,
        vec![vec![2, 3, 64, 64], vec![2, 3, 64, 64], vec![1, 3, 64, 64]]
    );
}

#[test]
fn test_load_from_extracted_directory() {
    let root = temp_root("cifar_load");
    let batches_dir = root.join("cifar-10-batches-bin");
    std::fs::create_dir_all(&batches_dir).unwrap();
    std::fs::write(batches_dir.join("test_batch.bin"), record(4, [1, 2, 3])).unwrap();

    let dataset = Cifar10Dataset::load(root.to_str(), false, false).unwrap();
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.label(0), Some(4));

    // 训练集文件缺失
    let err = Cifar10Dataset::load(root.to_str(), true, false).unwrap_err();
    assert!(matches!(err, DataError::FileNotFound(_)));

    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_load_without_download_reports_missing() {
    let root = temp_root("cifar_missing");
    let err = Cifar10Dataset::load(root.to_str(), true, false).unwrap_err();
    assert!(matches!(err, DataError::FileNotFound(_)));
}
