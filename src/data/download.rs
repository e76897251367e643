//! 通用下载工具
//!
//! 提供 HTTP 下载、MD5 校验和 tar.gz 解压功能，供各数据集复用。

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use md5::{Digest, Md5};
use tracing::info;

use super::error::DataError;

/// 下载`url`到`dest_path`；给出`expected_md5`时，校验通过才落盘
///
/// 校验失败返回`DataError::ChecksumMismatch`，此时不会留下半成品文件。
pub fn download_file(
    url: &str,
    dest_path: &Path,
    expected_md5: Option<&str>,
) -> Result<(), DataError> {
    info!("正在下载 {url} ...");
    let bytes = fetch(url)?;
    expected_md5.map_or(Ok(()), |expected| verify_md5(&bytes, expected))?;
    std::fs::write(dest_path, &bytes)?;
    info!("已保存 {dest_path:?}（{} 字节）", bytes.len());
    Ok(())
}

/// 读取完整的响应体（ureq 对 4xx/5xx 直接返回错误）
fn fetch(url: &str) -> Result<Vec<u8>, DataError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| DataError::DownloadError(format!("{url}: {e}")))?;
    let mut bytes = Vec::new();
    response.into_reader().read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// 将 tar.gz 压缩包解压到`dest_dir`
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<(), DataError> {
    let file = File::open(archive_path)
        .map_err(|_| DataError::FileNotFound(archive_path.to_path_buf()))?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    archive
        .unpack(dest_dir)
        .map_err(|e| DataError::DecompressionError(format!("{archive_path:?}: {e}")))?;
    info!("已解压 {archive_path:?} 到 {dest_dir:?}");
    Ok(())
}

/// 校验数据的 MD5
pub fn verify_md5(data: &[u8], expected: &str) -> Result<(), DataError> {
    let actual = compute_md5(data);
    if actual != expected {
        return Err(DataError::ChecksumMismatch {
            expected: expected.to_string(),
            got: actual,
        });
    }
    Ok(())
}

/// 计算数据的 MD5 校验码
pub fn compute_md5(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{:x}", result)
}
