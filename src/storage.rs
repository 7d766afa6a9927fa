//! 壁纸存储目录管理模块
//!
//! # 设计思路
//!
//! 统一管理裁剪结果的持久化路径，支持用户自定义目录，并在目录不存在时自动创建。
//!
//! # 实现思路
//!
//! - 优先使用用户在设置中配置的自定义目录。
//! - 未设置时回退到基础目录下的 `wallpapers` 子目录。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// 存储目录信息
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 获取壁纸存储目录
///
/// # 参数
/// * `base_dir` - 应用数据目录
/// * `custom_dir` - 用户自定义目录（可选）
///
/// # 返回
/// - `Ok(PathBuf)`：可用的壁纸存储目录
/// - `Err(AppError::Storage)`：无法创建目录
pub fn get_wallpapers_dir(base_dir: &Path, custom_dir: Option<String>) -> Result<PathBuf, AppError> {
    if let Some(dir) = custom_dir {
        if !dir.is_empty() {
            let path = PathBuf::from(&dir);
            if !path.exists() {
                fs::create_dir_all(&path).map_err(|e| {
                    AppError::Storage(format!("创建自定义目录 '{}' 失败: {}", dir, e))
                })?;
            }
            return Ok(path);
        }
    }

    let wallpapers_dir = base_dir.join("wallpapers");
    if !wallpapers_dir.exists() {
        fs::create_dir_all(&wallpapers_dir)
            .map_err(|e| AppError::Storage(format!("创建壁纸目录失败: {}", e)))?;
    }
    Ok(wallpapers_dir)
}

/// 获取壁纸存储目录信息（路径 + 占用大小 + 文件数）
pub fn get_wallpapers_dir_info(
    base_dir: &Path,
    custom_dir: Option<String>,
) -> Result<StorageInfo, AppError> {
    let dir = get_wallpapers_dir(base_dir, custom_dir)?;
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    for entry in fs::read_dir(&dir)?.flatten() {
        if let Ok(metadata) = entry.metadata() {
            if metadata.is_file() {
                total_size += metadata.len();
                file_count += 1;
            }
        }
    }

    Ok(StorageInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_temp_dir() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("wallpaper-cropper-storage-{nanos}"))
    }

    #[test]
    fn default_dir_is_created_under_base() {
        let base = unique_temp_dir();

        let dir = get_wallpapers_dir(&base, None).expect("dir should be created");

        assert_eq!(dir, base.join("wallpapers"));
        assert!(dir.is_dir());
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn custom_dir_wins_over_base_and_empty_is_ignored() {
        let base = unique_temp_dir();
        let custom = base.join("custom");

        let dir = get_wallpapers_dir(&base, Some(custom.to_string_lossy().to_string()))
            .expect("custom dir should be created");
        assert_eq!(dir, custom);

        let fallback = get_wallpapers_dir(&base, Some(String::new())).expect("fallback dir");
        assert_eq!(fallback, base.join("wallpapers"));
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn dir_info_counts_files() {
        let base = unique_temp_dir();
        let dir = get_wallpapers_dir(&base, None).expect("dir should be created");
        fs::write(dir.join("a.png"), [0u8; 10]).expect("write a");
        fs::write(dir.join("b.png"), [0u8; 5]).expect("write b");

        let info = get_wallpapers_dir_info(&base, None).expect("info should be read");

        assert_eq!(info.file_count, 2);
        assert_eq!(info.total_size, 15);
        let _ = fs::remove_dir_all(&base);
    }
}
