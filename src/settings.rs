//! 裁剪设置持久化模块
//!
//! 设置以 JSON 文件保存在应用数据目录下，读取后先校验再交给服务应用。

use std::fs;
use std::path::{Path, PathBuf};

use crate::cropper::{CropperSettings, WallpaperCropService};
use crate::error::AppError;

const SETTINGS_FILE_NAME: &str = "cropper_settings.json";

fn settings_file_path(app_data_dir: &Path) -> Result<PathBuf, AppError> {
    fs::create_dir_all(app_data_dir)
        .map_err(|e| AppError::Settings(format!("创建应用数据目录失败: {}", e)))?;

    Ok(app_data_dir.join(SETTINGS_FILE_NAME))
}

/// 读取设置文件；文件不存在时返回 `None`。
pub fn load_settings(app_data_dir: &Path) -> Result<Option<CropperSettings>, AppError> {
    let settings_path = settings_file_path(app_data_dir)?;
    if !settings_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&settings_path)?;
    let parsed = serde_json::from_str::<CropperSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;
    parsed.validate()?;

    Ok(Some(parsed))
}

/// 校验并写入设置文件。
pub fn save_settings(app_data_dir: &Path, settings: &CropperSettings) -> Result<(), AppError> {
    settings.validate()?;
    let settings_path = settings_file_path(app_data_dir)?;

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(settings_path, content)?;
    Ok(())
}

/// 启动时把已保存的设置应用到服务；没有设置文件时保持默认。
pub fn restore_settings(
    service: &WallpaperCropService,
    app_data_dir: &Path,
) -> Result<bool, AppError> {
    match load_settings(app_data_dir)? {
        Some(settings) => {
            service.apply_settings(&settings)?;
            log::info!("⚙️ 已恢复裁剪设置：{:?}", settings);
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cropper::CropError;

    fn unique_temp_dir() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("wallpaper-cropper-settings-{nanos}"))
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = unique_temp_dir();

        assert!(load_settings(&dir).expect("load should succeed").is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn saved_settings_are_restored_into_service() {
        let dir = unique_temp_dir();
        let settings = CropperSettings {
            quality_profile: "speed".to_string(),
            ..CropperSettings::default()
        };
        save_settings(&dir, &settings).expect("save should succeed");

        let service = WallpaperCropService::new();
        let restored = restore_settings(&service, &dir).expect("restore should succeed");

        assert!(restored);
        assert_eq!(service.get_quality_profile().expect("profile"), "speed");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_settings_are_not_saved() {
        let dir = unique_temp_dir();
        let settings = CropperSettings {
            quality_profile: "ultra".to_string(),
            ..CropperSettings::default()
        };

        let result = save_settings(&dir, &settings);

        assert!(matches!(result, Err(AppError::Crop(CropError::InvalidFormat(_)))));
        assert!(load_settings(&dir).expect("load should succeed").is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = unique_temp_dir();
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(dir.join(SETTINGS_FILE_NAME), "{oops").expect("write corrupt file");

        assert!(matches!(load_settings(&dir), Err(AppError::Settings(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}
