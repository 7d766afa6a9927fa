//! 壁纸元数据模块
//!
//! # 设计思路
//!
//! 元数据是构造后不再变化的值对象：署名、动作链接、合集 ID，以及仅动态壁纸才有的组件描述。
//! 静态/动态的区别用 `WallpaperKind` 枚举表达，只有 `Live` 变体携带组件，
//! 对静态壁纸读取组件会返回明确的 `UnsupportedForStatic` 错误，而不是空值。
//!
//! # 实现思路
//!
//! - 字段私有，访问器只返回借用，调用方无法修改。
//! - 通过 `serde` 支持从 JSON 目录加载，加载时校验动态壁纸组件名非空。

use serde::{Deserialize, Serialize};

/// 元数据相关错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// 对静态壁纸读取动态壁纸组件。
    #[error("静态壁纸没有动态壁纸组件")]
    UnsupportedForStatic,

    #[error("动态壁纸组件无效：{0}")]
    InvalidComponent(String),

    #[error("解析壁纸目录失败：{0}")]
    Parse(String),
}

/// 动态壁纸组件描述。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallpaperComponent {
    pub package_name: String,
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_activity: Option<String>,
}

impl WallpaperComponent {
    pub fn new(package_name: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            service_name: service_name.into(),
            label: None,
            settings_activity: None,
        }
    }

    /// 组件全名：`包名/服务名`。
    pub fn component_name(&self) -> String {
        format!("{}/{}", self.package_name, self.service_name)
    }

    fn validate(&self) -> Result<(), MetadataError> {
        if self.package_name.trim().is_empty() {
            return Err(MetadataError::InvalidComponent("包名为空".to_string()));
        }
        if self.service_name.trim().is_empty() {
            return Err(MetadataError::InvalidComponent(format!(
                "{} 的服务名为空",
                self.package_name
            )));
        }
        Ok(())
    }
}

/// 壁纸类型。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "component", rename_all = "snake_case")]
pub enum WallpaperKind {
    Static,
    Live(WallpaperComponent),
}

/// 面向用户展示的壁纸元数据。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallpaperMetadata {
    #[serde(default)]
    attributions: Vec<String>,
    #[serde(default)]
    action_url: Option<String>,
    #[serde(default)]
    collection_id: Option<String>,
    kind: WallpaperKind,
}

impl WallpaperMetadata {
    /// 创建静态壁纸元数据。
    pub fn new_static(
        attributions: Vec<String>,
        action_url: Option<String>,
        collection_id: Option<String>,
    ) -> Self {
        Self {
            attributions,
            action_url,
            collection_id,
            kind: WallpaperKind::Static,
        }
    }

    /// 创建动态壁纸元数据。
    pub fn new_live(
        attributions: Vec<String>,
        action_url: Option<String>,
        collection_id: Option<String>,
        component: WallpaperComponent,
    ) -> Self {
        Self {
            attributions,
            action_url,
            collection_id,
            kind: WallpaperKind::Live(component),
        }
    }

    /// 署名列表，顺序即展示顺序。
    pub fn attributions(&self) -> &[String] {
        &self.attributions
    }

    pub fn action_url(&self) -> Option<&str> {
        self.action_url.as_deref()
    }

    pub fn collection_id(&self) -> Option<&str> {
        self.collection_id.as_deref()
    }

    pub fn kind(&self) -> &WallpaperKind {
        &self.kind
    }

    pub fn is_live(&self) -> bool {
        matches!(self.kind, WallpaperKind::Live(_))
    }

    /// 动态壁纸组件；静态壁纸总是返回 `UnsupportedForStatic`。
    pub fn wallpaper_component(&self) -> Result<&WallpaperComponent, MetadataError> {
        match &self.kind {
            WallpaperKind::Live(component) => Ok(component),
            WallpaperKind::Static => Err(MetadataError::UnsupportedForStatic),
        }
    }
}

/// 解析 JSON 壁纸目录（元数据数组），保持文档顺序。
pub fn parse_catalog(json: &str) -> Result<Vec<WallpaperMetadata>, MetadataError> {
    let entries: Vec<WallpaperMetadata> =
        serde_json::from_str(json).map_err(|e| MetadataError::Parse(e.to_string()))?;

    for entry in &entries {
        if let WallpaperKind::Live(component) = &entry.kind {
            component.validate()?;
        }
    }

    log::debug!("📚 已加载壁纸目录：{} 项", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_metadata_returns_constructor_values() {
        let metadata = WallpaperMetadata::new_static(
            vec!["Sunset".to_string(), "by Someone".to_string()],
            Some("https://example.com/explore".to_string()),
            Some("nature".to_string()),
        );

        assert_eq!(metadata.attributions(), ["Sunset", "by Someone"]);
        assert_eq!(metadata.action_url(), Some("https://example.com/explore"));
        assert_eq!(metadata.collection_id(), Some("nature"));
        assert!(!metadata.is_live());
    }

    #[test]
    fn static_metadata_with_nothing_set() {
        let metadata = WallpaperMetadata::new_static(Vec::new(), None, None);

        assert!(metadata.attributions().is_empty());
        assert_eq!(metadata.action_url(), None);
        assert_eq!(metadata.collection_id(), None);
    }

    #[test]
    fn static_metadata_component_is_unsupported() {
        let metadata = WallpaperMetadata::new_static(Vec::new(), None, None);

        assert_eq!(
            metadata.wallpaper_component(),
            Err(MetadataError::UnsupportedForStatic)
        );
    }

    #[test]
    fn live_metadata_returns_stored_component() {
        let component = WallpaperComponent::new("com.example.live", "com.example.live.Service");
        let metadata =
            WallpaperMetadata::new_live(vec!["Waves".to_string()], None, None, component.clone());

        assert!(metadata.is_live());
        assert_eq!(metadata.wallpaper_component(), Ok(&component));
        assert_eq!(
            component.component_name(),
            "com.example.live/com.example.live.Service"
        );
    }

    #[test]
    fn catalog_keeps_document_order() {
        let json = r#"[
            {"attributions": ["B", "A"], "collection_id": "c1", "kind": {"type": "static"}},
            {"action_url": "https://example.com", "kind": {"type": "live", "component": {
                "package_name": "pkg", "service_name": "svc", "label": "Live"
            }}}
        ]"#;

        let entries = parse_catalog(json).expect("catalog should parse");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].attributions(), ["B", "A"]);
        assert_eq!(entries[0].collection_id(), Some("c1"));
        assert_eq!(
            entries[1]
                .wallpaper_component()
                .expect("live entry has component")
                .label
                .as_deref(),
            Some("Live")
        );
    }

    #[test]
    fn catalog_rejects_blank_service_name() {
        let json = r#"[{"kind": {"type": "live", "component": {
            "package_name": "pkg", "service_name": "  "
        }}}]"#;

        assert!(matches!(
            parse_catalog(json),
            Err(MetadataError::InvalidComponent(_))
        ));
    }

    #[test]
    fn catalog_reports_malformed_json() {
        assert!(matches!(
            parse_catalog("{not json"),
            Err(MetadataError::Parse(_))
        ));
    }
}
