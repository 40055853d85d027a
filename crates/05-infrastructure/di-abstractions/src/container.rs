//! 容器配置与构建器抽象
//!
//! 注册是一次性的启动阶段：构建器收集元数据，构建出注册表后只读使用。

use crate::registry::ComponentRegistry;
use infrastructure_common::{
    ComponentMetadata, ComponentScope, ConfigError, ConfigResult, ConfigSection, DependencyResult,
};
use serde::{Deserialize, Serialize};

/// 容器构建器 trait
pub trait ContainerBuilder: Sized {
    /// 关联的容器类型
    type Container: ComponentRegistry;

    /// 设置容器配置
    fn with_config(self, config: ContainerConfig) -> Self;

    /// 添加组件注册
    fn register(self, metadata: ComponentMetadata) -> Self;

    /// 构建容器，遇到第一个无效声明即失败
    fn build(self) -> DependencyResult<Self::Container>;
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 元数据未声明作用域时使用的默认作用域
    pub default_scope: ComponentScope,
    /// 注册表认可的自定义作用域种类
    pub custom_scopes: Vec<String>,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 构建完成后是否验证依赖关系
    pub validate_on_build: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            default_scope: ComponentScope::Singleton,
            custom_scopes: vec!["request".to_string(), "session".to_string()],
            max_resolution_depth: 100,
            validate_on_build: true,
        }
    }
}

impl ContainerConfig {
    /// 从 TOML 文本读取配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 值读取配置
    pub fn from_json_value(value: serde_json::Value) -> ConfigResult<Self> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// 从配置节绑定配置
    pub fn from_section(section: &ConfigSection) -> ConfigResult<Self> {
        let config: Self = section.bind()?;
        config.validate()?;
        Ok(config)
    }

    /// 设置默认作用域
    pub fn with_default_scope(mut self, scope: ComponentScope) -> Self {
        self.default_scope = scope;
        self
    }

    /// 添加自定义作用域种类
    pub fn with_custom_scope(mut self, kind: impl Into<String>) -> Self {
        let kind = kind.into();
        if !self.custom_scopes.contains(&kind) {
            self.custom_scopes.push(kind);
        }
        self
    }

    /// 设置最大解析深度
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// 作用域是否被注册表认可
    pub fn supports_scope(&self, scope: &ComponentScope) -> bool {
        scope
            .custom_kind()
            .map_or(true, |kind| self.custom_scopes.iter().any(|k| k == kind))
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::validation("max_resolution_depth 必须大于 0"));
        }
        if let Some(kind) = self.custom_scopes.iter().find(|k| k.trim().is_empty()) {
            return Err(ConfigError::validation(format!(
                "自定义作用域名称不能为空: {kind:?}"
            )));
        }
        if !self.supports_scope(&self.default_scope) {
            return Err(ConfigError::validation(format!(
                "默认作用域未在 custom_scopes 中声明: {}",
                self.default_scope
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = ContainerConfig::default();
        assert_eq!(config.default_scope, ComponentScope::Singleton);
        assert!(config.supports_scope(&ComponentScope::custom("request")));
        assert!(!config.supports_scope(&ComponentScope::custom("conversation")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = ContainerConfig::from_toml_str(
            r#"
            default_scope = "newinstance"
            custom_scopes = ["request", "tenant"]
            max_resolution_depth = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.default_scope, ComponentScope::NewInstance);
        assert!(config.supports_scope(&ComponentScope::custom("tenant")));
        assert!(!config.supports_scope(&ComponentScope::custom("session")));
        assert_eq!(config.max_resolution_depth, 16);
        assert!(config.validate_on_build);
    }

    #[test]
    fn test_from_toml_rejects_unknown_default_scope() {
        let result = ContainerConfig::from_toml_str(r#"default_scope = "tenant""#);
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_from_toml_parse_error() {
        let result = ContainerConfig::from_toml_str("default_scope = ");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_from_json_and_section() {
        let config = ContainerConfig::from_json_value(json!({
            "default_scope": "request",
            "max_resolution_depth": 8
        }))
        .unwrap();
        assert_eq!(config.default_scope, ComponentScope::custom("request"));

        let mut section = ConfigSection::new();
        section.insert("max_resolution_depth", json!(0));
        assert!(matches!(
            ContainerConfig::from_section(&section),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_builder_style_setters() {
        let config = ContainerConfig::default()
            .with_custom_scope("tenant")
            .with_custom_scope("tenant")
            .with_default_scope(ComponentScope::custom("tenant"))
            .with_max_resolution_depth(4);

        assert_eq!(config.custom_scopes.iter().filter(|k| *k == "tenant").count(), 1);
        assert!(config.validate().is_ok());
    }
}
