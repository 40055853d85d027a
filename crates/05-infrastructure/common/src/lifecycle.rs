//! 组件生命周期定义

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 组件作用域
///
/// 决定组件实例的共享方式。除单例与瞬时外的任何名称都视为自定义作用域，
/// 其实例由调用方提供的作用域存储负责保存。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentScope {
    /// 单例模式 - 注册表生命周期内只创建一个实例
    Singleton,
    /// 瞬时模式 - 每次请求都创建新实例
    NewInstance,
    /// 自定义作用域，例如 "request"、"session"
    Custom(String),
}

impl ComponentScope {
    /// 创建自定义作用域
    pub fn custom(kind: impl Into<String>) -> Self {
        Self::Custom(kind.into())
    }

    /// 是否为自定义作用域
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// 自定义作用域的种类名称
    pub fn custom_kind(&self) -> Option<&str> {
        match self {
            Self::Custom(kind) => Some(kind),
            _ => None,
        }
    }

    /// 作用域名称
    pub fn as_str(&self) -> &str {
        match self {
            Self::Singleton => "singleton",
            Self::NewInstance => "newinstance",
            Self::Custom(kind) => kind,
        }
    }
}

impl Default for ComponentScope {
    fn default() -> Self {
        Self::Singleton
    }
}

impl fmt::Display for ComponentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentScope {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scope = match s.trim().to_ascii_lowercase().as_str() {
            "singleton" => Self::Singleton,
            "newinstance" | "new_instance" | "prototype" => Self::NewInstance,
            _ => Self::Custom(s.trim().to_string()),
        };
        Ok(scope)
    }
}

impl Serialize for ComponentScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ComponentScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Err(serde::de::Error::custom("作用域名称不能为空"));
        }
        Ok(raw.parse().unwrap_or_default())
    }
}

/// 组件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentType {
    /// 普通组件，通过构造函数创建
    #[default]
    Component,
    /// 工厂组件，其方法各自提供一个组件
    Factory,
}

/// 生命周期钩子名称
///
/// 注册表只记录名称，调用时机由宿主应用负责。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleHooks {
    /// 构造完成后调用的方法名
    pub post_construct: Option<String>,
    /// 销毁前调用的方法名
    pub pre_destroy: Option<String>,
}

impl LifecycleHooks {
    /// 是否声明了任何钩子
    pub fn is_empty(&self) -> bool {
        self.post_construct.is_none() && self.pre_destroy.is_none()
    }
}
