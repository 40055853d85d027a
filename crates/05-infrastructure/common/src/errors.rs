//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },

    #[error("日志初始化失败: {message}")]
    LoggingError { message: String },
}

impl ConfigError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// 依赖注入错误类型
///
/// 注册与解析阶段的所有失败都通过此类型同步返回给调用者，
/// 失败时注册表保持调用前的状态。
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件重复注册: {identity}")]
    DuplicateComponent { identity: String },

    #[error("组件未注册: {identity}")]
    UnknownComponent { identity: String },

    #[error("不支持的作用域: {identity}, 作用域: {scope}")]
    UnsupportedScope { identity: String, scope: String },

    #[error("作用域组件无效: {identity}, 原因: {reason}")]
    InvalidScopedComponent { identity: String, reason: String },

    #[error("工厂组件未提供任何组件: {identity}")]
    EmptyFactory { identity: String },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("组件元数据无效: {identity}, 原因: {message}")]
    InvalidMetadata { identity: String, message: String },

    #[error("组件类型不匹配: {identity}, 期望类型: {expected}")]
    TypeMismatch { identity: String, expected: String },

    #[error("构造函数参数不足: {identity}, 位置: {position}")]
    MissingConstructorArgument { identity: String, position: usize },

    #[error("组件创建失败: {identity}, 原因: {source}")]
    ComponentCreationFailed {
        identity: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("超过最大解析深度 {max_depth}: {identity}")]
    ResolutionDepthExceeded { identity: String, max_depth: usize },

    #[error("容器配置无效: {source}")]
    InvalidConfiguration {
        #[from]
        source: ConfigError,
    },
}

impl DependencyError {
    /// 包装组件构造或工厂方法中产生的外部错误
    pub fn creation_failed(
        identity: impl ToString,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ComponentCreationFailed {
            identity: identity.to_string(),
            source: source.into(),
        }
    }

    /// 创建类型不匹配错误
    pub fn type_mismatch<T: ?Sized>(identity: impl ToString) -> Self {
        Self::TypeMismatch {
            identity: identity.to_string(),
            expected: std::any::type_name::<T>().to_string(),
        }
    }

    /// 是否为注册阶段产生的错误
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateComponent { .. }
                | Self::UnsupportedScope { .. }
                | Self::InvalidScopedComponent { .. }
                | Self::EmptyFactory { .. }
                | Self::InvalidMetadata { .. }
        )
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
