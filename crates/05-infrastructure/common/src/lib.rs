//! # Infrastructure Common
//!
//! 依赖注入容器的公共数据模型。
//!
//! ## 核心类型
//!
//! - [`ComponentIdentity`] - 组件标识（名称 + 所属类型）
//! - [`ComponentMetadata`] - 组件元数据及其构建器
//! - [`ComponentScope`] - 组件作用域
//! - [`DependencyError`] - 注册与解析错误
//!
//! ## 设计原则
//!
//! - 元数据由外部生产者通过构建器显式构造，容器不做运行时反射
//! - 构造函数、属性设置和工厂方法都以强类型闭包表的形式提供
//! - 元数据注册后不可变

pub mod configuration;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
