//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件注册和依赖解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentRegistry`] - 组件注册表接口
//! - [`ScopedStorage`] - 作用域存储接口
//! - [`ResolveContext`] - 一次解析调用的上下文
//! - [`CircularDependencyDetector`] - 静态循环依赖检测
//! - [`ContainerBuilder`] - 启动阶段的容器构建器

pub mod container;
pub mod registry;
pub mod resolver;
pub mod storage;

pub use container::*;
pub use registry::*;
pub use resolver::*;
pub use storage::*;
