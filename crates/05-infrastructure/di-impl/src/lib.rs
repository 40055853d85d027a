//! # 依赖注入具体实现
//!
//! 提供组件注册表、生命周期策略、工厂展开和内存作用域存储的实现。
//!
//! ## 使用方式
//!
//! ```rust,ignore
//! let registry = DiContainerBuilder::new()
//!     .register(logger_metadata)
//!     .register(service_metadata)
//!     .build()?;
//!
//! let request = InMemoryScopedStorage::new("request");
//! let service = registry.get_typed::<Service>(&ComponentIdentity::of::<Service>(), &[&request])?;
//! ```
//!
//! 注册阶段结束后注册表可在多个线程间共享，解析只获取读锁；
//! 单例在首次解析时创建，并发的首次解析只会构造一次。

pub mod builder;
pub mod component;
pub mod factory;
pub mod logging;
pub mod registry;
pub mod storage;

pub use builder::DiContainerBuilder;
pub use component::RegisteredComponent;
pub use factory::FactoryExpander;
pub use logging::{init_logging, LoggingConfig};
pub use registry::ComponentRegistryImpl;
pub use storage::InMemoryScopedStorage;
