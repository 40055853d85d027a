//! 容器构建器实现

use crate::registry::ComponentRegistryImpl;
use di_abstractions::{ComponentRegistry, ContainerBuilder, ContainerConfig};
use infrastructure_common::{ComponentMetadata, DependencyResult};
use tracing::info;

/// 依赖注入容器构建器
///
/// 按登记顺序注册组件，任何一个声明无效都会使构建失败。
#[derive(Debug, Default)]
pub struct DiContainerBuilder {
    config: ContainerConfig,
    registrations: Vec<ComponentMetadata>,
}

impl DiContainerBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 已登记的组件数量
    pub fn pending(&self) -> usize {
        self.registrations.len()
    }
}

impl ContainerBuilder for DiContainerBuilder {
    type Container = ComponentRegistryImpl;

    fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    fn register(mut self, metadata: ComponentMetadata) -> Self {
        self.registrations.push(metadata);
        self
    }

    fn build(self) -> DependencyResult<Self::Container> {
        info!("开始构建依赖注入容器，待注册组件 {} 个", self.registrations.len());

        let validate_on_build = self.config.validate_on_build;
        let registry = ComponentRegistryImpl::with_config(self.config)?;
        for metadata in self.registrations {
            registry.add_component(metadata)?;
        }

        if validate_on_build {
            registry.validate()?;
        }

        info!("依赖注入容器构建完成，共 {} 个组件", registry.len());
        Ok(registry)
    }
}
