//! 组件注册表实现

use crate::component::RegisteredComponent;
use crate::factory::FactoryExpander;
use di_abstractions::{
    CircularDependencyDetector, ComponentRegistry, ContainerConfig,
    DefaultCircularDependencyDetector, GraphCheck, ResolveContext,
};
use infrastructure_common::{
    ComponentIdentity, ComponentMetadata, ComponentScope, ConfigResult, DependencyError,
    DependencyResult, Instance,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 组件注册表实现
///
/// 注册通常只发生在启动阶段，之后的解析只获取读锁。
pub struct ComponentRegistryImpl {
    /// 容器配置
    config: ContainerConfig,
    /// 注册的组件
    components: RwLock<HashMap<ComponentIdentity, Arc<RegisteredComponent>>>,
    /// 循环依赖检测器
    detector: DefaultCircularDependencyDetector,
}

impl ComponentRegistryImpl {
    /// 使用默认配置创建注册表
    pub fn new() -> Self {
        Self::from_validated(ContainerConfig::default())
    }

    /// 使用指定配置创建注册表，配置先经过 [`ContainerConfig::validate`]
    pub fn with_config(config: ContainerConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: ContainerConfig) -> Self {
        Self {
            config,
            components: RwLock::new(HashMap::new()),
            detector: DefaultCircularDependencyDetector,
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 获取已注册组件
    pub fn component(&self, identity: &ComponentIdentity) -> Option<Arc<RegisteredComponent>> {
        self.components.read().get(identity).cloned()
    }

    /// 已创建实例的单例组件，供宿主应用在关闭时调用销毁钩子
    pub fn instantiated_singletons(&self) -> Vec<(Arc<ComponentMetadata>, Instance)> {
        self.components
            .read()
            .values()
            .filter_map(|component| {
                component
                    .cached_instance()
                    .map(|instance| (component.metadata().clone(), instance))
            })
            .collect()
    }

    /// 从指定组件出发静态检查解析时会经过的依赖闭包
    pub(crate) fn check_graph(&self, root: &ComponentIdentity) -> DependencyResult<GraphCheck> {
        let components = self.components.read();
        self.detector.check_from(root, &|identity| {
            components
                .get(identity)
                .map(|component| component.metadata().resolution_edges())
        })
    }

    /// 校验元数据并生成待插入的组件，不修改注册表
    fn prepare(&self, metadata: ComponentMetadata) -> DependencyResult<Vec<RegisteredComponent>> {
        let identity = metadata.identity.to_string();

        if metadata.is_factory() {
            if metadata.provides.is_empty() {
                return Err(DependencyError::EmptyFactory { identity });
            }
            if let Some(scope) = metadata.scope.as_ref().filter(|s| **s != ComponentScope::Singleton) {
                return Err(DependencyError::InvalidMetadata {
                    identity,
                    message: format!("工厂组件只能是单例, 声明的作用域: {scope}"),
                });
            }
        }

        let scope = if metadata.is_factory() {
            ComponentScope::Singleton
        } else {
            metadata
                .scope
                .clone()
                .unwrap_or_else(|| self.config.default_scope.clone())
        };

        if scope.is_custom() && !(metadata.hooks.is_empty() && metadata.provides.is_empty()) {
            let mut declared = Vec::new();
            if let Some(hook) = &metadata.hooks.post_construct {
                declared.push(format!("post_construct = {hook}"));
            }
            if let Some(hook) = &metadata.hooks.pre_destroy {
                declared.push(format!("pre_destroy = {hook}"));
            }
            if !metadata.provides.is_empty() {
                declared.push(format!("provides {} 个组件", metadata.provides.len()));
            }
            return Err(DependencyError::InvalidScopedComponent {
                identity,
                reason: format!("作用域组件 ({scope}) 不能声明 {}", declared.join(", ")),
            });
        }

        if !self.config.supports_scope(&scope) {
            return Err(DependencyError::UnsupportedScope {
                identity,
                scope: scope.to_string(),
            });
        }

        if !metadata.is_factory() && !metadata.provides.is_empty() {
            return Err(DependencyError::InvalidMetadata {
                identity,
                message: "只有工厂组件可以声明 provides".to_string(),
            });
        }

        let provided = if metadata.is_factory() {
            FactoryExpander::new(&self.config).expand(&metadata)?
        } else {
            Vec::new()
        };

        let mut entries = Vec::with_capacity(1 + provided.len());
        entries.push(RegisteredComponent::new(metadata, scope));
        entries.extend(
            provided
                .into_iter()
                .map(|(metadata, scope)| RegisteredComponent::new(metadata, scope)),
        );
        Ok(entries)
    }
}

impl Default for ComponentRegistryImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry for ComponentRegistryImpl {
    fn add_component(&self, metadata: ComponentMetadata) -> DependencyResult<()> {
        let entries = self.prepare(metadata)?;

        let mut components = self.components.write();
        let mut pending = HashSet::new();
        for entry in &entries {
            let identity = entry.identity();
            if components.contains_key(identity) || !pending.insert(identity) {
                return Err(DependencyError::DuplicateComponent {
                    identity: identity.to_string(),
                });
            }
        }

        for entry in entries {
            match entry.identity().label() {
                Some(label) => info!(
                    "注册组件: {} [{}] (作用域: {})",
                    entry.identity(),
                    label,
                    entry.scope()
                ),
                None => info!("注册组件: {} (作用域: {})", entry.identity(), entry.scope()),
            }
            components.insert(entry.identity().clone(), Arc::new(entry));
        }
        Ok(())
    }

    fn resolve_in(
        &self,
        identity: &ComponentIdentity,
        context: &mut ResolveContext<'_>,
    ) -> DependencyResult<Instance> {
        let component = self
            .component(identity)
            .ok_or_else(|| DependencyError::UnknownComponent {
                identity: identity.to_string(),
            })?;

        context.push(identity)?;
        let result = component.get(self, context);
        context.pop();

        if let Err(err) = &result {
            debug!("解析组件失败: {}, 深度: {}, 原因: {}", identity, context.depth(), err);
        }
        result
    }

    fn contains(&self, identity: &ComponentIdentity) -> bool {
        self.components.read().contains_key(identity)
    }

    fn metadata(&self, identity: &ComponentIdentity) -> Option<Arc<ComponentMetadata>> {
        self.component(identity)
            .map(|component| component.metadata().clone())
    }

    fn identities(&self) -> Vec<ComponentIdentity> {
        self.components.read().keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.components.read().len()
    }

    fn default_scope(&self) -> &ComponentScope {
        &self.config.default_scope
    }

    fn max_resolution_depth(&self) -> usize {
        self.config.max_resolution_depth
    }

    fn validate(&self) -> DependencyResult<()> {
        info!("验证依赖关系");
        let components = self.components.read();

        for (identity, component) in components.iter() {
            for dependency in component.metadata().dependency_edges() {
                if !components.contains_key(&dependency) {
                    warn!("组件 {} 依赖的 {} 未注册", identity, dependency);
                    return Err(DependencyError::UnknownComponent {
                        identity: format!("{dependency} (被 {identity} 依赖)"),
                    });
                }
            }
        }

        let roots: Vec<ComponentIdentity> = components.keys().cloned().collect();
        self.detector
            .detect_circular_dependencies(&roots, &|identity| {
                components
                    .get(identity)
                    .map(|component| component.metadata().dependency_edges())
            })?;

        info!("依赖关系验证通过，共 {} 个组件", components.len());
        Ok(())
    }
}

impl std::fmt::Debug for ComponentRegistryImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistryImpl")
            .field("config", &self.config)
            .field("components", &self.components.read().len())
            .finish()
    }
}
