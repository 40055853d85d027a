//! 已注册组件与生命周期策略
//!
//! 作用域在注册时就分派为具体的生命周期状态，每次解析只执行所选策略本身的工作。

use crate::registry::ComponentRegistryImpl;
use di_abstractions::{ComponentRegistry, GraphCheck, ResolveContext};
use infrastructure_common::{
    ComponentIdentity, ComponentMetadata, ComponentScope, ConstructorArgs, DependencyResult,
    Instance, Instantiation,
};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// 组件生命周期状态
enum Lifecycle {
    /// 单例，构造一次后缓存
    Singleton(OnceCell<Instance>),
    /// 每次解析都创建新实例
    NewInstance,
    /// 实例由同种类的作用域存储保存
    Scoped(String),
}

/// 已注册组件
///
/// 注册后元数据不再变化，单例缓存由组件自身持有。
pub struct RegisteredComponent {
    metadata: Arc<ComponentMetadata>,
    scope: ComponentScope,
    lifecycle: Lifecycle,
    /// 依赖闭包已确认全部注册且无环
    graph_verified: AtomicBool,
}

impl RegisteredComponent {
    /// 按已确定的作用域创建组件
    pub(crate) fn new(metadata: ComponentMetadata, scope: ComponentScope) -> Self {
        let lifecycle = match &scope {
            ComponentScope::Singleton => Lifecycle::Singleton(OnceCell::new()),
            ComponentScope::NewInstance => Lifecycle::NewInstance,
            ComponentScope::Custom(kind) => Lifecycle::Scoped(kind.clone()),
        };

        Self {
            metadata: Arc::new(metadata),
            scope,
            lifecycle,
            graph_verified: AtomicBool::new(false),
        }
    }

    /// 组件标识
    pub fn identity(&self) -> &ComponentIdentity {
        &self.metadata.identity
    }

    /// 组件元数据
    pub fn metadata(&self) -> &Arc<ComponentMetadata> {
        &self.metadata
    }

    /// 生效的作用域
    pub fn scope(&self) -> &ComponentScope {
        &self.scope
    }

    /// 已缓存的单例实例
    pub fn cached_instance(&self) -> Option<Instance> {
        match &self.lifecycle {
            Lifecycle::Singleton(slot) => slot.get().cloned(),
            _ => None,
        }
    }

    pub(crate) fn get(
        &self,
        registry: &ComponentRegistryImpl,
        context: &mut ResolveContext<'_>,
    ) -> DependencyResult<Instance> {
        let identity = self.identity();

        match &self.lifecycle {
            Lifecycle::Singleton(slot) => {
                if let Some(instance) = slot.get() {
                    debug!("返回已缓存的单例组件: {}", identity);
                    return Ok(instance.clone());
                }

                // 构造锁只在依赖闭包无环时获取，跨线程的循环不会互相等待
                self.ensure_acyclic(registry)?;
                slot.get_or_try_init(|| {
                    debug!("创建单例组件: {}", identity);
                    self.instantiate(registry, context)
                })
                .cloned()
            }
            Lifecycle::NewInstance => {
                debug!("创建新实例组件: {}", identity);
                self.instantiate(registry, context)
            }
            Lifecycle::Scoped(kind) => {
                let storage = context.storage_for(kind);

                if let Some(instance) = storage.and_then(|s| s.get(identity)) {
                    debug!("作用域存储命中: {} ({})", identity, kind);
                    return Ok(instance);
                }

                let instance = self.instantiate(registry, context)?;
                match storage {
                    Some(storage) => {
                        debug!("保存作用域组件: {} ({})", identity, kind);
                        storage.set(identity, instance.clone());
                    }
                    None => {
                        warn!(
                            "未提供作用域存储 {} (活动存储 {} 个)，组件 {} 的实例不会被缓存",
                            kind,
                            context.storages().len(),
                            identity
                        );
                    }
                }
                Ok(instance)
            }
        }
    }

    fn ensure_acyclic(&self, registry: &ComponentRegistryImpl) -> DependencyResult<()> {
        if self.graph_verified.load(Ordering::Acquire) {
            return Ok(());
        }
        if registry.check_graph(self.identity())? == GraphCheck::Acyclic {
            self.graph_verified.store(true, Ordering::Release);
        }
        Ok(())
    }

    fn instantiate(
        &self,
        registry: &ComponentRegistryImpl,
        context: &mut ResolveContext<'_>,
    ) -> DependencyResult<Instance> {
        let metadata = &self.metadata;

        match &metadata.instantiation {
            Instantiation::Constructor(constructor) => {
                let mut args = Vec::with_capacity(metadata.constructor_dependencies.len());
                for dependency in &metadata.constructor_dependencies {
                    args.push(registry.resolve_in(dependency, context)?);
                }

                let mut args = ConstructorArgs::new(metadata.identity.clone(), args);
                let mut instance = constructor(&mut args)?;
                if args.remaining() > 0 {
                    debug!(
                        "构造函数未使用全部依赖: {}, 剩余 {} 个",
                        metadata.identity,
                        args.remaining()
                    );
                }

                for property in &metadata.property_dependencies {
                    let injected = (property.setter)(instance.as_mut(), &mut || {
                        registry.resolve_in(&property.dependency, context)
                    })?;
                    if injected {
                        debug!("注入属性依赖: {}.{}", metadata.identity, property.property_name);
                    } else {
                        debug!(
                            "属性已有值，跳过注入: {}.{}",
                            metadata.identity, property.property_name
                        );
                    }
                }

                Ok(Arc::from(instance))
            }
            Instantiation::FactoryMethod {
                factory,
                method_name,
                method,
            } => {
                let factory_instance = registry.resolve_in(factory, context)?;
                debug!("调用工厂方法: {}.{}", factory, method_name);
                method(&factory_instance)
            }
        }
    }
}

impl std::fmt::Debug for RegisteredComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredComponent")
            .field("identity", self.identity())
            .field("scope", &self.scope)
            .field("instantiated", &self.cached_instance().is_some())
            .finish()
    }
}
