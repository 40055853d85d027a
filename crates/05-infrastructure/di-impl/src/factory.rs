//! 工厂展开
//!
//! 工厂组件上声明的每个方法都会展开为一个独立注册的组件，
//! 该组件通过调用工厂单例上的方法创建实例。

use di_abstractions::ContainerConfig;
use infrastructure_common::{
    ComponentMetadata, ComponentScope, ComponentType, DependencyError, DependencyResult,
    Instantiation, LifecycleHooks,
};
use std::collections::HashMap;
use tracing::debug;

/// 工厂展开器
pub struct FactoryExpander<'a> {
    config: &'a ContainerConfig,
}

impl<'a> FactoryExpander<'a> {
    /// 创建展开器
    pub fn new(config: &'a ContainerConfig) -> Self {
        Self { config }
    }

    /// 展开工厂，返回每个方法对应的元数据与生效作用域
    ///
    /// 所提供组件依赖工厂本身，这条边只参与循环检测，构造时由工厂方法负责解析工厂。
    pub fn expand(
        &self,
        factory: &ComponentMetadata,
    ) -> DependencyResult<Vec<(ComponentMetadata, ComponentScope)>> {
        if !factory.is_factory() {
            return Err(DependencyError::InvalidMetadata {
                identity: factory.identity.to_string(),
                message: "只能展开工厂组件".to_string(),
            });
        }
        if factory.provides.is_empty() {
            return Err(DependencyError::EmptyFactory {
                identity: factory.identity.to_string(),
            });
        }

        factory
            .provides
            .iter()
            .map(|provided| {
                let scope = provided
                    .scope
                    .clone()
                    .unwrap_or_else(|| self.config.default_scope.clone());

                if !self.config.supports_scope(&scope) {
                    return Err(DependencyError::UnsupportedScope {
                        identity: provided.identity.to_string(),
                        scope: scope.to_string(),
                    });
                }

                debug!(
                    "展开工厂方法: {}.{} -> {} ({})",
                    factory.identity, provided.method_name, provided.identity, scope
                );

                let metadata = ComponentMetadata {
                    identity: provided.identity.clone(),
                    component_type: ComponentType::Component,
                    scope: Some(scope.clone()),
                    constructor_dependencies: Vec::new(),
                    property_dependencies: Vec::new(),
                    provides: Vec::new(),
                    extra_dependencies: vec![factory.identity.clone()],
                    hooks: LifecycleHooks::default(),
                    file_path: factory.file_path.clone(),
                    attributes: HashMap::new(),
                    instantiation: Instantiation::FactoryMethod {
                        factory: factory.identity.clone(),
                        method_name: provided.method_name.clone(),
                        method: provided.method.clone(),
                    },
                };
                Ok((metadata, scope))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure_common::{ComponentIdentity, ProvidedComponent};

    struct Factory;
    struct X;
    struct Y;

    impl Factory {
        fn make_x(&self) -> X {
            X
        }

        fn make_y(&self) -> Y {
            Y
        }
    }

    fn factory_metadata() -> ComponentMetadata {
        ComponentMetadata::factory(ComponentIdentity::of::<Factory>(), |_| Ok(Factory))
            .provides(ProvidedComponent::new(
                "makeX",
                ComponentIdentity::of::<X>(),
                |f: &Factory| Ok(f.make_x()),
            ))
            .provides(
                ProvidedComponent::new("makeY", ComponentIdentity::of::<Y>(), |f: &Factory| {
                    Ok(f.make_y())
                })
                .with_scope(ComponentScope::NewInstance),
            )
            .file_path("src/factory.rs")
            .build()
    }

    #[test]
    fn test_expand_each_method() {
        let config = ContainerConfig::default();
        let expanded = FactoryExpander::new(&config)
            .expand(&factory_metadata())
            .unwrap();

        assert_eq!(expanded.len(), 2);

        let (x, x_scope) = &expanded[0];
        assert_eq!(x.identity, ComponentIdentity::of::<X>());
        assert_eq!(*x_scope, ComponentScope::Singleton);
        assert!(x.constructor_dependencies.is_empty());
        assert_eq!(x.extra_dependencies, vec![ComponentIdentity::of::<Factory>()]);
        assert_eq!(x.file_path.as_deref(), Some("src/factory.rs"));
        assert!(matches!(
            &x.instantiation,
            Instantiation::FactoryMethod { method_name, .. } if method_name == "makeX"
        ));

        let (_, y_scope) = &expanded[1];
        assert_eq!(*y_scope, ComponentScope::NewInstance);
    }

    #[test]
    fn test_expand_uses_configured_default_scope() {
        let config = ContainerConfig::default().with_default_scope(ComponentScope::NewInstance);
        let expanded = FactoryExpander::new(&config)
            .expand(&factory_metadata())
            .unwrap();
        assert_eq!(expanded[0].1, ComponentScope::NewInstance);
    }

    #[test]
    fn test_expand_rejects_unknown_scope() {
        let metadata = ComponentMetadata::factory(ComponentIdentity::of::<Factory>(), |_| Ok(Factory))
            .provides(
                ProvidedComponent::new("makeX", ComponentIdentity::of::<X>(), |f: &Factory| {
                    Ok(f.make_x())
                })
                .with_scope(ComponentScope::custom("tenant")),
            )
            .build();

        let config = ContainerConfig::default();
        assert!(matches!(
            FactoryExpander::new(&config).expand(&metadata),
            Err(DependencyError::UnsupportedScope { .. })
        ));
    }

    #[test]
    fn test_expand_empty_factory() {
        let metadata =
            ComponentMetadata::factory(ComponentIdentity::of::<Factory>(), |_| Ok(Factory)).build();
        let config = ContainerConfig::default();
        assert!(matches!(
            FactoryExpander::new(&config).expand(&metadata),
            Err(DependencyError::EmptyFactory { .. })
        ));
    }
}
