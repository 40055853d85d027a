//! 元数据定义
//!
//! 提供组件标识、组件元数据以及替代运行时反射的构造函数表、属性设置表和工厂方法表。

use crate::errors::{DependencyError, DependencyResult};
use crate::lifecycle::{ComponentScope, ComponentType, LifecycleHooks};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 已发布的组件实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 构造中的组件实例，属性注入完成前由构造方独占
pub type OwnedInstance = Box<dyn Any + Send + Sync>;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            name: short_type_name(full_name).to_string(),
            id: TypeId::of::<T>(),
            module_path: full_name.to_string(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        &self.name
    }
}

fn short_type_name(full_name: &str) -> &str {
    // 泛型参数中同样含有 "::"，只截取外层路径
    let outer = full_name.split('<').next().unwrap_or(full_name);
    let start = outer.rfind("::").map_or(0, |pos| pos + 2);
    &full_name[start..]
}

/// 组件标识
///
/// 相等性只由 `(name, owner)` 决定，`label` 仅用于展示。
#[derive(Debug, Clone)]
pub struct ComponentIdentity {
    name: String,
    owner: TypeInfo,
    label: Option<String>,
}

impl ComponentIdentity {
    /// 未命名组件，名称取自类型名
    pub fn of<T: ?Sized + 'static>() -> Self {
        let owner = TypeInfo::of::<T>();
        Self {
            name: owner.name.clone(),
            owner,
            label: None,
        }
    }

    /// 命名组件
    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: TypeInfo::of::<T>(),
            label: None,
        }
    }

    /// 设置展示标签
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// 组件名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 所属类型
    pub fn owner(&self) -> &TypeInfo {
        &self.owner
    }

    /// 展示标签
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl PartialEq for ComponentIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.owner.id == other.owner.id
    }
}

impl Eq for ComponentIdentity {}

impl Hash for ComponentIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.owner.id.hash(state);
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.owner.name {
            f.write_str(&self.name)
        } else {
            write!(f, "{}<{}>", self.name, self.owner.name)
        }
    }
}

/// 按声明顺序提供已解析的构造函数依赖
pub struct ConstructorArgs {
    identity: ComponentIdentity,
    args: std::vec::IntoIter<Instance>,
    position: usize,
}

impl ConstructorArgs {
    /// 创建构造参数
    pub fn new(identity: ComponentIdentity, args: Vec<Instance>) -> Self {
        Self {
            identity,
            args: args.into_iter(),
            position: 0,
        }
    }

    /// 正在构造的组件标识
    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    /// 取出下一个参数的原始实例
    pub fn next_instance(&mut self) -> DependencyResult<Instance> {
        let position = self.position;
        self.position += 1;
        self.args
            .next()
            .ok_or_else(|| DependencyError::MissingConstructorArgument {
                identity: self.identity.to_string(),
                position,
            })
    }

    /// 取出下一个参数并转换为具体类型
    pub fn next<T: Any + Send + Sync>(&mut self) -> DependencyResult<Arc<T>> {
        let position = self.position;
        self.next_instance()?.downcast::<T>().map_err(|_| {
            DependencyError::type_mismatch::<T>(format!("{} (参数 {})", self.identity, position))
        })
    }

    /// 剩余参数数量
    pub fn remaining(&self) -> usize {
        self.args.len()
    }
}

/// 构造函数表项
pub type ConstructorFn =
    Arc<dyn Fn(&mut ConstructorArgs) -> DependencyResult<OwnedInstance> + Send + Sync>;

/// 属性设置函数
///
/// 第二个参数用于按需解析依赖；属性已有值时不会调用它，返回 `false`。
pub type PropertySetterFn = Arc<
    dyn Fn(
            &mut (dyn Any + Send + Sync),
            &mut dyn FnMut() -> DependencyResult<Instance>,
        ) -> DependencyResult<bool>
        + Send
        + Sync,
>;

/// 工厂方法表项，接收工厂实例并返回所提供的组件实例
pub type FactoryMethodFn = Arc<dyn Fn(&Instance) -> DependencyResult<Instance> + Send + Sync>;

/// 属性依赖
#[derive(Clone)]
pub struct PropertyDependency {
    /// 属性名称
    pub property_name: String,
    /// 依赖的组件标识
    pub dependency: ComponentIdentity,
    /// 强类型设置函数
    pub setter: PropertySetterFn,
}

impl PropertyDependency {
    /// 通过字段访问器构造属性依赖
    ///
    /// 字段类型为 `Option<Arc<D>>`，已经为 `Some` 的字段不会被覆盖。
    pub fn new<T, D, F>(property_name: impl Into<String>, dependency: ComponentIdentity, accessor: F) -> Self
    where
        T: Any + Send + Sync,
        D: Any + Send + Sync,
        F: Fn(&mut T) -> &mut Option<Arc<D>> + Send + Sync + 'static,
    {
        let property_name = property_name.into();
        let property = property_name.clone();
        let dependency_identity = dependency.clone();

        let setter: PropertySetterFn = Arc::new(
            move |target: &mut (dyn Any + Send + Sync),
                  resolve: &mut dyn FnMut() -> DependencyResult<Instance>|
                  -> DependencyResult<bool> {
                let component = target
                    .downcast_mut::<T>()
                    .ok_or_else(|| DependencyError::type_mismatch::<T>(&property))?;
                let slot = accessor(component);
                if slot.is_some() {
                    return Ok(false);
                }
                let value = resolve()?
                    .downcast::<D>()
                    .map_err(|_| DependencyError::type_mismatch::<D>(&dependency_identity))?;
                *slot = Some(value);
                Ok(true)
            },
        );

        Self {
            property_name,
            dependency,
            setter,
        }
    }
}

impl fmt::Debug for PropertyDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDependency")
            .field("property_name", &self.property_name)
            .field("dependency", &self.dependency)
            .field("setter", &"<function>")
            .finish()
    }
}

/// 工厂提供的组件
#[derive(Clone)]
pub struct ProvidedComponent {
    /// 工厂方法名称
    pub method_name: String,
    /// 所提供组件的标识
    pub identity: ComponentIdentity,
    /// 方法级别的作用域覆盖
    pub scope: Option<ComponentScope>,
    /// 工厂方法
    pub method: FactoryMethodFn,
}

impl ProvidedComponent {
    /// 通过工厂类型 `F` 上的方法构造
    pub fn new<F, T, M>(method_name: impl Into<String>, identity: ComponentIdentity, method: M) -> Self
    where
        F: Any + Send + Sync,
        T: Any + Send + Sync,
        M: Fn(&F) -> DependencyResult<T> + Send + Sync + 'static,
    {
        let method_name = method_name.into();
        let name = method_name.clone();
        let method: FactoryMethodFn = Arc::new(move |factory: &Instance| -> DependencyResult<Instance> {
            let factory = factory
                .downcast_ref::<F>()
                .ok_or_else(|| DependencyError::type_mismatch::<F>(&name))?;
            Ok(Arc::new(method(factory)?) as Instance)
        });

        Self {
            method_name,
            identity,
            scope: None,
            method,
        }
    }

    /// 设置方法级别作用域
    pub fn with_scope(mut self, scope: ComponentScope) -> Self {
        self.scope = Some(scope);
        self
    }
}

impl fmt::Debug for ProvidedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvidedComponent")
            .field("method_name", &self.method_name)
            .field("identity", &self.identity)
            .field("scope", &self.scope)
            .field("method", &"<function>")
            .finish()
    }
}

/// 组件实例的创建方式
#[derive(Clone)]
pub enum Instantiation {
    /// 直接调用构造函数
    Constructor(ConstructorFn),
    /// 调用单例工厂上的方法
    FactoryMethod {
        /// 工厂组件标识
        factory: ComponentIdentity,
        /// 方法名称
        method_name: String,
        /// 方法
        method: FactoryMethodFn,
    },
}

impl fmt::Debug for Instantiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor(_) => f.write_str("Constructor(<function>)"),
            Self::FactoryMethod {
                factory,
                method_name,
                ..
            } => f
                .debug_struct("FactoryMethod")
                .field("factory", factory)
                .field("method_name", method_name)
                .finish(),
        }
    }
}

/// 组件元数据
///
/// 注册后不可变。`scope` 为 `None` 时使用注册表的默认作用域。
#[derive(Debug, Clone)]
pub struct ComponentMetadata {
    /// 组件标识
    pub identity: ComponentIdentity,
    /// 组件类型
    pub component_type: ComponentType,
    /// 显式声明的作用域
    pub scope: Option<ComponentScope>,
    /// 构造函数依赖，顺序即参数顺序
    pub constructor_dependencies: Vec<ComponentIdentity>,
    /// 属性依赖
    pub property_dependencies: Vec<PropertyDependency>,
    /// 工厂提供的组件
    pub provides: Vec<ProvidedComponent>,
    /// 仅用于循环检测和归属记录的额外依赖
    pub extra_dependencies: Vec<ComponentIdentity>,
    /// 生命周期钩子名称
    pub hooks: LifecycleHooks,
    /// 组件定义所在文件
    pub file_path: Option<String>,
    /// 供使用方附加的自定义属性
    pub attributes: HashMap<String, String>,
    /// 实例创建方式
    pub instantiation: Instantiation,
}

impl ComponentMetadata {
    /// 普通组件的元数据构建器
    pub fn component<T, F>(identity: ComponentIdentity, constructor: F) -> ComponentMetadataBuilder
    where
        T: Any + Send + Sync,
        F: Fn(&mut ConstructorArgs) -> DependencyResult<T> + Send + Sync + 'static,
    {
        ComponentMetadataBuilder::new(identity, ComponentType::Component, constructor)
    }

    /// 工厂组件的元数据构建器
    pub fn factory<T, F>(identity: ComponentIdentity, constructor: F) -> ComponentMetadataBuilder
    where
        T: Any + Send + Sync,
        F: Fn(&mut ConstructorArgs) -> DependencyResult<T> + Send + Sync + 'static,
    {
        ComponentMetadataBuilder::new(identity, ComponentType::Factory, constructor)
    }

    /// 是否为工厂组件
    pub fn is_factory(&self) -> bool {
        self.component_type == ComponentType::Factory
    }

    /// 循环检测使用的全部依赖边
    pub fn dependency_edges(&self) -> Vec<ComponentIdentity> {
        self.constructor_dependencies
            .iter()
            .chain(self.property_dependencies.iter().map(|p| &p.dependency))
            .chain(self.extra_dependencies.iter())
            .cloned()
            .collect()
    }

    /// 创建实例时实际会解析的依赖
    ///
    /// 不含 `extra_dependencies`，工厂方法创建的组件包含其工厂。
    pub fn resolution_edges(&self) -> Vec<ComponentIdentity> {
        let factory = match &self.instantiation {
            Instantiation::FactoryMethod { factory, .. } => Some(factory),
            Instantiation::Constructor(_) => None,
        };

        self.constructor_dependencies
            .iter()
            .chain(self.property_dependencies.iter().map(|p| &p.dependency))
            .chain(factory)
            .cloned()
            .collect()
    }
}

/// 组件元数据构建器
pub struct ComponentMetadataBuilder {
    metadata: ComponentMetadata,
}

impl ComponentMetadataBuilder {
    fn new<T, F>(identity: ComponentIdentity, component_type: ComponentType, constructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut ConstructorArgs) -> DependencyResult<T> + Send + Sync + 'static,
    {
        let constructor: ConstructorFn =
            Arc::new(move |args: &mut ConstructorArgs| -> DependencyResult<OwnedInstance> {
            Ok(Box::new(constructor(args)?) as OwnedInstance)
        });

        Self {
            metadata: ComponentMetadata {
                identity,
                component_type,
                scope: None,
                constructor_dependencies: Vec::new(),
                property_dependencies: Vec::new(),
                provides: Vec::new(),
                extra_dependencies: Vec::new(),
                hooks: LifecycleHooks::default(),
                file_path: None,
                attributes: HashMap::new(),
                instantiation: Instantiation::Constructor(constructor),
            },
        }
    }

    /// 设置作用域
    pub fn scope(mut self, scope: ComponentScope) -> Self {
        self.metadata.scope = Some(scope);
        self
    }

    /// 添加构造函数依赖
    pub fn constructor_dependency(mut self, dependency: ComponentIdentity) -> Self {
        self.metadata.constructor_dependencies.push(dependency);
        self
    }

    /// 添加属性依赖
    pub fn property_dependency(mut self, dependency: PropertyDependency) -> Self {
        self.metadata.property_dependencies.push(dependency);
        self
    }

    /// 添加工厂提供的组件
    pub fn provides(mut self, provided: ProvidedComponent) -> Self {
        self.metadata.provides.push(provided);
        self
    }

    /// 添加额外依赖
    pub fn extra_dependency(mut self, dependency: ComponentIdentity) -> Self {
        self.metadata.extra_dependencies.push(dependency);
        self
    }

    /// 设置构造后钩子
    pub fn post_construct(mut self, method_name: impl Into<String>) -> Self {
        self.metadata.hooks.post_construct = Some(method_name.into());
        self
    }

    /// 设置销毁前钩子
    pub fn pre_destroy(mut self, method_name: impl Into<String>) -> Self {
        self.metadata.hooks.pre_destroy = Some(method_name.into());
        self
    }

    /// 设置定义文件
    pub fn file_path(mut self, path: impl Into<String>) -> Self {
        self.metadata.file_path = Some(path.into());
        self
    }

    /// 添加自定义属性
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.attributes.insert(key.into(), value.into());
        self
    }

    /// 完成构建
    pub fn build(self) -> ComponentMetadata {
        self.metadata
    }
}
