//! 组件注册表抽象接口

use crate::resolver::ResolveContext;
use crate::storage::ScopedStorage;
use infrastructure_common::{
    ComponentIdentity, ComponentMetadata, ComponentScope, DependencyError, DependencyResult,
    Instance,
};
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

/// 组件注册表 trait
///
/// 提供组件注册和解析的核心接口
pub trait ComponentRegistry: Send + Sync {
    /// 注册组件，校验失败时注册表保持不变
    fn add_component(&self, metadata: ComponentMetadata) -> DependencyResult<()>;

    /// 在已有解析上下文中解析组件，供嵌套依赖解析使用
    fn resolve_in(
        &self,
        identity: &ComponentIdentity,
        context: &mut ResolveContext<'_>,
    ) -> DependencyResult<Instance>;

    /// 解析组件
    fn get_component(
        &self,
        identity: &ComponentIdentity,
        storages: &[&dyn ScopedStorage],
    ) -> DependencyResult<Instance> {
        let mut context = ResolveContext::new(storages, self.max_resolution_depth());
        self.resolve_in(identity, &mut context)
    }

    /// 解析组件并转换为具体类型
    fn get_typed<T>(
        &self,
        identity: &ComponentIdentity,
        storages: &[&dyn ScopedStorage],
    ) -> DependencyResult<Arc<T>>
    where
        T: Any + Send + Sync,
        Self: Sized,
    {
        self.get_component(identity, storages)?
            .downcast::<T>()
            .map_err(|_| {
                DependencyError::type_mismatch::<T>(format!(
                    "{identity} (声明类型: {})",
                    identity.owner().module_path
                ))
            })
    }

    /// 检查组件是否已注册
    fn contains(&self, identity: &ComponentIdentity) -> bool;

    /// 获取组件元数据
    fn metadata(&self, identity: &ComponentIdentity) -> Option<Arc<ComponentMetadata>>;

    /// 获取所有已注册的组件标识
    fn identities(&self) -> Vec<ComponentIdentity>;

    /// 已注册组件数量
    fn len(&self) -> usize;

    /// 是否没有任何组件
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 元数据未声明作用域时使用的默认作用域
    fn default_scope(&self) -> &ComponentScope;

    /// 最大解析深度
    fn max_resolution_depth(&self) -> usize;

    /// 验证依赖关系：所有依赖都已注册且不存在循环
    fn validate(&self) -> DependencyResult<()>;
}

/// 静态依赖图检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphCheck {
    /// 依赖闭包全部已注册且无环
    Acyclic,
    /// 无环，但闭包中存在尚未注册的组件
    Incomplete,
}

/// 循环依赖检测器
pub trait CircularDependencyDetector: Send + Sync {
    /// 从指定组件出发检查依赖闭包
    ///
    /// `edges` 返回组件声明的依赖；未注册的组件返回 `None`。
    fn check_from(
        &self,
        root: &ComponentIdentity,
        edges: &dyn Fn(&ComponentIdentity) -> Option<Vec<ComponentIdentity>>,
    ) -> DependencyResult<GraphCheck>;

    /// 检查全部组件
    fn detect_circular_dependencies(
        &self,
        roots: &[ComponentIdentity],
        edges: &dyn Fn(&ComponentIdentity) -> Option<Vec<ComponentIdentity>>,
    ) -> DependencyResult<GraphCheck> {
        let mut result = GraphCheck::Acyclic;
        for root in roots {
            if self.check_from(root, edges)? == GraphCheck::Incomplete {
                result = GraphCheck::Incomplete;
            }
        }
        Ok(result)
    }
}

/// 默认循环依赖检测器
#[derive(Debug, Default)]
pub struct DefaultCircularDependencyDetector;

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn check_from(
        &self,
        root: &ComponentIdentity,
        edges: &dyn Fn(&ComponentIdentity) -> Option<Vec<ComponentIdentity>>,
    ) -> DependencyResult<GraphCheck> {
        // 使用深度优先搜索检测循环依赖
        let mut visited = HashSet::new();
        let mut visiting = Vec::new();
        let mut complete = true;
        self.dfs_check(root, edges, &mut visited, &mut visiting, &mut complete)?;

        Ok(if complete {
            GraphCheck::Acyclic
        } else {
            GraphCheck::Incomplete
        })
    }
}

impl DefaultCircularDependencyDetector {
    fn dfs_check(
        &self,
        current: &ComponentIdentity,
        edges: &dyn Fn(&ComponentIdentity) -> Option<Vec<ComponentIdentity>>,
        visited: &mut HashSet<ComponentIdentity>,
        visiting: &mut Vec<ComponentIdentity>,
        complete: &mut bool,
    ) -> DependencyResult<()> {
        if let Some(start) = visiting.iter().position(|id| id == current) {
            // 检测到循环依赖
            let chain = visiting[start..]
                .iter()
                .chain(std::iter::once(current))
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");

            return Err(DependencyError::CircularDependency {
                dependency_chain: chain,
            });
        }

        if visited.contains(current) {
            return Ok(());
        }

        let Some(dependencies) = edges(current) else {
            tracing::trace!("依赖图中存在未注册组件: {}", current);
            *complete = false;
            visited.insert(current.clone());
            return Ok(());
        };

        visiting.push(current.clone());
        for dep in &dependencies {
            self.dfs_check(dep, edges, visited, visiting, complete)?;
        }
        visiting.pop();
        visited.insert(current.clone());

        Ok(())
    }
}
