//! 解析上下文
//!
//! 一次顶层解析调用内共享的状态：正在构造的组件链和调用方提供的作用域存储。

use crate::storage::{find_storage, ScopedStorage};
use infrastructure_common::{ComponentIdentity, DependencyError, DependencyResult};

/// 解析上下文
///
/// 嵌套解析原样转发同一组作用域存储。
pub struct ResolveContext<'a> {
    /// 当前解析链，用于检测循环依赖
    resolution_chain: Vec<ComponentIdentity>,
    /// 活动的作用域存储
    storages: &'a [&'a dyn ScopedStorage],
    /// 最大递归深度
    max_depth: usize,
}

impl<'a> ResolveContext<'a> {
    /// 创建新的解析上下文
    pub fn new(storages: &'a [&'a dyn ScopedStorage], max_depth: usize) -> Self {
        Self {
            resolution_chain: Vec::new(),
            storages,
            max_depth,
        }
    }

    /// 添加组件到解析链
    pub fn push(&mut self, identity: &ComponentIdentity) -> DependencyResult<()> {
        if self.resolution_chain.contains(identity) {
            return Err(DependencyError::CircularDependency {
                dependency_chain: self.describe_chain(identity),
            });
        }
        if self.resolution_chain.len() >= self.max_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                identity: identity.to_string(),
                max_depth: self.max_depth,
            });
        }
        self.resolution_chain.push(identity.clone());
        Ok(())
    }

    /// 从解析链中移除最后一个组件
    pub fn pop(&mut self) {
        self.resolution_chain.pop();
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    /// 活动的作用域存储
    pub fn storages(&self) -> &'a [&'a dyn ScopedStorage] {
        self.storages
    }

    /// 查找与作用域种类匹配的存储
    pub fn storage_for(&self, scope_kind: &str) -> Option<&'a dyn ScopedStorage> {
        find_storage(self.storages, scope_kind)
    }

    fn describe_chain(&self, repeated: &ComponentIdentity) -> String {
        self.resolution_chain
            .iter()
            .chain(std::iter::once(repeated))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
