//! 内存作用域存储

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use di_abstractions::ScopedStorage;
use infrastructure_common::{ComponentIdentity, Instance};
use tracing::debug;
use uuid::Uuid;

/// 基于内存的作用域存储
///
/// 宿主应用通常为每个请求或会话创建一个存储，作用域结束时丢弃即可释放其中的实例。
pub struct InMemoryScopedStorage {
    id: Uuid,
    scope_kind: String,
    created_at: DateTime<Utc>,
    instances: DashMap<ComponentIdentity, Instance>,
}

impl InMemoryScopedStorage {
    /// 创建指定作用域种类的存储
    pub fn new(scope_kind: impl Into<String>) -> Self {
        let storage = Self {
            id: Uuid::new_v4(),
            scope_kind: scope_kind.into(),
            created_at: Utc::now(),
            instances: DashMap::new(),
        };
        debug!("创建作用域存储: {} ({})", storage.scope_kind, storage.id);
        storage
    }

    /// 存储标识
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 已保存的实例数量
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// 是否保存了指定组件的实例
    pub fn contains(&self, identity: &ComponentIdentity) -> bool {
        self.instances.contains_key(identity)
    }

    /// 清空存储
    pub fn clear(&self) {
        self.instances.clear();
    }
}

impl ScopedStorage for InMemoryScopedStorage {
    fn scope_kind(&self) -> &str {
        &self.scope_kind
    }

    fn get(&self, identity: &ComponentIdentity) -> Option<Instance> {
        self.instances.get(identity).map(|entry| entry.value().clone())
    }

    fn set(&self, identity: &ComponentIdentity, instance: Instance) {
        self.instances.insert(identity.clone(), instance);
    }
}

impl std::fmt::Debug for InMemoryScopedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryScopedStorage")
            .field("id", &self.id)
            .field("scope_kind", &self.scope_kind)
            .field("created_at", &self.created_at)
            .field("instances", &self.instances.len())
            .finish()
    }
}
