//! 作用域存储抽象接口
//!
//! 自定义作用域组件的实例由调用方提供的存储保存，容器只调用 `get`/`set`。

use infrastructure_common::{ComponentIdentity, Instance};

/// 作用域存储 trait
///
/// 每种作用域（如 "request"、"session"）对应一个存储实例，
/// 同步由提供方负责。
pub trait ScopedStorage {
    /// 存储对应的作用域种类
    fn scope_kind(&self) -> &str;

    /// 按组件标识查找已有实例
    fn get(&self, identity: &ComponentIdentity) -> Option<Instance>;

    /// 保存实例
    fn set(&self, identity: &ComponentIdentity, instance: Instance);
}

/// 在活动存储中查找与作用域种类匹配的第一个存储
pub fn find_storage<'a>(
    storages: &[&'a dyn ScopedStorage],
    scope_kind: &str,
) -> Option<&'a dyn ScopedStorage> {
    storages
        .iter()
        .copied()
        .find(|storage| storage.scope_kind() == scope_kind)
}
