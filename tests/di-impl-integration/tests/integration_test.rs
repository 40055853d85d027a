//! 容器端到端集成测试
//!
//! 模拟宿主应用：从配置文件构建容器，按请求创建作用域存储，关闭时处理销毁钩子。

use di_abstractions::{ComponentRegistry, ContainerBuilder, ContainerConfig};
use di_impl::{init_logging, ComponentRegistryImpl, DiContainerBuilder, InMemoryScopedStorage, LoggingConfig};
use infrastructure_common::{
    ComponentIdentity, ComponentMetadata, ComponentScope, ConstructorArgs, DependencyError,
    PropertyDependency, ProvidedComponent,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

fn init_test_logging() {
    INIT.call_once(|| {
        let _ = init_logging(&LoggingConfig::development().with_filter("debug"));
    });
}

const CONTAINER_TOML: &str = r#"
default_scope = "singleton"
custom_scopes = ["request", "session"]
max_resolution_depth = 32
validate_on_build = true
"#;

#[derive(Debug)]
struct AppConfig {
    database_url: String,
}

#[derive(Debug)]
struct ConnectionPool {
    url: String,
    opened: Arc<AtomicUsize>,
}

/// 提供连接池的工厂
#[derive(Debug)]
struct InfrastructureFactory {
    config: Arc<AppConfig>,
    opened: Arc<AtomicUsize>,
}

impl InfrastructureFactory {
    fn connection_pool(&self) -> ConnectionPool {
        self.opened.fetch_add(1, Ordering::SeqCst);
        ConnectionPool {
            url: self.config.database_url.clone(),
            opened: self.opened.clone(),
        }
    }
}

#[derive(Debug)]
struct UserRepository {
    pool: Arc<ConnectionPool>,
}

#[derive(Debug)]
struct RequestSession {
    id: usize,
}

#[derive(Debug)]
struct UserController {
    repository: Arc<UserRepository>,
    session: Option<Arc<RequestSession>>,
}

fn components(opened: Arc<AtomicUsize>, sessions: Arc<AtomicUsize>) -> Vec<ComponentMetadata> {
    vec![
        ComponentMetadata::component(ComponentIdentity::of::<AppConfig>(), |_| {
            Ok(AppConfig {
                database_url: "postgres://localhost/adsp".to_string(),
            })
        })
        .build(),
        ComponentMetadata::factory(
            ComponentIdentity::of::<InfrastructureFactory>(),
            move |args: &mut ConstructorArgs| {
                Ok(InfrastructureFactory {
                    config: args.next::<AppConfig>()?,
                    opened: opened.clone(),
                })
            },
        )
        .constructor_dependency(ComponentIdentity::of::<AppConfig>())
        .provides(ProvidedComponent::new(
            "connectionPool",
            ComponentIdentity::named::<ConnectionPool>("primaryPool"),
            |factory: &InfrastructureFactory| Ok(factory.connection_pool()),
        ))
        .file_path("src/infrastructure/factory.rs")
        .build(),
        ComponentMetadata::component(
            ComponentIdentity::of::<UserRepository>(),
            |args: &mut ConstructorArgs| {
                Ok(UserRepository {
                    pool: args.next::<ConnectionPool>()?,
                })
            },
        )
        .constructor_dependency(ComponentIdentity::named::<ConnectionPool>("primaryPool"))
        .pre_destroy("close")
        .build(),
        ComponentMetadata::component(ComponentIdentity::of::<RequestSession>(), move |_| {
            Ok(RequestSession {
                id: sessions.fetch_add(1, Ordering::SeqCst),
            })
        })
        .scope(ComponentScope::custom("request"))
        .build(),
        ComponentMetadata::component(
            ComponentIdentity::of::<UserController>(),
            |args: &mut ConstructorArgs| {
                Ok(UserController {
                    repository: args.next::<UserRepository>()?,
                    session: None,
                })
            },
        )
        .scope(ComponentScope::NewInstance)
        .constructor_dependency(ComponentIdentity::of::<UserRepository>())
        .property_dependency(PropertyDependency::new(
            "session",
            ComponentIdentity::of::<RequestSession>(),
            |controller: &mut UserController| &mut controller.session,
        ))
        .attribute("kind", "controller")
        .attribute("route", "/users")
        .build(),
    ]
}

fn build_container(
    opened: Arc<AtomicUsize>,
    sessions: Arc<AtomicUsize>,
) -> anyhow::Result<ComponentRegistryImpl> {
    init_test_logging();
    let config = ContainerConfig::from_toml_str(CONTAINER_TOML)?;

    let mut builder = DiContainerBuilder::new().with_config(config);
    for metadata in components(opened, sessions) {
        builder = builder.register(metadata);
    }
    Ok(builder.build()?)
}

#[test]
fn test_request_lifecycle() -> anyhow::Result<()> {
    let opened = Arc::new(AtomicUsize::new(0));
    let sessions = Arc::new(AtomicUsize::new(0));
    let registry = build_container(opened.clone(), sessions.clone())?;

    // 工厂 + 1 个提供组件 + 4 个普通组件
    assert_eq!(registry.len(), 6);

    let controller_id = ComponentIdentity::of::<UserController>();

    let first_request = InMemoryScopedStorage::new("request");
    let a = registry.get_typed::<UserController>(&controller_id, &[&first_request])?;
    let b = registry.get_typed::<UserController>(&controller_id, &[&first_request])?;

    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a.repository, &b.repository));
    assert!(Arc::ptr_eq(
        a.session.as_ref().unwrap(),
        b.session.as_ref().unwrap()
    ));
    assert_eq!(first_request.len(), 1);

    let second_request = InMemoryScopedStorage::new("request");
    let c = registry.get_typed::<UserController>(&controller_id, &[&second_request])?;
    assert_ne!(
        a.session.as_ref().unwrap().id,
        c.session.as_ref().unwrap().id
    );
    assert_eq!(sessions.load(Ordering::SeqCst), 2);

    // 连接池由工厂方法创建一次，所有请求共享
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(c.repository.pool.url, "postgres://localhost/adsp");
    assert_eq!(c.repository.pool.opened.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_metadata_is_exposed_to_host() -> anyhow::Result<()> {
    let registry = build_container(
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
    )?;

    let controller = registry
        .metadata(&ComponentIdentity::of::<UserController>())
        .ok_or_else(|| anyhow::anyhow!("UserController 未注册"))?;
    assert_eq!(controller.attributes.get("kind").map(String::as_str), Some("controller"));

    let controllers: Vec<_> = registry
        .identities()
        .into_iter()
        .filter_map(|id| registry.metadata(&id))
        .filter(|m| m.attributes.get("kind").map(String::as_str) == Some("controller"))
        .collect();
    assert_eq!(controllers.len(), 1);

    let pool = registry
        .metadata(&ComponentIdentity::named::<ConnectionPool>("primaryPool"))
        .ok_or_else(|| anyhow::anyhow!("primaryPool 未注册"))?;
    assert_eq!(pool.file_path.as_deref(), Some("src/infrastructure/factory.rs"));
    assert_eq!(
        pool.extra_dependencies,
        vec![ComponentIdentity::of::<InfrastructureFactory>()]
    );
    Ok(())
}

#[test]
fn test_pre_destroy_hooks_of_instantiated_singletons() -> anyhow::Result<()> {
    let registry = build_container(
        Arc::new(AtomicUsize::new(0)),
        Arc::new(AtomicUsize::new(0)),
    )?;

    registry.get_component(&ComponentIdentity::of::<UserRepository>(), &[])?;

    let hooks: Vec<String> = registry
        .instantiated_singletons()
        .into_iter()
        .filter_map(|(metadata, _)| metadata.hooks.pre_destroy.clone())
        .collect();
    assert_eq!(hooks, vec!["close".to_string()]);
    Ok(())
}

#[test]
fn test_invalid_declaration_fails_build() {
    init_test_logging();
    let result = DiContainerBuilder::new()
        .register(
            ComponentMetadata::component(ComponentIdentity::of::<RequestSession>(), |_| {
                Ok(RequestSession { id: 0 })
            })
            .scope(ComponentScope::custom("request"))
            .post_construct("init")
            .build(),
        )
        .build();

    assert!(matches!(
        result,
        Err(DependencyError::InvalidScopedComponent { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_requests_share_singletons() -> anyhow::Result<()> {
    let opened = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(build_container(
        opened.clone(),
        Arc::new(AtomicUsize::new(0)),
    )?);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let request = InMemoryScopedStorage::new("request");
            let controller = registry.get_typed::<UserController>(
                &ComponentIdentity::of::<UserController>(),
                &[&request],
            )?;
            Ok::<_, DependencyError>(controller.repository.clone())
        }));
    }

    let mut repositories = Vec::new();
    for handle in handles {
        repositories.push(handle.await??);
    }

    assert!(repositories.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    Ok(())
}
