//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use user_service::config::ServiceConfig;
use user_service::lifecycle::{Application, Shutdown};

/// A running service on an ephemeral port, backed by in-memory SQLite.
pub struct TestService {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<()>,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.database.url = "sqlite::memory:".into();
    config
}

/// Start the full application and wait until it answers.
pub async fn spawn_service(config: ServiceConfig) -> TestService {
    let app = Application::build(config).await.unwrap();
    let addr = app.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        app.run(server_shutdown).await.unwrap();
    });

    let client = client();
    for _ in 0..50 {
        if client.get(format!("http://{}/", addr)).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    TestService { addr, shutdown, handle }
}

/// A client that never pools or goes through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
