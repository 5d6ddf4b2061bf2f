use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use teatrack_backend::config::{Config, PaginationConfig, StatsConfig};
use teatrack_backend::routes::build_router;
use teatrack_backend::state::AppState;
use teatrack_backend::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

pub fn test_config(sled_path: String) -> Config {
    // 直接构造 Config，避免 set_var 造成多线程测试环境变量竞态
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        jwt_secret: format!("integration-test-jwt-secret-{}", uuid::Uuid::new_v4()),
        cors_origin: "http://localhost:5173".to_string(),
        stats: StatsConfig::default(),
        pagination: PaginationConfig::default(),
    }
}

pub async fn spawn_with_config(customize: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("teatrack-test.sled");

    let mut config = test_config(sled_path.to_string_lossy().to_string());
    customize(&mut config);

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let state = AppState::new(store, &config);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_server() -> TestApp {
    spawn_with_config(|_| {}).await
}
