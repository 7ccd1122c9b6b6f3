// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mikrotik_webui::{
    AppEnv, AppState, Config, DeviceRegistry, DeviceService, MetricsRegistry, MikroTikClient,
    Result, create_router,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Загружаем .env файл
    dotenvy::dotenv().ok();

    // Инициализация логирования
    setup_tracing(AppEnv::from_env());

    let config = Config::from_env();

    // Логируем информацию о конфигурации (без паролей)
    tracing::info!("Environment: {}", config.app_env.as_str());
    tracing::info!(
        "Device defaults: port {}, user '{}', timeout {:?}, tls {}, retries {}",
        config.mikrotik.default_port,
        config.mikrotik.username,
        config.mikrotik.timeout,
        config.mikrotik.use_tls,
        config.mikrotik.max_retries
    );

    let metrics = MetricsRegistry::new();
    let client = MikroTikClient::new(&config.mikrotik).map_err(|e| {
        tracing::error!("Failed to build HTTP client: {}", e);
        e
    })?;
    let service = DeviceService::new(
        DeviceRegistry::new(),
        Arc::new(client),
        metrics.clone(),
        &config.mikrotik,
    );

    // Устройства из DEVICES_CONFIG регистрируем в фоне: пробы не задерживают старт
    if !config.devices.is_empty() {
        tracing::info!(
            "Registering {} configured device(s)",
            config.devices.len()
        );
        let seed_service = service.clone();
        let devices = config.devices.clone();
        tokio::spawn(async move {
            let added = seed_service.seed_devices(&devices).await;
            tracing::info!("Registered {} of {} configured device(s)", added, devices.len());
        });
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        service,
        metrics,
    });

    // Канал завершения (graceful shutdown)
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    // Ожидание Ctrl+C
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let app = create_router(state);

    let addr: SocketAddr = config.server_addr.parse().map_err(|e| {
        tracing::error!("Invalid server address: {}", e);
        e
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind address: {}", e);
        e
    })?;

    tracing::info!("MikroTik Web UI starting on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - GET  /                            - Web UI");
    tracing::info!("  - GET  /devices/{{id}}/rest/{{path}}  - RouterOS resource browser");
    tracing::info!("  - GET  /health                      - Health check");
    tracing::info!("  - GET  /metrics                     - Prometheus metrics");

    // Запуск сервера с graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            tracing::info!("HTTP server shutting down");
        })
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            e
        })?;

    Ok(())
}

fn setup_tracing(app_env: AppEnv) {
    // RUST_LOG имеет приоритет, иначе фильтр по APP_ENV
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(app_env.default_log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
