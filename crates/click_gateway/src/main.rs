mod config;
mod gateway;
mod metrics;
mod scene;
mod segmenter;

use crate::config::Config;
use crate::gateway::GatewaySvc;
use crate::metrics::GatewayMetrics;
use crate::scene::SceneStore;
use crate::segmenter::Segmenter;
use api::gen::api::v1::click_gateway_server::ClickGatewayServer;
use backproject::calib::CalibrationTable;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Initialization ---
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();
    let config = Config::parse();
    tracing::info!(config = ?config, "Gateway starting with configuration");

    // Long-lived, read-only service objects; the per-click pipeline only ever
    // borrows them.
    let table = Arc::new(CalibrationTable::nuscenes_ring());
    let scene = Arc::new(SceneStore::load(&config.scene_dir)?);
    tracing::info!(scene_dir = %config.scene_dir.display(), "Scene images loaded");

    let segmenter = Segmenter::connect(
        &config.segmenter_grpc_addr,
        Duration::from_millis(config.segment_timeout_ms),
    )
    .await?;
    tracing::info!(addr = %config.segmenter_grpc_addr, "Connected to segmentation collaborator");

    let metrics = Arc::new(GatewayMetrics::new());

    // --- 2. Start Metrics Server ---
    let metrics_router = metrics.router();
    let metrics_addr: std::net::SocketAddr = config.metrics_listen_addr.parse()?;
    tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(metrics_addr)
            .await
            .unwrap();
        tracing::info!(addr = %metrics_addr, "Gateway metrics server started");
        axum::serve(listener, metrics_router.into_make_service())
            .await
            .unwrap();
    });

    // --- 3. Serve Clicks ---
    let svc = GatewaySvc {
        table,
        scene,
        segmenter,
        metrics,
        default_closest_points: config.closest_points,
    };

    let grpc_addr: std::net::SocketAddr = config.grpc_listen_addr.parse()?;
    tracing::info!(addr = %grpc_addr, "Gateway gRPC server started");
    tonic::transport::Server::builder()
        .add_service(ClickGatewayServer::new(svc))
        .serve_with_shutdown(grpc_addr, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received.");
        })
        .await?;

    tracing::info!("Gateway shutting down.");
    Ok(())
}
