use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use clap::Parser;

use faceblur_core::detection::infrastructure::model_cache::ModelCache;
use faceblur_core::shared::constants::{FACE_MODEL_NAME, FACE_MODEL_URL};
use faceblur_server::config::Config;
use faceblur_server::router;
use faceblur_server::service::{BlurService, VideoBlurService};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    config.validate()?;

    log::info!("Resolving face model: {FACE_MODEL_NAME}");
    let models = ModelCache::new(config.model_dir.clone(), config.download_timeout())?;
    let model_path = models.resolve(FACE_MODEL_NAME, FACE_MODEL_URL, download_progress())?;

    let service = VideoBlurService::new(&config, model_path)?;
    service
        .verify_model()
        .map_err(|e| format!("Error loading face model: {e}"))?;
    log::info!("Face model loaded from {}", service.model_path().display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config.socket_addr(), Arc::new(service)))
}

async fn serve(
    addr: SocketAddr,
    service: Arc<dyn BlurService>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Starting face blur service on {addr}");
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Could not listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}

/// Logs model download progress in 10% steps.
fn download_progress() -> impl FnMut(u64, Option<u64>) {
    let mut last_step = None;
    move |downloaded, total| {
        let Some(total) = total.filter(|&t| t > 0) else {
            return;
        };
        let step = downloaded * 10 / total;
        if last_step.replace(step) != Some(step) {
            log::info!("Downloading face detection model... {}%", step * 10);
        }
    }
}
