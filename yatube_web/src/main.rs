use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use yatube_core::{config, YatubeCore};
use yatube_web::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatube_core=info,yatube_web=info,tower_http=debug".into()),
        )
        .init();

    let config = config::get_or_init()
        .await
        .context("failed to load config")?;
    let core = YatubeCore::start(config)
        .await
        .context("failed to start core")?;

    let addr = core.config.bind_addr.clone();
    let app = yatube_web::app(AppState::new(core));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Yatube listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
