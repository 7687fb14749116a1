use anyhow::Context;
use clap::Parser;
use log::info;
use skinsight::config::Args;
use skinsight::{server, Classifier};
use std::time::Instant;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skinsight::init_logger();
    let args = Args::parse();

    info!("=== Starting skin lesion classification service ===");

    let manager = args.model_manager().context("Failed to create model cache directory")?;
    let source = args.model_source();
    let model_path = manager
        .resolve(&args.model, source.as_ref(), args.fresh)
        .await
        .with_context(|| format!("Failed to locate model (looked for {})", args.model.display()))?;

    let start_time = Instant::now();
    info!("Loading model from {}...", model_path.display());
    let classifier = Classifier::builder()
        .with_runtime_config(args.runtime_config())
        .with_model_path(&model_path)
        .build()
        .context("Failed to build classifier")?;
    info!("Model loaded in {:.2?}", start_time.elapsed());

    let app = server::router(server::AppState::new(classifier));

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
