use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, error};
use paper_pulse::{
    agents::{Pipeline, RoleRunner, ToolBox, WorkerRole},
    config::Config,
    llm::adapter_from_config,
    routes::create_router,
    scheduler::CycleScheduler,
    search::ArxivClient,
    utils::init_logger,
    AppState, StateStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // A missing credential aborts here, before anything is bound
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);
    info!("Backend: {:?}", config.llm);

    let store = StateStore::new(Duration::from_secs(config.schedule.interval_secs));

    // Assemble the pipeline
    let llm = adapter_from_config(&config.llm);
    let arxiv = Arc::new(ArxivClient::new(&config.arxiv.api_base)?);
    let pipeline = Pipeline::new(
        RoleRunner::new(
            llm,
            ToolBox::paper_search(arxiv, config.arxiv.max_results),
            config.llm.max_tool_rounds,
        ),
        WorkerRole::roster(&config.llm.model),
        config.arxiv.lookback_days,
    );

    // Start the background cycle
    let cancel = CancellationToken::new();
    let scheduler = CycleScheduler::new(
        pipeline,
        store.clone(),
        Duration::from_secs(config.schedule.error_backoff_secs),
        cancel.clone(),
    )
    .spawn();

    let app = create_router(AppState {
        store,
        config: config.clone(),
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    cancel.cancel();
    if let Err(e) = scheduler.await {
        error!("Scheduler task ended abnormally: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            // Without a signal handler the server runs until killed
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
    cancel.cancel();
}
