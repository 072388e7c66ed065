use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelgen_db::{PgVideoStore, VideoStore};
use reelgen_events::{CallbackConfig, EventBus, EventPersistence, WebhookNotifier};
use reelgen_pipeline::{GenerationPipeline, PipelineConfig, RevisionPipeline, StageRunner};
use reelgen_providers::{
    ChatClient, FalClipGenerator, FalImageEditor, FalMusicGenerator, FalQueueClient,
    FalSpeechSynthesizer, FalVideoComposer, OpenAiRevisionAnalyzer, OpenAiScriptGenerator,
    ProvidersConfig,
};
use reelgen_worker::{TaskRunner, WorkerConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelgen_worker=debug,reelgen_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let worker_config = WorkerConfig::from_env();
    let providers_config = ProvidersConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    let callback_config = CallbackConfig::from_env();
    tracing::info!(
        poll_interval_secs = worker_config.poll_interval_secs,
        task_timeout_secs = worker_config.task_timeout_secs,
        "Loaded worker configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = reelgen_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    reelgen_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    reelgen_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Providers ---
    let queue = FalQueueClient::new(
        providers_config.fal_base_url.clone(),
        providers_config.fal_api_key.clone(),
    );
    let chat = ChatClient::new(&providers_config);
    let store: Arc<dyn VideoStore> = Arc::new(PgVideoStore::new(pool.clone()));
    let notifier = Arc::new(WebhookNotifier::new(callback_config));

    // --- Pipelines ---
    let runner = Arc::new(StageRunner::new(
        Arc::clone(&store),
        Arc::new(FalImageEditor::new(queue.clone())),
        Arc::new(FalClipGenerator::new(queue.clone())),
        Arc::new(FalSpeechSynthesizer::new(queue.clone())),
        Arc::new(FalMusicGenerator::new(queue.clone())),
        Arc::new(FalVideoComposer::new(queue)),
    ));
    let generation = GenerationPipeline::new(
        Arc::clone(&store),
        Arc::new(OpenAiScriptGenerator::new(chat.clone())),
        Arc::clone(&runner),
        notifier.clone(),
        pipeline_config,
    );
    let revision = RevisionPipeline::new(
        Arc::clone(&store),
        Arc::new(OpenAiRevisionAnalyzer::new(chat)),
        runner,
        notifier.clone(),
    );

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let persistence_handle = tokio::spawn(EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    tracing::info!("Event persistence started");

    // --- Task runner ---
    let cancel = CancellationToken::new();
    let task_runner = TaskRunner::new(
        pool,
        store,
        generation,
        revision,
        notifier,
        Arc::clone(&event_bus),
        worker_config,
    );
    let runner_cancel = cancel.clone();
    let runner_handle = tokio::spawn(async move {
        task_runner.run(runner_cancel).await;
    });

    shutdown_signal().await;

    // --- Shutdown ---
    // A run in flight only observes the token between tasks, so the join
    // is bounded; an abandoned claim is recovered by the stale sweep.
    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(10), runner_handle).await;
    tracing::info!("Task runner stopped");

    // Drop the event bus sender to close the broadcast channel.
    // This signals persistence to shut down.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), persistence_handle).await;
    tracing::info!("Event persistence shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
