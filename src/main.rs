use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use patient_intake::adapters::http::{app_router, TwimlSettings, VoiceHandlers};
use patient_intake::adapters::{
    InMemorySessionStore, LoggingSender, ResendConfig, ResendSender, SessionSweeper,
    SessionSweeperConfig,
};
use patient_intake::application::{
    CallStatusHandler, ConfirmationDispatcher, ContinueCallHandler, StartCallHandler,
};
use patient_intake::config::AppConfig;
use patient_intake::domain::intake::{IntakeStateMachine, ResponseComposer, RetryPolicy};
use patient_intake::domain::scheduling::AppointmentGenerator;
use patient_intake::domain::validation::HeuristicAddressValidator;
use patient_intake::ports::{NotificationSender, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let sender = build_sender(&config)?;
    info!(sender = sender.name(), "Notification sender ready");

    let dispatcher = ConfirmationDispatcher::new(sender)
        .with_max_attempts(config.email.max_send_attempts)
        .with_backoff(Duration::from_millis(config.email.retry_backoff_ms));

    let generator =
        AppointmentGenerator::from_utc_offset_minutes(config.intake.clinic_utc_offset_minutes)?;
    let machine = IntakeStateMachine::new(
        Arc::new(HeuristicAddressValidator::new()),
        generator,
        RetryPolicy::new(config.intake.max_retries),
    )
    .with_slot_count(config.intake.slot_count)
    .with_min_confidence(config.intake.min_confidence);
    let composer = ResponseComposer::new(config.telephony.gather_timeout_secs);

    let handlers = VoiceHandlers::new(
        Arc::new(StartCallHandler::new(store.clone(), machine.clone(), composer)),
        Arc::new(ContinueCallHandler::new(
            store.clone(),
            machine,
            composer,
            dispatcher,
        )),
        Arc::new(CallStatusHandler::new(store.clone())),
        composer,
        TwimlSettings {
            action: config.server.webhook_url(&config.telephony.continue_path),
            voice: config.telephony.voice.clone(),
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = SessionSweeper::with_config(
        store.clone(),
        SessionSweeperConfig::default()
            .with_interval(Duration::from_secs(config.intake.sweep_interval_secs))
            .with_inactivity_timeout(config.intake.inactivity_timeout_secs)
            .with_retention(config.intake.retention_secs),
    );
    let sweeper_task = tokio::spawn(async move {
        if let Err(e) = sweeper.run(shutdown_rx).await {
            warn!(error = %e, "Session sweeper stopped");
        }
    });

    let app = app_router(handlers, store)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "Patient intake line listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Could not listen for Ctrl+C, shutting down");
            }
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    let _ = sweeper_task.await;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_sender(config: &AppConfig) -> Result<Arc<dyn NotificationSender>, Box<dyn std::error::Error>> {
    match config.email.api_key() {
        Some(key) => {
            let resend = ResendConfig::new(key, config.email.from_header(), &config.email.to_email)
                .with_base_url(&config.email.base_url)
                .with_timeout(Duration::from_secs(config.email.send_timeout_secs));
            Ok(Arc::new(ResendSender::new(resend)?))
        }
        None => {
            warn!("No Resend API key configured, completed intakes will only be logged");
            Ok(Arc::new(LoggingSender::new()))
        }
    }
}
