use {
    pay_relay::{
        AppState,
        adapters::{
            http::router,
            nats::{self, NatsPublisher},
            stripe::{SignatureVerifier, StripeCheckout},
        },
        config::Config,
    },
    std::sync::Arc,
    tokio::{signal, sync::watch},
    tracing_subscriber::EnvFilter,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let nats_client = nats::connect(&config.nats_servers)
        .await
        .expect("failed to connect to NATS");

    let state = AppState {
        checkout: Arc::new(StripeCheckout::new(&config.stripe_secret)),
        publisher: Arc::new(NatsPublisher::new(nats_client.clone())),
        verifier: Arc::new(SignatureVerifier::new(
            config.webhook_secret.as_str(),
            config.webhook_tolerance_secs,
        )),
        redirects: Arc::new(config.redirects.clone()),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let responder = tokio::spawn(nats::run_session_responder(
        nats_client.clone(),
        state.clone(),
        shutdown_rx,
    ));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    tracing::info!("listening on {addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    shutdown_tx.send(true).ok();
    match responder.await {
        Ok(Err(e)) => tracing::error!(error = %e, "session responder failed"),
        Err(e) => tracing::error!(error = %e, "session responder panicked"),
        Ok(Ok(())) => {}
    }

    // Drain events still buffered in the client before exiting.
    if let Err(e) = nats_client.flush().await {
        tracing::warn!(error = %e, "failed to flush NATS client");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
