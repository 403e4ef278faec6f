use clap::Parser;
use loki_control::utils::{logger, validation::Validate};
use loki_control::{ControlConfig, Daemon, DaemonArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = DaemonArgs::parse();

    logger::init_daemon_logger(args.verbose, args.json_logs);

    tracing::info!("🚀 Starting loki-daemon");
    tracing::info!("📁 Loading configuration from: {}", args.config.display());

    let mut config = match ControlConfig::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load config file '{}': {}", args.config.display(), e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if let Some(socket) = args.socket {
        tracing::info!("🔧 Socket overridden to: {}", socket);
        config.daemon.socket_path = socket;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!(
        "✅ Allowing writes under [{}] and programs [{}]",
        config.daemon.allowed_write_prefixes.join(", "),
        config.daemon.allowed_programs.join(", ")
    );

    let daemon = match Daemon::bind(&config.daemon) {
        Ok(daemon) => daemon,
        Err(e) => {
            tracing::error!(
                "❌ Could not bind {}: {} (Severity: {:?})",
                config.daemon.socket_path,
                e,
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code().max(1));
        }
    };

    daemon.run_until(shutdown_signal()).await?;
    tracing::info!("👋 loki-daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("Cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT"),
        _ = terminate.recv() => tracing::info!("Received SIGTERM"),
    }
}
