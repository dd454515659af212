use clap::{Parser, Subcommand};
use guardian::adapters::{
    HttpCluster, HttpInvestigations, HttpNotifier, HttpPredictor, LocalNotifier, SimulatedCluster,
    SimulatedMetricsSource,
};
use guardian::adapters::{ClusterApi, InvestigationSource, Notifier, Predictor};
use guardian::config::AppConfig;
use guardian::coordination::CoordinationRegistry;
use guardian::correlation::CorrelationService;
use guardian::domain::{AgentState, AgentStatus, ServiceMetrics};
use guardian::error::Result;
use guardian::registry::AgentRegistry;
use guardian::scaling::{rules, ScalingEngine, ScalingMonitor};
use guardian::services::{self, AppState};
use guardian::StaticInvestigations;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "guardian", about = "Multi-agent incident correlation and coordination engine")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "guardian.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine with its HTTP surface and the monitoring loop
    Serve {
        /// Override the configured API port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the rule-based verdict for one metrics snapshot
    Decide {
        #[arg(long)]
        service: String,
        #[arg(long)]
        cpu: f64,
        #[arg(long)]
        memory: f64,
        #[arg(long, default_value_t = 100.0)]
        response_time: f64,
        #[arg(long, default_value_t = 0.0)]
        error_rate: f64,
        #[arg(long, default_value_t = 1)]
        replicas: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            init_logging(&config);
            let port = port.unwrap_or(config.api.port);
            run_serve(config, port).await?;
        }
        Commands::Decide {
            service,
            cpu,
            memory,
            response_time,
            error_rate,
            replicas,
        } => {
            init_logging_simple();
            let metrics = ServiceMetrics {
                service_name: service,
                cpu_usage: cpu,
                memory_usage: memory,
                current_replicas: replicas,
                desired_replicas: replicas,
                response_time_avg: response_time,
                request_rate: 0.0,
                error_rate,
                timestamp: chrono::Utc::now(),
            };
            let reference_tz = chrono::FixedOffset::east_opt(
                config.scaling.utc_offset_hours * 3600,
            )
            .unwrap_or_else(|| chrono::FixedOffset::east_opt(0).expect("zero offset is valid"));
            let local_now = chrono::Utc::now().with_timezone(&reference_tz);
            let decision = rules::decide(
                &metrics,
                local_now,
                config.scaling.min_replicas,
                config.scaling.max_replicas,
            );
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
    }

    Ok(())
}

async fn run_serve(config: AppConfig, port: u16) -> Result<()> {
    info!("starting guardian coordination engine");

    let correlation = Arc::new(CorrelationService::new(config.correlation.window_secs));
    let registry = Arc::new(AgentRegistry::new());
    let coordination = Arc::new(CoordinationRegistry::new());

    // Collaborators: HTTP where an endpoint is configured, built-in
    // stand-ins otherwise
    let predictor: Option<Arc<dyn Predictor>> = match &config.collaborators.model_url {
        Some(url) => {
            info!(url = %url, "AI predictor enabled");
            Some(Arc::new(HttpPredictor::new(
                url,
                config.collaborators.model_api_key.clone(),
            )))
        }
        None => {
            info!("no model endpoint configured, scaling runs on rules");
            None
        }
    };

    let investigations: Arc<dyn InvestigationSource> = match &config.collaborators.investigations_url
    {
        Some(url) => Arc::new(HttpInvestigations::new(url)),
        None => Arc::new(StaticInvestigations::new(0)),
    };

    let cluster: Arc<dyn ClusterApi> = match &config.collaborators.cluster_url {
        Some(url) => Arc::new(HttpCluster::new(url)),
        None => {
            let simulated = SimulatedCluster::new();
            for service in &config.scaling.monitored_services {
                simulated.seed(service, 2).await;
            }
            Arc::new(simulated)
        }
    };

    let metrics_source = Arc::new(SimulatedMetricsSource::new(cluster.clone()));

    let notifier: Arc<dyn Notifier> = match &config.collaborators.notify_url {
        Some(url) => Arc::new(HttpNotifier::new(url)),
        None => Arc::new(LocalNotifier::new(correlation.clone())),
    };

    if config.scaling.start_paused {
        coordination
            .pause(
                &config.scaling.coordination_domain,
                "Auto-scaling disabled by configuration",
                "guardian",
            )
            .await;
    }

    registry
        .register(
            AgentState::new("ops-guardian", AgentStatus::Active).with_capabilities(&[
                "infrastructure_monitoring",
                "auto_scaling",
                "traffic_prediction",
            ]),
        )
        .await;

    let engine = Arc::new(ScalingEngine::new(
        config.scaling.clone(),
        predictor,
        investigations,
        cluster,
        notifier,
        metrics_source,
        coordination.clone(),
    ));

    let monitor = ScalingMonitor::new(
        engine.clone(),
        std::time::Duration::from_secs(config.scaling.monitor_interval_secs),
    )
    .spawn();

    let state = AppState {
        correlation,
        registry,
        coordination,
        engine,
        monitoring_active: monitor.running_flag(),
        started_at: chrono::Utc::now(),
    };

    services::serve(state, port, shutdown_signal()).await?;

    info!("shutting down, waiting for the monitor cycle boundary");
    monitor.stop().await;
    info!("guardian stopped");
    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,guardian=debug"));

    match &config.logging.dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "guardian.log");
            if config.logging.json {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(file_appender)
                    .json()
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .init();
            }
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .init();
        }
    }
}

fn init_logging_simple() {
    // Minimal logging for one-shot CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
