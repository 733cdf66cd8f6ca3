use clap::Parser;
use dagen_cli::commands::{self, cli};
use dagen_core::api as core_api;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, core_api::CliError> {
    let args = cli::Args::parse();
    let cfg = core_api::load_default().map_err(|e| core_api::CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(core_api::CliError::Command)?;

    tracing::debug!(
        target: "dagen.cli",
        stage = "start",
        version = core_api::GENERATOR_VERSION,
        "dagen starting"
    );

    match args.command {
        cli::Commands::Compile(a) => commands::compile::handle_compile(a),
        cli::Commands::Run(a) => commands::run::handle_run(a, &cfg).await,
        cli::Commands::Publish(a) => commands::publish::handle_publish(a, &cfg).await,
        cli::Commands::Validate(a) => commands::validate::handle_validate(a),
    }
}

fn exit_code_for_error(e: &core_api::CliError) -> i32 {
    i32::from(e.error_code().as_u16())
}

fn init_tracing(logging: &core_api::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("dagen"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("dagen.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Ok(());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
