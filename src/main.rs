use clap::Parser;
use release_resolver::utils::error::ErrorSeverity;
use release_resolver::utils::{logger, validation::Validate};
use release_resolver::{CliConfig, ResolverConfig, ResolverService};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match &cli.config {
        Some(path) => match ResolverConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => ResolverConfig::default(),
    };

    if config.is_production() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting release-resolver");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let service = ResolverService::from_config(&config)?;

    if cli.info {
        println!("{}", serde_json::to_string_pretty(&service.info())?);
        return Ok(());
    }

    let query = match cli.query() {
        Ok(query) => query,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if !cli.skip_probe {
        let calibration = service.calibrate().await;
        tracing::info!(
            "⏱️ Request interval: {}ms",
            calibration.interval().as_millis()
        );
    }

    let deadline = Duration::from_secs(cli.timeout_seconds);
    match service.resolve(&query, deadline).await {
        Ok(suggestions) => {
            let json = serde_json::to_string_pretty(&suggestions)?;
            if !config.is_production() {
                tracing::debug!("{}", json);
            }
            tracing::info!("✅ {} suggestion(s)", suggestions.len());
            println!("{}", json);
        }
        Err(e) => {
            tracing::error!(
                "❌ Resolution failed: {} (Kind: {:?}, Severity: {:?})",
                e,
                e.kind(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
