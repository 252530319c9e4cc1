//! Subcommand handlers.

use anyhow::{Context, anyhow, bail};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tradeoff_core::{
    AnalyzerMode, Analyzer, ConfigError, ConfigOverrides, ServiceConfig, build_analyzer,
    gateway, load_config, validate_request,
};

use crate::Commands;

pub async fn handle_command(command: Commands, config_file: Option<&Path>) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port, mock } => {
            let overrides = ConfigOverrides {
                host,
                port,
                analyzer: mock.then_some(AnalyzerMode::Mock),
            };
            let config = load(config_file, &overrides)?;
            let analyzer = analyzer_for(&config)?;
            gateway::run(&config, analyzer)
                .await
                .with_context(|| format!("Server on {} failed", config.server.bind_addr()))
        }
        Commands::Compare { file, mock } => {
            let overrides = ConfigOverrides {
                analyzer: mock.then_some(AnalyzerMode::Mock),
                ..ConfigOverrides::default()
            };
            let config = load(config_file, &overrides)?;
            let analyzer = analyzer_for(&config)?;
            compare_file(&file, analyzer.as_ref()).await
        }
        Commands::Config => {
            let config = load(config_file, &ConfigOverrides::default())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> anyhow::Result<ServiceConfig> {
    let config = load_config(config_file, overrides)
        .map_err(|e| anyhow!("Configuration error: {}", e))?;
    for warning in config.validate() {
        warn!("{}", warning);
    }
    Ok(config)
}

fn analyzer_for(config: &ServiceConfig) -> anyhow::Result<Arc<dyn Analyzer>> {
    build_analyzer(config).map_err(|e| match e {
        ConfigError::EnvVarMissing { var } => anyhow!(
            "{} is not set. Export it, add it to .env, or run with --mock for offline analysis.",
            var
        ),
        other => anyhow::Error::new(other).context("Cannot start the analyzer"),
    })
}

async fn compare_file(path: &Path, analyzer: &dyn Analyzer) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read request file {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let request = match validate_request(&raw) {
        Ok(request) => request,
        Err(e) => {
            for violation in &e.violations {
                eprintln!("  {}", violation);
            }
            bail!("Invalid comparison request ({} violation(s))", e.violations.len());
        }
    };

    info!(
        options = request.options().len(),
        analyzer = analyzer.kind(),
        "Analyzing request"
    );
    let report = analyzer
        .analyze(&request)
        .await
        .map_err(|e| anyhow!("Analysis failed ({}): {}", e.kind(), e))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
