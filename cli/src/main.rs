//! chartspec - compile dashboard chart configurations from the command line

mod settings;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chart_data::{process_table, LoadConfig, Record, RecordLoader, TableRequest};
use charts::{specification_json, validate_chart_config, ChartConfig, ChartDataService, ChartKind, WidgetParams};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::SettingsLoader;

/// Exit status for a configuration that fails validation
const INVALID_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "chartspec")]
#[command(about = "Compile dashboard chart configurations into chart specifications")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the chart specification for a configuration and data file
    Chart {
        /// Chart kind: bar, line, area, pie, scatter, bubble or radar
        #[arg(long)]
        kind: ChartKind,

        #[command(flatten)]
        data: DataArgs,

        /// Chart configuration JSON
        #[arg(long)]
        config: PathBuf,

        /// Call-site widget params JSON
        #[arg(long)]
        params: Option<PathBuf>,

        /// Render settings JSON (theme, palette and display defaults)
        #[arg(long)]
        settings: Option<PathBuf>,

        #[arg(long)]
        pretty: bool,
    },
    /// Filter, sort, search and paginate records as a table
    Table {
        #[command(flatten)]
        data: DataArgs,

        /// Table request JSON (columns, filters, sort, search, page)
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        pretty: bool,
    },
    /// Validate a chart configuration without any data
    Validate {
        #[arg(long)]
        kind: ChartKind,

        #[arg(long)]
        config: PathBuf,

        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Records JSON: an array of objects, or an object holding one
    #[arg(long)]
    data: PathBuf,

    /// Dot path to the records array inside the data file
    #[arg(long)]
    root: Option<String>,
}

impl DataArgs {
    fn load(&self) -> Result<Vec<Record>> {
        let mut config = LoadConfig::default();
        if let Some(ref root) = self.root {
            config = config.with_root_path(root.clone());
        }
        RecordLoader::with_config(config)
            .load_file(&self.data)
            .with_context(|| format!("loading records from {}", self.data.display()))
    }
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Chart {
            kind,
            data,
            config,
            params,
            settings,
            pretty,
        } => {
            let records = data.load()?;
            let config: ChartConfig = read_json(&config)?;
            let call_site: Option<WidgetParams> = params.as_deref().map(read_json::<WidgetParams>).transpose()?;

            let mut service = ChartDataService::new();
            if let Some(path) = settings {
                let mut loader = SettingsLoader::new(path);
                let defaults = loader.load_sync()?.to_widget_params();
                tracing::debug!(path = %loader.settings_path().display(), "loaded render settings");
                service = service.with_component_defaults(defaults);
            }

            let context = service.create_context(kind, &records, &config, call_site.as_ref());
            if !context.is_valid() {
                print_json(&context.validation, pretty)?;
                return Ok(ExitCode::from(INVALID_CONFIG));
            }
            print_json(&specification_json(&context)?, pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Table { data, config, pretty } => {
            let records = data.load()?;
            let request: TableRequest = match config {
                Some(path) => read_json(&path)?,
                None => TableRequest::default(),
            };
            print_json(&process_table(&records, &request), pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { kind, config, pretty } => {
            let config: ChartConfig = read_json(&config)?;
            let result = validate_chart_config(kind, &config);
            print_json(&result, pretty)?;
            Ok(if result.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(INVALID_CONFIG)
            })
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chart_command() {
        let cli = Cli::try_parse_from([
            "chartspec", "chart", "--kind", "pie", "--data", "rows.json", "--config", "pie.json", "--pretty",
        ])
        .unwrap();
        match cli.command {
            Command::Chart { kind, pretty, params, .. } => {
                assert_eq!(kind, ChartKind::Pie);
                assert!(pretty);
                assert!(params.is_none());
            }
            _ => panic!("expected chart command"),
        }

        assert!(Cli::try_parse_from(["chartspec", "chart", "--kind", "gauge", "--data", "a", "--config", "b"]).is_err());
    }

    #[test]
    fn test_read_json_reports_path() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "[").unwrap();

        let err = read_json::<ChartConfig>(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.json"));
    }
}
