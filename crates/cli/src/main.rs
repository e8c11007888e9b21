use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};

use holding_watch_core::errors::CoreError;
use holding_watch_core::format::format_number;
use holding_watch_core::models::change::{chart_title, RowKey};
use holding_watch_core::models::chart::ChartOption;
use holding_watch_core::models::event::ChangeKind;
use holding_watch_core::models::query::{ChangeQuery, SortOrder, DEFAULT_MIN_TOTAL_PRICE};
use holding_watch_core::models::settings::ApiConfig;
use holding_watch_core::providers::http::HttpChangeSource;
use holding_watch_core::providers::traits::ChangeSource;
use holding_watch_core::services::chart_registry::{ChartHandle, ChartSurface};
use holding_watch_core::services::chart_service::ChartService;
use holding_watch_core::HoldingWatch;

#[derive(Parser)]
#[command(name = "holding-watch", about = "Query insider ownership changes and annotated price charts")]
struct Cli {
    /// JSON file with `base_url` / `timeout_ms`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in milliseconds (overrides the config file)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// More log output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List ownership changes in a date range
    Changes {
        /// First day (YYYY-MM-DD); defaults to the start of this month
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD); defaults to today
        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long, value_enum, default_value = "increase")]
        kind: KindArg,

        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Minimum total transaction value (0 disables the filter)
        #[arg(long, default_value_t = DEFAULT_MIN_TOTAL_PRICE)]
        min_total: f64,

        /// Also fetch and print the chart of this row (0-based)
        #[arg(long)]
        expand: Option<usize>,
    },

    /// Print the annotated price chart of a stock
    Chart {
        #[arg(long)]
        code: String,

        /// Stock name for the chart title
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Print one actor's change history in a stock as a chart
    History {
        #[arg(long)]
        code: String,

        /// Stock name for the chart title
        #[arg(long, default_value = "")]
        name: String,

        /// Actor whose changes to show
        #[arg(long)]
        changer: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Increase,
    Decrease,
    All,
}

impl KindArg {
    fn to_kind(self) -> Option<ChangeKind> {
        match self {
            KindArg::Increase => Some(ChangeKind::Increase),
            KindArg::Decrease => Some(ChangeKind::Decrease),
            KindArg::All => None,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => SortOrder::Asc,
            SortArg::Desc => SortOrder::Desc,
        }
    }
}

/// Mounts charts by printing their configuration as JSON to stdout.
struct StdoutSurface;

struct PrintedChart {
    key: RowKey,
}

impl ChartHandle for PrintedChart {
    fn dispose(&mut self) {
        log::debug!("Disposed {}", self.key);
    }
}

impl ChartSurface for StdoutSurface {
    type Handle = PrintedChart;

    fn mount(&mut self, key: &RowKey, option: &ChartOption) -> Option<PrintedChart> {
        match serde_json::to_string_pretty(option) {
            Ok(json) => {
                println!("{json}");
                Some(PrintedChart { key: key.clone() })
            }
            Err(e) => {
                log::error!("Failed to serialize chart {key}: {e}");
                None
            }
        }
    }
}

fn init_log(verbose: u8) {
    let (global_level, my_code_level) = match verbose {
        0 => (log::LevelFilter::Warn, log::LevelFilter::Info),
        1 => (log::LevelFilter::Warn, log::LevelFilter::Debug),
        _ => (log::LevelFilter::Info, log::LevelFilter::Trace),
    };

    env_logger::Builder::new()
        .filter(None, global_level)
        .filter(Some("holding_watch_core"), my_code_level)
        .filter(Some("holding_watch"), my_code_level)
        .parse_default_env()
        .init();
}

fn load_config(cli: &Cli) -> Result<ApiConfig, CoreError> {
    let mut config = match &cli.config {
        Some(path) => ApiConfig::from_json_file(path)?,
        None => ApiConfig::default(),
    };
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(timeout) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout);
    }
    config.validated()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CoreError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_log(cli.verbose);

    let config = load_config(&cli)?;
    let source = HttpChangeSource::new(&config)?;
    log::info!("Using backend {}", source.base_url());

    match cli.command {
        Command::Changes {
            start,
            end,
            kind,
            sort,
            min_total,
            expand,
        } => {
            let today = Local::now().date_naive();
            let default_range = ChangeQuery::current_month(today);
            let query = ChangeQuery::new(
                start.unwrap_or(default_range.start),
                end.unwrap_or(default_range.end),
            )
            .with_change_type(kind.to_kind())
            .with_sort(sort.map(SortOrder::from))
            .with_min_total(Some(min_total));

            let mut watch = HoldingWatch::new(source, StdoutSurface);
            watch.search(query).await?;
            print_json(&watch.records())?;
            eprintln!(
                "{} rows ({} increases, {} decreases), {} total increase",
                watch.rows().len(),
                watch.increase_count(),
                watch.decrease_count(),
                format_number(watch.rows().iter().map(|r| r.record.total_increase).sum()),
            );

            if let Some(index) = expand {
                if !watch.expand(index).await? {
                    eprintln!("Row {index} has no chart");
                }
            }
        }
        Command::Chart { code, name } => {
            let detail = source.fetch_chart(&code).await?;
            if detail.is_empty() {
                log::warn!("No price data for {code}");
            }
            let option = ChartService::new().chart_for_detail(&chart_title(&name, &code), &detail);
            print_json(&option)?;
        }
        Command::History {
            code,
            name,
            changer,
        } => {
            let watch = HoldingWatch::new(source, StdoutSurface);
            let option = watch
                .history_chart(&code, &name, changer.as_deref())
                .await?;
            print_json(&option)?;
        }
    }

    Ok(())
}
