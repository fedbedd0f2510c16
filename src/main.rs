// Entry point and high-level CLI flow.
//
// One linear pass:
// - load the sheet (published CSV or a local file),
// - group rows into divisions, naming wards from the directory service,
// - write the JSON array once at the end.
// Any fatal error is logged and exits with status 1; nothing is written.
mod aggregate;
mod config;
mod loader;
mod net;
mod normalize;
mod output;
mod resolver;
mod types;
mod util;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{ChangePolicy, DuplicatePolicy, PipelineOptions, RunConfig, Source};
use resolver::{HttpDirectory, WardNameResolver, WardNames};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rrt_sheet", version, about = "Build the RRT ward directory JSON from the published sheet")]
struct Cli {
    #[arg(long, env = config::SHEET_ID_VAR, hide_env_values = true, help = "Published spreadsheet id")]
    sheet_id: Option<String>,
    #[arg(long, help = "Read rows from a local CSV file instead of the published sheet")]
    input: Option<String>,
    #[arg(
        long,
        default_value_t = config::DEFAULT_SKIP_ROWS,
        help = "Leading records to skip before data rows (the published export has a role header and a column header)"
    )]
    skip_rows: usize,
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT)]
    output: String,
    #[arg(long, help = "Pretty-print the JSON output")]
    pretty: bool,
    #[arg(long, help = "Do not look up ward names")]
    no_resolve: bool,
    #[arg(long, value_enum, default_value_t = ChangePolicy::Reconstructed)]
    change_policy: ChangePolicy,
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Skip)]
    duplicates: DuplicatePolicy,
    #[arg(long, default_value = resolver::DEFAULT_DIRECTORY_URL)]
    directory_url: String,
    #[arg(long, help = "Timeout for each HTTP request, in seconds (default: none)")]
    timeout_secs: Option<u64>,
    #[arg(long, default_value_t = 0, help = "Print the first N divisions as a table")]
    preview: usize,
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<RunConfig> {
        let source = match (self.input, self.sheet_id) {
            (Some(path), _) => Source::File(path),
            (None, Some(id)) if !id.trim().is_empty() => Source::Sheet(id.trim().to_string()),
            _ => bail!("no {} found in env", config::SHEET_ID_VAR),
        };
        Ok(RunConfig {
            source,
            skip_rows: self.skip_rows,
            output: self.output,
            pretty: self.pretty,
            directory_url: self.directory_url,
            timeout: self.timeout_secs.map(Duration::from_secs),
            preview: self.preview,
            pipeline: PipelineOptions {
                change_policy: self.change_policy,
                duplicates: self.duplicates,
                resolve_names: !self.no_resolve,
            },
        })
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the sheet text and parse it into rows.
fn handle_load(cfg: &RunConfig) -> Result<Vec<types::Row>> {
    let text = match &cfg.source {
        Source::Sheet(id) => loader::fetch_csv(&loader::sheet_url(id), cfg.timeout)?,
        Source::File(path) => loader::read_csv_file(path)?,
    };
    let (rows, report) = loader::parse_rows(&text, cfg.skip_rows)?;
    info!(
        "parsed csv file successfully ({} records, {} data rows, {} skipped, {} short rows)",
        util::format_int(report.total_records),
        util::format_int(rows.len()),
        report.skipped_leading,
        util::format_int(report.short_rows)
    );
    Ok(rows)
}

fn run(cfg: RunConfig) -> Result<()> {
    let rows = handle_load(&cfg)?;

    let mut resolver = if cfg.pipeline.resolve_names {
        let source = HttpDirectory::new(&cfg.directory_url, cfg.timeout)
            .context("build directory client")?;
        Some(WardNameResolver::new(source))
    } else {
        None
    };

    let names = resolver.as_mut().map(|r| r as &mut dyn WardNames);
    let (data, report) = aggregate::aggregate(&rows, &cfg.pipeline, names)?;
    info!(
        "successfully built the final json ({} rows, {} divisions, {} wards, {} duplicates dropped, {} rows without a ward number)",
        util::format_int(report.rows),
        util::format_int(report.divisions),
        util::format_int(report.wards),
        util::format_int(report.duplicates),
        util::format_int(report.non_numeric)
    );
    if let Some(r) = &resolver {
        info!(
            "ward names: {} directory fetches, {} districts cached, {} lookups failed",
            r.fetches(),
            r.cache().len(),
            util::format_int(r.failures())
        );
    }

    output::write_json(&cfg.output, &data, cfg.pretty)?;
    info!("successfully wrote data to path {}", cfg.output);

    if cfg.preview > 0 {
        println!("{}", output::preview_table(&data, cfg.preview));
    }
    Ok(())
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = cli.into_config().and_then(run);
    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
