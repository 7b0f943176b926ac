use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use clap::{Args, Parser, Subcommand};
use reqwest::Client;
use skumapper::{
    cache::RateCardCache,
    config::{regions, Options},
    fetch::{self, Credentials},
    io::{self, load, unload},
    model::{RateCard, VmSizeList},
    pipeline::{self, CancelFlag, PipelineInput, Progress, StageReport},
    project::catalog::filter_vm_sizes,
    rates::RateCalc,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Map on-premises VM inventories to Azure VM SKUs and estimate monthly cost"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Map an inventory sheet and write the mapping and override sheets.
    Map(MapArgs),
    /// Write an example inventory sheet.
    Sample {
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        options: Option<PathBuf>,
        #[arg(long, default_value = "USD")]
        currency: String,
    },
    /// Download the CSP rate card into the cache directory.
    FetchRateCard(FetchRateCardArgs),
    /// Download the VM size list of a region as JSON.
    FetchVmSizes(FetchVmSizesArgs),
}

#[derive(Args)]
struct MapArgs {
    #[arg(long)]
    vm_specs: PathBuf,
    #[arg(long)]
    output: PathBuf,
    #[arg(long)]
    override_input: Option<PathBuf>,
    /// Defaults to `<output stem>-overrides.csv`.
    #[arg(long)]
    override_output: Option<PathBuf>,
    /// Defaults to `<override input stem>-validated.csv` next to the output.
    #[arg(long)]
    validated_override_output: Option<PathBuf>,
    #[arg(long)]
    rate_card: PathBuf,
    #[arg(long)]
    vm_sizes: PathBuf,
    /// Azure region, e.g. "West US" (ARM and pricing names work too).
    #[arg(long)]
    region: String,
    #[arg(long)]
    options: Option<PathBuf>,
    /// Used when the rate card does not name its currency.
    #[arg(long, default_value = "USD")]
    currency: String,
}

#[derive(Args)]
struct AccountArgs {
    #[arg(long, env = "SKUMAPPER_TENANT_ID")]
    tenant_id: String,
    #[arg(long, env = "SKUMAPPER_APP_ID")]
    app_id: String,
    #[arg(long, env = "SKUMAPPER_USERNAME")]
    username: String,
    #[arg(long, env = "SKUMAPPER_PASSWORD", hide_env_values = true)]
    password: String,
}

impl AccountArgs {
    fn credentials(&self) -> Credentials {
        Credentials {
            tenant_id: self.tenant_id.clone(),
            app_id: self.app_id.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Args)]
struct FetchRateCardArgs {
    #[command(flatten)]
    account: AccountArgs,
    #[arg(long, default_value = "USD")]
    currency: String,
    /// Two-letter CSP market, e.g. "US".
    #[arg(long, default_value = "US")]
    market: String,
    #[arg(long, default_value = "en-US")]
    locale: String,
    #[arg(long, default_value = "ratecards")]
    cache_dir: PathBuf,
    /// Reuse a cached card younger than this many hours.
    #[arg(long)]
    max_age_hours: Option<i64>,
}

#[derive(Args)]
struct FetchVmSizesArgs {
    #[command(flatten)]
    account: AccountArgs,
    #[arg(long, env = "SKUMAPPER_SUBSCRIPTION_ID")]
    subscription_id: String,
    #[arg(long)]
    region: String,
    #[arg(long)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) dispatch ─────────────────────────────────────────────────
    match Cli::parse().command {
        Command::Map(args) => map(args).await,
        Command::Sample {
            output,
            options,
            currency,
        } => {
            let opts = load_options(options.as_deref())?;
            io::write_rows_to_path(&output, &unload::sample_sheet(opts.memory_unit, &currency))?;
            info!(path = %output.display(), "wrote sample VM specs");
            Ok(())
        }
        Command::FetchRateCard(args) => fetch_rate_card(args).await,
        Command::FetchVmSizes(args) => fetch_vm_sizes(args).await,
    }
}

fn load_options(path: Option<&Path>) -> Result<Options> {
    match path {
        Some(p) => Options::load(p),
        None => Ok(Options::default()),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    path.with_file_name(format!("{stem}-{suffix}.csv"))
}

async fn map(args: MapArgs) -> Result<()> {
    // ─── 1) options & region ─────────────────────────────────────────
    let options = load_options(args.options.as_deref())?;
    let region = regions::lookup(&args.region)
        .ok_or_else(|| anyhow!("unknown Azure region '{}'", args.region))?;
    info!(region = region.display, pricing = region.pricing, "mapping region");

    // ─── 2) rate card & SKU catalog ──────────────────────────────────
    let raw_card = fs::read_to_string(&args.rate_card)
        .with_context(|| format!("reading rate card {}", args.rate_card.display()))?;
    let card = RateCard::parse(&raw_card)?;
    let currency = if card.currency.trim().is_empty() {
        args.currency.clone()
    } else {
        card.currency.clone()
    };
    let rates = RateCalc::new(card.into_meters());
    info!(meters = rates.len(), %currency, "loaded rate card");

    let raw_sizes = fs::read_to_string(&args.vm_sizes)
        .with_context(|| format!("reading VM sizes {}", args.vm_sizes.display()))?;
    let sizes: VmSizeList = serde_json::from_str(&raw_sizes)
        .with_context(|| format!("parsing VM sizes {}", args.vm_sizes.display()))?;
    let catalog = filter_vm_sizes(&sizes.value, &options.series_included);
    info!(available = sizes.value.len(), included = catalog.len(), "filtered VM sizes");

    // ─── 3) input sheets ─────────────────────────────────────────────
    let table = io::read_rows_from_path(&args.vm_specs, options.vm_specs_skip_lines)?;
    let vm_specs = load::vm_specs_from_table(&table, &options.vm_specs_sequence);
    let override_specs = match &args.override_input {
        Some(path) => {
            let table = io::read_rows_from_path(path, options.override_skip_lines)?;
            Some(load::override_specs_from_table(
                &table,
                &options.override_sequence,
            ))
        }
        None => None,
    };

    // ─── 4) run the pipeline off the async threads ───────────────────
    let input = PipelineInput {
        options,
        region: region.pricing.to_string(),
        currency,
        vm_specs,
        override_specs,
        catalog,
        rates,
    };

    let cancel = CancelFlag::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling");
                cancel.cancel();
            }
        }
    });

    let (tx, mut rx) = mpsc::unbounded_channel::<StageReport>();
    let logger = tokio::spawn(async move {
        while let Some(r) = rx.recv().await {
            if r.done == r.total {
                info!(stage = %r.stage, total = r.total, "stage complete");
            } else {
                debug!(stage = %r.stage, done = r.done, total = r.total, "progress");
            }
        }
    });

    let output = tokio::task::spawn_blocking(move || {
        pipeline::run(&input, &Progress::new(tx), &cancel)
    })
    .await??;
    // sender dropped with the closure, so the logger drains and exits
    logger.await?;

    // ─── 5) write results ────────────────────────────────────────────
    io::write_rows_to_path(&args.output, &output.mapping_sheet)?;
    let override_out = args
        .override_output
        .unwrap_or_else(|| sibling(&args.output, "overrides"));
    io::write_rows_to_path(&override_out, &output.override_sheet)?;

    if let (Some(sheet), Some(input_path)) =
        (&output.validated_override_sheet, &args.override_input)
    {
        let path = args.validated_override_output.unwrap_or_else(|| {
            let name = input_path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("overrides.csv"));
            sibling(&args.output.with_file_name(name), "validated")
        });
        io::write_rows_to_path(&path, sheet)?;
    }

    info!(
        records = output.results.len(),
        mapped = output.mapped_count(),
        output = %args.output.display(),
        "done"
    );
    Ok(())
}

async fn fetch_rate_card(args: FetchRateCardArgs) -> Result<()> {
    let cache = RateCardCache::new(&args.cache_dir)?;
    if let Some(max_age) = args.max_age_hours.map(Duration::hours) {
        if let Some(cached) = cache.load(&args.currency, &args.market)? {
            if !cached.is_older_than(max_age) {
                info!(
                    path = %cache.path_for(&args.currency, &args.market).display(),
                    "cached rate card is fresh, skipping download"
                );
                return Ok(());
            }
        }
    }

    let client = Client::new();
    let body = fetch::ratecard::fetch_rate_card(
        &client,
        &args.account.credentials(),
        &args.currency,
        &args.market,
        &args.locale,
    )
    .await?;
    cache.save(&args.currency, &args.market, &body)?;
    Ok(())
}

async fn fetch_vm_sizes(args: FetchVmSizesArgs) -> Result<()> {
    let region = regions::lookup(&args.region)
        .ok_or_else(|| anyhow!("unknown Azure region '{}'", args.region))?;
    let client = Client::new();
    let sizes = fetch::vmsizes::fetch_vm_sizes(
        &client,
        &args.account.credentials(),
        &args.subscription_id,
        region.location,
    )
    .await?;

    let json = serde_json::to_string_pretty(&VmSizeList { value: sizes })?;
    tokio::fs::write(&args.output, json)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(path = %args.output.display(), "wrote VM sizes");
    Ok(())
}
