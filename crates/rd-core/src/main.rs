//! Reward Divergence Core - divergence tables and heatmaps
//!
//! The entry point for rd-core, handling:
//! - Gridworld divergence heatmaps
//! - The synthetic shaping comparison
//! - Catalog listing and configuration checks

use clap::{Args, Parser, Subcommand, ValueEnum};
use rd_common::{format_error_human, Error, FigureFormat, Result};
use rd_config::{
    apply_preset, list_presets, resolve_config, resolve_output_root, validate_plot_config,
    ConfigPath, DivergenceKind, PlotConfig, PresetName, CONFIG_SCHEMA_VERSION,
};
use rd_core::exit_codes::ExitCode;
use rd_core::gridworld::RewardCatalog;
use rd_core::heatmaps::HeatmapOptions;
use rd_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use rd_core::masks::RewardMask;
use rd_core::pipeline::{run_plot_gridworld_divergence, run_shaping_comparison, RunOutcome};
use rd_core::synthetic::{Metric, SyntheticConfig};
use rd_report::apply_styles;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reward Divergence - pairwise reward distances rendered as heatmaps
#[derive(Parser)]
#[command(name = "rd-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Plot configuration file (default: RD_CONFIG, RD_CONFIG_DIR, then XDG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for command results on stdout
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Log format on stderr (default: RD_LOG_FORMAT, then human)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv); without -v or -q, RD_LOG then RUST_LOG apply
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute divergences between gridworld rewards and save heatmaps
    PlotGridworldDivergence(PlotArgs),

    /// Compare EPIC and L2 distances under random shaping
    ShapingComparison(ShapingArgs),

    /// List the rewards of a catalog
    Rewards(RewardsArgs),

    /// Validate configuration, styles and masks
    Check(CheckArgs),

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Options shared by commands that load a plot configuration.
#[derive(Args, Debug)]
struct RunOpts {
    /// Named preset applied over the configuration (repeatable)
    #[arg(long = "preset", short = 'p')]
    presets: Vec<PresetName>,

    /// Root directory for run outputs
    #[arg(long)]
    log_root: Option<PathBuf>,

    /// Figure file format
    #[arg(long, value_enum)]
    fmt: Option<FigureFormat>,

    /// Style sheets, replacing the configured list
    #[arg(long, value_delimiter = ',')]
    styles: Option<Vec<String>>,
}

#[derive(Args, Debug)]
struct PlotArgs {
    #[command(flatten)]
    run: RunOpts,

    /// Divergence measure
    #[arg(long)]
    kind: Option<DivergenceKind>,

    /// MDP discount in [0, 1)
    #[arg(long)]
    discount: Option<f64>,

    /// Alternating-minimization rounds
    #[arg(long)]
    n_iter: Option<usize>,

    /// JSON reward catalog instead of the built-in gridworlds
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Only compare these rewards
    #[arg(long, value_delimiter = ',')]
    reward_subset: Option<Vec<String>>,

    /// Divide by the Zero reward's divergence
    #[arg(long)]
    normalize: bool,

    /// Colour limits at the 25th and 75th percentiles
    #[arg(long)]
    robust: bool,
}

#[derive(Args, Debug)]
struct ShapingArgs {
    #[command(flatten)]
    run: RunOpts,

    /// Reward noise levels
    #[arg(long, value_delimiter = ',')]
    reward_noise: Option<Vec<f64>>,

    /// Potential noise levels
    #[arg(long, value_delimiter = ',')]
    potential_noise: Option<Vec<f64>>,

    /// Trials per noise combination
    #[arg(long)]
    trials: Option<usize>,

    /// Random seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Columns to plot
    #[arg(long, value_enum, value_delimiter = ',')]
    metrics: Option<Vec<Metric>>,
}

#[derive(Args, Debug)]
struct RewardsArgs {
    /// JSON reward catalog instead of the built-in gridworlds
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Presets to apply before validating (repeatable)
    #[arg(long = "preset", short = 'p')]
    presets: Vec<PresetName>,

    /// List available presets
    #[arg(long)]
    list_presets: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet);
    init_logging(&LogConfig::from_env(level, cli.global.log_format));

    let result = match cli.command {
        None | Some(Commands::Version) => {
            print_version(&cli.global);
            Ok(ExitCode::Clean)
        }
        Some(Commands::PlotGridworldDivergence(args)) => run_plot(&cli.global, &args),
        Some(Commands::ShapingComparison(args)) => run_shaping(&cli.global, &args),
        Some(Commands::Rewards(args)) => run_rewards(&cli.global, &args),
        Some(Commands::Check(args)) => run_check(&cli.global, &args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(err) => {
            let use_color = !cli.global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(&err, use_color));
            ExitCode::from(&err)
        }
    };
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Configuration loading
// ============================================================================

fn load_config(global: &GlobalOpts, presets: &[PresetName]) -> Result<(PlotConfig, ConfigPath)> {
    let resolved = resolve_config(global.config.as_deref());
    let mut config = match &resolved.path {
        Some(path) => PlotConfig::from_file(path)?,
        None => PlotConfig::default(),
    };
    for preset in presets {
        apply_preset(&mut config, *preset);
    }
    debug!(source = %resolved.source, presets = presets.len(), "Loaded plot configuration");
    Ok((config, resolved))
}

fn apply_run_opts(config: &mut PlotConfig, run: &RunOpts) {
    if let Some(fmt) = run.fmt {
        config.save.fmt = fmt;
    }
    if let Some(styles) = &run.styles {
        config.styles = styles.clone();
    }
}

fn load_catalog(cli: Option<&Path>, configured: Option<&Path>) -> Result<RewardCatalog> {
    match cli.or(configured) {
        Some(path) => RewardCatalog::from_file(path),
        None => Ok(RewardCatalog::builtin()),
    }
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_plot(global: &GlobalOpts, args: &PlotArgs) -> Result<ExitCode> {
    let (mut config, _) = load_config(global, &args.run.presets)?;
    apply_run_opts(&mut config, &args.run);
    if let Some(kind) = args.kind {
        config.kind = kind;
    }
    if let Some(discount) = args.discount {
        config.discount = discount;
    }
    if let Some(n_iter) = args.n_iter {
        config.n_iter = n_iter;
    }
    if let Some(subset) = &args.reward_subset {
        config.reward_subset = Some(subset.clone());
    }
    config.heatmap.normalize |= args.normalize;
    config.heatmap.robust |= args.robust;
    validate_plot_config(&config)?;

    let catalog = load_catalog(args.catalog.as_deref(), config.catalog.as_deref())?;
    let root = resolve_output_root(args.run.log_root.as_deref(), config.log_root.as_deref());
    let outcome = run_plot_gridworld_divergence(&config, &catalog, &root)?;
    print_outcome(global, "plot-gridworld-divergence", &outcome)?;
    Ok(ExitCode::Clean)
}

fn run_shaping(global: &GlobalOpts, args: &ShapingArgs) -> Result<ExitCode> {
    let (mut config, _) = load_config(global, &args.run.presets)?;
    apply_run_opts(&mut config, &args.run);
    validate_plot_config(&config)?;

    let defaults = SyntheticConfig::default();
    let synthetic = SyntheticConfig {
        reward_noise: args.reward_noise.clone().unwrap_or(defaults.reward_noise),
        potential_noise: args
            .potential_noise
            .clone()
            .unwrap_or(defaults.potential_noise),
        trials: args.trials.unwrap_or(defaults.trials),
        seed: args.seed,
        discount: config.discount,
        ..defaults
    };

    let root = resolve_output_root(args.run.log_root.as_deref(), config.log_root.as_deref());
    let outcome = run_shaping_comparison(&synthetic, args.metrics.as_deref(), &config, &root)?;
    print_outcome(global, "shaping-comparison", &outcome)?;
    Ok(ExitCode::Clean)
}

fn run_rewards(global: &GlobalOpts, args: &RewardsArgs) -> Result<ExitCode> {
    let configured = match resolve_config(global.config.as_deref()).path {
        Some(path) => PlotConfig::from_file(&path)?.catalog,
        None => None,
    };
    let catalog = load_catalog(args.catalog.as_deref(), configured.as_deref())?;

    let mut rewards = Vec::with_capacity(catalog.len());
    for (name, cfg) in catalog.iter() {
        let (xlen, ylen) = cfg.grid_shape()?;
        rewards.push((name, xlen, ylen));
    }

    match global.format {
        OutputFormat::Json => {
            let json: Vec<_> = rewards
                .iter()
                .map(|(name, xlen, ylen)| {
                    serde_json::json!({ "name": name, "grid": [xlen, ylen] })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Human => {
            for (name, xlen, ylen) in rewards {
                println!("{name}\t{xlen}x{ylen}");
            }
        }
    }
    Ok(ExitCode::Clean)
}

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> Result<ExitCode> {
    if args.list_presets {
        for (preset, description) in list_presets() {
            println!("{:<10} {}", preset.as_str(), description);
        }
        return Ok(ExitCode::Clean);
    }

    let mut results: Vec<serde_json::Value> = Vec::new();
    let mut first_error: Option<Error> = None;
    let mut record = |check: &str, outcome: Result<serde_json::Value>| match outcome {
        Ok(details) => results.push(serde_json::json!({
            "check": check,
            "status": "ok",
            "details": details,
        })),
        Err(err) => {
            results.push(serde_json::json!({
                "check": check,
                "status": "error",
                "error": err.to_string(),
            }));
            if first_error.is_none() {
                first_error = Some(err);
            }
        }
    };

    match load_config(global, &args.presets) {
        Ok((config, resolved)) => {
            record(
                "config",
                Ok(serde_json::json!({
                    "source": resolved.source.to_string(),
                    "path": resolved.path.as_ref().map(|p| p.display().to_string()),
                })),
            );
            record(
                "validation",
                validate_plot_config(&config)
                    .map(|_| serde_json::json!({ "kind": config.kind.as_str() }))
                    .map_err(Error::from),
            );
            record(
                "styles",
                apply_styles(&config.styles)
                    .map_err(Error::from)
                    .and_then(|style| HeatmapOptions::from_config(&config, style))
                    .map(|_| serde_json::json!({ "styles": config.styles })),
            );
            record(
                "masks",
                config
                    .effective_masks()
                    .iter()
                    .map(RewardMask::from_group)
                    .collect::<Result<Vec<_>>>()
                    .map(|masks| serde_json::json!({ "groups": masks.len() })),
            );
            record(
                "catalog",
                load_catalog(None, config.catalog.as_deref()).and_then(|catalog| {
                    let missing: Vec<&String> = config
                        .reward_subset
                        .iter()
                        .flatten()
                        .filter(|name| !catalog.contains(name))
                        .collect();
                    match missing.first() {
                        Some(name) => Err(Error::UnknownReward(name.to_string())),
                        None => Ok(serde_json::json!({ "rewards": catalog.len() })),
                    }
                }),
            );
        }
        Err(err) => record("config", Err(err)),
    }

    match global.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "schema_version": CONFIG_SCHEMA_VERSION,
                "status": if first_error.is_none() { "ok" } else { "error" },
                "checks": results,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            for result in &results {
                let status = result["status"].as_str().unwrap_or("error");
                let mark = if status == "ok" { "✓" } else { "✗" };
                println!("{} {}", mark, result["check"].as_str().unwrap_or_default());
            }
        }
    }

    match first_error {
        Some(err) => {
            debug!(error = %err, "Check failed");
            Ok(ExitCode::from(&err))
        }
        None => Ok(ExitCode::Clean),
    }
}

fn print_outcome(global: &GlobalOpts, command: &str, outcome: &RunOutcome) -> Result<()> {
    match global.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "command": command,
                "log_dir": outcome.log_dir.display().to_string(),
                "data": outcome.data.display().to_string(),
                "figures": outcome
                    .figures
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            for path in &outcome.figures {
                println!("{}", path.display());
            }
            println!("{}", outcome.data.display());
        }
    }
    Ok(())
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            let version_info = serde_json::json!({
                "schema_version": CONFIG_SCHEMA_VERSION,
                "rd_core_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{}", version_info);
        }
        OutputFormat::Human => {
            println!("rd-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", CONFIG_SCHEMA_VERSION);
        }
    }
}
