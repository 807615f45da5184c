//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use rinku_core::builtins::standard_registry;
use rinku_core::{Dispatch, Outcome, PipelineReport, run_pipeline};
use rinku_shared::{AppConfig, OutputFormat, PipelineDef, init_config, load_config};
use serde_json::Value;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Rinku — chain steps into a pipeline and stop at the first failure.
#[derive(Parser)]
#[command(
    name = "rinku",
    version,
    about = "Run declarative function-chaining pipelines.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Result output format (overrides `[defaults] output`).
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputArg {
    Text,
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run a pipeline file, or one registered in config.
    Run {
        /// Pipeline definition (.toml or .json).
        #[arg(required_unless_present = "name", conflicts_with = "name")]
        file: Option<PathBuf>,

        /// Name of a pipeline registered under `[[pipelines]]`.
        #[arg(short, long)]
        name: Option<String>,

        /// Replace the pipeline's seed with this JSON value.
        #[arg(long)]
        seed: Option<String>,

        /// Print every resolved step, not only the final result.
        #[arg(long)]
        steps: bool,

        /// Print the result of one named step instead of the final result.
        #[arg(long, value_name = "NAME")]
        step: Option<String>,

        /// Output format.
        #[arg(long)]
        format: Option<OutputArg>,
    },

    /// List the operations available to pipeline steps.
    Ops,

    /// List pipelines registered in config.
    List,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so `--format json` output on stdout stays parseable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "rinku=warn",
        1 => "rinku=info",
        2 => "rinku=debug",
        _ => "rinku=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            file,
            name,
            seed,
            steps,
            step,
            format,
        } => {
            let opts = RunOptions {
                seed,
                steps,
                step,
                format,
            };
            cmd_run(file, name.as_deref(), &opts)
        }
        Command::Ops => cmd_ops(),
        Command::List => cmd_list(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Flags shared by both ways of selecting a pipeline.
struct RunOptions {
    seed: Option<String>,
    steps: bool,
    step: Option<String>,
    format: Option<OutputArg>,
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_run(file: Option<PathBuf>, name: Option<&str>, opts: &RunOptions) -> Result<()> {
    let config = load_config()?;
    let path = resolve_pipeline_path(&config, file, name)?;

    let mut def = PipelineDef::load(&path)?;
    if let Some(seed) = &opts.seed {
        def.seed = serde_json::from_str(seed).map_err(|e| eyre!("invalid --seed JSON: {e}"))?;
    }

    let format = opts
        .format
        .map(OutputFormat::from)
        .unwrap_or(config.defaults.output);
    let show_steps = opts.steps || config.defaults.show_steps;

    info!(path = %path.display(), pipeline = %def.name, "running pipeline");

    let registry: Arc<dyn Dispatch<Value>> = Arc::new(standard_registry());
    let run = run_pipeline(&def, registry)?;

    if let Some(step) = &opts.step {
        let outcome = run.chain.link_result(step)?;
        match format {
            OutputFormat::Text => println!("{}", render_outcome(outcome)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Text => print!("{}", render_report(&run.report, show_steps)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run.report)?),
    }

    if run.report.halted {
        let at = run.report.steps.len().saturating_sub(1);
        return Err(eyre!("pipeline '{}' halted at step {at}", def.name));
    }

    Ok(())
}

/// A file argument wins; otherwise look the name up in config.
fn resolve_pipeline_path(
    config: &AppConfig,
    file: Option<PathBuf>,
    name: Option<&str>,
) -> Result<PathBuf> {
    match (file, name) {
        (Some(path), _) => Ok(path),
        (None, Some(name)) => config
            .find_pipeline(name)
            .map(|entry| PathBuf::from(&entry.path))
            .ok_or_else(|| eyre!("no pipeline named '{name}' is registered in config")),
        (None, None) => Err(eyre!("a pipeline file or --name is required")),
    }
}

fn cmd_ops() -> Result<()> {
    for op in standard_registry().operations() {
        println!("{op}");
    }
    Ok(())
}

fn cmd_list() -> Result<()> {
    let config = load_config()?;

    if config.pipelines.is_empty() {
        println!("No pipelines registered. Add [[pipelines]] entries to the config file.");
        return Ok(());
    }

    for entry in &config.pipelines {
        match &entry.description {
            Some(description) => println!("{:<20} {}  ({description})", entry.name, entry.path),
            None => println!("{:<20} {}", entry.name, entry.path),
        }
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// One-line rendering of an outcome: the JSON value, or `error` plus payload.
fn render_outcome(outcome: &Outcome<Value>) -> String {
    match outcome {
        Outcome::Ok(value) => value.to_string(),
        Outcome::Error(failure) if failure.is_bare() => "error".to_string(),
        Outcome::Error(failure) => {
            let fields: Vec<String> = failure.payload().iter().map(Value::to_string).collect();
            format!("error: {}", fields.join(", "))
        }
    }
}

fn render_report(report: &PipelineReport, show_steps: bool) -> String {
    let mut lines = Vec::new();

    if show_steps {
        lines.push(format!("Pipeline: {} (run {})", report.pipeline, report.run_id));
        lines.extend(report.steps.iter().map(|step| {
            let name = step.name.as_deref().unwrap_or("-");
            format!("  [{}] {name:<16} {}", step.index, render_outcome(&step.result))
        }));
    }

    if report.halted {
        lines.push(format!("Halted: {}", render_outcome(&report.result)));
        if report.skipped > 0 {
            lines.push(format!("Skipped: {} step(s)", report.skipped));
        }
    } else {
        lines.push(render_outcome(&report.result));
    }

    lines.into_iter().map(|line| line + "\n").collect()
}
