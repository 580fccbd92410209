//! railsynth entry point
//!
//! Configuration priority: flags > env vars > config/{env}.yaml >
//! config/default.yaml > defaults. Logs go to stderr; stdout only carries
//! `replay` and `list` output.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use railsynth_agent::{Resources, ScenarioRegistry};
use railsynth_config::{load_settings, DomainData, HydrationMode, Settings};
use railsynth_pipeline::{GenerationPlan, Generator, HydrationOptions, Hydrator, JsonlSink};

#[derive(Parser, Debug)]
#[command(name = "railsynth", version, about = "Deterministic kiosk dialogue synthesis")]
struct Cli {
    /// Configuration environment, loads config/{env}.yaml on top of the defaults
    #[arg(long, env = "RAILSYNTH_ENV", global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate skeleton files, one per scenario
    Generate {
        #[arg(long)]
        seed: Option<u64>,
        /// Samples per scenario
        #[arg(long)]
        count: Option<u32>,
        /// Scenario to run (repeatable, default all)
        #[arg(long = "scenario")]
        scenarios: Vec<String>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Run on a single thread
        #[arg(long)]
        sequential: bool,
    },
    /// Render context blocks into system prompts
    Hydrate {
        /// Skeleton file or directory of .jsonl files
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        template: Option<PathBuf>,
        /// JSON file with replacement tool definitions
        #[arg(long)]
        tools: Option<PathBuf>,
        /// whole | sliced
        #[arg(long)]
        mode: Option<HydrationMode>,
        #[arg(long)]
        remove_meta: bool,
    },
    /// Regenerate one sample and print it
    Replay {
        #[arg(long)]
        scenario: String,
        /// Run seed the sample was generated under
        #[arg(long, required_unless_present = "sample_seed", conflicts_with = "sample_seed")]
        seed: Option<u64>,
        /// Derived sample seed, as written in `_meta.seed`
        #[arg(long)]
        sample_seed: Option<u64>,
        #[arg(long)]
        run_id: u32,
        /// Also print the decision log, one JSON object per line
        #[arg(long)]
        decisions: bool,
    },
    /// List scenario names
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.env.as_deref()).context("Failed to load configuration")?;
    init_tracing(&settings);

    tracing::debug!(
        environment = ?settings.environment,
        config_env = cli.env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    match cli.command {
        Command::Generate {
            seed,
            count,
            scenarios,
            output,
            sequential,
        } => {
            let mut generation = settings.generation.clone();
            if let Some(seed) = seed {
                generation.seed = seed;
            }
            if let Some(count) = count {
                generation.count = count;
            }
            if !scenarios.is_empty() {
                generation.scenarios = scenarios;
            }
            if sequential {
                generation.parallel = false;
            }
            let output = output.unwrap_or_else(|| PathBuf::from(&generation.output_dir));
            anyhow::ensure!(generation.count > 0, "--count must be at least 1");

            let resources = load_resources(&settings)?;
            let registry = ScenarioRegistry::builtin();
            let batches = Generator::new(&resources, &registry)
                .run(&GenerationPlan::from(&generation))
                .context("Generation failed")?;
            let paths = JsonlSink::new(&output)
                .write_all(&batches)
                .with_context(|| format!("Failed to write skeletons to {}", output.display()))?;
            tracing::info!(
                files = paths.len(),
                output = %output.display(),
                seed = generation.seed,
                "Skeletons written"
            );
        }

        Command::Hydrate {
            input,
            output,
            template,
            tools,
            mode,
            remove_meta,
        } => {
            let mut hydration = settings.hydration.clone();
            if let Some(template) = template {
                hydration.template_path = template.display().to_string();
            }
            if let Some(tools) = tools {
                hydration.tools_path = Some(tools.display().to_string());
            }
            if let Some(mode) = mode {
                hydration.mode = mode;
            }
            hydration.remove_meta |= remove_meta;

            let options = HydrationOptions::from_config(&hydration)
                .context("Failed to prepare hydration options")?;
            let report = Hydrator::new(options)?
                .hydrate_path(&input, &output)
                .with_context(|| format!("Failed to hydrate {}", input.display()))?;
            tracing::info!(
                files = report.files,
                records = report.records,
                samples = report.samples,
                mode = ?hydration.mode,
                "Hydration complete"
            );
        }

        Command::Replay {
            scenario,
            seed,
            sample_seed,
            run_id,
            decisions,
        } => {
            let resources = load_resources(&settings)?;
            let registry = ScenarioRegistry::builtin();
            let generator = Generator::new(&resources, &registry);
            let sample = match (sample_seed, seed) {
                (Some(sample_seed), _) => generator.replay_meta(&scenario, sample_seed, run_id),
                (None, Some(seed)) => generator.replay(&scenario, seed, run_id),
                (None, None) => anyhow::bail!("--seed or --sample-seed is required"),
            }
            .with_context(|| format!("Failed to replay {}#{}", scenario, run_id))?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{}", sample.record.to_json_line()?)?;
            if decisions {
                for decision in &sample.decisions {
                    writeln!(out, "{}", serde_json::to_string(decision)?)?;
                }
            }
        }

        Command::List => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for name in ScenarioRegistry::builtin().names() {
                writeln!(out, "{}", name)?;
            }
        }
    }

    Ok(())
}

fn load_resources(settings: &Settings) -> Result<Resources> {
    let data = DomainData::load(&settings.resources).context("Failed to load domain resources")?;
    Ok(Resources::new(
        data,
        settings.generation.calendar_start,
        settings.generation.calendar_end,
    ))
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("railsynth={}", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    subscriber.with(fmt_layer).init();
}
