use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use ev_charge_env::config::Config;
use ev_charge_env::eval::{self, EvalReport};
use ev_charge_env::qlearn::{self, QPolicy};
use ev_charge_env::telemetry::init_tracing;
use ev_charge_env::types::QTable;
use ev_charge_env::{ConstantAgent, EvChargeEnv, Policy};

#[derive(Debug, Parser)]
#[command(name = "ev-charge", about = "Run policies against the EV charging environment")]
struct Cli {
    /// TOML configuration file; EVCHARGE__* variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::Args)]
struct EnvArgs {
    #[arg(long)]
    scenario: Option<String>,
    #[arg(long)]
    max_steps: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate a fixed agent over several seeded episodes.
    Evaluate {
        #[arg(long, value_enum, default_value_t = AgentKind::PriceAware)]
        agent: AgentKind,
        #[arg(long)]
        episodes: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Also write the JSON report here.
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        env: EnvArgs,
    },
    /// Train a tabular Q-learner, then evaluate its greedy policy.
    Train {
        #[arg(long)]
        episodes: Option<usize>,
        #[arg(long)]
        eval_episodes: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        env: EnvArgs,
    },
    /// Run one episode, rendering the state after every step.
    Rollout {
        #[arg(long, value_enum, default_value_t = AgentKind::PriceAware)]
        agent: AgentKind,
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        env: EnvArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    PriceAware,
    /// Always charge at full rate.
    Baseline,
    /// Never charge.
    Idle,
}

impl AgentKind {
    fn label(&self) -> &'static str {
        match self {
            AgentKind::PriceAware => "price_aware",
            AgentKind::Baseline => "baseline",
            AgentKind::Idle => "idle",
        }
    }

    fn build(&self, config: &Config) -> Box<dyn Policy> {
        match self {
            AgentKind::PriceAware => Box::new(config.agent),
            AgentKind::Baseline => Box::new(ConstantAgent(1.0)),
            AgentKind::Idle => Box::new(ConstantAgent(0.0)),
        }
    }
}

fn build_env(config: &mut Config, args: &EnvArgs) -> Result<EvChargeEnv> {
    if let Some(scenario) = &args.scenario {
        config.env.scenario = scenario.clone();
    }
    if let Some(max_steps) = args.max_steps {
        config.env.max_steps = max_steps;
    }
    EvChargeEnv::from_label(&config.env.scenario, config.env.max_steps)
        .with_context(|| format!("cannot build environment for scenario '{}'", config.env.scenario))
}

fn emit(report: &EvalReport, output: Option<&PathBuf>) -> Result<()> {
    let json = report.to_json()?;
    println!("{json}");
    if let Some(path) = output {
        fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Evaluate {
            agent,
            episodes,
            seed,
            output,
            env,
        } => {
            let mut env = build_env(&mut config, &env)?;
            let mut policy = agent.build(&config);
            let report = eval::evaluate(
                &mut env,
                &mut policy,
                agent.label(),
                episodes.unwrap_or(config.eval.episodes),
                seed.unwrap_or(config.eval.seed),
            )?;
            emit(&report, output.as_ref())?;
        }
        Command::Train {
            episodes,
            eval_episodes,
            seed,
            output,
            env,
        } => {
            let mut env = build_env(&mut config, &env)?;
            let mut params = config.train;
            if let Some(episodes) = episodes {
                params.episodes = episodes;
            }
            if let Some(seed) = seed {
                params.seed = seed;
            }

            let mut q_table = QTable::default();
            let summary = qlearn::train(&mut q_table, &mut env, &params)?;
            info!(table_size = summary.table_size, "q-table trained");

            let mut policy = QPolicy::new(q_table);
            // evaluate on seeds the learner never trained on
            let eval_seed = params.seed.wrapping_add(params.episodes as u64);
            let report = eval::evaluate(
                &mut env,
                &mut policy,
                "q_learning",
                eval_episodes.unwrap_or(config.eval.episodes),
                eval_seed,
            )?;
            emit(&report, output.as_ref())?;
        }
        Command::Rollout { agent, seed, env } => {
            let mut env = build_env(&mut config, &env)?;
            let mut policy = agent.build(&config);
            let summary = eval::run_episode_with(&mut env, &mut policy, seed, EvChargeEnv::render)?;
            println!(
                "total_reward={:.3} steps={} terminated={}",
                summary.total_reward, summary.steps, summary.terminated
            );
        }
    }

    Ok(())
}
