//! Randomized stress runner
//!
//! This module provides the `stress` subcommand, which replays a seeded
//! stream of inserts, removals and lookups against each tree engine and a
//! `BTreeMap` model, running the engine's `verify` pass at checkpoints.

use anyhow::{Context, Result, bail};
use balanced_forest::tree::{AvlTreeMap, RedBlackTreeMap};
use clap::{Args, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the stress subcommand
#[derive(Args, Debug)]
pub struct StressArgs {
    /// Scenario YAML file path (required)
    #[arg(long, short = 's')]
    pub scenario: PathBuf,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of operations per engine
    #[arg(long)]
    pub operations: Option<usize>,

    /// Run only this engine
    #[arg(long, value_enum)]
    pub engine: Option<Engine>,
}

/// A tree engine under test
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    Avl,
    RedBlack,
}

/// Scenario configuration from YAML
#[derive(Debug, Deserialize)]
struct ScenarioConfig {
    name: Option<String>,
    seed: Option<u64>,
    operations: Option<usize>,
    key_space: Option<u32>,
    mix: Option<OperationMix>,
    engines: Option<Vec<Engine>>,
    verify_every: Option<usize>,
}

/// Relative weights of the operation kinds
#[derive(Debug, Deserialize, Clone, Copy)]
struct OperationMix {
    insert: u32,
    remove: u32,
    get: u32,
}

impl OperationMix {
    /// Sum of the weights, or `None` if it does not fit in a `u32`.
    fn total(self) -> Option<u32> {
        self.insert.checked_add(self.remove)?.checked_add(self.get)
    }
}

impl Default for OperationMix {
    fn default() -> Self {
        Self {
            insert: 5,
            remove: 3,
            get: 2,
        }
    }
}

/// Fully resolved run parameters
#[derive(Debug)]
struct StressPlan {
    name: String,
    seed: u64,
    operations: usize,
    key_space: u32,
    mix: OperationMix,
    total_weight: u32,
    engines: Vec<Engine>,
    verify_every: usize,
}

impl StressPlan {
    /// Priority: CLI > Environment > Scenario YAML > Default
    fn from_args_and_scenario(args: &StressArgs, scenario: ScenarioConfig) -> Result<Self> {
        let seed = args
            .seed
            .or_else(|| env::var("STRESS_SEED").ok().and_then(|value| value.parse().ok()))
            .or(scenario.seed)
            .unwrap_or(0x5eed);

        let operations = args
            .operations
            .or_else(|| {
                env::var("STRESS_OPERATIONS")
                    .ok()
                    .and_then(|value| value.parse().ok())
            })
            .or(scenario.operations)
            .unwrap_or(10_000);

        let key_space = scenario.key_space.unwrap_or(1_024);
        if key_space == 0 {
            bail!("key_space must be positive");
        }

        let mix = scenario.mix.unwrap_or_default();
        let total_weight = match mix.total() {
            Some(0) => bail!("operation mix must have at least one non-zero weight"),
            Some(total) => total,
            None => bail!("operation mix weights overflow u32 when summed"),
        };

        let engines = match args.engine {
            Some(engine) => vec![engine],
            None => scenario
                .engines
                .unwrap_or_else(|| vec![Engine::Avl, Engine::RedBlack]),
        };

        Ok(Self {
            name: scenario.name.unwrap_or_else(|| "unnamed".to_string()),
            seed,
            operations,
            key_space,
            mix,
            total_weight,
            engines,
            verify_every: scenario.verify_every.unwrap_or(1_000).max(1),
        })
    }
}

/// The common surface of both engines exercised by the runner.
trait StressTarget {
    const LABEL: &'static str;

    fn insert(&mut self, key: u32, value: u64) -> Option<u64>;
    fn remove(&mut self, key: u32) -> Option<u64>;
    fn get(&self, key: u32) -> Option<u64>;
    fn len(&self) -> usize;
    fn height(&self) -> usize;

    /// Runs the engine's own invariant check plus any extra
    /// cross-checks against the model.
    fn check(&self, model: &BTreeMap<u32, u64>) -> Result<()>;
}

impl StressTarget for AvlTreeMap<u32, u64> {
    const LABEL: &'static str = "avl";

    fn insert(&mut self, key: u32, value: u64) -> Option<u64> {
        Self::insert(self, key, value)
    }

    fn remove(&mut self, key: u32) -> Option<u64> {
        Self::remove(self, &key)
    }

    fn get(&self, key: u32) -> Option<u64> {
        Self::get(self, &key).copied()
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn height(&self) -> usize {
        Self::height(self)
    }

    fn check(&self, model: &BTreeMap<u32, u64>) -> Result<()> {
        self.verify()?;
        if !self.iter().eq(model.iter()) {
            bail!("avl entries diverged from the model");
        }
        Ok(())
    }
}

impl StressTarget for RedBlackTreeMap<u32, u64> {
    const LABEL: &'static str = "red-black";

    fn insert(&mut self, key: u32, value: u64) -> Option<u64> {
        Self::insert(self, key, value)
    }

    fn remove(&mut self, key: u32) -> Option<u64> {
        Self::remove(self, &key)
    }

    fn get(&self, key: u32) -> Option<u64> {
        Self::get(self, &key).copied()
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn height(&self) -> usize {
        Self::height(self)
    }

    fn check(&self, model: &BTreeMap<u32, u64>) -> Result<()> {
        self.verify()?;
        for (rank, (key, value)) in model.iter().enumerate() {
            if self.select(rank) != Some((key, value)) {
                bail!("select({rank}) disagrees with the model");
            }
            if self.rank(key) != rank {
                bail!("rank({key}) disagrees with the model");
            }
        }
        Ok(())
    }
}

/// Outcome of a single engine run
#[derive(Debug)]
struct EngineReport {
    engine: &'static str,
    inserts: usize,
    removals: usize,
    lookups: usize,
    final_len: usize,
    max_height: usize,
    elapsed_ms: u64,
}

/// Run the stress subcommand
pub fn run(args: &StressArgs) -> Result<()> {
    let content = fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario file: {}", args.scenario.display()))?;
    let scenario: ScenarioConfig =
        serde_yaml::from_str(&content).context("Failed to parse scenario YAML")?;
    let plan = StressPlan::from_args_and_scenario(args, scenario)?;

    tracing::info!(
        scenario = %plan.name,
        seed = plan.seed,
        operations = plan.operations,
        key_space = plan.key_space,
        engines = ?plan.engines,
        "starting stress run"
    );

    for engine in &plan.engines {
        let report = match engine {
            Engine::Avl => run_engine(&mut AvlTreeMap::<u32, u64>::new(), &plan),
            Engine::RedBlack => run_engine(&mut RedBlackTreeMap::<u32, u64>::new(), &plan),
        }
        .with_context(|| format!("Engine {engine:?} failed in scenario {}", plan.name))?;

        tracing::info!(
            engine = report.engine,
            inserts = report.inserts,
            removals = report.removals,
            lookups = report.lookups,
            final_len = report.final_len,
            max_height = report.max_height,
            elapsed_ms = report.elapsed_ms,
            "engine passed"
        );
    }

    Ok(())
}

fn run_engine<T: StressTarget>(target: &mut T, plan: &StressPlan) -> Result<EngineReport> {
    // Each engine replays the same stream.
    let mut rng = StdRng::seed_from_u64(plan.seed);
    let mut model = BTreeMap::new();
    let started = Instant::now();

    let mut report = EngineReport {
        engine: T::LABEL,
        inserts: 0,
        removals: 0,
        lookups: 0,
        final_len: 0,
        max_height: 0,
        elapsed_ms: 0,
    };

    for step in 1..=plan.operations {
        let key = rng.random_range(0..plan.key_space);
        let roll = rng.random_range(0..plan.total_weight);

        if roll < plan.mix.insert {
            let value: u64 = rng.random();
            if target.insert(key, value) != model.insert(key, value) {
                bail!("step {step}: insert({key}) returned a different previous value");
            }
            report.inserts += 1;
        } else if roll < plan.mix.insert + plan.mix.remove {
            if target.remove(key) != model.remove(&key) {
                bail!("step {step}: remove({key}) returned a different value");
            }
            report.removals += 1;
        } else {
            if target.get(key) != model.get(&key).copied() {
                bail!("step {step}: get({key}) returned a different value");
            }
            report.lookups += 1;
        }

        if target.len() != model.len() {
            bail!(
                "step {step}: length {} differs from model length {}",
                target.len(),
                model.len()
            );
        }
        report.max_height = report.max_height.max(target.height());

        if step % plan.verify_every == 0 {
            target
                .check(&model)
                .with_context(|| format!("verification failed at step {step}"))?;
            tracing::debug!(engine = T::LABEL, step, len = target.len(), "checkpoint passed");
        }
    }

    target.check(&model).context("final verification failed")?;

    report.final_len = target.len();
    report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(report)
}
