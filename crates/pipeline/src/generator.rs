//! Sample generator
//!
//! Expands a plan into (scenario, run_id) pairs, run ids counting from 1,
//! runs them independently and gathers the records back in (scenario order,
//! run_id) order. Pairs share
//! nothing but the read-only [`Resources`], so the parallel and sequential
//! paths produce identical output.

use rayon::prelude::*;
use railsynth_agent::{
    run_scenario_with_seed, GeneratedSample, Resources, Scenario, ScenarioRegistry,
};
use railsynth_config::GenerationConfig;
use railsynth_core::derive_seed;
use std::time::Instant;

use crate::{PipelineError, Result};

/// What to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub seed: u64,
    /// Samples per scenario
    pub count: u32,
    /// Scenario names; empty means the whole catalog
    pub scenarios: Vec<String>,
    pub parallel: bool,
}

impl From<&GenerationConfig> for GenerationPlan {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            seed: config.seed,
            count: config.count,
            scenarios: config.scenarios.clone(),
            parallel: config.parallel,
        }
    }
}

/// All samples of one scenario, ordered by run id
#[derive(Debug, Clone)]
pub struct ScenarioBatch {
    pub scenario: &'static str,
    pub samples: Vec<GeneratedSample>,
}

pub struct Generator<'a> {
    resources: &'a Resources,
    registry: &'a ScenarioRegistry,
}

impl<'a> Generator<'a> {
    pub fn new(resources: &'a Resources, registry: &'a ScenarioRegistry) -> Self {
        Self {
            resources,
            registry,
        }
    }

    fn scenarios(&self, names: &[String]) -> Result<Vec<&'a dyn Scenario>> {
        if names.is_empty() {
            return Ok(self.registry.iter().collect());
        }
        names.iter().map(|name| self.lookup(name)).collect()
    }

    /// `seed` is the derived per-sample seed
    fn sample(&self, scenario: &dyn Scenario, seed: u64, run_id: u32) -> Result<GeneratedSample> {
        run_scenario_with_seed(self.resources, scenario, seed, run_id).map_err(|source| {
            tracing::error!(
                scenario = scenario.name(),
                run_id,
                seed,
                error = %source,
                "Sample generation failed"
            );
            PipelineError::Sample {
                scenario: scenario.name().to_string(),
                run_id,
                seed,
                source,
            }
        })
    }

    /// Generate every sample of the plan
    pub fn run(&self, plan: &GenerationPlan) -> Result<Vec<ScenarioBatch>> {
        let scenarios = self.scenarios(&plan.scenarios)?;
        let jobs: Vec<(usize, u32)> = (0..scenarios.len())
            .flat_map(|index| (1..=plan.count).map(move |run_id| (index, run_id)))
            .collect();

        let start = Instant::now();
        let run = |&(index, run_id): &(usize, u32)| {
            let scenario = scenarios[index];
            let seed = derive_seed(plan.seed, scenario.name(), run_id);
            self.sample(scenario, seed, run_id)
        };
        let samples: Vec<GeneratedSample> = if plan.parallel {
            jobs.par_iter().map(run).collect::<Result<_>>()?
        } else {
            jobs.iter().map(run).collect::<Result<_>>()?
        };

        let mut samples = samples.into_iter();
        let batches: Vec<ScenarioBatch> = scenarios
            .iter()
            .map(|scenario| ScenarioBatch {
                scenario: scenario.name(),
                samples: samples.by_ref().take(plan.count as usize).collect(),
            })
            .collect();

        tracing::info!(
            scenarios = batches.len(),
            samples = jobs.len(),
            seed = plan.seed,
            parallel = plan.parallel,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Generation complete"
        );
        Ok(batches)
    }

    fn lookup(&self, scenario: &str) -> Result<&'a dyn Scenario> {
        self.registry
            .get(scenario)
            .ok_or_else(|| PipelineError::UnknownScenario(scenario.to_string()))
    }

    /// Regenerate one sample from the run seed it was generated under
    pub fn replay(&self, scenario: &str, seed: u64, run_id: u32) -> Result<GeneratedSample> {
        let scenario = self.lookup(scenario)?;
        self.sample(scenario, derive_seed(seed, scenario.name(), run_id), run_id)
    }

    /// Regenerate one sample from the values of its `_meta` block
    pub fn replay_meta(
        &self,
        scenario: &str,
        sample_seed: u64,
        run_id: u32,
    ) -> Result<GeneratedSample> {
        let scenario = self.lookup(scenario)?;
        self.sample(scenario, sample_seed, run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(scenarios: &[&str], count: u32, parallel: bool) -> GenerationPlan {
        GenerationPlan {
            seed: 42,
            count,
            scenarios: scenarios.iter().map(|s| s.to_string()).collect(),
            parallel,
        }
    }

    #[test]
    fn test_batches_keep_scenario_and_run_order() {
        let resources = Resources::builtin();
        let registry = ScenarioRegistry::builtin();
        let generator = Generator::new(&resources, &registry);
        let batches = generator.run(&plan(&["rude", "qa"], 4, true)).unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].scenario, "rude");
        assert_eq!(batches[1].scenario, "qa");
        for batch in &batches {
            let ids: Vec<u32> = batch.samples.iter().map(|s| s.record.meta.run_id).collect();
            assert_eq!(ids, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let resources = Resources::builtin();
        let registry = ScenarioRegistry::builtin();
        let generator = Generator::new(&resources, &registry);
        let parallel = generator.run(&plan(&[], 3, true)).unwrap();
        let sequential = generator.run(&plan(&[], 3, false)).unwrap();

        assert_eq!(parallel.len(), registry.len());
        for (a, b) in parallel.iter().zip(&sequential) {
            let a: Vec<_> = a.samples.iter().map(|s| &s.record).collect();
            let b: Vec<_> = b.samples.iter().map(|s| &s.record).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_unknown_scenario_is_rejected() {
        let resources = Resources::builtin();
        let registry = ScenarioRegistry::builtin();
        let generator = Generator::new(&resources, &registry);
        let err = generator.run(&plan(&["weather"], 1, false)).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownScenario(name) if name == "weather"));
    }

    #[test]
    fn test_replay_matches_batch_sample() {
        let resources = Resources::builtin();
        let registry = ScenarioRegistry::builtin();
        let generator = Generator::new(&resources, &registry);
        let batches = generator.run(&plan(&["ticket_purchase"], 3, true)).unwrap();
        let replayed = generator.replay("ticket_purchase", 42, 2).unwrap();
        assert_eq!(batches[0].samples[1].record, replayed.record);
        assert_eq!(batches[0].samples[1].decisions, replayed.decisions);
    }

    #[test]
    fn test_replay_from_meta_is_byte_identical() {
        let resources = Resources::builtin();
        let registry = ScenarioRegistry::builtin();
        let generator = Generator::new(&resources, &registry);
        let batches = generator.run(&plan(&["search_fail", "ten_turn"], 2, true)).unwrap();

        for sample in batches.iter().flat_map(|b| &b.samples) {
            let meta = &sample.record.meta;
            let replayed = generator
                .replay_meta(&meta.scenario, meta.seed, meta.run_id)
                .unwrap();
            assert_eq!(
                sample.record.to_json_line().unwrap(),
                replayed.record.to_json_line().unwrap()
            );
        }
    }

    #[test]
    fn test_run_ids_count_from_one() {
        let resources = Resources::builtin();
        let registry = ScenarioRegistry::builtin();
        let generator = Generator::new(&resources, &registry);
        let batches = generator.run(&plan(&["qa"], 2, false)).unwrap();
        let ids: Vec<u32> = batches[0].samples.iter().map(|s| s.record.meta.run_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
