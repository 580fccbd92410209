//! Scenarios
//!
//! A scenario is a named composition of components. [`run_scenario`] is the
//! single driver: it derives the sample seed, draws the kiosk context, lets
//! the scenario build the dialogue and seals it into a validated record.

mod catalog;

pub use catalog::{
    LongTicketPurchase, MultiTurn, QaScenario, RefusalScenario, RudeScenario, SearchFail,
    SearchTrains, TenTurn, TicketPurchase, UiNavigation,
};

use chrono::{Duration, NaiveTime};
use railsynth_config::constants::generation::{CONTEXT_HOUR_MAX, CONTEXT_HOUR_MIN};
use railsynth_core::{
    derive_seed, ContextParams, Decision, DecisionSource, Error, Result, SkeletonRecord,
};

use crate::dialogue::Dialogue;
use crate::resources::{Env, Resources};

/// Named composition of components
pub trait Scenario: Send + Sync {
    fn name(&self) -> &'static str;

    /// Append this scenario's turns to a freshly opened dialogue
    fn generate(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue>;
}

/// Scenarios in their canonical order
pub struct ScenarioRegistry {
    scenarios: Vec<Box<dyn Scenario>>,
}

impl ScenarioRegistry {
    pub fn builtin() -> Self {
        Self {
            scenarios: vec![
                Box::new(SearchTrains),
                Box::new(TicketPurchase),
                Box::new(LongTicketPurchase),
                Box::new(UiNavigation),
                Box::new(MultiTurn),
                Box::new(QaScenario),
                Box::new(RefusalScenario),
                Box::new(RudeScenario),
                Box::new(SearchFail),
                Box::new(TenTurn),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Scenario> {
        self.scenarios
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.scenarios.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Scenario> {
        self.scenarios.iter().map(|s| s.as_ref())
    }

    /// Resolve a list of names, keeping the given order
    pub fn select(&self, names: &[String]) -> Result<Vec<&dyn Scenario>> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| Error::Structure(format!("unknown scenario '{}'", name)))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl Default for ScenarioRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// One generated record with the draws that produced it
#[derive(Debug, Clone)]
pub struct GeneratedSample {
    pub record: SkeletonRecord,
    pub decisions: Vec<Decision>,
}

/// Kiosk context of a new sample: major origin, calendar day, daytime clock
fn draw_context(decisions: &mut DecisionSource, resources: &Resources) -> ContextParams {
    let majors: Vec<&str> = resources
        .stations
        .major()
        .into_iter()
        .map(|s| s.name.as_str())
        .collect();
    let origins: Vec<&str> = if majors.is_empty() {
        resources.stations.all().iter().map(|s| s.name.as_str()).collect()
    } else {
        majors
    };
    let origin = decisions.choose("context:origin", &origins).to_string();

    let span = (resources.calendar_end - resources.calendar_start)
        .num_days()
        .max(0) as u32;
    let offset = decisions.int("context:date_offset", 0, span);
    let date = resources.calendar_start + Duration::days(i64::from(offset));

    let hour = decisions.int("context:hour", CONTEXT_HOUR_MIN, CONTEXT_HOUR_MAX);
    let minute = decisions.int("context:minute", 0, 59);
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);

    ContextParams::new(origin, date, time)
}

/// Generate sample `run_id` of `scenario` under the run seed
pub fn run_scenario(
    resources: &Resources,
    scenario: &dyn Scenario,
    run_seed: u64,
    run_id: u32,
) -> Result<GeneratedSample> {
    let seed = derive_seed(run_seed, scenario.name(), run_id);
    run_scenario_with_seed(resources, scenario, seed, run_id)
}

/// Generate a sample from its already derived seed.
///
/// `_meta.seed` holds this seed, so `(scenario, seed, run_id)` read back from
/// a record regenerates it exactly.
pub fn run_scenario_with_seed(
    resources: &Resources,
    scenario: &dyn Scenario,
    sample_seed: u64,
    run_id: u32,
) -> Result<GeneratedSample> {
    let mut decisions = DecisionSource::new(sample_seed);
    let params = draw_context(&mut decisions, resources);
    tracing::trace!(
        scenario = scenario.name(),
        seed = sample_seed,
        run_id,
        origin = %params.origin,
        "Generating sample"
    );

    let dialogue = {
        let mut env = Env::new(&mut decisions, resources);
        scenario.generate(&mut env, Dialogue::new(params))?
    };
    let record = dialogue.finish(scenario.name(), sample_seed, run_id, resources.tools.clone())?;

    Ok(GeneratedSample {
        record,
        decisions: decisions.into_log(),
    })
}
