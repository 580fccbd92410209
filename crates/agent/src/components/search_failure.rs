//! Search with simulated backend failures
//!
//! Each failure kind is a short script: one or more failed `search_trains`
//! calls, optionally explained to the user, then a successful retry that may
//! change the arguments (new time, new destination).

use railsynth_core::{format_hhmm, Result};
use railsynth_tools::{BackendFailure, SearchArgs, DATE_TOMORROW};
use std::fmt;

use super::search::{run_search, spoken_city, Search};
use super::Component;
use crate::dialogue::{Dialogue, Turn};
use crate::protocol::{Action, Outcome};
use crate::resources::Env;

/// Preferred interchange for `invalid_route`
const DEFAULT_HUB: &str = "Bologna Centrale";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    DoubleInternalError,
    TimeoutRetry,
    NoTrainsAltTime,
    InvalidRoute,
    ServiceUnavailable,
    RateLimited,
}

impl FailureKind {
    pub const ALL: [FailureKind; 6] = [
        FailureKind::DoubleInternalError,
        FailureKind::TimeoutRetry,
        FailureKind::NoTrainsAltTime,
        FailureKind::InvalidRoute,
        FailureKind::ServiceUnavailable,
        FailureKind::RateLimited,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::DoubleInternalError => "double_internal_error",
            FailureKind::TimeoutRetry => "timeout_retry",
            FailureKind::NoTrainsAltTime => "no_trains_alt_time",
            FailureKind::InvalidRoute => "invalid_route",
            FailureKind::ServiceUnavailable => "service_unavailable",
            FailureKind::RateLimited => "rate_limited",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed attempt of a script
struct FailedStep {
    failure: BackendFailure,
    /// Assistant explanation and user answer; silent steps retry at once
    exchange: Option<(String, &'static str)>,
}

/// Argument change applied before the successful retry
enum Retry {
    Same,
    At { date: Option<&'static str>, time: &'static str },
    Via { hub: String },
}

#[derive(Debug, Clone, Default)]
pub struct SearchFailure {
    /// Drawn at build time when unset
    pub kind: Option<FailureKind>,
    pub search: Search,
}

impl SearchFailure {
    pub fn new(kind: FailureKind) -> Self {
        Self {
            kind: Some(kind),
            search: Search::fresh(),
        }
    }

    fn script(
        kind: FailureKind,
        env: &Env<'_>,
        args: &SearchArgs,
        now: &str,
    ) -> (Vec<FailedStep>, Retry, String) {
        match kind {
            FailureKind::DoubleInternalError => (
                vec![
                    FailedStep {
                        failure: BackendFailure::InternalError,
                        exchange: None,
                    },
                    FailedStep {
                        failure: BackendFailure::InternalError,
                        exchange: Some(("😔 Doppio errore. 🙂 Un altro tentativo?".into(), "Vai, ripeti")),
                    },
                ],
                Retry::Same,
                "🙂 Problema risolto! 😊 Quale ti piace?".into(),
            ),
            FailureKind::TimeoutRetry => (
                vec![FailedStep {
                    failure: BackendFailure::Timeout { seconds: 30 },
                    exchange: None,
                }],
                Retry::Same,
                "😊 Ecco i treni! 🙂 Quale preferisci?".into(),
            ),
            FailureKind::NoTrainsAltTime => (
                vec![FailedStep {
                    failure: BackendFailure::NoTrainsAfter { time: now.to_string() },
                    exchange: Some((
                        "😔 Nessun treno disponibile a quest'ora. 😊 Controllo domani mattina presto?".into(),
                        "Va bene, presto però",
                    )),
                }],
                Retry::At {
                    date: Some(DATE_TOMORROW),
                    time: "06:00",
                },
                "😊 Perfetto! Il primo treno di domani parte alle {dep}. 🙂 Ti interessa?".into(),
            ),
            FailureKind::InvalidRoute => {
                let hub = interchange(env, args);
                let city = spoken_city(env, &hub);
                (
                    vec![FailedStep {
                        failure: BackendFailure::NoDirectConnection { hub: hub.clone() },
                        exchange: Some((
                            format!(
                                "😔 Non ci sono treni diretti. 🤔 Posso cercare con cambio a {}?",
                                hub
                            ),
                            "Ok va bene",
                        )),
                    }],
                    Retry::Via { hub },
                    format!("😊 Ecco i treni per {}! Da lì puoi cambiare. 🙂", city),
                )
            }
            FailureKind::ServiceUnavailable => (
                vec![FailedStep {
                    failure: BackendFailure::ServiceUnavailable {
                        until: "15:00".into(),
                    },
                    exchange: Some((
                        "😔 Sistema in manutenzione fino alle 15:00. 😊 Vuoi attendere?".into(),
                        "Ok aspetto",
                    )),
                }],
                Retry::At {
                    date: None,
                    time: "15:00",
                },
                "😊 Ore 15:00, ecco i treni disponibili! 🙂".into(),
            ),
            FailureKind::RateLimited => (
                vec![FailedStep {
                    failure: BackendFailure::RateLimited { wait_seconds: 30 },
                    exchange: Some((
                        "😅 Un attimo, troppe richieste! 😊 Riprovo tra qualche secondo...".into(),
                        "Ok",
                    )),
                }],
                Retry::Same,
                "😊 Ecco i treni! 🙂 Quale vuoi?".into(),
            ),
        }
    }
}

/// Interchange station distinct from both ends of the trip
fn interchange(env: &Env<'_>, args: &SearchArgs) -> String {
    let stations = &env.resources.stations;
    let usable = |name: &str| name != args.origin && name != args.destination;
    if stations.get(DEFAULT_HUB).is_some() && usable(DEFAULT_HUB) {
        return DEFAULT_HUB.to_string();
    }
    stations
        .major()
        .into_iter()
        .find(|s| usable(&s.name))
        .map(|s| s.name.clone())
        .unwrap_or_else(|| DEFAULT_HUB.to_string())
}

fn fail(turn: &mut Turn, args: &SearchArgs, failure: &BackendFailure) -> Result<()> {
    turn.call(Action::Search, args.clone().into())?;
    turn.respond(Outcome::Failed, &failure.response())
}

impl Component for SearchFailure {
    fn name(&self) -> &'static str {
        "search_failure"
    }

    fn build(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let kind = match self.kind {
            Some(kind) => kind,
            None => *env.decisions.choose("search_fail:kind", &FailureKind::ALL),
        };
        let plan = self.search.prepare(env, &dialogue)?;
        let now = format_hhmm(plan.at_time.unwrap_or(dialogue.params().time));
        let (steps, retry, success) = Self::script(kind, env, &plan.args, &now);

        let mut dialogue = dialogue;
        let mut turn = dialogue.begin_turn();
        if let Some(time) = plan.at_time {
            turn.at_time(time);
        }
        turn.user(plan.user_text.as_str());

        for step in steps {
            fail(&mut turn, &plan.args, &step.failure)?;
            if let Some((reply, answer)) = step.exchange {
                turn.assistant(reply);
                dialogue = dialogue.push_turn(turn)?;
                turn = dialogue.begin_turn();
                turn.user(answer);
            }
        }

        let args = match retry {
            Retry::Same => plan.args.clone(),
            Retry::At { date, time } => {
                let args = plan.args.clone().with_time(time);
                match date {
                    Some(date) => args.with_date(date),
                    None => args,
                }
            }
            Retry::Via { hub } => SearchArgs {
                destination: hub,
                ..plan.args.clone()
            },
        };
        let (_, first) = run_search(env, &mut turn, &args)?;
        turn.assistant(success.replace("{dep}", &first));

        tracing::debug!(kind = %kind, destination = %args.destination, "Search failure turn");
        dialogue.push_turn(turn)
    }
}
