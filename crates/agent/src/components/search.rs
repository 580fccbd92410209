//! Search component

use chrono::{NaiveTime, Timelike};
use railsynth_config::StationEntry;
use railsynth_core::{Error, Result};
use railsynth_tools::{SearchArgs, DATE_TODAY, DATE_TOMORROW, TIME_NOW};
use std::fmt;

use super::{with_aside, Component};
use crate::corpus::{placeholders, render, CorpusFilter};
use crate::dialogue::{Dialogue, Turn};
use crate::phrases::categories::{PASSENGER_ASIDES, REFINE_QUERIES, SEARCH_QUERIES, SEARCH_SUCCESS};
use crate::protocol::{Action, Outcome};
use crate::resources::{Env, Resources};

/// Placeholders a search template may use on any turn
const SEARCH_PLACEHOLDERS: &[&str] = &[
    "{destination}",
    "{relative_date}",
    "{relative_date_morning}",
    "{relative_date_afternoon}",
    "{relative_date_evening}",
    "{time_request}",
];

/// Placeholders that move the kiosk clock; only usable on the opening turn
const PERIOD_PLACEHOLDERS: &[&str] = &["{period_morning}", "{period_afternoon}", "{period_evening}"];

/// How the user names the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mention {
    /// Bare city, e.g. "Milano"
    City,
    /// Canonical station name, e.g. "Milano Centrale"
    FullName,
}

impl fmt::Display for Mention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mention::City => "city",
            Mention::FullName => "full_name",
        })
    }
}

/// User request for trains, answered with the first results page
#[derive(Debug, Clone)]
pub struct Search {
    /// Canonical destination; drawn from the catalog when unset
    pub destination: Option<String>,
    pub mention: Option<Mention>,
    /// Exclude phrasings that assume earlier conversation
    pub fresh_topic: bool,
    pub category: &'static str,
}

impl Default for Search {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Everything decided for one search request before it is emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    pub user_text: String,
    pub args: SearchArgs,
    /// Kiosk time implied by the request ("stasera", ...)
    pub at_time: Option<NaiveTime>,
}

impl Search {
    /// Opening request on a new topic
    pub fn fresh() -> Self {
        Self {
            destination: None,
            mention: None,
            fresh_topic: true,
            category: SEARCH_QUERIES,
        }
    }

    /// Follow-up changing the destination of an earlier search
    pub fn refine() -> Self {
        Self {
            fresh_topic: false,
            category: REFINE_QUERIES,
            ..Self::fresh()
        }
    }

    pub fn to(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn mentioned_as(mut self, mention: Mention) -> Self {
        self.mention = Some(mention);
        self
    }

    /// Decide destination, phrasing and arguments
    pub fn prepare(&self, env: &mut Env<'_>, dialogue: &Dialogue) -> Result<SearchPlan> {
        let resources = env.resources;
        let origin = dialogue.params().origin.clone();
        let destination = self.destination(env, dialogue)?;

        let city = destination.city();
        let city_resolves = city != destination.name
            && resources
                .stations
                .resolve(city)
                .is_some_and(|s| s.name == destination.name);
        let mention = match self.mention {
            Some(Mention::City) if city_resolves => Mention::City,
            Some(_) => Mention::FullName,
            None if city_resolves => {
                *env.decisions
                    .choose("search:mention", &[Mention::City, Mention::FullName])
            }
            None => Mention::FullName,
        };
        let spoken = match mention {
            Mention::City => city.to_string(),
            Mention::FullName => destination.name.clone(),
        };

        let mut supported = SEARCH_PLACEHOLDERS.to_vec();
        if dialogue.is_opening() {
            supported.extend_from_slice(PERIOD_PLACEHOLDERS);
        }
        let filter = CorpusFilter::fresh(self.fresh_topic)
            .requiring("{destination}")
            .supporting(&supported);
        let template = resources
            .corpus
            .phrase_where(env.decisions, self.category, filter, |text| {
                text.contains("{destination}")
            })?;

        let mut used: Vec<String> = Vec::new();
        for placeholder in placeholders(&template) {
            if !used.iter().any(|u| u == placeholder) {
                used.push(placeholder.to_string());
            }
        }

        let now = dialogue.params().time;
        let mut date = DATE_TODAY;
        let mut time = TIME_NOW.to_string();
        let mut at_time = None;
        let mut vars: Vec<(&str, String)> = vec![("destination", spoken)];

        for placeholder in &used {
            match placeholder.as_str() {
                "{period_morning}" => {
                    at_time = Some(period_time(env, 6, 11)?);
                    vars.push(("period_morning", "stamattina".into()));
                }
                "{period_afternoon}" => {
                    at_time = Some(period_time(env, 12, 17)?);
                    vars.push(("period_afternoon", "oggi pomeriggio".into()));
                }
                "{period_evening}" => {
                    at_time = Some(period_time(env, 16, 21)?);
                    vars.push(("period_evening", "stasera".into()));
                }
                "{relative_date}" => {
                    date = DATE_TOMORROW;
                    vars.push(("relative_date", "domani".into()));
                }
                "{relative_date_morning}" => {
                    date = DATE_TOMORROW;
                    time = "morning".into();
                    vars.push(("relative_date_morning", "domani mattina".into()));
                }
                "{relative_date_afternoon}" => {
                    date = DATE_TOMORROW;
                    time = "afternoon".into();
                    vars.push(("relative_date_afternoon", "domani pomeriggio".into()));
                }
                "{relative_date_evening}" => {
                    date = DATE_TOMORROW;
                    time = "evening".into();
                    vars.push(("relative_date_evening", "domani sera".into()));
                }
                "{time_request}" => {
                    let (low, high) = if date == DATE_TOMORROW {
                        (6, 21)
                    } else {
                        ((now.hour() + 1).min(23), 23)
                    };
                    let hour = env.decisions.int("search:request_hour", low, high);
                    let minute = *env.decisions.choose("search:request_minute", &[0u32, 30]);
                    time = format!("{:02}:{:02}", hour, minute);
                    vars.push(("time_request", time.clone()));
                }
                _ => {}
            }
        }

        let borrowed: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let mut user_text = render(&template, &borrowed)?;

        let mut passengers = 1;
        if env.decisions.chance("search:group", 20) {
            passengers = env.decisions.int("search:passengers", 2, 4);
            let count = passengers.to_string();
            let aside = env.say(PASSENGER_ASIDES, &[("passengers", count.as_str())])?;
            user_text = with_aside(&user_text, &aside);
        }

        let args = SearchArgs::new(origin, destination.name.clone())
            .with_date(date)
            .with_time(time)
            .with_passengers(passengers);

        Ok(SearchPlan {
            user_text,
            args,
            at_time,
        })
    }

    fn destination<'r>(&self, env: &mut Env<'r>, dialogue: &Dialogue) -> Result<&'r StationEntry> {
        let resources: &'r Resources = env.resources;
        let stations = &resources.stations;
        if let Some(name) = &self.destination {
            return stations
                .get(name)
                .or_else(|| stations.resolve(name))
                .ok_or_else(|| Error::Structure(format!("unknown station '{}'", name)));
        }

        let origin = &dialogue.params().origin;
        let origin_city = stations.get(origin).map(StationEntry::city);
        let current = dialogue.params().destination.as_deref();

        let mut candidates: Vec<&StationEntry> = stations
            .all()
            .iter()
            .filter(|s| &s.name != origin && Some(s.city()) != origin_city)
            .filter(|s| Some(s.name.as_str()) != current)
            .collect();
        if candidates.is_empty() {
            candidates = stations.all().iter().filter(|s| &s.name != origin).collect();
        }
        if candidates.is_empty() {
            return Err(Error::Structure(format!(
                "no destination reachable from '{}'",
                origin
            )));
        }
        Ok(*env.decisions.choose("search:destination", &candidates))
    }
}

fn period_time(env: &mut Env<'_>, low: u32, high: u32) -> Result<NaiveTime> {
    let hour = env.decisions.int("search:period_hour", low, high);
    let minute = env.decisions.int("search:period_minute", 0, 59);
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| Error::Structure(format!("invalid kiosk time {}:{}", hour, minute)))
}

/// Emit the search call, answer it with the first page and store the results.
///
/// Returns the number of results and the first departure.
pub(crate) fn run_search(env: &mut Env<'_>, turn: &mut Turn, args: &SearchArgs) -> Result<(usize, String)> {
    let backend = env.resources.backend;
    turn.call(Action::Search, args.clone().into())?;
    let results = backend.search(env.decisions, args, turn.params().time);
    let response = backend.search_response(&results);
    turn.respond(
        Outcome::Results {
            total_pages: results.total_pages(),
        },
        &response,
    )?;

    let count = results.len();
    let first = results
        .trains()
        .first()
        .map(|t| t.dep.clone())
        .unwrap_or_default();
    turn.set_results(results);
    turn.set_destination(args.destination.clone());
    Ok((count, first))
}

/// City users would call a canonical station by
pub(crate) fn spoken_city(env: &Env<'_>, station: &str) -> String {
    env.resources
        .stations
        .get(station)
        .map(|s| s.city().to_string())
        .unwrap_or_else(|| station.to_string())
}

impl Component for Search {
    fn name(&self) -> &'static str {
        "search"
    }

    fn build(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue> {
        let plan = self.prepare(env, &dialogue)?;
        let mut turn = dialogue.begin_turn();
        if let Some(time) = plan.at_time {
            turn.at_time(time);
        }
        turn.user(plan.user_text.as_str());

        let (count, first) = run_search(env, &mut turn, &plan.args)?;
        let city = spoken_city(env, &plan.args.destination);
        let count_text = count.to_string();
        let reply = env.say(
            SEARCH_SUCCESS,
            &[
                ("count", count_text.as_str()),
                ("destination", city.as_str()),
                ("dep", first.as_str()),
            ],
        )?;
        turn.assistant(reply);

        tracing::debug!(
            destination = %plan.args.destination,
            date = %plan.args.date,
            time = %plan.args.time,
            results = count,
            "Search turn"
        );
        dialogue.push_turn(turn)
    }
}
