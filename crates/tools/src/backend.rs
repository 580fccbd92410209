//! Deterministic mock of the ticketing backend
//!
//! Every value the backend invents is drawn from the sample's
//! [`DecisionSource`]. There is no wall clock: relative times resolve
//! against the simulated kiosk time.

use chrono::{Duration, NaiveTime};
use railsynth_config::constants::backend::{
    BASE_TRIP_MINUTES, CARRIAGES, CONFIRMATION_ALPHABET, CONFIRMATION_LENGTH,
    DURATION_JITTER_MINUTES, MAX_GAP_MINUTES, MAX_RESULTS, MIN_GAP_MINUTES, MIN_RESULTS,
    MIN_TRIP_MINUTES, PAGE_SIZE, PRICE_JITTER_PERCENT, SEAT_ROWS,
};
use railsynth_core::context::hhmm;
use railsynth_core::{format_hhmm, ContextParams, DecisionSource, Price, Ticket, Train};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeSet;
use std::fmt;

use crate::arguments::{PurchaseArgs, SearchArgs};

/// Static properties of one train type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainKind {
    pub name: &'static str,
    pub prefix: &'static str,
    /// Relative speed in percent of an Intercity
    pub speed_percent: u32,
    pub base_fare_euros: u32,
    pub stops: u32,
}

impl TrainKind {
    /// Nominal trip length before jitter
    pub fn nominal_minutes(&self) -> i64 {
        i64::from(BASE_TRIP_MINUTES * 100 / self.speed_percent)
    }
}

impl fmt::Display for TrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub const TRAIN_KINDS: [TrainKind; 5] = [
    TrainKind {
        name: "Frecciarossa",
        prefix: "FR",
        speed_percent: 150,
        base_fare_euros: 50,
        stops: 0,
    },
    TrainKind {
        name: "Frecciargento",
        prefix: "FA",
        speed_percent: 140,
        base_fare_euros: 40,
        stops: 2,
    },
    TrainKind {
        name: "Intercity",
        prefix: "IC",
        speed_percent: 100,
        base_fare_euros: 25,
        stops: 5,
    },
    TrainKind {
        name: "Regionale Veloce",
        prefix: "RV",
        speed_percent: 80,
        base_fare_euros: 12,
        stops: 8,
    },
    TrainKind {
        name: "Regionale",
        prefix: "R",
        speed_percent: 60,
        base_fare_euros: 8,
        stops: 15,
    },
];

/// Train types that require seat selection
pub const HIGH_SPEED_TYPES: [&str; 2] = ["Frecciarossa", "Frecciargento"];

pub fn is_high_speed(train_type: &str) -> bool {
    HIGH_SPEED_TYPES.contains(&train_type)
}

/// Regional trains only sell second class
pub fn has_first_class(train_type: &str) -> bool {
    train_type != "Regionale"
}

/// Seat preference expressed by the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeatPreference {
    Window,
    Aisle,
    Indifferent,
}

impl SeatPreference {
    pub const ALL: [SeatPreference; 3] = [
        SeatPreference::Window,
        SeatPreference::Aisle,
        SeatPreference::Indifferent,
    ];

    fn letters(&self) -> &'static [char] {
        match self {
            SeatPreference::Window => &['A', 'D'],
            SeatPreference::Aisle => &['B', 'C'],
            SeatPreference::Indifferent => &['A', 'B', 'C', 'D'],
        }
    }
}

impl fmt::Display for SeatPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SeatPreference::Window => "window",
            SeatPreference::Aisle => "aisle",
            SeatPreference::Indifferent => "indifferent",
        })
    }
}

/// Full result list of one search, served page by page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResults {
    trains: Vec<Train>,
    page_size: usize,
}

impl SearchResults {
    pub fn new(trains: Vec<Train>, page_size: usize) -> Self {
        Self {
            trains,
            page_size: page_size.max(1),
        }
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    pub fn len(&self) -> usize {
        self.trains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    /// Number of pages, at least one
    pub fn total_pages(&self) -> u32 {
        let pages = self.trains.len().div_ceil(self.page_size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Trains on a 1-based page; out-of-range pages clamp to the nearest one
    pub fn page(&self, page: u32) -> Vec<Train> {
        let page = page.clamp(1, self.total_pages()) as usize;
        self.trains
            .iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Train> {
        self.trains.iter().find(|t| t.id == id)
    }

    pub fn at_position(&self, pos: u32) -> Option<&Train> {
        self.trains.iter().find(|t| t.pos == pos)
    }
}

/// Mock ticketing backend
#[derive(Debug, Clone, Copy)]
pub struct MockBackend {
    page_size: usize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl MockBackend {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Generate the full result list for a search issued at `now`
    pub fn search(&self, decisions: &mut DecisionSource, args: &SearchArgs, now: NaiveTime) -> SearchResults {
        let start = resolve_time(&args.time, now);
        let count = decisions.int("backend:result_count", MIN_RESULTS, MAX_RESULTS);

        let mut departure = start;
        let mut used_ids = BTreeSet::new();
        let mut trains = Vec::with_capacity(count as usize);

        for pos in 1..=count {
            let gap = decisions.int("backend:gap", MIN_GAP_MINUTES, MAX_GAP_MINUTES);
            departure += Duration::minutes(i64::from(gap));

            let kind = *decisions.choose("backend:train_type", &TRAIN_KINDS);

            let (jitter, _) = decisions.next_int(
                "backend:duration_jitter",
                -DURATION_JITTER_MINUTES,
                DURATION_JITTER_MINUTES,
            );
            let duration = (kind.nominal_minutes() + jitter).max(i64::from(MIN_TRIP_MINUTES));
            let arrival = departure + Duration::minutes(duration);

            let (price_jitter, _) = decisions.next_int(
                "backend:price_jitter",
                -PRICE_JITTER_PERCENT,
                PRICE_JITTER_PERCENT,
            );
            // base fare in euros times (100 + jitter) percent is already cents
            let cents = i64::from(kind.base_fare_euros) * (100 + price_jitter);

            let id = loop {
                let number = decisions.int("backend:train_number", 1000, 9999);
                let candidate = format!("{}{}", kind.prefix, number);
                if used_ids.insert(candidate.clone()) {
                    break candidate;
                }
            };

            trains.push(Train {
                pos,
                id,
                dep: format_hhmm(departure),
                arr: format_hhmm(arrival),
                train_type: kind.name.to_string(),
                stops: kind.stops,
                price: Price::from_cents(u32::try_from(cents).unwrap_or(0)),
            });
        }

        tracing::trace!(
            destination = %args.destination,
            results = trains.len(),
            start = %format_hhmm(start),
            "Mock search"
        );

        SearchResults::new(trains, self.page_size)
    }

    /// Response to a successful search: the first page plus paging totals
    pub fn search_response(&self, results: &SearchResults) -> JsonValue {
        json!({
            "trains": results.page(1),
            "page": 1,
            "total_pages": results.total_pages(),
            "total_results": results.len(),
        })
    }

    /// Response to `next`/`prev`
    pub fn page_response(&self, results: &SearchResults, page: u32) -> JsonValue {
        json!({
            "page": page,
            "total_pages": results.total_pages(),
            "trains": results.page(page),
        })
    }

    /// Response to `back`, naming the state the interface returned to
    pub fn back_response(&self, state: &str) -> JsonValue {
        let message = match state {
            "results" => "Tornato ai risultati",
            _ => "Ricerca annullata",
        };
        json!({ "state": state, "message": message })
    }

    /// Response to `status`, built from the visible context only
    pub fn status_response(&self, params: &ContextParams) -> JsonValue {
        json!({
            "current_state": params.state().as_str(),
            "search_params": {
                "origin": params.origin,
                "destination": params.destination,
            },
            "page": params.ui.page,
            "total_pages": params.ui.total_pages,
            "selection": params.ticket.as_ref().map(|t| t.train_id.clone()),
        })
    }

    /// Response to `show_changes` for one train
    pub fn changes_response(&self, decisions: &mut DecisionSource, train: &Train) -> JsonValue {
        let stops: Vec<String> = (1..=train.stops).map(|i| format!("Stazione {}", i)).collect();
        if decisions.chance("backend:delayed", 50) {
            let delay = decisions.int("backend:delay_minutes", 5, 20);
            json!({
                "train_id": train.id,
                "status": "delayed",
                "delay_minutes": delay,
                "stops": stops,
                "is_direct": train.is_direct(),
            })
        } else {
            json!({
                "train_id": train.id,
                "status": "on_time",
                "stops": stops,
                "is_direct": train.is_direct(),
            })
        }
    }

    /// Response to a high-speed purchase without a seat: the seat map opens
    pub fn seat_map_response(&self, decisions: &mut DecisionSource, train: &Train, carriage: u32) -> JsonValue {
        let free = decisions.int("backend:free_seats", 4, SEAT_ROWS * 4);
        json!({
            "status": "seat_selection_required",
            "train_id": train.id,
            "carriage": carriage,
            "total_carriages": CARRIAGES,
            "available_seats": free,
        })
    }

    /// Pick a seat and carriage matching a preference
    pub fn pick_seat(&self, decisions: &mut DecisionSource, preference: SeatPreference) -> (String, u32) {
        let row = decisions.int("backend:seat_row", 1, SEAT_ROWS);
        let letter = decisions.choose("backend:seat_letter", preference.letters());
        let carriage = decisions.int("backend:carriage", 1, CARRIAGES);
        (format!("{}{}", row, letter), carriage)
    }

    /// Issue a ticket for `train`
    pub fn purchase(&self, decisions: &mut DecisionSource, args: &PurchaseArgs, train: &Train) -> Ticket {
        let (seat, carriage) = match (&args.seat, args.carriage) {
            (Some(seat), Some(carriage)) => (seat.clone(), carriage),
            (Some(seat), None) => (seat.clone(), decisions.int("backend:carriage", 1, CARRIAGES)),
            _ => {
                let (seat, carriage) = self.pick_seat(decisions, SeatPreference::Indifferent);
                (seat, args.carriage.unwrap_or(carriage))
            }
        };

        let alphabet: Vec<char> = CONFIRMATION_ALPHABET.chars().collect();
        let confirmation_code: String = (0..CONFIRMATION_LENGTH)
            .map(|_| *decisions.choose("backend:confirmation", &alphabet))
            .collect();

        Ticket {
            confirmation_code,
            train_id: train.id.clone(),
            travel_class: args.travel_class.clone(),
            seat,
            carriage,
            price: train.price,
        }
    }
}

/// Resolve a `time` argument against the simulated kiosk time
pub fn resolve_time(raw: &str, now: NaiveTime) -> NaiveTime {
    let fixed = |hour: u32| NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(now);
    match raw.trim().to_lowercase().as_str() {
        "" | "now" | "adesso" | "ora" | "subito" => now,
        "morning" | "mattina" => fixed(8),
        "afternoon" | "pomeriggio" => fixed(14),
        "evening" | "sera" | "stasera" => fixed(19),
        other => NaiveTime::parse_from_str(other, hhmm::FORMAT).unwrap_or(now),
    }
}
