//! Centralized constants for railsynth
//!
//! Single source of truth for defaults shared by the generator, the mock
//! backend and the hydrator.

/// Generation defaults
pub mod generation {
    /// Default run seed
    pub const DEFAULT_SEED: u64 = 42;

    /// Default samples per scenario
    pub const DEFAULT_COUNT: u32 = 10;

    /// First simulated calendar day
    pub const CALENDAR_START: &str = "2025-12-01";

    /// Last simulated calendar day (inclusive)
    pub const CALENDAR_END: &str = "2026-01-31";

    /// Earliest simulated kiosk hour
    pub const CONTEXT_HOUR_MIN: u32 = 6;

    /// Latest simulated kiosk hour
    pub const CONTEXT_HOUR_MAX: u32 = 22;

    pub const DEFAULT_OUTPUT_DIR: &str = "output/skeletons";
}

/// Mock backend shape
pub mod backend {
    /// Trains per results page
    pub const PAGE_SIZE: usize = 3;

    pub const MIN_RESULTS: u32 = 5;
    pub const MAX_RESULTS: u32 = 12;

    /// Minutes between consecutive departures
    pub const MIN_GAP_MINUTES: u32 = 15;
    pub const MAX_GAP_MINUTES: u32 = 60;

    /// Reference trip length for a train of speed 1.0
    pub const BASE_TRIP_MINUTES: u32 = 180;
    pub const DURATION_JITTER_MINUTES: i64 = 20;
    pub const MIN_TRIP_MINUTES: u32 = 30;

    /// Price jitter around the base fare, in percent
    pub const PRICE_JITTER_PERCENT: i64 = 20;

    /// Carriages on a high-speed train
    pub const CARRIAGES: u32 = 8;

    /// Seat rows per carriage
    pub const SEAT_ROWS: u32 = 15;

    pub const CONFIRMATION_ALPHABET: &str = "ABCDEF0123456789";
    pub const CONFIRMATION_LENGTH: usize = 6;
}

/// Placeholders shared between skeletons and hydration templates
pub mod placeholders {
    pub const SYSTEM_PROMPT: &str = "{{SYSTEM_PROMPT}}";
    pub const DYN_CONTEXT: &str = "{{DYN_CONTEXT}}";
    pub const TOOL_DEFINITION: &str = "{{TOOL_DEFINITION}}";
}

/// Default resource locations, relative to the working directory
pub mod paths {
    pub const STATIONS: &str = "config/data/stations.yaml";
    pub const CORPUS: &str = "config/data/corpus.yaml";
    pub const QA_PAIRS: &str = "config/data/qa_pairs.yaml";
    pub const SYSTEM_PROMPT_TEMPLATE: &str = "config/templates/system_prompt.txt";
}
