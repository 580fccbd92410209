//! Context parameters and slices
//!
//! A [`ContextSlice`] records the parameter set under which the next
//! `slice_length` messages were generated. The hydrator rebuilds every
//! dynamic system-prompt block from these parameters alone.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::conversation::{StateKind, UiSnapshot};

/// Euro amount held as integer cents.
///
/// Serialized as a two-decimal string (`"25.90"`) so the wire text never
/// depends on float formatting. Plain JSON numbers are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(pub u32);

impl Price {
    pub fn from_cents(cents: u32) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u32 {
        self.0
    }

    fn from_euros(euros: f64) -> Option<Self> {
        let cents = (euros * 100.0).round();
        (euros.is_finite() && cents >= 0.0 && cents <= f64::from(u32::MAX))
            .then(|| Price(cents as u32))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Price {
    type Err = String;

    /// `"25"`, `"25.9"` or `"25.90"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid price '{}'", s);
        let (units, fraction) = s.trim().split_once('.').unwrap_or((s.trim(), ""));
        if units.is_empty()
            || fraction.len() > 2
            || !units.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let units: u32 = units.parse().map_err(|_| invalid())?;
        let cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u32>().map_err(|_| invalid())? * 10,
            _ => fraction.parse::<u32>().map_err(|_| invalid())?,
        };
        units
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .map(Price)
            .ok_or_else(invalid)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Euros(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Euros(euros) => Price::from_euros(euros)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid price {}", euros))),
        }
    }
}

/// `HH:MM` serde format for [`NaiveTime`]
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Format a time of day as `HH:MM`
pub fn format_hhmm(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// One row of a search result page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    /// 1-based position within the full result list
    pub pos: u32,
    pub id: String,
    pub dep: String,
    pub arr: String,
    #[serde(rename = "type")]
    pub train_type: String,
    pub stops: u32,
    pub price: Price,
}

impl Train {
    /// Travel time in minutes; arrivals before departure roll past midnight
    pub fn duration_minutes(&self) -> Option<u32> {
        let dep = NaiveTime::parse_from_str(&self.dep, hhmm::FORMAT).ok()?;
        let arr = NaiveTime::parse_from_str(&self.arr, hhmm::FORMAT).ok()?;
        let dep_min = dep.num_seconds_from_midnight() / 60;
        let arr_min = arr.num_seconds_from_midnight() / 60;
        if arr_min >= dep_min {
            Some(arr_min - dep_min)
        } else {
            Some(arr_min + 24 * 60 - dep_min)
        }
    }

    pub fn is_direct(&self) -> bool {
        self.stops == 0
    }
}

/// Issued ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub confirmation_code: String,
    pub train_id: String,
    #[serde(rename = "class")]
    pub travel_class: String,
    pub seat: String,
    pub carriage: u32,
    pub price: Price,
}

/// Parameters active over one slice of messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextParams {
    /// Kiosk station (`stazione`)
    pub origin: String,
    /// Simulated date (`data`)
    pub date: NaiveDate,
    /// Simulated time of day (`ora`)
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub ui: UiSnapshot,
    /// Visible results page
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trains: Vec<Train>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
}

impl ContextParams {
    pub fn new(origin: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            origin: origin.into(),
            date,
            time,
            destination: None,
            ui: UiSnapshot::default(),
            trains: Vec::new(),
            ticket: None,
        }
    }

    pub fn state(&self) -> StateKind {
        self.ui.state
    }

    pub fn train(&self, id: &str) -> Option<&Train> {
        self.trains.iter().find(|t| t.id == id)
    }

    pub fn train_ids(&self) -> impl Iterator<Item = &str> {
        self.trains.iter().map(|t| t.id.as_str())
    }
}

/// `slice_length` consecutive messages generated under `params`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSlice {
    pub slice_length: usize,
    pub params: ContextParams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::DialogueState;

    fn train(dep: &str, arr: &str) -> Train {
        Train {
            pos: 1,
            id: "IC1234".into(),
            dep: dep.into(),
            arr: arr.into(),
            train_type: "Intercity".into(),
            stops: 5,
            price: Price(2590),
        }
    }

    #[test]
    fn test_price_format() {
        assert_eq!(Price(2590).to_string(), "25.90");
        assert_eq!(Price(805).to_string(), "8.05");
        assert_eq!(serde_json::to_string(&Price(4500)).unwrap(), r#""45.00""#);
        assert_eq!(serde_json::to_string(&Price(1999)).unwrap(), r#""19.99""#);
        assert_eq!(serde_json::from_str::<Price>(r#""19.99""#).unwrap(), Price(1999));
        assert_eq!(serde_json::from_str::<Price>(r#""45.1""#).unwrap(), Price(4510));
        assert_eq!(serde_json::from_str::<Price>("45.1").unwrap(), Price(4510));
        assert!(serde_json::from_str::<Price>(r#""19.999""#).is_err());
        assert!(serde_json::from_str::<Price>(r#""-3.00""#).is_err());
        assert!(serde_json::from_str::<Price>("-3.0").is_err());
    }

    #[test]
    fn test_duration_handles_midnight() {
        assert_eq!(train("08:15", "11:05").duration_minutes(), Some(170));
        assert_eq!(train("23:30", "01:10").duration_minutes(), Some(100));
        assert_eq!(train("8h", "11:05").duration_minutes(), None);
    }

    #[test]
    fn test_params_serialization_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 23).unwrap();
        let time = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        let mut params = ContextParams::new("Roma Termini", date, time);

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["date"], "2025-12-23");
        assert_eq!(json["time"], "09:05");
        assert!(json.get("trains").is_none());
        assert!(json.get("ticket").is_none());

        params.ui = DialogueState::first_page(2).snapshot();
        params.trains.push(train("09:30", "12:20"));
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["trains"][0]["type"], "Intercity");
        assert_eq!(json["trains"][0]["price"], "25.90");

        let back: ContextParams = serde_json::from_value(json).unwrap();
        assert_eq!(back, params);
    }
}
