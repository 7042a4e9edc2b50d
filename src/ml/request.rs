//! Normalized forecast request.
//!
//! Both the full and the simplified wire shapes are translated into
//! [`ForecastRequest`] before any feature work happens. Categorical inputs are
//! parsed leniently: anything outside the known domain becomes the neutral
//! variant instead of an error.

use serde::{Deserialize, Serialize};

/// Default competitor distance when the caller does not know it.
pub const DEFAULT_COMPETITION_DISTANCE: f64 = 1000.0;

/// State holiday marker as used in the training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateHoliday {
    #[default]
    None,
    Public,
    Easter,
    Christmas,
}

impl StateHoliday {
    /// `"a"`, `"b"` and `"c"` are holidays; `"0"` and anything else is none.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "a" => Self::Public,
            "b" => Self::Easter,
            "c" => Self::Christmas,
            _ => Self::None,
        }
    }

    pub fn encoded(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Public => 1.0,
            Self::Easter => 2.0,
            Self::Christmas => 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    A,
    B,
    C,
    D,
}

impl StoreType {
    /// Case-insensitive; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "c" => Some(Self::C),
            "d" => Some(Self::D),
            _ => None,
        }
    }
}

/// Encoding used by the model: 0 for unset or unknown, then a=1 .. d=4.
pub fn encode_store_type(store_type: Option<StoreType>) -> f64 {
    match store_type {
        None => 0.0,
        Some(StoreType::A) => 1.0,
        Some(StoreType::B) => 2.0,
        Some(StoreType::C) => 3.0,
        Some(StoreType::D) => 4.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assortment {
    Basic,
    Extra,
    Extended,
}

impl Assortment {
    /// Case-insensitive; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "a" => Some(Self::Basic),
            "b" => Some(Self::Extra),
            "c" => Some(Self::Extended),
            _ => None,
        }
    }
}

/// Encoding used by the model: 0 for unset or unknown, then a=1 .. c=3.
pub fn encode_assortment(assortment: Option<Assortment>) -> f64 {
    match assortment {
        None => 0.0,
        Some(Assortment::Basic) => 1.0,
        Some(Assortment::Extra) => 2.0,
        Some(Assortment::Extended) => 3.0,
    }
}

/// A single store/date forecast request after wire-level validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub store: u32,
    /// `YYYY-MM-DD`; parsed during feature derivation.
    pub date: String,
    pub promo: bool,
    pub state_holiday: StateHoliday,
    pub school_holiday: bool,
    /// ISO weekday, 1 = Monday. Derived from `date` when absent.
    pub day_of_week: Option<u8>,
    pub store_type: Option<StoreType>,
    pub assortment: Option<Assortment>,
    /// Defaults to [`DEFAULT_COMPETITION_DISTANCE`].
    pub competition_distance: Option<f64>,
    pub competition_open_since_year: Option<i32>,
    /// Most recent observation last.
    pub recent_sales: Option<Vec<f64>>,
}

impl ForecastRequest {
    /// Request with every optional attribute left at its default.
    pub fn new(store: u32, date: impl Into<String>) -> Self {
        Self {
            store,
            date: date.into(),
            promo: false,
            state_holiday: StateHoliday::None,
            school_holiday: false,
            day_of_week: None,
            store_type: None,
            assortment: None,
            competition_distance: None,
            competition_open_since_year: None,
            recent_sales: None,
        }
    }

    pub fn with_promo(mut self, promo: bool) -> Self {
        self.promo = promo;
        self
    }

    pub fn with_day_of_week(mut self, day_of_week: u8) -> Self {
        self.day_of_week = Some(day_of_week);
        self
    }

    pub fn with_recent_sales(mut self, recent_sales: Vec<f64>) -> Self {
        self.recent_sales = Some(recent_sales);
        self
    }

    pub fn competition_distance(&self) -> f64 {
        self.competition_distance
            .unwrap_or(DEFAULT_COMPETITION_DISTANCE)
    }
}
