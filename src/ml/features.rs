//! Feature derivation.
//!
//! Maps a [`ForecastRequest`] onto the 31 model inputs in the exact order the
//! scaler and regressor were fit on. The only failure is an unparseable date;
//! every other missing or unknown input has a fixed default.

use chrono::{Datelike, NaiveDate};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::f64::consts::PI;

use super::history::{SalesHistory, HISTORY_WINDOW};
use super::request::{encode_assortment, encode_store_type, ForecastRequest};
use crate::errors::ServiceError;

pub const FEATURE_COUNT: usize = 31;

/// Model inputs, declared in training order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Store,
    DayOfWeek,
    Promo,
    StateHolidayEncoded,
    SchoolHoliday,
    StoreTypeEncoded,
    AssortmentEncoded,
    CompetitionDistance,
    CompetitionOpen,
    Year,
    Month,
    Day,
    WeekOfYear,
    Quarter,
    IsWeekend,
    IsMonthEnd,
    IsMonthStart,
    MonthSin,
    MonthCos,
    DayOfWeekSin,
    DayOfWeekCos,
    SalesLag1,
    SalesLag7,
    SalesLag14,
    SalesLag30,
    SalesRollingMean7,
    SalesRollingStd7,
    SalesRollingMean14,
    SalesRollingStd14,
    SalesRollingMean30,
    SalesRollingStd30,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Store,
        Feature::DayOfWeek,
        Feature::Promo,
        Feature::StateHolidayEncoded,
        Feature::SchoolHoliday,
        Feature::StoreTypeEncoded,
        Feature::AssortmentEncoded,
        Feature::CompetitionDistance,
        Feature::CompetitionOpen,
        Feature::Year,
        Feature::Month,
        Feature::Day,
        Feature::WeekOfYear,
        Feature::Quarter,
        Feature::IsWeekend,
        Feature::IsMonthEnd,
        Feature::IsMonthStart,
        Feature::MonthSin,
        Feature::MonthCos,
        Feature::DayOfWeekSin,
        Feature::DayOfWeekCos,
        Feature::SalesLag1,
        Feature::SalesLag7,
        Feature::SalesLag14,
        Feature::SalesLag30,
        Feature::SalesRollingMean7,
        Feature::SalesRollingStd7,
        Feature::SalesRollingMean14,
        Feature::SalesRollingStd14,
        Feature::SalesRollingMean30,
        Feature::SalesRollingStd30,
    ];

    /// Column position in the model input.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name used at training time.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Store => "Store",
            Feature::DayOfWeek => "DayOfWeek",
            Feature::Promo => "Promo",
            Feature::StateHolidayEncoded => "StateHoliday_encoded",
            Feature::SchoolHoliday => "SchoolHoliday",
            Feature::StoreTypeEncoded => "StoreType_encoded",
            Feature::AssortmentEncoded => "Assortment_encoded",
            Feature::CompetitionDistance => "CompetitionDistance",
            Feature::CompetitionOpen => "CompetitionOpen",
            Feature::Year => "Year",
            Feature::Month => "Month",
            Feature::Day => "Day",
            Feature::WeekOfYear => "WeekOfYear",
            Feature::Quarter => "Quarter",
            Feature::IsWeekend => "IsWeekend",
            Feature::IsMonthEnd => "IsMonthEnd",
            Feature::IsMonthStart => "IsMonthStart",
            Feature::MonthSin => "Month_sin",
            Feature::MonthCos => "Month_cos",
            Feature::DayOfWeekSin => "DayOfWeek_sin",
            Feature::DayOfWeekCos => "DayOfWeek_cos",
            Feature::SalesLag1 => "Sales_lag_1",
            Feature::SalesLag7 => "Sales_lag_7",
            Feature::SalesLag14 => "Sales_lag_14",
            Feature::SalesLag30 => "Sales_lag_30",
            Feature::SalesRollingMean7 => "Sales_rolling_mean_7",
            Feature::SalesRollingStd7 => "Sales_rolling_std_7",
            Feature::SalesRollingMean14 => "Sales_rolling_mean_14",
            Feature::SalesRollingStd14 => "Sales_rolling_std_14",
            Feature::SalesRollingMean30 => "Sales_rolling_mean_30",
            Feature::SalesRollingStd30 => "Sales_rolling_std_30",
        }
    }
}

/// Ordered column names, as reported by the model-info endpoint.
pub fn feature_names() -> Vec<&'static str> {
    Feature::ALL.iter().map(|f| f.name()).collect()
}

/// One fully populated model input row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Raw values in training order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |&f| (f, self.get(f)))
    }

    fn set(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = value;
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.name(), &value)?;
        }
        map.end()
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Parses a `YYYY-MM-DD` date exactly as given.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    let malformed = || ServiceError::MalformedDate(raw.to_string());
    // chrono skips whitespace ahead of numeric fields
    if raw.trim() != raw {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| malformed())
}

/// Supplied weekday when it is within 1..=7, otherwise the ISO weekday of `date`.
pub fn resolve_day_of_week(day_of_week: Option<u8>, date: NaiveDate) -> u32 {
    match day_of_week {
        Some(d) if (1..=7).contains(&d) => u32::from(d),
        _ => date.weekday().number_from_monday(),
    }
}

/// (sin, cos) of `value` on a cycle of length `period`.
pub fn cyclical(value: u32, period: u32) -> (f64, f64) {
    let angle = 2.0 * PI * f64::from(value) / f64::from(period);
    (angle.sin(), angle.cos())
}

/// True when the following day starts a new month.
pub fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.day() == 1)
}

pub fn derive_features(request: &ForecastRequest) -> Result<FeatureVector, ServiceError> {
    let date = parse_date(&request.date)?;

    let year = date.year();
    let month = date.month();
    let day = date.day();
    let week_of_year = date.iso_week().week();
    let quarter = (month - 1) / 3 + 1;
    let day_of_week = resolve_day_of_week(request.day_of_week, date);

    let (month_sin, month_cos) = cyclical(month, 12);
    let (dow_sin, dow_cos) = cyclical(day_of_week, 7);

    let is_weekend = day_of_week >= 6;

    let competition_open = request
        .competition_open_since_year
        .map_or(false, |since| since <= year);

    let history = match request.recent_sales.as_deref() {
        Some(sales) if sales.len() >= HISTORY_WINDOW => SalesHistory::from_recent_sales(sales),
        _ => None,
    }
    .unwrap_or_else(|| SalesHistory::synthetic(request.store, request.promo, is_weekend, day));

    let mut vector = FeatureVector {
        values: [0.0; FEATURE_COUNT],
    };
    vector.set(Feature::Store, f64::from(request.store));
    vector.set(Feature::DayOfWeek, f64::from(day_of_week));
    vector.set(Feature::Promo, flag(request.promo));
    vector.set(Feature::StateHolidayEncoded, request.state_holiday.encoded());
    vector.set(Feature::SchoolHoliday, flag(request.school_holiday));
    vector.set(Feature::StoreTypeEncoded, encode_store_type(request.store_type));
    vector.set(Feature::AssortmentEncoded, encode_assortment(request.assortment));
    vector.set(Feature::CompetitionDistance, request.competition_distance());
    vector.set(Feature::CompetitionOpen, flag(competition_open));
    vector.set(Feature::Year, f64::from(year));
    vector.set(Feature::Month, f64::from(month));
    vector.set(Feature::Day, f64::from(day));
    vector.set(Feature::WeekOfYear, f64::from(week_of_year));
    vector.set(Feature::Quarter, f64::from(quarter));
    vector.set(Feature::IsWeekend, flag(is_weekend));
    vector.set(Feature::IsMonthEnd, flag(is_month_end(date)));
    vector.set(Feature::IsMonthStart, flag(day == 1));
    vector.set(Feature::MonthSin, month_sin);
    vector.set(Feature::MonthCos, month_cos);
    vector.set(Feature::DayOfWeekSin, dow_sin);
    vector.set(Feature::DayOfWeekCos, dow_cos);
    vector.set(Feature::SalesLag1, history.lag_1);
    vector.set(Feature::SalesLag7, history.lag_7);
    vector.set(Feature::SalesLag14, history.lag_14);
    vector.set(Feature::SalesLag30, history.lag_30);
    vector.set(Feature::SalesRollingMean7, history.rolling_mean_7);
    vector.set(Feature::SalesRollingStd7, history.rolling_std_7);
    vector.set(Feature::SalesRollingMean14, history.rolling_mean_14);
    vector.set(Feature::SalesRollingStd14, history.rolling_std_14);
    vector.set(Feature::SalesRollingMean30, history.rolling_mean_30);
    vector.set(Feature::SalesRollingStd30, history.rolling_std_30);

    Ok(vector)
}
