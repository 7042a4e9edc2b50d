//! Sales-history features: lags and rolling statistics.
//!
//! Real history is summarized from the trailing 30-day window. Callers that
//! cannot supply a full window get a synthetic estimate instead, seeded from
//! the store and day of month so identical inputs always reproduce the same
//! numbers.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Trailing window the model was trained on.
pub const HISTORY_WINDOW: usize = 30;

const BASE_SALES: f64 = 5000.0;
const PROMO_MULTIPLIER: f64 = 1.2;
const WEEKEND_FACTOR: f64 = 1.1;

/// The ten sales-history inputs of the feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalesHistory {
    pub lag_1: f64,
    pub lag_7: f64,
    pub lag_14: f64,
    pub lag_30: f64,
    pub rolling_mean_7: f64,
    pub rolling_std_7: f64,
    pub rolling_mean_14: f64,
    pub rolling_std_14: f64,
    pub rolling_mean_30: f64,
    pub rolling_std_30: f64,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n).
fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// The last `min(k, len)` entries.
fn tail(values: &[f64], k: usize) -> &[f64] {
    &values[values.len().saturating_sub(k)..]
}

/// `values[len - k]`, i.e. lag 1 is the most recent observation.
fn lag(values: &[f64], k: usize) -> Option<f64> {
    values.len().checked_sub(k).map(|i| values[i])
}

impl SalesHistory {
    /// Summarizes the trailing [`HISTORY_WINDOW`] entries of `recent_sales`.
    ///
    /// Returns `None` for an empty series. Lags reaching past the start of a
    /// short window fall back to the matching rolling mean.
    pub fn from_recent_sales(recent_sales: &[f64]) -> Option<Self> {
        if recent_sales.is_empty() {
            return None;
        }
        let window = tail(recent_sales, HISTORY_WINDOW);

        let rolling_mean_7 = mean(tail(window, 7));
        let rolling_mean_14 = mean(tail(window, 14));
        let rolling_mean_30 = mean(window);

        Some(Self {
            lag_1: lag(window, 1).unwrap_or(rolling_mean_7),
            lag_7: lag(window, 7).unwrap_or(rolling_mean_7),
            lag_14: lag(window, 14).unwrap_or(rolling_mean_14),
            lag_30: lag(window, 30).unwrap_or(rolling_mean_30),
            rolling_mean_7,
            rolling_std_7: population_std(tail(window, 7)),
            rolling_mean_14,
            rolling_std_14: population_std(tail(window, 14)),
            rolling_mean_30,
            rolling_std_30: population_std(window),
        })
    }

    /// Heuristic stand-in when real history is missing or shorter than the window.
    pub fn synthetic(store: u32, promo: bool, is_weekend: bool, day_of_month: u32) -> Self {
        let estimated = estimated_sales(store, promo, is_weekend);
        let mut rng = StdRng::seed_from_u64(u64::from(store) + u64::from(day_of_month));

        let rolling_mean_7 = estimated * (0.9 + rng.gen_range(-0.1_f64..0.1));
        let rolling_mean_14 = estimated * (0.95 + rng.gen_range(-0.05_f64..0.05));
        let rolling_mean_30 = estimated;
        let lag_1 = rolling_mean_7 * (1.0 + rng.gen_range(-0.2_f64..0.2));

        Self {
            lag_1,
            lag_7: rolling_mean_7,
            lag_14: rolling_mean_14,
            lag_30: rolling_mean_30,
            rolling_mean_7,
            rolling_std_7: rolling_mean_7 * 0.15,
            rolling_mean_14,
            rolling_std_14: rolling_mean_14 * 0.12,
            rolling_mean_30,
            rolling_std_30: rolling_mean_30 * 0.10,
        }
    }
}

/// Baseline daily sales adjusted for promotion, store and weekend.
pub fn estimated_sales(store: u32, promo: bool, is_weekend: bool) -> f64 {
    let promo_multiplier = if promo { PROMO_MULTIPLIER } else { 1.0 };
    let store_factor = 1.0 + f64::from(store % 100) / 1000.0;
    let weekend_factor = if is_weekend { WEEKEND_FACTOR } else { 1.0 };
    BASE_SALES * promo_multiplier * store_factor * weekend_factor
}
