// Forecasting over the loaded model artifacts
pub mod forecasting;

pub use forecasting::ForecastService;
