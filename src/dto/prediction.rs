use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ml::{Assortment, ForecastRequest, ForecastResult, StateHoliday, StoreType};

fn default_state_holiday() -> String {
    "0".to_string()
}

/// Full prediction input including optional store attributes and sales history.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[schema(example = json!({
    "store": 1,
    "date": "2023-12-15",
    "promo": 1,
    "state_holiday": "0",
    "school_holiday": 0,
    "day_of_week": 5,
    "store_type": "a",
    "assortment": "c",
    "competition_distance": 570.0
}))]
pub struct PredictionRequest {
    /// Store ID
    #[validate(range(min = 1))]
    pub store: u32,
    /// Date in YYYY-MM-DD format
    pub date: String,
    /// Promotion (0 or 1)
    #[validate(range(min = 0, max = 1))]
    pub promo: u8,
    /// State holiday (0, a, b, c)
    pub state_holiday: String,
    /// School holiday (0 or 1)
    #[validate(range(min = 0, max = 1))]
    pub school_holiday: u8,
    /// Day of week (1-7)
    #[validate(range(min = 1, max = 7))]
    pub day_of_week: u8,
    /// Store type (a, b, c, d)
    pub store_type: Option<String>,
    /// Assortment (a, b, c)
    pub assortment: Option<String>,
    /// Distance to nearest competitor
    #[validate(range(min = 0.0))]
    pub competition_distance: Option<f64>,
    /// Month when competition opened; accepted but not used by the model
    pub competition_open_since_month: Option<u8>,
    /// Year when competition opened
    pub competition_open_since_year: Option<i32>,
    /// Recent daily sales, oldest first (last 30 days)
    pub recent_sales: Option<Vec<f64>>,
}

impl From<PredictionRequest> for ForecastRequest {
    fn from(req: PredictionRequest) -> Self {
        Self {
            store: req.store,
            date: req.date,
            promo: req.promo == 1,
            state_holiday: StateHoliday::from_code(&req.state_holiday),
            school_holiday: req.school_holiday == 1,
            day_of_week: Some(req.day_of_week),
            store_type: req.store_type.as_deref().and_then(StoreType::from_code),
            assortment: req.assortment.as_deref().and_then(Assortment::from_code),
            competition_distance: req.competition_distance,
            competition_open_since_year: req.competition_open_since_year,
            recent_sales: req.recent_sales,
        }
    }
}

/// Minimal prediction input; store attributes and history are defaulted.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[schema(example = json!({
    "store": 1,
    "date": "2023-12-15",
    "promo": 1
}))]
pub struct SimplePredictionRequest {
    /// Store ID
    #[validate(range(min = 1))]
    pub store: u32,
    /// Date in YYYY-MM-DD format
    pub date: String,
    /// Promotion (0 or 1)
    #[validate(range(min = 0, max = 1))]
    pub promo: u8,
    /// State holiday (0, a, b, c)
    #[serde(default = "default_state_holiday")]
    pub state_holiday: String,
    /// School holiday (0 or 1)
    #[serde(default)]
    #[validate(range(min = 0, max = 1))]
    pub school_holiday: u8,
    /// Day of week (1-7, derived from the date if not provided)
    #[validate(range(min = 1, max = 7))]
    pub day_of_week: Option<u8>,
}

impl From<SimplePredictionRequest> for ForecastRequest {
    fn from(req: SimplePredictionRequest) -> Self {
        Self {
            promo: req.promo == 1,
            state_holiday: StateHoliday::from_code(&req.state_holiday),
            school_holiday: req.school_holiday == 1,
            day_of_week: req.day_of_week,
            ..ForecastRequest::new(req.store, req.date)
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BatchPredictionRequest {
    pub predictions: Vec<PredictionRequest>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SimpleBatchPredictionRequest {
    pub predictions: Vec<SimplePredictionRequest>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[schema(example = json!({
    "store": 1,
    "date": "2023-12-15",
    "forecasted_sales": 6123.4,
    "confidence_score": 0.87
}))]
pub struct PredictionResponse {
    pub store: u32,
    pub date: String,
    pub forecasted_sales: f64,
    pub confidence_score: Option<f64>,
}

impl From<ForecastResult> for PredictionResponse {
    fn from(result: ForecastResult) -> Self {
        Self {
            store: result.store,
            date: result.date,
            forecasted_sales: result.forecasted_sales,
            confidence_score: result.confidence_score,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<PredictionResponse>,
    pub total_predictions: usize,
}

impl From<Vec<ForecastResult>> for BatchPredictionResponse {
    fn from(results: Vec<ForecastResult>) -> Self {
        let predictions: Vec<PredictionResponse> =
            results.into_iter().map(PredictionResponse::from).collect();
        Self {
            total_predictions: predictions.len(),
            predictions,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ModelInfo {
    #[schema(example = "Random Forest Regressor")]
    pub model_type: String,
    #[schema(example = "Rossmann Store Sales Dataset")]
    pub trained_on: String,
    #[schema(example = "1.0.0")]
    pub version: String,
    pub features: Vec<String>,
    #[schema(example = 31)]
    pub total_features: usize,
    pub model_requirements: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" when a model is loaded, otherwise "unhealthy"
    #[schema(example = "healthy")]
    pub status: String,
    pub model_loaded: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RetrainResponse {
    #[schema(example = "Model retraining started")]
    pub message: String,
    #[schema(example = "initiated")]
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ServiceBanner {
    #[schema(example = "Rossmann Sales Forecasting API")]
    pub message: String,
    #[schema(example = "1.0.0")]
    pub version: String,
    #[schema(example = "/docs")]
    pub docs: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> PredictionRequest {
        serde_json::from_value(serde_json::json!({
            "store": 12,
            "date": "2015-07-31",
            "promo": 1,
            "state_holiday": "b",
            "school_holiday": 1,
            "day_of_week": 5,
            "store_type": "C",
            "assortment": "z",
            "competition_open_since_month": 9,
            "competition_open_since_year": 2008
        }))
        .unwrap()
    }

    #[test]
    fn full_request_converts_leniently() {
        let request = full_request();
        assert!(request.validate().is_ok());

        let forecast: ForecastRequest = request.into();
        assert!(forecast.promo);
        assert!(forecast.school_holiday);
        assert_eq!(forecast.state_holiday, StateHoliday::Easter);
        assert_eq!(forecast.store_type, Some(StoreType::C));
        assert_eq!(forecast.assortment, None);
        assert_eq!(forecast.day_of_week, Some(5));
        assert_eq!(forecast.competition_open_since_year, Some(2008));
    }

    #[test]
    fn out_of_range_fields_fail_validation() {
        let mut request = full_request();
        request.promo = 2;
        assert!(request.validate().is_err());

        let mut request = full_request();
        request.store = 0;
        assert!(request.validate().is_err());

        let mut request = full_request();
        request.day_of_week = 8;
        assert!(request.validate().is_err());

        let mut request = full_request();
        request.competition_distance = Some(-1.0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn simple_request_defaults() {
        let request: SimplePredictionRequest =
            serde_json::from_value(serde_json::json!({"store": 3, "date": "2024-03-02", "promo": 0}))
                .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.state_holiday, "0");
        assert_eq!(request.school_holiday, 0);

        let forecast: ForecastRequest = request.into();
        assert_eq!(forecast.day_of_week, None);
        assert_eq!(forecast.store_type, None);
        assert_eq!(forecast.competition_distance(), 1000.0);
        assert!(forecast.recent_sales.is_none());
    }

    #[test]
    fn batch_response_counts_predictions() {
        let results = vec![
            ForecastResult {
                store: 1,
                date: "2023-12-15".into(),
                forecasted_sales: 10.0,
                confidence_score: Some(0.5),
            };
            3
        ];
        let response = BatchPredictionResponse::from(results);
        assert_eq!(response.total_predictions, 3);
        assert_eq!(response.predictions[2].store, 1);
    }
}
