pub mod prediction;

pub use prediction::{
    BatchPredictionRequest, BatchPredictionResponse, HealthResponse, ModelInfo, PredictionRequest,
    PredictionResponse, RetrainResponse, ServiceBanner, SimpleBatchPredictionRequest,
    SimplePredictionRequest,
};
