use log::info;
use ndarray::Array4;
use tract_onnx::prelude::*;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::PredictionResult;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

pub trait Predictor: Send + Sync {
    fn labels(&self) -> &[String];

    fn predict(&self, input: Array4<f32>) -> Result<PredictionResult, ApiError>;
}

pub struct OnnxClassifier {
    plan: Plan,
    labels: Vec<String>,
    softmax: bool,
}

impl OnnxClassifier {
    /// Loads and optimizes the model once; it is shared by every request.
    pub fn load(config: &Config) -> Result<Self, ApiError> {
        let side = config.image_size as usize;
        let model_err = |e: TractError| ApiError::Model(e.to_string());

        let plan = tract_onnx::onnx()
            .model_for_path(&config.model)
            .map_err(model_err)?
            .with_input_fact(0, f32::fact([1, 3, side, side]).into())
            .map_err(model_err)?
            .into_optimized()
            .map_err(model_err)?
            .into_runnable()
            .map_err(model_err)?;

        info!(
            "loaded model {} with {} labels",
            config.model.display(),
            config.labels.len()
        );

        Ok(Self {
            plan,
            labels: config.labels.clone(),
            softmax: config.softmax,
        })
    }
}

impl Predictor for OnnxClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, input: Array4<f32>) -> Result<PredictionResult, ApiError> {
        let inference_err = |e: TractError| ApiError::Inference(e.to_string());

        let outputs = self.plan.run(tvec!(input_tensor(input).into())).map_err(inference_err)?;
        let output = outputs
            .first()
            .ok_or_else(|| ApiError::Inference("model produced no outputs".into()))?;
        let raw: Vec<f32> = output
            .to_array_view::<f32>()
            .map_err(inference_err)?
            .iter()
            .copied()
            .collect();

        rank(&self.labels, &raw, self.softmax)
    }
}

/// Converts in logical order, whatever the memory layout of `input`.
fn input_tensor(input: Array4<f32>) -> Tensor {
    input.into_tensor()
}

/// Turns raw model outputs into a result, optionally through softmax.
pub fn rank(labels: &[String], raw: &[f32], apply_softmax: bool) -> Result<PredictionResult, ApiError> {
    let probabilities = if apply_softmax { softmax(raw) } else { raw.to_vec() };

    // non-finite scores would serialize as null
    if let Some(index) = probabilities.iter().position(|p| !p.is_finite()) {
        return Err(ApiError::Inference(format!(
            "model returned a non-finite score at index {}",
            index
        )));
    }

    PredictionResult::from_probabilities(labels, &probabilities).ok_or_else(|| {
        ApiError::Inference(format!(
            "model returned {} values for {} labels",
            raw.len(),
            labels.len()
        ))
    })
}

pub fn softmax(values: &[f32]) -> Vec<f32> {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
