use clap::{ArgAction, Parser};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Largest accepted model input side.
pub const MAX_IMAGE_SIZE: u32 = 4096;

/// Brain MRI classification server.
#[derive(Debug, Clone, Parser)]
#[command(name = "tumor-classifier", version, about)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "CLASSIFIER_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Path to the ONNX model
    #[arg(long, env = "CLASSIFIER_MODEL", default_value = "model.onnx")]
    pub model: PathBuf,

    /// Class names in model output order
    #[arg(
        long,
        env = "CLASSIFIER_LABELS",
        value_delimiter = ',',
        default_value = "glioma,meningioma,notumor,pituitary"
    )]
    pub labels: Vec<String>,

    /// Side of the square model input in pixels
    #[arg(long, env = "CLASSIFIER_IMAGE_SIZE", default_value_t = 224)]
    pub image_size: u32,

    /// Apply softmax to raw model outputs
    #[arg(long, env = "CLASSIFIER_SOFTMAX", default_value_t = true, action = ArgAction::Set)]
    pub softmax: bool,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.labels.is_empty() {
            return Err(ConfigError::NoLabels);
        }
        if self.image_size == 0 {
            return Err(ConfigError::ZeroImageSize);
        }
        if self.image_size > MAX_IMAGE_SIZE {
            return Err(ConfigError::ImageSizeTooLarge(self.image_size));
        }

        let mut seen = HashSet::new();
        for label in &self.labels {
            if label.trim().is_empty() {
                return Err(ConfigError::EmptyLabel);
            }
            if !seen.insert(label.as_str()) {
                return Err(ConfigError::DuplicateLabel(label.clone()));
            }
        }
        Ok(())
    }
}
