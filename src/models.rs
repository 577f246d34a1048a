use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of classifying one scan.
///
/// Nothing is enforced here: the label may be empty or missing from
/// `scores`, and scores need not sum to one.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionResult {
    pub predicted_label: String,
    pub scores: HashMap<String, f32>,
}

impl PredictionResult {
    pub fn new(predicted_label: impl Into<String>, scores: HashMap<String, f32>) -> Self {
        Self {
            predicted_label: predicted_label.into(),
            scores,
        }
    }

    /// Pairs labels with probabilities by index and picks the highest one.
    ///
    /// Returns `None` if the slices are empty or their lengths differ.
    pub fn from_probabilities<S: AsRef<str>>(labels: &[S], probabilities: &[f32]) -> Option<Self> {
        if labels.is_empty() || labels.len() != probabilities.len() {
            return None;
        }

        let mut best = 0;
        for (index, &p) in probabilities.iter().enumerate() {
            let current = probabilities[best];
            // NaN never wins over a number.
            if p > current || (current.is_nan() && !p.is_nan()) {
                best = index;
            }
        }

        let scores = labels
            .iter()
            .zip(probabilities)
            .map(|(label, &p)| (label.as_ref().to_owned(), p))
            .collect();

        Some(Self::new(labels[best].as_ref(), scores))
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub labels: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glioma_scan() -> PredictionResult {
        let scores = [
            ("glioma", 0.91),
            ("meningioma", 0.05),
            ("notumor", 0.02),
            ("pituitary", 0.02),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
        PredictionResult::new("glioma", scores)
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let text = serde_json::to_string(&glioma_scan()).unwrap();
        let expected =
            r#"{"predicted_label":"glioma","scores":{"glioma":0.91,"meningioma":0.05,"notumor":0.02,"pituitary":0.02}}"#;

        // scores order is unspecified, so match the frame and each entry
        assert!(text.starts_with(r#"{"predicted_label":"glioma","scores":{"#));
        assert!(text.ends_with("}}"));
        for entry in [
            r#""glioma":0.91"#,
            r#""meningioma":0.05"#,
            r#""notumor":0.02"#,
            r#""pituitary":0.02"#,
        ] {
            assert!(text.contains(entry), "{} missing from {}", entry, text);
        }
        assert_eq!(text.len(), expected.len());
    }

    #[test]
    fn round_trips_through_json() {
        let labels = ["", "glioma", "pituitary tumour", "神経膠腫", "x\"y"];
        let values = [0.0, 0.91, -3.5, f32::MIN_POSITIVE, f32::MAX, f32::MIN, 1.0e-7, 123456.79];

        for (i, label) in labels.iter().enumerate() {
            for len in 0..values.len() {
                let scores: HashMap<String, f32> = values[..len]
                    .iter()
                    .enumerate()
                    .map(|(j, &v)| (format!("{}-класс-{}", labels[(i + j) % labels.len()], j), v))
                    .collect();
                let original = PredictionResult::new(*label, scores);

                let text = serde_json::to_string(&original).unwrap();
                let decoded: PredictionResult = serde_json::from_str(&text).unwrap();
                assert_eq!(decoded, original, "round trip of {}", text);
            }
        }

        let original = glioma_scan();
        let text = serde_json::to_string(&original).unwrap();
        assert_eq!(serde_json::from_str::<PredictionResult>(&text).unwrap(), original);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let empty: PredictionResult = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.predicted_label, "");
        assert!(empty.scores.is_empty());

        let label_only: PredictionResult =
            serde_json::from_str(r#"{"predicted_label":"x"}"#).unwrap();
        assert_eq!(label_only.predicted_label, "x");
        assert!(label_only.scores.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let decoded: PredictionResult =
            serde_json::from_str(r#"{"predicted_label":"x","scores":{},"extra":123}"#).unwrap();
        assert_eq!(decoded, PredictionResult::new("x", HashMap::new()));
    }

    #[test]
    fn empty_scores_serialize_as_object() {
        let result = PredictionResult::new("notumor", HashMap::new());
        let text = serde_json::to_string(&result).unwrap();
        assert!(text.contains(r#""scores":{}"#));
        assert_eq!(serde_json::from_str::<PredictionResult>(&text).unwrap(), result);
    }

    #[test]
    fn label_need_not_appear_in_scores() {
        let result = PredictionResult::new("unknown", [("glioma".to_owned(), 1.0)].into());
        assert!(!result.scores.contains_key(&result.predicted_label));
    }

    #[test]
    fn malformed_input_is_rejected_by_serde() {
        assert!(serde_json::from_str::<PredictionResult>(r#"{"scores":{"a":"high"}}"#).is_err());
        assert!(serde_json::from_str::<PredictionResult>(r#"{"predicted_label":3}"#).is_err());
    }

    #[test]
    fn from_probabilities_picks_highest() {
        let labels = ["glioma", "meningioma", "notumor", "pituitary"];
        let result = PredictionResult::from_probabilities(&labels, &[0.1, 0.2, 0.6, 0.1]).unwrap();
        assert_eq!(result.predicted_label, "notumor");
        assert_eq!(result.scores.len(), 4);
        assert_eq!(result.scores["pituitary"], 0.1);
    }

    #[test]
    fn from_probabilities_ties_and_nan() {
        let labels = ["a", "b", "c"];
        let tie = PredictionResult::from_probabilities(&labels, &[0.4, 0.4, 0.2]).unwrap();
        assert_eq!(tie.predicted_label, "a");

        let nan = PredictionResult::from_probabilities(&labels, &[f32::NAN, 0.1, 0.3]).unwrap();
        assert_eq!(nan.predicted_label, "c");
    }

    #[test]
    fn from_probabilities_rejects_mismatched_lengths() {
        assert!(PredictionResult::from_probabilities(&["a", "b"], &[1.0]).is_none());
        assert!(PredictionResult::from_probabilities::<&str>(&[], &[]).is_none());
    }
}
