use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{AsRefStr, EnumIter, EnumString};

/// Classes the prediction service can report. `Healthy` is the sentinel
/// class; everything else is a nutrient deficiency.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    strum_macros::Display,
)]
pub enum Diagnosis {
    Calcium,
    #[serde(rename = "healthy")]
    #[strum(serialize = "healthy")]
    Healthy,
    Magnesium,
    Nitrogen,
    Phosphorus,
    Potassium,
    Iron,
}

impl Diagnosis {
    pub fn is_healthy(self) -> bool {
        self == Diagnosis::Healthy
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
    strum_macros::Display,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    None,
    Moderate,
    High,
    /// Anything the service sends that is not one of the known levels.
    #[default]
    Unclassified,
}

impl Severity {
    /// Position on the emphasis scale, `None` for unclassified values.
    pub fn rank(self) -> Option<u8> {
        match self {
            Severity::None => Some(0),
            Severity::Moderate => Some(1),
            Severity::High => Some(2),
            Severity::Unclassified => None,
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Severity::Unclassified)
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        value.as_ref().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub symptoms: String,
    pub organic_fertilizer: String,
    pub form: String,
    pub dosage_per_plant: String,
    pub sunlight_requirement: String,
    pub humidity_requirement: String,
    /// Accent colour for the diagnosis, e.g. `"purple"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A validated diagnosis, ready to be presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Diagnosis,
    pub confidence: f64,
    #[serde(default)]
    pub class_probabilities: BTreeMap<String, f64>,
    pub recommendation: Recommendation,
}

/// Body of `POST /predict`, in both its success and failure shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_probabilities: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum ResponseError {
    #[display(fmt = "service reported failure")]
    Rejected { message: Option<String> },
    #[display(fmt = "response is missing `{}`", _0)]
    MissingField(&'static str),
    #[display(fmt = "unknown class label `{}`", _0)]
    UnknownClass(String),
    #[display(fmt = "confidence {} is outside [0, 1]", _0)]
    ConfidenceOutOfRange(f64),
    #[display(fmt = "severity `{}` contradicts prediction `{}`", severity, prediction)]
    SeverityMismatch {
        prediction: Diagnosis,
        severity: Severity,
    },
}

impl std::error::Error for ResponseError {}

impl ResponseError {
    /// Text the service asked us to show, if any.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            ResponseError::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }
}

impl PredictionResponse {
    pub fn success(result: PredictionResult) -> Self {
        Self {
            success: true,
            prediction: Some(result.prediction.to_string()),
            confidence: Some(result.confidence),
            class_probabilities: Some(result.class_probabilities),
            recommendation: Some(result.recommendation),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Checks the payload against the `PredictionResult` shape.
    pub fn into_result(self) -> Result<PredictionResult, ResponseError> {
        if !self.success {
            return Err(ResponseError::Rejected {
                message: self.error,
            });
        }

        let label = self
            .prediction
            .ok_or(ResponseError::MissingField("prediction"))?;
        let prediction = label
            .parse::<Diagnosis>()
            .map_err(|_| ResponseError::UnknownClass(label.clone()))?;

        let confidence = self
            .confidence
            .ok_or(ResponseError::MissingField("confidence"))?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ResponseError::ConfidenceOutOfRange(confidence));
        }

        let recommendation = self
            .recommendation
            .ok_or(ResponseError::MissingField("recommendation"))?;

        match (prediction.is_healthy(), recommendation.severity) {
            (_, Severity::Unclassified) => {}
            (true, Severity::None) | (false, Severity::Moderate | Severity::High) => {}
            (_, severity) => {
                return Err(ResponseError::SeverityMismatch {
                    prediction,
                    severity,
                });
            }
        }

        Ok(PredictionResult {
            prediction,
            confidence,
            class_probabilities: self.class_probabilities.unwrap_or_default(),
            recommendation,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub success: bool,
    pub recommendations: BTreeMap<String, Recommendation>,
}
