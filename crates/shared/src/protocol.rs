use std::collections::BTreeMap;

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use crate::{
    domain::FieldKey,
    error::{ResponseShapeError, ValidationError},
};

pub const PREDICT_PATH: &str = "/api/predict";

/// Largest integer an f64 carries exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Every field parsed and range-checked. Serializes as the prediction
/// request body.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    values: BTreeMap<FieldKey, f64>,
}

impl ValidatedInput {
    /// Validates all thirteen fields. Keys missing from `raw` count as empty.
    /// On failure every offending field is reported, not just the first.
    pub fn validate(
        raw: &BTreeMap<FieldKey, String>,
    ) -> Result<Self, BTreeMap<FieldKey, ValidationError>> {
        let mut values = BTreeMap::new();
        let mut errors = BTreeMap::new();

        for key in FieldKey::ALL {
            let input = raw.get(&key).map(String::as_str).unwrap_or_default();
            match key.spec().parse(input) {
                Ok(value) => {
                    values.insert(key, value);
                }
                Err(err) => {
                    errors.insert(key, err);
                }
            }
        }

        if errors.is_empty() {
            Ok(Self { values })
        } else {
            Err(errors)
        }
    }

    pub fn get(&self, key: FieldKey) -> f64 {
        self.values.get(&key).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for ValidatedInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
                map.serialize_entry(key.as_str(), &(*value as i64))?;
            } else {
                map.serialize_entry(key.as_str(), value)?;
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum PredictedClass {
    Absent,
    Present,
}

impl From<PredictedClass> for u8 {
    fn from(value: PredictedClass) -> Self {
        match value {
            PredictedClass::Absent => 0,
            PredictedClass::Present => 1,
        }
    }
}

impl PredictedClass {
    pub fn headline(self) -> &'static str {
        match self {
            PredictedClass::Absent => "Low Risk Detected",
            PredictedClass::Present => "High Risk Detected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probability {
    pub positive: f64,
    pub negative: f64,
}

/// Raw body of a 2xx answer from the prediction service, every member
/// optional so shape problems surface as `ResponseShapeError` instead of
/// a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<Probability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResponse {
    pub fn into_result(self) -> Result<PredictionResult, ResponseShapeError> {
        let class = self
            .prediction
            .ok_or(ResponseShapeError::MissingField("prediction"))?;
        let predicted_class = if class == 0.0 {
            PredictedClass::Absent
        } else if class == 1.0 {
            PredictedClass::Present
        } else {
            return Err(ResponseShapeError::InvalidClass(class));
        };

        let probability = self
            .probability
            .ok_or(ResponseShapeError::MissingField("probability"))?;
        if !probability.positive.is_finite() {
            return Err(ResponseShapeError::InvalidProbability { name: "positive" });
        }
        if !probability.negative.is_finite() {
            return Err(ResponseShapeError::InvalidProbability { name: "negative" });
        }

        Ok(PredictionResult {
            predicted_class,
            probability,
            success: self.success,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    #[serde(rename = "prediction")]
    pub predicted_class: PredictedClass,
    pub probability: Probability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl PredictionResult {
    /// Positive probability as a percentage with one decimal, e.g. `82.0%`.
    pub fn risk_percentage_label(&self) -> String {
        format!("{:.1}%", self.probability.positive * 100.0)
    }

    /// Fill fraction for a risk bar.
    pub fn bar_fraction(&self) -> f32 {
        (self.probability.positive as f32).clamp(0.0, 1.0)
    }
}
