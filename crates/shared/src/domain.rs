use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    Age,
    Sex,
    Cp,
    Trestbps,
    Chol,
    Fbs,
    Restecg,
    Thalach,
    Exang,
    Oldpeak,
    Slope,
    Ca,
    Thal,
}

impl FieldKey {
    pub const ALL: [FieldKey; 13] = [
        FieldKey::Age,
        FieldKey::Sex,
        FieldKey::Cp,
        FieldKey::Trestbps,
        FieldKey::Chol,
        FieldKey::Fbs,
        FieldKey::Restecg,
        FieldKey::Thalach,
        FieldKey::Exang,
        FieldKey::Oldpeak,
        FieldKey::Slope,
        FieldKey::Ca,
        FieldKey::Thal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Age => "age",
            FieldKey::Sex => "sex",
            FieldKey::Cp => "cp",
            FieldKey::Trestbps => "trestbps",
            FieldKey::Chol => "chol",
            FieldKey::Fbs => "fbs",
            FieldKey::Restecg => "restecg",
            FieldKey::Thalach => "thalach",
            FieldKey::Exang => "exang",
            FieldKey::Oldpeak => "oldpeak",
            FieldKey::Slope => "slope",
            FieldKey::Ca => "ca",
            FieldKey::Thal => "thal",
        }
    }

    pub fn spec(self) -> &'static FieldSpec {
        // FIELD_SPECS is declared in FieldKey::ALL order.
        &FIELD_SPECS[self as usize]
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labeled code of an enumerated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub code: u8,
    pub label: &'static str,
}

impl Choice {
    pub fn code_str(&self) -> String {
        self.code.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Free-form numeric text, range-checked on submit.
    Numeric { min: f64, max: f64 },
    /// Restricted to the listed codes, in display order.
    Enumerated { choices: &'static [Choice] },
}

impl FieldKind {
    /// Inclusive range accepted on submit. Enumerated kinds span their first
    /// and last code.
    pub fn range(&self) -> (f64, f64) {
        match self {
            FieldKind::Numeric { min, max } => (*min, *max),
            FieldKind::Enumerated { choices } => {
                let min = choices.first().map(|c| f64::from(c.code)).unwrap_or(0.0);
                let max = choices.last().map(|c| f64::from(c.code)).unwrap_or(0.0);
                (min, max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub label: &'static str,
    pub help: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn range(&self) -> (f64, f64) {
        self.kind.range()
    }

    pub fn placeholder(&self) -> String {
        let label = self.label.to_lowercase();
        match self.kind {
            FieldKind::Numeric { .. } => format!("Enter {label}"),
            FieldKind::Enumerated { .. } => format!("Select {label}"),
        }
    }

    /// Label of the choice whose code matches `raw`, if this is an
    /// enumerated field and `raw` names one of its codes.
    pub fn choice_label(&self, raw: &str) -> Option<&'static str> {
        let FieldKind::Enumerated { choices } = self.kind else {
            return None;
        };
        let raw = raw.trim();
        choices
            .iter()
            .find(|choice| choice.code_str() == raw)
            .map(|choice| choice.label)
    }

    /// Parses raw input and checks it against the declared inclusive range.
    /// Enumerated fields must also hit one of their declared codes.
    pub fn parse(&self, raw: &str) -> Result<f64, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { label: self.label });
        }

        let value = match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                return Err(ValidationError::NotANumber {
                    label: self.label,
                    raw: trimmed.to_string(),
                })
            }
        };

        let (min, max) = self.range();
        if !(min..=max).contains(&value) {
            return Err(ValidationError::OutOfRange {
                label: self.label,
                min,
                max,
                value,
            });
        }

        if let FieldKind::Enumerated { choices } = self.kind {
            if !choices.iter().any(|choice| f64::from(choice.code) == value) {
                let allowed = choices
                    .iter()
                    .map(Choice::code_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ValidationError::NotAChoice {
                    label: self.label,
                    allowed,
                    value,
                });
            }
        }

        Ok(value)
    }
}

const SEX_CHOICES: &[Choice] = &[
    Choice { code: 0, label: "Female" },
    Choice { code: 1, label: "Male" },
];

const CHEST_PAIN_CHOICES: &[Choice] = &[
    Choice { code: 0, label: "Typical Angina" },
    Choice { code: 1, label: "Atypical Angina" },
    Choice { code: 2, label: "Non-anginal Pain" },
    Choice { code: 3, label: "Asymptomatic" },
];

const FASTING_BLOOD_SUGAR_CHOICES: &[Choice] = &[
    Choice { code: 0, label: "≤ 120 mg/dl" },
    Choice { code: 1, label: "> 120 mg/dl" },
];

const RESTING_ECG_CHOICES: &[Choice] = &[
    Choice { code: 0, label: "Normal" },
    Choice { code: 1, label: "ST-T Wave Abnormality" },
    Choice { code: 2, label: "Left Ventricular Hypertrophy" },
];

const YES_NO_CHOICES: &[Choice] = &[
    Choice { code: 0, label: "No" },
    Choice { code: 1, label: "Yes" },
];

const ST_DEPRESSION_CHOICES: &[Choice] = &[
    Choice { code: 0, label: "0" },
    Choice { code: 1, label: "1" },
    Choice { code: 2, label: "2" },
    Choice { code: 3, label: "3" },
    Choice { code: 4, label: "4" },
    Choice { code: 5, label: "5" },
];

const ST_SLOPE_CHOICES: &[Choice] = &[
    Choice { code: 0, label: "Upsloping" },
    Choice { code: 1, label: "Flat" },
    Choice { code: 2, label: "Downsloping" },
];

const MAJOR_VESSEL_CHOICES: &[Choice] = &[
    Choice { code: 0, label: "0" },
    Choice { code: 1, label: "1" },
    Choice { code: 2, label: "2" },
    Choice { code: 3, label: "3" },
];

const THALASSEMIA_CHOICES: &[Choice] = &[
    Choice { code: 0, label: "Normal" },
    Choice { code: 1, label: "Fixed Defect" },
    Choice { code: 2, label: "Reversible Defect" },
    Choice { code: 3, label: "Unknown" },
];

pub static FIELD_SPECS: [FieldSpec; 13] = [
    FieldSpec {
        key: FieldKey::Age,
        label: "Age",
        help: "Years",
        kind: FieldKind::Numeric { min: 18.0, max: 100.0 },
    },
    FieldSpec {
        key: FieldKey::Sex,
        label: "Sex",
        help: "0 = Female, 1 = Male",
        kind: FieldKind::Enumerated { choices: SEX_CHOICES },
    },
    FieldSpec {
        key: FieldKey::Cp,
        label: "Chest Pain Type",
        help: "0 = Typical angina, 1 = Atypical angina, 2 = Non-anginal pain, 3 = Asymptomatic",
        kind: FieldKind::Enumerated {
            choices: CHEST_PAIN_CHOICES,
        },
    },
    FieldSpec {
        key: FieldKey::Trestbps,
        label: "Resting Blood Pressure",
        help: "mm Hg",
        kind: FieldKind::Numeric { min: 90.0, max: 200.0 },
    },
    FieldSpec {
        key: FieldKey::Chol,
        label: "Cholesterol",
        help: "mg/dl",
        kind: FieldKind::Numeric {
            min: 120.0,
            max: 570.0,
        },
    },
    FieldSpec {
        key: FieldKey::Fbs,
        label: "Fasting Blood Sugar",
        help: "0 = ≤ 120 mg/dl, 1 = > 120 mg/dl",
        kind: FieldKind::Enumerated {
            choices: FASTING_BLOOD_SUGAR_CHOICES,
        },
    },
    FieldSpec {
        key: FieldKey::Restecg,
        label: "Resting ECG",
        help: "0 = Normal, 1 = ST-T wave abnormality, 2 = Left ventricular hypertrophy",
        kind: FieldKind::Enumerated {
            choices: RESTING_ECG_CHOICES,
        },
    },
    FieldSpec {
        key: FieldKey::Thalach,
        label: "Max Heart Rate",
        help: "Beats per minute",
        kind: FieldKind::Numeric { min: 60.0, max: 220.0 },
    },
    FieldSpec {
        key: FieldKey::Exang,
        label: "Exercise Induced Angina",
        help: "0 = No, 1 = Yes",
        kind: FieldKind::Enumerated {
            choices: YES_NO_CHOICES,
        },
    },
    FieldSpec {
        key: FieldKey::Oldpeak,
        label: "ST Depression",
        help: "Induced by exercise relative to rest",
        kind: FieldKind::Enumerated {
            choices: ST_DEPRESSION_CHOICES,
        },
    },
    FieldSpec {
        key: FieldKey::Slope,
        label: "ST Slope",
        help: "0 = Upsloping, 1 = Flat, 2 = Downsloping",
        kind: FieldKind::Enumerated {
            choices: ST_SLOPE_CHOICES,
        },
    },
    FieldSpec {
        key: FieldKey::Ca,
        label: "Number of Major Vessels",
        help: "Colored by fluoroscopy (0-3)",
        kind: FieldKind::Enumerated {
            choices: MAJOR_VESSEL_CHOICES,
        },
    },
    FieldSpec {
        key: FieldKey::Thal,
        label: "Thalassemia",
        help: "0 = Normal, 1 = Fixed defect, 2 = Reversible defect, 3 = Not available",
        kind: FieldKind::Enumerated {
            choices: THALASSEMIA_CHOICES,
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_follow_key_order() {
        for (index, key) in FieldKey::ALL.into_iter().enumerate() {
            assert_eq!(FIELD_SPECS[index].key, key);
            assert_eq!(key.spec().key, key);
        }
    }

    #[test]
    fn declared_ranges_match_schema_table() {
        let expected = [
            (FieldKey::Age, 18.0, 100.0),
            (FieldKey::Sex, 0.0, 1.0),
            (FieldKey::Cp, 0.0, 3.0),
            (FieldKey::Trestbps, 90.0, 200.0),
            (FieldKey::Chol, 120.0, 570.0),
            (FieldKey::Fbs, 0.0, 1.0),
            (FieldKey::Restecg, 0.0, 2.0),
            (FieldKey::Thalach, 60.0, 220.0),
            (FieldKey::Exang, 0.0, 1.0),
            (FieldKey::Oldpeak, 0.0, 5.0),
            (FieldKey::Slope, 0.0, 2.0),
            (FieldKey::Ca, 0.0, 3.0),
            (FieldKey::Thal, 0.0, 3.0),
        ];
        for (key, min, max) in expected {
            assert_eq!(key.spec().range(), (min, max), "range of {key}");
        }
    }

    #[test]
    fn boundaries_are_inclusive_for_every_field() {
        for spec in &FIELD_SPECS {
            let (min, max) = spec.range();
            assert_eq!(spec.parse(&min.to_string()), Ok(min), "{} at min", spec.key);
            assert_eq!(spec.parse(&max.to_string()), Ok(max), "{} at max", spec.key);
            assert!(
                matches!(
                    spec.parse(&(min - 1.0).to_string()),
                    Err(ValidationError::OutOfRange { .. })
                ),
                "{} below min",
                spec.key
            );
            assert!(
                matches!(
                    spec.parse(&(max + 1.0).to_string()),
                    Err(ValidationError::OutOfRange { .. })
                ),
                "{} above max",
                spec.key
            );
        }
    }

    #[test]
    fn rejects_empty_and_non_numeric_input() {
        let spec = FieldKey::Chol.spec();
        assert_eq!(
            spec.parse("   "),
            Err(ValidationError::Required {
                label: "Cholesterol"
            })
        );
        assert!(matches!(
            spec.parse("two hundred"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            spec.parse("NaN"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            spec.parse("inf"),
            Err(ValidationError::NotANumber { .. })
        ));
    }

    #[test]
    fn trims_surrounding_whitespace_before_parsing() {
        assert_eq!(FieldKey::Age.spec().parse(" 54 "), Ok(54.0));
    }

    #[test]
    fn placeholder_depends_on_kind() {
        assert_eq!(FieldKey::Age.spec().placeholder(), "Enter age");
        assert_eq!(
            FieldKey::Cp.spec().placeholder(),
            "Select chest pain type"
        );
    }

    #[test]
    fn resolves_choice_labels_for_enumerated_fields_only() {
        assert_eq!(FieldKey::Thal.spec().choice_label("2"), Some("Reversible Defect"));
        assert_eq!(FieldKey::Thal.spec().choice_label("9"), None);
        assert_eq!(FieldKey::Age.spec().choice_label("40"), None);
    }

    #[test]
    fn enumerated_fields_reject_undeclared_codes_inside_the_range() {
        assert_eq!(
            FieldKey::Sex.spec().parse("0.5"),
            Err(ValidationError::NotAChoice {
                label: "Sex",
                allowed: "0, 1".to_string(),
                value: 0.5,
            })
        );
        assert!(matches!(
            FieldKey::Cp.spec().parse("2.7"),
            Err(ValidationError::NotAChoice { .. })
        ));
        assert_eq!(FieldKey::Cp.spec().parse("2.0"), Ok(2.0));
        assert_eq!(FieldKey::Oldpeak.spec().parse("3"), Ok(3.0));
    }

    #[test]
    fn numeric_fields_accept_fractions_inside_the_range() {
        assert_eq!(FieldKey::Chol.spec().parse("210.5"), Ok(210.5));
    }
}
