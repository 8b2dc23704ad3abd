use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    load_settings, ClientSettings, FormController, HttpPredictionClient, SubmitOutcome, UiState,
};
use shared::{domain::FieldKey, protocol::PredictionResult};
use tracing_subscriber::EnvFilter;

/// Submit one patient's measurements to the heart disease prediction service.
#[derive(Parser, Debug)]
#[command(name = "heart-risk", version)]
struct Args {
    /// Age in years (18-100)
    #[arg(long)]
    age: Option<String>,
    /// 0 = female, 1 = male
    #[arg(long)]
    sex: Option<String>,
    /// Chest pain type (0-3)
    #[arg(long)]
    cp: Option<String>,
    /// Resting blood pressure in mm Hg (90-200)
    #[arg(long)]
    trestbps: Option<String>,
    /// Serum cholesterol in mg/dl (120-570)
    #[arg(long)]
    chol: Option<String>,
    /// Fasting blood sugar > 120 mg/dl (0/1)
    #[arg(long)]
    fbs: Option<String>,
    /// Resting ECG result (0-2)
    #[arg(long)]
    restecg: Option<String>,
    /// Maximum heart rate achieved (60-220)
    #[arg(long)]
    thalach: Option<String>,
    /// Exercise induced angina (0/1)
    #[arg(long)]
    exang: Option<String>,
    /// ST depression (0-5)
    #[arg(long)]
    oldpeak: Option<String>,
    /// ST slope (0-2)
    #[arg(long)]
    slope: Option<String>,
    /// Number of major vessels (0-3)
    #[arg(long)]
    ca: Option<String>,
    /// Thalassemia (0-3)
    #[arg(long)]
    thal: Option<String>,

    /// Prediction service base url; overrides predictor.toml and env.
    #[arg(long)]
    api_url: Option<String>,
    /// Request timeout in seconds, 0 disables it.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print the prediction as JSON.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn field_values(&self) -> [(FieldKey, Option<&str>); 13] {
        [
            (FieldKey::Age, self.age.as_deref()),
            (FieldKey::Sex, self.sex.as_deref()),
            (FieldKey::Cp, self.cp.as_deref()),
            (FieldKey::Trestbps, self.trestbps.as_deref()),
            (FieldKey::Chol, self.chol.as_deref()),
            (FieldKey::Fbs, self.fbs.as_deref()),
            (FieldKey::Restecg, self.restecg.as_deref()),
            (FieldKey::Thalach, self.thalach.as_deref()),
            (FieldKey::Exang, self.exang.as_deref()),
            (FieldKey::Oldpeak, self.oldpeak.as_deref()),
            (FieldKey::Slope, self.slope.as_deref()),
            (FieldKey::Ca, self.ca.as_deref()),
            (FieldKey::Thal, self.thal.as_deref()),
        ]
    }

    fn apply_overrides(&self, settings: &mut ClientSettings) {
        if let Some(url) = &self.api_url {
            settings.api_base_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.request_timeout_secs = (secs > 0).then_some(secs);
        }
    }
}

fn render_result(result: &PredictionResult) -> String {
    let mut out = format!(
        "{}\nRisk Level: {}",
        result.predicted_class.headline(),
        result.risk_percentage_label()
    );
    if let Some(timestamp) = &result.timestamp {
        out.push_str(&format!("\nTimestamp: {timestamp}"));
    }
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    args.apply_overrides(&mut settings);
    let client = HttpPredictionClient::new(&settings)?;

    let mut controller = FormController::new();
    for (key, raw) in args.field_values() {
        controller.set_value(key, raw.unwrap_or_default());
    }

    match controller.submit(&client).await {
        SubmitOutcome::Completed => {}
        SubmitOutcome::Rejected => {
            for (key, err) in controller.field_errors() {
                eprintln!("--{key}: {err}");
            }
            bail!(
                "{} invalid field(s); nothing was sent",
                controller.field_errors().len()
            );
        }
        SubmitOutcome::Busy => bail!("a prediction is already in flight"),
    }

    match controller.state() {
        UiState::Result(result) if args.json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        UiState::Result(result) => println!("{}", render_result(result)),
        UiState::Error(message) => bail!("{message}"),
        UiState::Idle | UiState::Loading => bail!("prediction did not complete"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::{PredictedClass, Probability};

    #[test]
    fn renders_headline_and_percentage() {
        let result = PredictionResult {
            predicted_class: PredictedClass::Present,
            probability: Probability {
                positive: 0.82,
                negative: 0.18,
            },
            success: Some(true),
            timestamp: None,
        };
        assert_eq!(render_result(&result), "High Risk Detected\nRisk Level: 82.0%");
    }

    #[test]
    fn cli_flags_override_loaded_settings() {
        let args = Args::parse_from([
            "heart-risk",
            "--age",
            "61",
            "--api-url",
            "http://10.0.0.5:5000",
            "--timeout-secs",
            "0",
        ]);
        let mut settings = ClientSettings::default();
        args.apply_overrides(&mut settings);

        assert_eq!(settings.api_base_url, "http://10.0.0.5:5000");
        assert_eq!(settings.request_timeout_secs, None);
        assert_eq!(args.field_values()[0], (FieldKey::Age, Some("61")));
        assert_eq!(args.field_values()[1], (FieldKey::Sex, None));
    }
}
