use super::*;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use shared::{domain::FieldKey, protocol::PredictedClass};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct RecordedRequest {
    content_type: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct MockServiceState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn handle_predict(
    State(state): State<MockServiceState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_str(&body).unwrap_or(Value::Null);
    state
        .requests
        .lock()
        .await
        .push(RecordedRequest { content_type, body });
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

async fn spawn_prediction_service(
    status: StatusCode,
    body: impl Into<String>,
) -> anyhow::Result<(String, Arc<Mutex<Vec<RecordedRequest>>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockServiceState {
        status,
        body: body.into(),
        requests: Arc::clone(&requests),
    };
    let app = Router::new()
        .route("/api/predict", post(handle_predict))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), requests))
}

fn client_for(base_url: &str) -> HttpPredictionClient {
    HttpPredictionClient::new(&ClientSettings {
        api_base_url: base_url.to_string(),
        request_timeout_secs: Some(5),
    })
    .expect("client")
}

fn filled_controller() -> FormController {
    let mut controller = FormController::new();
    for (key, raw) in [
        (FieldKey::Age, "52"),
        (FieldKey::Sex, "0"),
        (FieldKey::Cp, "2"),
        (FieldKey::Trestbps, "128"),
        (FieldKey::Chol, "204.5"),
        (FieldKey::Fbs, "0"),
        (FieldKey::Restecg, "1"),
        (FieldKey::Thalach, "156"),
        (FieldKey::Exang, "1"),
        (FieldKey::Oldpeak, "1"),
        (FieldKey::Slope, "1"),
        (FieldKey::Ca, "0"),
        (FieldKey::Thal, "3"),
    ] {
        controller.set_value(key, raw);
    }
    controller
}

const HIGH_RISK_BODY: &str = r#"{"prediction":1,"probability":{"positive":0.82,"negative":0.18}}"#;

#[tokio::test]
async fn posts_thirteen_numeric_fields_as_json() {
    let (base_url, requests) = spawn_prediction_service(StatusCode::OK, HIGH_RISK_BODY)
        .await
        .expect("spawn service");
    let client = client_for(&base_url);
    let mut controller = filled_controller();

    assert_eq!(controller.submit(&client).await, SubmitOutcome::Completed);

    let requests = requests.lock().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.content_type.as_deref(), Some("application/json"));

    let object = request.body.as_object().expect("json object body");
    assert_eq!(object.len(), 13);
    for key in FieldKey::ALL {
        let sent = object
            .get(key.as_str())
            .and_then(Value::as_f64)
            .unwrap_or_else(|| panic!("{key} missing or not a number"));
        let typed: f64 = controller.value(key).parse().expect("numeric fixture");
        assert_eq!(sent, typed, "{key}");
    }
}

#[tokio::test]
async fn ok_response_yields_result_state() {
    let (base_url, _) = spawn_prediction_service(StatusCode::OK, HIGH_RISK_BODY)
        .await
        .expect("spawn service");
    let mut controller = filled_controller();
    controller.submit(&client_for(&base_url)).await;

    let UiState::Result(result) = controller.state() else {
        panic!("expected result, got {:?}", controller.state());
    };
    assert_eq!(result.predicted_class, PredictedClass::Present);
    assert_eq!(result.risk_percentage_label(), "82.0%");
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let (base_url, _) = spawn_prediction_service(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "model unavailable" }).to_string(),
    )
    .await
    .expect("spawn service");
    let mut controller = filled_controller();
    controller.submit(&client_for(&base_url)).await;

    assert_eq!(
        controller.state(),
        &UiState::Error("model unavailable".to_string())
    );
}

#[tokio::test]
async fn error_status_without_message_uses_fallback() {
    let (base_url, _) = spawn_prediction_service(StatusCode::BAD_GATEWAY, "upstream down")
        .await
        .expect("spawn service");
    let err = client_for(&base_url)
        .predict(&filled_controller().form().validate().expect("valid"))
        .await
        .expect_err("should fail");

    assert!(matches!(
        err,
        PredictionError::Status {
            status: 502,
            message: None
        }
    ));
    assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
}

#[tokio::test]
async fn malformed_success_body_is_an_error_not_a_panic() {
    let (base_url, _) = spawn_prediction_service(StatusCode::OK, r#"{"prediction":"yes"}"#)
        .await
        .expect("spawn service");
    let mut controller = filled_controller();
    controller.submit(&client_for(&base_url)).await;

    assert_eq!(
        controller.state(),
        &UiState::Error(MALFORMED_RESPONSE_MESSAGE.to_string())
    );
}

#[tokio::test]
async fn success_false_is_reported_as_error() {
    let (base_url, _) = spawn_prediction_service(
        StatusCode::OK,
        json!({ "success": false, "error": "invalid feature vector" }).to_string(),
    )
    .await
    .expect("spawn service");
    let mut controller = filled_controller();
    controller.submit(&client_for(&base_url)).await;

    assert_eq!(
        controller.state(),
        &UiState::Error("invalid feature vector".to_string())
    );
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client_for(&format!("http://{addr}"))
        .predict(&filled_controller().form().validate().expect("valid"))
        .await
        .expect_err("should fail");

    assert!(matches!(err, PredictionError::Transport(_)));
    assert_eq!(err.user_message(), FALLBACK_ERROR_MESSAGE);
}

#[tokio::test]
async fn invalid_form_sends_nothing() {
    let (base_url, requests) = spawn_prediction_service(StatusCode::OK, HIGH_RISK_BODY)
        .await
        .expect("spawn service");
    let mut controller = filled_controller();
    controller.set_value(FieldKey::Thalach, "59");

    assert_eq!(
        controller.submit(&client_for(&base_url)).await,
        SubmitOutcome::Rejected
    );
    assert!(requests.lock().await.is_empty());
}

#[test]
fn endpoint_is_derived_from_base_url() {
    let client = client_for("http://127.0.0.1:5000");
    assert_eq!(client.endpoint().as_str(), "http://127.0.0.1:5000/api/predict");
}
