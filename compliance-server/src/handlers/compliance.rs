//! Compliance handlers

use axum::{extract::{State, rejection::JsonRejection}, Json};
use serde::Serialize;
use serde_json::Value;

use compliance_core::{
    evaluate_batch, evaluate_with_config, expand_messages, prioritize, summarize,
    BatchItem, CommunicationRecord, ComplianceStatus, ComplianceSummary,
    PrioritizedRecommendations, Verdict, Violation,
};

use crate::{AppState, AppError, AppResult};
use crate::middleware::auth::AdminContext;

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
    pub summary: ComplianceSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub status: ComplianceStatus,
    pub confidence_score: f64,
    pub violations: Vec<Violation>,
    pub recommendations: PrioritizedRecommendations,
}

/// Evaluate a single communication
pub async fn check(
    State(state): State<AppState>,
    admin: Option<AdminContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Verdict>> {
    let Json(body) = payload?;
    let record = CommunicationRecord::from_json(&body)?;
    let verdict = evaluate_with_config(&record, &state.engine);

    tracing::info!(
        status = %verdict.status,
        violations = verdict.violations.len(),
        severe = verdict.has_severe_violations(),
        requested_by = admin.as_ref().map(|a| a.username.as_str()).unwrap_or("anonymous"),
        "Compliance check"
    );

    Ok(Json(verdict))
}

/// Evaluate `{ "communications": [...] }`; one result per input, same order
pub async fn batch(
    State(state): State<AppState>,
    admin: Option<AdminContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<BatchResponse>> {
    let Json(mut body) = payload?;
    let communications = take_array(&mut body, "communications")?;

    tracing::info!(
        count = communications.len(),
        requested_by = admin.as_ref().map(|a| a.username.as_str()).unwrap_or("anonymous"),
        "Batch compliance check"
    );

    run_batch(&state, communications).await.map(Json)
}

/// Evaluate `{ "messages": [text...], "context": {...} }`: each message is the
/// content of a record built from the shared context
pub async fn batch_messages(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<BatchResponse>> {
    let Json(mut body) = payload?;
    let messages = take_array(&mut body, "messages")?;
    let context = body.get("context").cloned().unwrap_or(Value::Null);

    tracing::info!(count = messages.len(), "Message batch compliance check");

    let records = expand_messages(&messages, &context);
    run_batch(&state, records).await.map(Json)
}

/// Evaluate one communication and return severity-ordered remediation
pub async fn recommendations(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<RecommendationsResponse>> {
    let Json(body) = payload?;
    let record = CommunicationRecord::from_json(&body)?;
    let verdict = evaluate_with_config(&record, &state.engine);

    Ok(Json(RecommendationsResponse {
        status: verdict.status,
        confidence_score: verdict.confidence_score,
        recommendations: prioritize(&verdict),
        violations: verdict.violations,
    }))
}

async fn run_batch(state: &AppState, records: Vec<Value>) -> AppResult<BatchResponse> {
    let engine = state.engine.clone();

    // rayon fans out across cores; keep it off the async workers
    let results = tokio::task::spawn_blocking(move || evaluate_batch(&records, &engine)).await?;
    let summary = summarize(results.iter().map(|item| &item.verdict));

    Ok(BatchResponse { results, summary })
}

fn take_array(body: &mut Value, key: &str) -> AppResult<Vec<Value>> {
    if !body.is_object() {
        return Err(AppError::ValidationError("Request body must be a JSON object".to_string()));
    }
    match body.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(AppError::ValidationError(format!("`{}` must be an array", key))),
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::{Request, StatusCode, header}, Router};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::{config::Config, create_router, AppState};

    fn app() -> Router {
        create_router(AppState::new(Config::default()))
    }

    fn secured_app() -> Router {
        let config = Config {
            admin_user: Some("admin".to_string()),
            admin_password: Some("hunter2".to_string()),
            jwt_secret: "test-secret".to_string(),
            ..Config::default()
        };
        create_router(AppState::new(config))
    }

    fn compliant() -> serde_json::Value {
        json!({
            "consentObtained": true,
            "optOutAvailable": true,
            "timeSent": "14:30",
            "debtValidationNoticeGiven": true,
            "harassmentIndicatorsPresent": false,
            "thirdPartyDisclosure": false,
            "consumerProtectionMeasuresPresent": true,
            "unfairPracticesPresent": false,
            "content": "Please call us back."
        })
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<String>, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty)).unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    async fn post(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        send(app, "POST", uri, Some(body.to_string()), None).await
    }

    #[tokio::test]
    async fn test_health() {
        for uri in ["/health", "/api/health"] {
            let (status, body) = send(app(), "GET", uri, None, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "ok");
        }
    }

    #[tokio::test]
    async fn test_check_compliant() {
        let (status, body) = post(app(), "/compliance/check", compliant()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "compliant");
        assert_eq!(body["compliant"], true);
        assert_eq!(body["confidenceScore"], 1.0);
        assert_eq!(body["violations"], json!([]));
    }

    #[tokio::test]
    async fn test_check_non_compliant_is_still_ok() {
        let mut record = compliant();
        record["consentObtained"] = json!(false);

        let (status, body) = post(app(), "/compliance/check", record).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "non_compliant");
        assert_eq!(body["compliant"], false);
        assert_eq!(body["violations"][0]["regime"], "TCPA");
        assert_eq!(body["violations"][0]["ruleId"], "TCPA-001");
    }

    #[tokio::test]
    async fn test_check_late_requires_review() {
        let mut record = compliant();
        record["timeSent"] = json!("23:00");

        let (_, body) = post(app(), "/compliance/check", record).await;
        assert_eq!(body["status"], "requires_review");
        assert_eq!(body["violations"][0]["category"], "outside_calling_hours");
    }

    #[tokio::test]
    async fn test_check_unreadable_time_requires_review() {
        let mut record = compliant();
        record["timeSent"] = json!("11:30 PM");

        let (status, body) = post(app(), "/compliance/check", record).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "requires_review");
        assert_eq!(body["violations"][0]["ruleId"], "TCPA-003");
        assert!(body["violations"][0]["message"].as_str().unwrap().contains("unreadable time \"11:30 PM\""));

        let mut record = compliant();
        record["timeSent"] = json!(null);
        let (_, body) = post(app(), "/compliance/check", record).await;
        assert_eq!(body["status"], "compliant");
    }

    #[tokio::test]
    async fn test_check_rejects_non_object() {
        let (status, body) = post(app(), "/compliance/check", json!([1, 2, 3])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().contains("JSON object"));
    }

    #[tokio::test]
    async fn test_check_rejects_invalid_json() {
        let (status, _) = send(app(), "POST", "/compliance/check", Some("{not json".to_string()), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_isolates_bad_record() {
        let mut bad = compliant();
        bad["content"] = json!(42);
        let mut late = compliant();
        late["timeSent"] = json!("23:00");

        let (status, body) = post(
            app(),
            "/compliance/batch",
            json!({ "communications": [compliant(), bad, late] }),
        ).await;

        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["status"], "compliant");
        assert_eq!(results[1]["status"], "requires_review");
        assert!(results[1]["violations"][0]["message"].as_str().unwrap().contains("unparseable input"));
        assert_eq!(results[2]["status"], "requires_review");
        assert_eq!(results[2]["violations"][0]["ruleId"], "TCPA-003");
        assert_eq!(body["summary"]["totalCommunications"], 3);
        assert_eq!(body["summary"]["compliantCount"], 1);
    }

    #[tokio::test]
    async fn test_batch_requires_array() {
        let (status, _) = post(app(), "/compliance/batch", json!({ "communications": "nope" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post(app(), "/compliance/batch", json!([compliant()])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_messages() {
        let mut context = compliant();
        context.as_object_mut().unwrap().remove("content");

        let (status, body) = post(
            app(),
            "/compliance/batch-messages",
            json!({ "messages": ["Thanks for your payment.", "FINAL NOTICE: pay now"], "context": context }),
        ).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["communicationId"], "msg_1");
        assert_eq!(body["results"][0]["status"], "compliant");
        assert_eq!(body["results"][1]["status"], "non_compliant");
        assert_eq!(body["results"][1]["violations"][0]["ruleId"], "FDCPA-002");
    }

    #[tokio::test]
    async fn test_recommendations() {
        let mut record = compliant();
        record["unfairPracticesPresent"] = json!(true);
        record["optOutAvailable"] = json!(false);

        let (status, body) = post(app(), "/compliance/recommendations", record).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "non_compliant");
        assert_eq!(body["recommendations"]["criticalFixes"].as_array().unwrap().len(), 1);
        assert_eq!(body["recommendations"]["suggestedImprovements"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_login_disabled_without_credentials() {
        let (status, _) = post(app(), "/auth/login", json!({"username": "a", "password": "b"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_secured_routes_require_token() {
        let (status, _) = post(secured_app(), "/compliance/check", compliant()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = post(secured_app(), "/auth/login", json!({"username": "admin", "password": "wrong"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = post(secured_app(), "/auth/login", json!({"username": "", "password": ""})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, login) = post(secured_app(), "/auth/login", json!({"username": "admin", "password": "hunter2"})).await;
        assert_eq!(status, StatusCode::OK);
        let token = login["token"].as_str().unwrap().to_string();

        let (status, body) = send(
            secured_app(),
            "POST",
            "/compliance/check",
            Some(compliant().to_string()),
            Some(&token),
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "compliant");

        let (status, _) = send(secured_app(), "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_secured_rejects_forged_token() {
        let forged = crate::handlers::auth::create_token("admin", "other-secret", 1).unwrap();
        let (status, _) = send(
            secured_app(),
            "POST",
            "/compliance/check",
            Some(compliant().to_string()),
            Some(&forged),
        ).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
