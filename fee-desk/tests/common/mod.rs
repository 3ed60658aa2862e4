#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use fee_desk::config::FeeApiSettings;
use fee_desk::services::{CollectionRules, FeeApiClient};
use fee_desk::startup::build_router;
use fee_desk::AppState;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STUDENT_ID: &str = "stu-1";
pub const OPERATOR_ID: &str = "u-7";
pub const OPERATOR_TOKEN: &str = "operator-token";
pub const SERVICE_TOKEN: &str = "service-token";

pub struct TestApp {
    pub fee_api: MockServer,
    pub router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(CollectionRules::default()).await
    }

    pub async fn spawn_with(rules: CollectionRules) -> Self {
        let fee_api = MockServer::start().await;

        let client = FeeApiClient::new(FeeApiSettings {
            base_url: fee_api.uri(),
            api_token: Some(Secret::new(SERVICE_TOKEN.to_string())),
            timeout_seconds: 5,
        });
        let state = AppState::new(Arc::new(client), rules, Duration::from_secs(60));

        TestApp {
            fee_api,
            router: build_router(state),
        }
    }

    /// Send a request as an operator with `role`; `None` sends no auth
    /// headers at all.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        role: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(role) = role {
            builder = builder
                .header("x-user-role", role)
                .header("x-user-id", OPERATOR_ID)
                .header("authorization", format!("Bearer {}", OPERATOR_TOKEN));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, body)
    }

    pub async fn get(&self, uri: &str, role: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, role, None).await
    }

    pub async fn post(&self, uri: &str, role: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, role, Some(body)).await
    }

    pub async fn mock_student_fees(&self, records: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/students/{}/fees", STUDENT_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": records,
            })))
            .mount(&self.fee_api)
            .await;
    }

    pub async fn mock_discounts(&self) {
        Mock::given(method("GET"))
            .and(path("/fee-discounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [
                    { "code": "MERIT10", "discountType": "percentage", "percentage": 10, "amount": null, "name": "Merit" },
                    { "code": "FLAT500", "discountType": "fixed", "percentage": null, "amount": 500, "name": "Sibling" }
                ],
            })))
            .mount(&self.fee_api)
            .await;
    }

    /// How many times the fee list of the test student was fetched.
    pub async fn fee_list_fetches(&self) -> usize {
        let fee_path = format!("/students/{}/fees", STUDENT_ID);
        self.fee_api
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.to_string() == "GET" && r.url.path() == fee_path)
            .count()
    }

    pub async fn collect_posts(&self) -> Vec<Value> {
        self.fee_api
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == "/fees/collect")
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}

/// Three fee records: one overdue and part paid, one undated and unpaid,
/// one settled.
pub fn fee_records() -> Value {
    json!([
        {
            "_id": "fee-1",
            "studentId": STUDENT_ID,
            "className": "Class 10",
            "courseName": "Physics",
            "batchName": "Morning",
            "totalFee": 1000,
            "paidAmount": 400,
            "pendingAmount": 600,
            "nextPaymentDueDate": "2000-01-01",
            "paymentHistory": [
                {
                    "_id": "pay-1",
                    "receiptNo": "R-001",
                    "paymentMode": "cash",
                    "paymentDate": "1999-12-01T00:00:00.000Z",
                    "amount": 400,
                    "discountAmount": 50,
                    "fine": 10
                }
            ]
        },
        {
            "_id": "fee-2",
            "studentId": STUDENT_ID,
            "courseName": "Chemistry",
            "totalFee": 500,
            "paidAmount": 0,
            "pendingAmount": 500,
            "nextPaymentDueDate": null,
            "paymentHistory": []
        },
        {
            "_id": "fee-3",
            "studentId": STUDENT_ID,
            "className": "Class 10",
            "courseName": "Maths",
            "batchName": "Evening",
            "totalFee": 300,
            "paidAmount": 300,
            "pendingAmount": 0,
            "nextPaymentDueDate": "2000-02-01"
        }
    ])
}
