//! Integration tests for saathi-core
//!
//! These tests exercise the full gateway → normalize workflow against a mock
//! ML service, and the caller-orchestrated fallback path when the service is
//! down.

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::sync::oneshot;

use saathi_core::{
    fallback_anomaly_detection, Budget, Error, MlServiceClient, Severity, Transaction,
    TransactionType, Trend,
};

/// Mock ML service returning canned payloads in the real service's shape.
struct MockMlServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockMlServer {
    async fn start() -> Self {
        let app = Router::new()
            .route("/health", get(handle_health))
            .route("/anomalies", post(handle_anomalies))
            .route("/forecast", post(handle_forecast))
            .route("/adaptive-budget", post(handle_adaptive_budget))
            .route("/category-insights", post(handle_category_insights));
        Self::serve(app).await
    }

    /// A server whose analytics endpoints all fail with 503.
    async fn start_degraded() -> Self {
        let app = Router::new()
            .route("/health", get(handle_health))
            .route("/anomalies", post(handle_unavailable))
            .route("/forecast", post(handle_unavailable))
            .route("/adaptive-budget", post(handle_unavailable))
            .route("/category-insights", post(handle_unavailable));
        Self::serve(app).await
    }

    async fn serve(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockMlServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "saathi-ml-service" }))
}

async fn handle_unavailable() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "model unavailable")
}

async fn handle_anomalies(Json(request): Json<Value>) -> Json<Value> {
    // The gateway must project transactions down to the wire contract.
    let txns = request["transactions"].as_array().expect("transactions");
    assert!(txns.iter().all(|t| {
        t.get("amount").is_some()
            && t.get("category").is_some()
            && t.get("date").is_some()
            && t.get("merchant").is_some()
            && t.get("type").is_some()
    }));

    Json(json!({
        "model": "IsolationForest-v2 (scikit-learn)",
        "anomalies": [
            {
                "category": "Food",
                "currentSpend": 9000,
                "averageSpend": 3000,
                "standardDeviation": 800,
                "multiplier": 3.0,
                "zScore": 3.2,
                "severity": "critical",
                "message": "You spent 3x your usual Food budget this month"
            },
            {
                "category": "Transport",
                "currentSpend": 2400,
                "averageSpend": 1800,
                "multiplier": 1.3,
                "severity": "warning"
            },
            {
                "category": "Gifts",
                "currentSpend": 900,
                "averageSpend": 800,
                "multiplier": 1.1,
                "severity": "mild"
            }
        ],
        "largeTransactions": [
            {
                "amount": 60000,
                "category": "Electronics",
                "merchant": "Croma",
                "date": "2026-03-12 00:00:00",
                "message": "Unusually large expense"
            }
        ],
        "totalAnomalies": 3,
        "analysisWindow": "full transaction history"
    }))
}

async fn handle_forecast(Json(_request): Json<Value>) -> Json<Value> {
    Json(json!({
        "model": "Prophet-v2 (Meta time-series forecasting)",
        "currentMonth": { "totalSpentSoFar": 12000, "dayOfMonth": 15, "daysRemaining": 16, "dailyAverage": 800 },
        "projection": { "projected": 24800, "low": 21000, "high": 28000, "confidence": "85%" },
        "historicalAvg": 23000,
        "dailyForecast": [
            { "date": "2026-03-16", "day": 16, "amount": 800, "yhat": 820.4, "yhat_lower": 601.2, "yhat_upper": 1000.9, "isActual": false }
        ],
        "categoryForecasts": [
            { "category": "Food", "spentSoFar": 5000, "projectedTotal": 10000, "dailyRate": 333 }
        ],
        "budgetAlerts": [
            { "category": "Food", "budgetLimit": 8000, "projectedSpend": 10000, "willExceedBudget": true }
        ],
        "insight": "On track to spend more than usual."
    }))
}

async fn handle_adaptive_budget(Json(request): Json<Value>) -> Json<Value> {
    assert_eq!(request["incomeRange"], "FROM_50K_TO_1L");
    assert_eq!(request["monthlyIncome"], 50000.0);
    // The spending map must only cover the current calendar month.
    assert_eq!(request["currentSpending"]["Rent"], 12000.0);
    assert_eq!(request["currentSpending"]["Food"], 4000.0);
    assert!(request["currentSpending"].get("Electronics").is_none());

    Json(json!({
        "rule": "50/30/20 (Standard)",
        "isLowIncome": false,
        "monthlyIncome": 50000,
        "recommended": {
            "needs": { "percentage": 50, "amount": 25000 },
            "wants": { "percentage": 30, "amount": 15000 },
            "savings": { "percentage": 20, "amount": 10000 }
        },
        "actual": {
            "needs": { "amount": 12000, "percentage": 24.0 },
            "wants": { "amount": 4000, "percentage": 8.0 },
            "savings": { "amount": 0, "percentage": 0.0 },
            "other": { "amount": 0 }
        },
        "categoryAllocations": [
            { "category": "Rent", "currentSpend": 12000, "bucket": "Needs" },
            { "category": "Food", "currentSpend": 4000, "bucket": "Wants" }
        ],
        "insights": ["You're saving less than recommended."]
    }))
}

async fn handle_category_insights(Json(_request): Json<Value>) -> Json<Value> {
    Json(json!({
        "merchantInsights": [
            {
                "merchant": "Swiggy",
                "category": "Food",
                "totalSpent": 9000,
                "averageAmount": 450,
                "visitCount": 20,
                "frequency": "about every 2 days",
                "trend": "increasing"
            }
        ],
        "categoryPatterns": [
            { "category": "Food", "monthlyAverage": 2500, "trend": "increasing", "totalTransactions": 40 }
        ],
        "totalMerchantsAnalyzed": 1,
        "model": "PatternDetection-v1 (frequency + trend analysis)"
    }))
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn expense(amount: f64, category: &str, date: NaiveDate) -> Transaction {
    Transaction {
        amount,
        tx_type: TransactionType::Expense,
        category: category.to_string(),
        merchant: None,
        description: format!("{} spend", category),
        date,
    }
}

fn sample_history() -> Vec<Transaction> {
    vec![
        expense(12_000.0, "Rent", d(2026, 3, 1)),
        expense(4_000.0, "Food", d(2026, 3, 8)),
        // Previous month, must stay out of current-month windows.
        expense(9_000.0, "Electronics", d(2026, 2, 20)),
    ]
}

// =============================================================================
// Health check
// =============================================================================

#[tokio::test]
async fn test_health_check_against_live_service() {
    let server = MockMlServer::start().await;
    let client = MlServiceClient::new(&server.url());
    assert!(client.check_health().await);
}

#[tokio::test]
async fn test_health_check_against_dead_service() {
    let mut server = MockMlServer::start().await;
    let url = server.url();
    server.stop();
    // Give the graceful shutdown a moment to release the socket.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = MlServiceClient::new(&url);
    assert!(!client.check_health().await);
}

// =============================================================================
// Gateway → normalizer round trips
// =============================================================================

#[tokio::test]
async fn test_anomaly_detection_end_to_end() {
    let server = MockMlServer::start().await;
    let client = MlServiceClient::new(&server.url());

    let report = client.detect_anomalies(&sample_history()).await.unwrap();

    assert_eq!(report.total_anomalies, 4);
    // Remote vocabulary arrives mapped: critical → high, warning → medium,
    // anything else → low.
    assert_eq!(report.anomalies[0].severity, Severity::High);
    assert_eq!(report.anomalies[1].severity, Severity::Medium);
    assert_eq!(report.anomalies[2].severity, Severity::Low);
    // The large transaction keeps its merchant and day-precision date.
    let large = &report.anomalies[3];
    assert_eq!(large.severity, Severity::High);
    assert_eq!(large.merchant.as_deref(), Some("Croma"));
    assert_eq!(large.date, Some(d(2026, 3, 12)));
    assert_eq!(report.model, "IsolationForest-v2 (scikit-learn)");
}

#[tokio::test]
async fn test_forecast_end_to_end() {
    let server = MockMlServer::start().await;
    let client = MlServiceClient::new(&server.url());

    let budgets = vec![Budget {
        category: "Food".to_string(),
        limit: 8_000.0,
    }];
    let report = client.forecast(&sample_history(), &budgets).await.unwrap();

    assert_eq!(report.total_predicted, 24_800.0);
    assert_eq!(report.historical_avg, 23_000.0);

    let day = &report.daily_forecast[0];
    assert_eq!(day.date, d(2026, 3, 16));
    assert_eq!(day.predicted, 820.0);
    assert_eq!(day.lower, 601.0);
    assert_eq!(day.upper, 1_001.0);

    // Trend was absent upstream: derived from projection vs spend.
    assert_eq!(report.category_forecasts[0].trend, Trend::Up);

    // Overshoot was absent upstream: defaults to projected − limit.
    assert_eq!(report.budget_alerts[0].overshoot, 2_000.0);
}

#[tokio::test]
async fn test_adaptive_budget_end_to_end() {
    let server = MockMlServer::start().await;
    let client = MlServiceClient::new(&server.url());

    let report = client
        .adaptive_budget(&sample_history(), 50_000.0, None, d(2026, 3, 15))
        .await
        .unwrap();

    assert_eq!(report.rule, "50/30/20 (Standard)");
    assert_eq!(report.estimated_income, 50_000.0);
    assert_eq!(report.allocation.needs, 25_000.0);
    assert_eq!(report.allocation.wants, 15_000.0);
    assert_eq!(report.allocation.savings, 10_000.0);

    // Two distinct categories this month → bucket allocation split two ways.
    assert_eq!(report.category_budgets.len(), 2);
    let rent = report
        .category_budgets
        .iter()
        .find(|cb| cb.category == "Rent")
        .unwrap();
    assert_eq!(rent.budget, 12_500.0);
    let food = report
        .category_budgets
        .iter()
        .find(|cb| cb.category == "Food")
        .unwrap();
    assert_eq!(food.budget, 7_500.0);

    assert_eq!(report.tips.len(), 1);
}

#[tokio::test]
async fn test_category_insights_end_to_end() {
    let server = MockMlServer::start().await;
    let client = MlServiceClient::new(&server.url());

    let report = client.category_insights(&sample_history()).await.unwrap();

    assert_eq!(report.categories.len(), 1);
    let food = &report.categories[0];
    assert_eq!(food.category, "Food");
    assert_eq!(food.trend, Trend::Up);
    assert_eq!(food.total_spent, 15_000.0);
    assert_eq!(food.top_merchants[0].merchant, "Swiggy");
    assert!(food.saving_tip.is_some());
}

// =============================================================================
// Failure path: caller-orchestrated fallback
// =============================================================================

#[tokio::test]
async fn test_non_success_status_carries_body_verbatim() {
    let server = MockMlServer::start_degraded().await;
    let client = MlServiceClient::new(&server.url());

    let err = client.detect_anomalies(&sample_history()).await.unwrap_err();
    match err {
        Error::MlService { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "model unavailable");
        }
        other => panic!("expected MlService error, got: {}", other),
    }
}

#[tokio::test]
async fn test_caller_falls_back_when_service_degraded() {
    let server = MockMlServer::start_degraded().await;
    let client = MlServiceClient::new(&server.url());

    // Health says up, analytics say 503; the caller catches and degrades.
    assert!(client.check_health().await);

    let mut history: Vec<Transaction> = (1..=8)
        .map(|i| expense(100.0, "Food", d(2026, 3, i)))
        .collect();
    history.push(expense(5_000.0, "Food", d(2026, 3, 20)));

    let report = match client.detect_anomalies(&history).await {
        Ok(report) => report,
        Err(Error::MlService { .. }) | Err(Error::Http(_)) => fallback_anomaly_detection(&history),
    };

    assert_eq!(report.model, "Statistical fallback (mean + 2σ)");
    assert_eq!(report.total_anomalies, 1);
    assert_eq!(report.anomalies[0].amount, 5_000.0);
}
