//! API tests against a real listener on an ephemeral port

use crate::support::TestPlatform;
use audit_intel::api::{ApiHandle, ApiServer, ApiState, ROOT_MESSAGE};
use audit_intel::storage::SharedStorage;
use audit_intel::Collector;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

struct TestApi {
    handle: ApiHandle,
    base: String,
    client: reqwest::Client,
}

impl TestApi {
    fn start(storage: SharedStorage, trigger: Arc<Notify>) -> Self {
        let state = ApiState::new(storage, trigger, vec!["Code4rena".to_string()]);
        let server = ApiServer::bind("127.0.0.1:0", state).expect("Failed to bind API");
        let handle = server.spawn(2).expect("Failed to start API");
        let addr = handle.local_addr().expect("API should listen on an IP address");

        Self {
            handle,
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .expect("GET failed");
        let status = response.status().as_u16();
        let body = response.text().await.expect("Failed to read body");
        (status, serde_json::from_str(&body).expect("Body is not JSON"))
    }

    async fn post(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .post(format!("{}{}", self.base, path))
            .send()
            .await
            .expect("POST failed");
        let status = response.status().as_u16();
        let body = response.text().await.expect("Failed to read body");
        (status, serde_json::from_str(&body).expect("Body is not JSON"))
    }
}

#[tokio::test]
async fn test_collected_report_round_trips_through_api() {
    let platform = TestPlatform::start().await;
    platform.mount_index(&[("vault", "Vault Protocol")]).await;
    platform.mount_contest("vault").await;
    platform.collector.collect(5).await.unwrap();

    let api = TestApi::start(platform.storage.clone(), Arc::new(Notify::new()));

    let (status, reports) = api.get("/reports").await;
    assert_eq!(status, 200);
    let id = reports[0]["id"].as_i64().expect("report id");

    let (status, report) = api.get(&format!("/reports/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(report["platform"], "Code4rena");
    assert_eq!(report["title"], "Vault Protocol");
    assert_eq!(
        report["url"],
        format!("{}/contests/vault", platform.server.uri())
    );
    assert_eq!(report["participants"], 1204);
    assert_eq!(report["findings"].as_array().unwrap().len(), 3);

    let (status, findings) = api.get(&format!("/findings?report_id={}&severity=high", id)).await;
    assert_eq!(status, 200);
    assert_eq!(findings.as_array().unwrap().len(), 1);
    assert_eq!(findings[0]["title"], "Reentrancy in withdraw");

    api.handle.shutdown();
}

#[tokio::test]
async fn test_api_errors() {
    let platform = TestPlatform::start().await;
    let api = TestApi::start(platform.storage.clone(), Arc::new(Notify::new()));

    let (status, body) = api.get("/").await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], ROOT_MESSAGE);

    let (status, body) = api.get("/reports/12345").await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"], "Report not found");

    let (status, _) = api.get("/reports?limit=101").await;
    assert_eq!(status, 422);

    let (status, body) = api.get("/does-not-exist").await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"], "Not Found");

    api.handle.shutdown();
}

#[tokio::test]
async fn test_collect_endpoint_wakes_scheduler() {
    let platform = TestPlatform::start().await;
    let trigger = Arc::new(Notify::new());
    let api = TestApi::start(platform.storage.clone(), Arc::clone(&trigger));

    let (status, body) = api.post("/collect?platform=Code4rena").await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Collection started for Code4rena");

    tokio::time::timeout(Duration::from_secs(1), trigger.notified())
        .await
        .expect("POST /collect should notify the scheduler");

    let (status, _) = api.post("/collect").await;
    assert_eq!(status, 422);

    let (status, _) = api.post("/collect?platform=Immunefi").await;
    assert_eq!(status, 404);

    // The collector itself was never invoked by the endpoint
    assert_eq!(platform.collector.platform(), "Code4rena");
    assert!(platform.server.received_requests().await.unwrap_or_default().is_empty());

    api.handle.shutdown();
}
