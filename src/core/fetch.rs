//! Fetch primitive.
//!
//! `Fetcher::sync` is the explicit "dependencies changed" hook. When the dependency value
//! differs from the last one seen and the predicate holds, a request task is spawned. The
//! task writes its outcome into the shared `FetchState`. Errors never escape; they are
//! recorded as text in `FetchState::error`.

use crate::domain::ports::HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 多個請求重疊時，哪一個回應可以寫入狀態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrder {
    /// 最後完成的回應勝出，不論發出順序
    #[default]
    LastResolvedWins,
    /// 只接受最新一次發出的請求，較舊的回應直接丟棄
    LatestRequestWins,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    /// 成功後不會被清除
    pub error: String,
    /// `data` 被指派的次數
    pub revision: u64,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: String::new(),
            revision: 0,
        }
    }
}

enum Outcome<T> {
    Data(T),
    Status(u16),
    Failed(String),
}

pub struct Fetcher<T, D> {
    client: Arc<dyn HttpClient>,
    state: Arc<watch::Sender<FetchState<T>>>,
    order: ResponseOrder,
    latest_generation: Arc<AtomicU64>,
    last_dependencies: Option<D>,
}

impl<T, D> Fetcher<T, D>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
    D: PartialEq,
{
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            client,
            state: Arc::new(state),
            order: ResponseOrder::default(),
            latest_generation: Arc::new(AtomicU64::new(0)),
            last_dependencies: None,
        }
    }

    pub fn with_order(mut self, order: ResponseOrder) -> Self {
        self.order = order;
        self
    }

    /// 依賴值改變且 `should_fetch()` 為真時發出請求，回傳請求任務
    ///
    /// 第一次呼叫一律視為改變。依賴值相同時不會呼叫 `should_fetch`。
    pub fn sync<F>(
        &mut self,
        url: impl Into<String>,
        dependencies: D,
        should_fetch: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce() -> bool,
    {
        if self.last_dependencies.as_ref() == Some(&dependencies) {
            return None;
        }
        self.last_dependencies = Some(dependencies);

        if !should_fetch() {
            tracing::debug!("Dependencies changed but fetch predicate is false, skipping request");
            return None;
        }

        Some(self.request(url.into()))
    }

    fn request(&self, url: String) -> JoinHandle<()> {
        let generation = self.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| state.is_loading = true);

        let client = Arc::clone(&self.client);
        let state = Arc::clone(&self.state);
        let latest_generation = Arc::clone(&self.latest_generation);
        let order = self.order;

        tokio::spawn(async move {
            tracing::debug!("Fetching {} (request #{})", url, generation);
            let outcome = fetch_outcome::<T>(client.as_ref(), &url).await;

            if order == ResponseOrder::LatestRequestWins
                && latest_generation.load(Ordering::SeqCst) != generation
            {
                tracing::debug!("Discarding stale response for request #{}", generation);
                return;
            }

            state.send_modify(|state| {
                match outcome {
                    Outcome::Data(data) => {
                        state.data = Some(data);
                        state.revision += 1;
                    }
                    Outcome::Status(status) => state.error = status.to_string(),
                    Outcome::Failed(message) => state.error = message,
                }
                state.is_loading = false;
            });
        })
    }

    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }
}

async fn fetch_outcome<T: DeserializeOwned>(client: &dyn HttpClient, url: &str) -> Outcome<T> {
    let response = match client.get(url).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("❌ Request to {} failed: {}", url, e);
            return Outcome::Failed(e.to_string());
        }
    };

    tracing::debug!("Response status: {}", response.status);
    if !response.is_success() {
        return Outcome::Status(response.status);
    }

    match serde_json::from_slice::<T>(&response.body) {
        Ok(data) => Outcome::Data(data),
        Err(e) => {
            tracing::error!("❌ Could not parse response from {}: {}", url, e);
            Outcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Company;
    use crate::domain::ports::HttpResponse;
    use crate::utils::error::{FormError, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::Mutex;

    const ONE_COMPANY: &str =
        r#"[{"tax_id":"123","company_name":"Acme","city":"X","street":"1 Main"}]"#;

    enum Reply {
        Respond { status: u16, body: String, delay: Duration },
        Fail(String),
    }

    #[derive(Clone, Default)]
    struct StubClient {
        replies: Arc<Mutex<HashMap<String, Reply>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl StubClient {
        async fn respond(&self, url: &str, status: u16, body: &str, delay: Duration) {
            self.replies.lock().await.insert(
                url.to_string(),
                Reply::Respond {
                    status,
                    body: body.to_string(),
                    delay,
                },
            );
        }

        async fn fail(&self, url: &str, message: &str) {
            self.replies
                .lock()
                .await
                .insert(url.to_string(), Reply::Fail(message.to_string()));
        }

        async fn calls(&self) -> Vec<String> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl HttpClient for StubClient {
        async fn get(&self, url: &str) -> Result<HttpResponse> {
            self.calls.lock().await.push(url.to_string());
            let (status, body, delay) = match self.replies.lock().await.get(url) {
                Some(Reply::Respond {
                    status,
                    body,
                    delay,
                }) => (*status, body.clone(), *delay),
                Some(Reply::Fail(message)) => {
                    return Err(FormError::Io(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        message.clone(),
                    )))
                }
                None => (404, String::new(), Duration::ZERO),
            };
            tokio::time::sleep(delay).await;
            Ok(HttpResponse {
                status,
                body: body.into_bytes(),
            })
        }
    }

    fn fetcher(client: &StubClient) -> Fetcher<Vec<Company>, String> {
        Fetcher::new(Arc::new(client.clone()))
    }

    #[tokio::test]
    async fn test_success_sets_data_and_clears_loading() {
        let client = StubClient::default();
        client.respond("/c?tax_id=123", 200, ONE_COMPANY, Duration::ZERO).await;
        let mut fetcher = fetcher(&client);

        let handle = fetcher.sync("/c?tax_id=123", "123".to_string(), || true).unwrap();
        assert!(fetcher.state().is_loading);
        handle.await.unwrap();

        let state = fetcher.state();
        assert!(!state.is_loading);
        assert_eq!(state.error, "");
        assert_eq!(state.revision, 1);
        let data = state.data.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].company_name, "Acme");
        assert_eq!(data[0].street, "1 Main");
    }

    #[tokio::test]
    async fn test_false_predicate_issues_no_request() {
        let client = StubClient::default();
        let mut fetcher = fetcher(&client);

        for deps in ["", "a", "b"] {
            assert!(fetcher.sync("/c", deps.to_string(), || false).is_none());
        }

        assert!(client.calls().await.is_empty());
        assert_eq!(fetcher.state(), FetchState::default());
    }

    #[tokio::test]
    async fn test_unchanged_dependencies_skip_predicate() {
        let client = StubClient::default();
        client.respond("/c", 200, "[]", Duration::ZERO).await;
        let mut fetcher = fetcher(&client);

        fetcher.sync("/c", "123".to_string(), || true).unwrap().await.unwrap();
        let again = fetcher.sync("/c", "123".to_string(), || panic!("predicate re-evaluated"));

        assert!(again.is_none());
        assert_eq!(client.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_not_found_records_status_and_keeps_data() {
        let client = StubClient::default();
        client.respond("/c?tax_id=123", 200, ONE_COMPANY, Duration::ZERO).await;
        let mut fetcher = fetcher(&client);

        fetcher.sync("/c?tax_id=123", "123".to_string(), || true).unwrap().await.unwrap();
        fetcher.sync("/c?tax_id=999", "999".to_string(), || true).unwrap().await.unwrap();

        let state = fetcher.state();
        assert_eq!(state.error, "404");
        assert_eq!(state.data.unwrap()[0].tax_id, "123");
        assert_eq!(state.revision, 1);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_error_survives_later_success() {
        let client = StubClient::default();
        client.respond("/ok", 200, ONE_COMPANY, Duration::ZERO).await;
        let mut fetcher = fetcher(&client);

        fetcher.sync("/missing", "1".to_string(), || true).unwrap().await.unwrap();
        fetcher.sync("/ok", "2".to_string(), || true).unwrap().await.unwrap();

        let state = fetcher.state();
        assert_eq!(state.error, "404");
        assert!(state.data.is_some());
    }

    #[tokio::test]
    async fn test_transport_failure_records_message() {
        let client = StubClient::default();
        client.fail("/c", "connection reset").await;
        let mut fetcher = fetcher(&client);

        fetcher.sync("/c", "1".to_string(), || true).unwrap().await.unwrap();

        let state = fetcher.state();
        assert_eq!(state.error, "IO error: connection reset");
        assert!(state.data.is_none());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_parse_failure_records_message() {
        let client = StubClient::default();
        client.respond("/c", 200, r#"{"not":"an array"}"#, Duration::ZERO).await;
        let mut fetcher = fetcher(&client);

        fetcher.sync("/c", "1".to_string(), || true).unwrap().await.unwrap();

        let state = fetcher.state();
        assert!(state.error.contains("invalid type"), "got {}", state.error);
        assert!(state.data.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_resolved_response_wins_by_default() {
        let client = StubClient::default();
        client.respond("/slow", 200, ONE_COMPANY, Duration::from_millis(300)).await;
        client.respond("/fast", 200, "[]", Duration::from_millis(10)).await;
        let mut fetcher = fetcher(&client);

        let slow = fetcher.sync("/slow", "1".to_string(), || true).unwrap();
        let fast = fetcher.sync("/fast", "12".to_string(), || true).unwrap();
        fast.await.unwrap();
        slow.await.unwrap();

        // 較早發出但較晚完成的請求覆蓋了結果
        let state = fetcher.state();
        assert_eq!(state.data.unwrap().len(), 1);
        assert_eq!(state.revision, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_request_wins_discards_stale_response() {
        let client = StubClient::default();
        client.respond("/slow", 200, ONE_COMPANY, Duration::from_millis(300)).await;
        client.respond("/fast", 200, "[]", Duration::from_millis(10)).await;
        let mut fetcher = fetcher(&client).with_order(ResponseOrder::LatestRequestWins);

        let slow = fetcher.sync("/slow", "1".to_string(), || true).unwrap();
        let fast = fetcher.sync("/fast", "12".to_string(), || true).unwrap();
        fast.await.unwrap();
        slow.await.unwrap();

        let state = fetcher.state();
        assert!(state.data.unwrap().is_empty());
        assert_eq!(state.revision, 1);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_subscribers_see_loading_transition() {
        let client = StubClient::default();
        client.respond("/c", 200, "[]", Duration::ZERO).await;
        let mut fetcher = fetcher(&client);
        let mut rx = fetcher.subscribe();

        let handle = fetcher.sync("/c", "1".to_string(), || true).unwrap();
        assert!(rx.borrow_and_update().is_loading);

        handle.await.unwrap();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_loading);
    }
}
