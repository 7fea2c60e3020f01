use crate::core::fetch::ResponseOrder;
use crate::domain::model::InvoiceRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 原始 HTTP 回應；狀態碼判斷留給呼叫端
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, record: &InvoiceRecord) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn lookup_endpoint(&self) -> &str;
    fn debounce_delay(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn response_order(&self) -> ResponseOrder;
}
