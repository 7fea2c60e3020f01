use crate::core::{InvoiceRecord, SubmissionSink};
use crate::utils::error::{FormError, Result};
use async_trait::async_trait;
use std::io::Write;

/// 送出紀錄的去向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SinkKind {
    #[default]
    Stdout,
    Log,
}

pub fn build_sink(kind: SinkKind) -> Box<dyn SubmissionSink> {
    match kind {
        SinkKind::Stdout => Box::new(StdoutSink),
        SinkKind::Log => Box::new(LogSink),
    }
}

#[async_trait]
impl SubmissionSink for Box<dyn SubmissionSink> {
    async fn submit(&self, record: &InvoiceRecord) -> Result<()> {
        (**self).submit(record).await
    }
}

/// 將送出的紀錄以單行 JSON 印到 stdout
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

fn write_record<W: Write>(out: &mut W, record: &InvoiceRecord) -> Result<()> {
    let json = serde_json::to_string(record)?;
    writeln!(out, "{}", json)
        .and_then(|_| out.flush())
        .map_err(|e| FormError::Sink {
            message: e.to_string(),
        })
}

#[async_trait]
impl SubmissionSink for StdoutSink {
    async fn submit(&self, record: &InvoiceRecord) -> Result<()> {
        write_record(&mut std::io::stdout().lock(), record)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl SubmissionSink for LogSink {
    async fn submit(&self, record: &InvoiceRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        tracing::info!(invoice = %json, "📄 Invoice submitted");
        Ok(())
    }
}
