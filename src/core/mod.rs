pub mod debounce;
pub mod fetch;
pub mod form;

pub use crate::domain::model::{Company, FormData, FormField, InvoiceRecord};
pub use crate::domain::ports::{ConfigProvider, HttpClient, HttpResponse, SubmissionSink};
pub use crate::utils::error::Result;
