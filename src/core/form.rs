use crate::core::debounce::Debouncer;
use crate::core::fetch::{FetchState, Fetcher};
use crate::domain::model::{Company, FormData, FormField, InvoiceRecord};
use crate::domain::ports::{ConfigProvider, HttpClient, SubmissionSink};
use crate::utils::error::{FormError, Result};
use crate::utils::validation::validate_form;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;

pub const TAX_MULTIPLIER: f64 = 1.23;

/// 含稅總價，固定兩位小數
pub fn gross_price(unit_price: f64, quantity: f64) -> String {
    format!("{:.2}", unit_price * TAX_MULTIPLIER * quantity)
}

/// 公司目錄查詢網址：`<endpoint>?tax_id=<tax_id>`
pub fn lookup_url(endpoint: &Url, tax_id: &str) -> String {
    let mut url = endpoint.clone();
    url.query_pairs_mut().append_pair("tax_id", tax_id);
    url.to_string()
}

/// 每次 render 後的畫面狀態
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormView {
    pub data: FormData,
    pub price_gross: String,
    pub is_loading: bool,
    pub error: String,
    pub autofilled: bool,
    pub notice: Option<String>,
}

impl FormView {
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for field in FormField::ALL {
            let value = match field {
                FormField::TaxId => self.data.tax_id.clone(),
                FormField::CompanyName => self.data.company_name.clone(),
                FormField::City => self.data.city.clone(),
                FormField::Street => self.data.street.clone(),
                FormField::UnitPrice => self.data.unit_price.to_string(),
                FormField::Quantity => self.data.quantity.to_string(),
            };
            let _ = writeln!(out, "{:>13}: {}", field.name(), value);
        }
        let _ = write!(out, "  Price gross: {}$", self.price_gross);
        out
    }
}

pub struct FormController<S: SubmissionSink> {
    data: FormData,
    lookup_endpoint: Url,
    debouncer: Debouncer<String>,
    fed_tax_id: String,
    fetcher: Fetcher<Vec<Company>, String>,
    applied_revision: u64,
    sink: S,
}

impl<S: SubmissionSink> FormController<S> {
    pub fn new<C: ConfigProvider>(config: &C, client: Arc<dyn HttpClient>, sink: S) -> Result<Self> {
        let lookup_endpoint = Url::parse(config.lookup_endpoint())?;

        Ok(Self {
            data: FormData::default(),
            lookup_endpoint,
            debouncer: Debouncer::new(String::new(), config.debounce_delay()),
            fed_tax_id: String::new(),
            fetcher: Fetcher::new(client).with_order(config.response_order()),
            applied_revision: 0,
            sink,
        })
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn price_gross(&self) -> String {
        gross_price(self.data.unit_price, self.data.quantity)
    }

    pub fn lookup_url(&self, tax_id: &str) -> String {
        lookup_url(&self.lookup_endpoint, tax_id)
    }

    pub fn handle_change(&mut self, field: FormField, raw: &str) -> Result<()> {
        match field {
            FormField::TaxId => self.data.tax_id = raw.to_string(),
            FormField::CompanyName => self.data.company_name = raw.to_string(),
            FormField::City => self.data.city = raw.to_string(),
            FormField::Street => self.data.street = raw.to_string(),
            FormField::UnitPrice => self.data.unit_price = parse_number(field, raw)?,
            FormField::Quantity => self.data.quantity = parse_number(field, raw)?,
        }
        Ok(())
    }

    /// 比對狀態差異並觸發對應的副作用，回傳目前畫面
    pub fn render(&mut self) -> FormView {
        self.feed_debouncer();

        let debounced = self.debouncer.current();
        let url = self.lookup_url(&debounced);
        let has_tax_id = !debounced.is_empty();
        if self.fetcher.sync(url, debounced, || has_tax_id).is_some() {
            tracing::debug!("Company lookup started");
        }

        let state = self.fetcher.state();
        let autofilled = self.apply_lookup(&state);
        if autofilled {
            // 自動填入可能改了 tax_id，要立刻排程下一次查詢
            self.feed_debouncer();
        }

        FormView {
            data: self.data.clone(),
            price_gross: self.price_gross(),
            is_loading: state.is_loading,
            error: state.error,
            autofilled,
            notice: None,
        }
    }

    fn feed_debouncer(&mut self) {
        if self.data.tax_id != self.fed_tax_id {
            self.fed_tax_id = self.data.tax_id.clone();
            self.debouncer.set(self.fed_tax_id.clone());
        }
    }

    fn apply_lookup(&mut self, state: &FetchState<Vec<Company>>) -> bool {
        if state.revision == self.applied_revision {
            return false;
        }
        self.applied_revision = state.revision;

        match state.data.as_deref() {
            Some([company]) => {
                tracing::info!("✨ Autofilling form with {}", company.company_name);
                self.data.tax_id = company.tax_id.clone();
                self.data.company_name = company.company_name.clone();
                self.data.city = company.city.clone();
                self.data.street = company.street.clone();
                true
            }
            Some(companies) => {
                tracing::debug!("Lookup returned {} companies, not autofilling", companies.len());
                false
            }
            None => false,
        }
    }

    pub async fn submit(&mut self) -> Result<InvoiceRecord> {
        validate_form(&self.data)?;

        let record = InvoiceRecord::new(self.data.clone(), self.price_gross());
        self.sink.submit(&record).await?;
        tracing::info!(
            "✅ Invoice submitted for {} (gross {})",
            record.company_name,
            record.price_gross
        );

        self.data = FormData::default();
        Ok(record)
    }

    pub fn subscribe_debounced(&self) -> watch::Receiver<String> {
        self.debouncer.subscribe()
    }

    pub fn subscribe_fetch(&self) -> watch::Receiver<FetchState<Vec<Company>>> {
        self.fetcher.subscribe()
    }
}

fn parse_number(field: FormField, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| FormError::validation(field.name(), "Please enter a number"))
}
