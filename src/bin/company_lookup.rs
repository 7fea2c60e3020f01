use clap::Parser;
use invoice_form::core::fetch::Fetcher;
use invoice_form::core::form::lookup_url;
use invoice_form::core::{Company, ConfigProvider};
use invoice_form::utils::{logger, validation::Validate};
use invoice_form::{CliArgs, ReqwestHttpClient};
use std::sync::Arc;
use url::Url;

#[derive(Parser)]
#[command(name = "company-lookup")]
#[command(about = "Look up companies in the directory by tax ID")]
struct Args {
    /// Tax ID to search for
    tax_id: String,

    #[command(flatten)]
    common: CliArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.common.verbose, args.common.log_json);

    let config = args.common.resolve()?;
    config.validate()?;

    let endpoint = Url::parse(config.lookup_endpoint())?;
    let url = lookup_url(&endpoint, &args.tax_id);

    let client = ReqwestHttpClient::new(config.request_timeout())?;
    let mut fetcher: Fetcher<Vec<Company>, String> = Fetcher::new(Arc::new(client));

    let tax_id = args.tax_id.clone();
    let Some(request) = fetcher.sync(url, args.tax_id, || !tax_id.is_empty()) else {
        anyhow::bail!("tax ID must not be empty");
    };
    request.await?;

    let state = fetcher.state();
    if !state.error.is_empty() {
        anyhow::bail!("lookup failed: {}", state.error);
    }

    let companies = state.data.unwrap_or_default();
    tracing::info!("🔍 {} matching companies", companies.len());
    for company in &companies {
        println!(
            "{}",
            serde_json::json!({
                "tax_id": company.tax_id,
                "company_name": company.company_name,
                "city": company.city,
                "street": company.street,
                "id": company.id,
                "createdAt": company.created_at,
            })
        );
    }

    Ok(())
}
