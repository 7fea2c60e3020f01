use clap::Parser;
use invoice_form::core::form::FormView;
use invoice_form::core::ConfigProvider;
use invoice_form::utils::{logger, validation::Validate};
use invoice_form::adapters::sink::{build_sink, SinkKind};
use invoice_form::{parse_command, CliArgs, FormController, FormEvent, FormSession, ReqwestHttpClient};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

#[derive(Parser)]
#[command(name = "invoice-form")]
#[command(about = "Invoice entry form with company autocomplete by tax ID")]
struct Args {
    #[command(flatten)]
    common: CliArgs,

    /// Where submitted invoices are sent
    #[arg(long, value_enum, default_value_t = SinkKind::Stdout)]
    sink: SinkKind,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Args { common: args, sink } = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose, args.log_json);

    tracing::info!("Starting invoice-form");
    if args.verbose {
        tracing::debug!("CLI args: {:?}, sink: {:?}", args, sink);
    }

    // 載入並驗證配置
    let config = match args.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let client = ReqwestHttpClient::new(config.request_timeout())?;
    let controller = FormController::new(&config, Arc::new(client), build_sink(sink))?;
    let session = FormSession::new(controller);
    let view = session.subscribe();

    let (tx, rx) = mpsc::channel(32);
    let session_handle = tokio::spawn(session.run(rx));
    let printer_handle = tokio::spawn(print_views(view));

    println!("Enter <field>=<value>, submit, show or quit.");
    println!("Fields: tax_id, company_name, city, street, unit_price, quantity");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(event) => {
                let quit = event == FormEvent::Quit;
                if tx.send(event).await.is_err() || quit {
                    break;
                }
            }
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
            }
        }
    }

    drop(tx);
    session_handle.await?;
    printer_handle.await?;
    Ok(())
}

/// 只印出與上一個畫面不同的部分
async fn print_views(mut views: watch::Receiver<FormView>) {
    let mut previous = views.borrow_and_update().clone();

    while views.changed().await.is_ok() {
        let view = views.borrow_and_update().clone();

        if view.is_loading && !previous.is_loading {
            println!("⏳ Looking up company...");
        }
        if view.error != previous.error && !view.error.is_empty() {
            println!("⚠️  Can't autocomplete form: {}", view.error);
        }
        if view.autofilled {
            println!(
                "✨ Autofilled: {}, {}, {}",
                view.data.company_name, view.data.street, view.data.city
            );
        }
        if view.price_gross != previous.price_gross {
            println!("Price gross: {}$", view.price_gross);
        }
        if let Some(notice) = &view.notice {
            println!("{}", notice);
        }

        previous = view;
    }
}
