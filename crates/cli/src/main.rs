use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockdx_core::diagnosis::{self, DiagnoseError};
use stockdx_core::domain::symbol::SymbolQuery;
use stockdx_core::ingest::yahoo::YahooClient;
use stockdx_core::time::lookback::LookbackWindow;

mod report;

#[derive(Debug, Parser)]
#[command(name = "stockdx_cli")]
struct Args {
    /// Stock code (e.g. 2330, 5314) or an exchange-qualified symbol.
    #[arg(default_value = "2330")]
    code: String,

    /// Print the diagnosis as JSON instead of a text report.
    #[arg(long)]
    json: bool,

    /// Skip the trend verdict regardless of DIAGNOSIS_TREND_VERDICT.
    #[arg(long)]
    no_trend: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockdx_core::config::Settings::from_env()?;
    let sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let Some(query) = SymbolQuery::parse(&args.code) else {
        anyhow::bail!("stock code must not be blank");
    };

    let mut rules = settings.rules();
    if args.no_trend {
        rules.trend_verdict = false;
    }

    let display = settings.display_config()?;
    let provider = YahooClient::from_settings(&settings)?;

    match diagnosis::diagnose(&provider, &query, rules, LookbackWindow::default()).await {
        Ok(d) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&d)?);
            } else {
                print!("{}", report::text_report(&d));
                println!("{}", display.disclaimer);
            }
            Ok(())
        }
        Err(err) => {
            if let DiagnoseError::Unexpected(inner) = &err {
                sentry_anyhow::capture_anyhow(inner);
            }
            tracing::error!(code = %query.code(), error = %err, "diagnosis failed");
            eprintln!("{}", err.user_message());
            drop(sentry_guard);
            std::process::exit(1);
        }
    }
}

fn init_sentry(settings: &stockdx_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
