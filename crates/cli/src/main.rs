use anyhow::Context;
use clap::Parser;
use dailybrief_core::domain::report::DailyReport;
use dailybrief_core::domain::snapshot::BusinessSnapshot;
use dailybrief_core::llm::error::NarrativeServiceError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "dailybrief")]
struct Args {
    /// Today's revenue.
    #[arg(long)]
    today_revenue: f64,

    /// Today's total cost.
    #[arg(long)]
    today_cost: f64,

    /// Customers acquired today.
    #[arg(long)]
    today_customers: u64,

    /// Yesterday's revenue.
    #[arg(long)]
    yesterday_revenue: f64,

    /// Yesterday's total cost.
    #[arg(long)]
    yesterday_cost: f64,

    /// Customers acquired yesterday.
    #[arg(long)]
    yesterday_customers: u64,

    /// Report date (YYYY-MM-DD). Defaults to today's UTC date.
    #[arg(long)]
    as_of_date: Option<String>,

    /// Print the report as a single JSON record.
    #[arg(long)]
    json: bool,

    /// Compute metrics and alerts only; skip the narrative request.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = dailybrief_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let as_of_date = resolve_as_of_date(args.as_of_date.as_deref())?;
    let snapshot = BusinessSnapshot {
        today_revenue: args.today_revenue,
        today_cost: args.today_cost,
        today_customers: args.today_customers,
        yesterday_revenue: args.yesterday_revenue,
        yesterday_cost: args.yesterday_cost,
        yesterday_customers: args.yesterday_customers,
    };

    if args.dry_run {
        let derived = dailybrief_core::metrics::compute(&snapshot);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&derived)?);
        } else {
            println!("Dry run for {as_of_date} (no narrative requested)");
            println!();
            println!("{}", dailybrief_core::llm::prompt::render_summary(&derived));
        }
        return Ok(());
    }

    // Credential is checked here, before any pipeline work.
    let client = dailybrief_core::llm::anthropic::AnthropicClient::from_settings(&settings)?;

    match dailybrief_core::pipeline::run(&client, as_of_date, snapshot).await {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            if let Some(svc) = err.downcast_ref::<NarrativeServiceError>() {
                tracing::error!(%as_of_date, error = %svc, "narrative generation failed");
                if let Some(raw) = svc.raw_output.as_deref() {
                    tracing::debug!(raw, "raw service response");
                }
            } else {
                tracing::error!(%as_of_date, error = %err, "daily report failed");
            }
            Err(err)
        }
    }
}

fn print_report(report: &DailyReport) {
    println!("Daily brief for {}", report.as_of_date);
    println!();
    println!(
        "{}",
        dailybrief_core::llm::prompt::render_summary(&report.metrics)
    );
    println!();
    println!("Recommendations:");
    println!("{}", report.recommendations);
}

fn init_sentry(settings: &dailybrief_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn resolve_as_of_date(as_of_date_arg: Option<&str>) -> anyhow::Result<chrono::NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --as-of-date: {s}"));
    }

    Ok(chrono::Utc::now().date_naive())
}
