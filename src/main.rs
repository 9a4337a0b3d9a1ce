use anyhow::Context;
use chrono::{NaiveDate, Utc};
use tracing_subscriber::EnvFilter;

use petpal::config::AppConfig;
use petpal::errors::AppError;
use petpal::services::gateway::http::HttpBookingGateway;
use petpal::services::gateway::DateRange;
use petpal::services::store_bookings::StoreBookings;

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {s}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let store_id: i64 = args
        .first()
        .ok_or_else(|| AppError::Config("usage: petpal <store_id> [start] [end]".to_string()))?
        .parse()
        .context("store id must be a number")?;

    let today = Utc::now().date_naive();
    let default_range = DateRange::upcoming(today, config.full_dates_window_days);
    let start = args.get(1).map(|s| parse_date(s)).transpose()?.unwrap_or(default_range.start);
    let end = args.get(2).map(|s| parse_date(s)).transpose()?.unwrap_or(default_range.end);
    anyhow::ensure!(start <= end, "start date {start} is after end date {end}");

    let gateway = HttpBookingGateway::from_config(&config)?;
    tracing::info!(store_id, %start, %end, api = %config.api_url, "loading store availability");

    let snapshot = StoreBookings::load(&gateway, store_id, DateRange::new(start, end)).await;
    let view = snapshot.view();

    for date in snapshot.range().dates() {
        let key = date.format("%Y-%m-%d").to_string();
        let schedule = snapshot.day_schedule(&key);
        let free = schedule.iter().filter(|slot| slot.is_free()).count();
        let marker = if view.is_full(&key) { " FULL" } else { "" };
        println!("{key}: {free}/{} free{marker}", view.total_slots);

        for slot in schedule.iter().filter(|slot| !slot.is_free()) {
            println!("  {} {}", slot.time, slot.occupants.join(", "));
        }
    }

    Ok(())
}
