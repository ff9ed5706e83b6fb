//! Basic usage example for the appstat library
//!
//! Loads a snapshot directory (first argument, default `.`), then prints a
//! few headline figures for the whole audience and for French users only.

use appstat::{
    Result,
    aggregation::Aggregator,
    dashboard::{Dashboard, View},
    filters::FilterConfig,
    timezone::TimezoneConfig,
};
use appstat_loader::DataLoader;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let data_dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let loader = DataLoader::new(data_dir)?;
    let data = loader.load(&View::Engagement.tables()).await?;

    let agg = Aggregator::new(&data);
    println!("Snapshot Summary:");
    println!("=================");
    println!("Users:           {}", agg.total_users());
    println!("Retention rate:  {:.2}%", agg.retention_rate());
    println!("Avg duration:    {:.2} min", agg.avg_session_duration_minutes());

    let metrics = agg.active_users_metrics();
    println!(
        "DAU / WAU / MAU: {:.2} / {:.2} / {:.2}",
        metrics.dau, metrics.wau, metrics.mau
    );

    println!("\nTop pages:");
    for row in agg.most_visited_pages().iter().take(5) {
        println!("  {:<20} {}", row.label, row.count);
    }

    // Same figures through a view, restricted to one country
    let dashboard = Dashboard::new(TimezoneConfig::default());
    let filter = FilterConfig::new().with_country("France");
    let report = dashboard.engagement(&data, &filter)?;
    println!(
        "\nFrance: conversion {:.2}%, {} one-session users",
        report.conversion_rate, report.frequency.daily
    );
    for warning in &report.warnings {
        println!("warning: {warning}");
    }

    Ok(())
}
