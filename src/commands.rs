//! Command execution
//!
//! Turns parsed CLI arguments into rendered output. `main` only sets up
//! logging and prints what [`run`] returns.

use crate::cli::{Cli, Command, EngagementArgs, ExportArgs};
use crate::dashboard::{Dashboard, View, ViewOptions};
use appstat_core::error::Result;
use appstat_core::timezone::TimezoneConfig;
use appstat_export::{CollectionExporter, ExportPlan, JsonDumpSource};
use appstat_loader::DataLoader;
use appstat_terminal::{get_formatter, render_report};
use tracing::info;

/// Execute the command of `cli` and return the text to print
pub async fn run(cli: &Cli, show_progress: bool) -> Result<String> {
    let timezone = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    run_with_timezone(cli, timezone, show_progress).await
}

/// Same as [`run`] with an explicit timezone, which may pin "today"
pub async fn run_with_timezone(
    cli: &Cli,
    timezone: TimezoneConfig,
    show_progress: bool,
) -> Result<String> {
    let (view, engagement) = match &cli.command {
        Command::Export(args) => return export(args, show_progress).await,
        Command::Overview => (View::Overview, None),
        Command::Audience => (View::Audience, None),
        Command::Engagement(args) | Command::Report(args) => (View::Engagement, Some(args)),
        Command::Geo => (View::Geo, None),
    };

    info!("Using timezone: {}", timezone.display_name());
    let filter = cli.filter_config(timezone.today())?;

    let loader = DataLoader::new(&cli.data_dir)?
        .with_options(view.load_options(cli.load_options()))
        .with_progress(show_progress);
    let data = loader.load(&view.tables()).await?;
    info!("Rendering {} view", view);

    let dashboard = Dashboard::new(timezone).with_options(view_options(cli, engagement)?);
    let formatter = get_formatter(cli.json, cli.top);

    let output = match view {
        View::Overview => formatter.format_overview(&dashboard.overview(&data, &filter)),
        View::Audience => formatter.format_audience(&dashboard.audience(&data, &filter)),
        View::Geo => formatter.format_geo(&dashboard.geo(&data, &filter)),
        View::Engagement => {
            let report = dashboard.engagement(&data, &filter)?;
            if matches!(cli.command, Command::Report(_)) {
                render_report(&report, &filter)
            } else {
                formatter.format_engagement(&report)
            }
        }
    };
    Ok(output)
}

fn view_options(cli: &Cli, engagement: Option<&EngagementArgs>) -> Result<ViewOptions> {
    let mut options = ViewOptions {
        towns: cli.town_normalizer()?,
        ..Default::default()
    };
    if let Some(args) = engagement {
        options.conversion_basis = args.conversion;
        options.histogram_bin_minutes = args.bin_minutes;
    }
    Ok(options)
}

async fn export(args: &ExportArgs, show_progress: bool) -> Result<String> {
    let source = JsonDumpSource::new(&args.from)?;
    let plan = ExportPlan {
        parent: args.parent.clone(),
        ..ExportPlan::default()
    };
    let summary = CollectionExporter::new(source, &args.out)
        .with_plan(plan)
        .with_progress(show_progress)
        .run()
        .await?;

    let mut lines: Vec<String> = summary
        .files
        .iter()
        .map(|file| format!("Wrote {}", file.display()))
        .collect();
    lines.extend(
        summary
            .empty
            .iter()
            .map(|name| format!("Skipped empty collection {name}")),
    );
    lines.push(format!(
        "Exported {} documents into {} files",
        summary.documents,
        summary.files.len()
    ));
    Ok(lines.join("\n"))
}
