//! Markdown narrative report
//!
//! Interpolates the engagement figures into fixed prose with two-decimal
//! precision. Inactive filters are reported as covering everything.

use appstat_core::aggregation_types::EngagementReport;
use appstat_core::filters::FilterConfig;

/// Render the engagement report as markdown
///
/// # Examples
/// ```
/// use appstat_core::aggregation_types::EngagementReport;
/// use appstat_core::filters::FilterConfig;
/// use appstat_terminal::render_report;
///
/// let report = EngagementReport { conversion_rate: 42.0, ..Default::default() };
/// let text = render_report(&report, &FilterConfig::new());
/// assert!(text.contains("**42.00%**"));
/// assert!(text.contains("All available dates."));
/// ```
pub fn render_report(report: &EngagementReport, filter: &FilterConfig) -> String {
    let date_info = match &filter.date_range {
        Some(range) => format!("- Date range: {} - {}", range.start(), range.end()),
        None => "All available dates.".to_string(),
    };
    let country_info = if filter.countries.is_empty() {
        "All countries.".to_string()
    } else {
        format!("- Selected countries: {}", filter.countries.join(", "))
    };
    let device_info = if filter.devices.is_empty() {
        "All device types.".to_string()
    } else {
        let labels: Vec<&str> = filter.devices.iter().map(|d| d.label()).collect();
        format!("- Device types: {}", labels.join(", "))
    };

    let rate = report.conversion_rate;
    let segments = &report.frequency;
    let activity = match &report.active_users {
        Some(active) => format!(
            "- **Active users:**\n\
             \x20   - **Daily (DAU):** on average **{:.2}** sessions are recorded on each active day.\n\
             \x20   - **Weekly (WAU):** on a weekly basis, about **{:.2}** sessions take place.\n\
             \x20   - **Monthly (MAU):** **{:.2}** sessions are recorded in each active month.\n",
            active.dau, active.wau, active.mau
        ),
        None => "- **Active users:** not available for this snapshot.\n".to_string(),
    };
    let duration = match report.avg_session_duration_minutes {
        Some(minutes) => format!(
            "- **Average session duration:** sessions last **{minutes:.2} minutes** on average.\n"
        ),
        None => "- **Average session duration:** not available for this snapshot.\n".to_string(),
    };

    format!(
        "## Automatic Report\n\
         \n\
         **Analysis period:**\n\
         {date_info}\n\
         \n\
         **Applied filters:**\n\
         {country_info}\n\
         {device_info}\n\
         \n\
         **Key metrics:**\n\
         \n\
         - **Conversion rate:** the share of signed-up users who performed the tracked action \
         ({basis}) is **{rate:.2}%**. Out of all registered users, about {rate:.2}% completed it.\n\
         \n\
         {activity}\
         \n\
         {duration}\
         \n\
         - **User engagement:**\n\
         \x20   - **Average sessions per user:** each active user takes part in **{per_user:.2}** sessions.\n\
         \x20   - **Daily users:** **{daily}** users have exactly one session.\n\
         \x20   - **Weekly users:** **{weekly}** users have between two and seven sessions.\n\
         \x20   - **Monthly users:** **{monthly}** users have more than seven sessions.\n\
         \n\
         This report summarizes user engagement and loyalty over the selected window. \
         Conversion and activity figures point at strengths and at opportunities to raise \
         engagement and satisfaction.\n",
        basis = report.conversion_basis,
        per_user = report.avg_sessions_per_user,
        daily = segments.daily,
        weekly = segments.weekly,
        monthly = segments.monthly,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstat_core::aggregation_types::{ActiveUsers, FrequencySegments};
    use appstat_core::filters::DateRange;
    use appstat_core::types::Device;
    use chrono::NaiveDate;

    #[test]
    fn test_report_with_filters() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        let filter = FilterConfig::new()
            .with_countries(["Cameroon", "France"])
            .with_device(Device::Ios)
            .with_date_range(range);
        let report = EngagementReport {
            conversion_rate: 66.666_666,
            active_users: Some(ActiveUsers {
                dau: 2.0,
                wau: 4.25,
                mau: 10.0,
            }),
            frequency: FrequencySegments {
                daily: 5,
                weekly: 3,
                monthly: 1,
            },
            avg_session_duration_minutes: Some(3.5),
            avg_sessions_per_user: 1.333_333,
            ..Default::default()
        };

        let text = render_report(&report, &filter);
        assert!(text.contains("- Date range: 2024-01-01 - 2024-03-31"));
        assert!(text.contains("- Selected countries: Cameroon, France"));
        assert!(text.contains("- Device types: iOS"));
        assert!(text.contains("**66.67%**"));
        assert!(text.contains("**4.25**"));
        assert!(text.contains("**3.50 minutes**"));
        assert!(text.contains("**1.33**"));
        assert!(text.contains("**5** users have exactly one session"));
    }

    #[test]
    fn test_report_without_filters() {
        let text = render_report(&EngagementReport::default(), &FilterConfig::new());
        assert!(text.contains("All countries."));
        assert!(text.contains("All device types."));
        assert!(text.contains("**0.00%**"));
        assert!(text.contains("- **Active users:** not available for this snapshot."));
        assert!(!text.contains("DAU"));
    }
}
