use crate::metrics::DerivedMetrics;

const ALERT_SEPARATOR: &str = "; ";
const NO_ALERTS_MARKER: &str = "None";

/// Fixed-template summary of the day's metrics, two decimal places
/// throughout. This is what the analyst sees and what the model is shown.
pub fn render_summary(metrics: &DerivedMetrics) -> String {
    let alerts = if metrics.alerts.is_empty() {
        NO_ALERTS_MARKER.to_string()
    } else {
        metrics.alerts.join(ALERT_SEPARATOR)
    };

    format!(
        "Daily business metrics:\n\
         - Profit: {:.2}\n\
         - Revenue change vs yesterday: {:.2}%\n\
         - Cost change vs yesterday: {:.2}%\n\
         - Customer acquisition cost (today): {:.2}\n\
         - CAC change vs yesterday: {:.2}%\n\
         - Alerts: {}",
        metrics.profit,
        metrics.revenue_change_percent,
        metrics.cost_change_percent,
        metrics.cac_today,
        metrics.cac_change_percent,
        alerts,
    )
}

/// The full prompt sent to the service: summary plus the ask.
pub fn render_prompt(metrics: &DerivedMetrics) -> String {
    format!(
        "{}\n\nBased on these metrics, give 2-3 concise, actionable recommendations \
         for the business owner as bullet points.",
        render_summary(metrics)
    )
}
