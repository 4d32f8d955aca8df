use crate::domain::snapshot::BusinessSnapshot;
use serde::{Deserialize, Serialize};

/// CAC drift above this (percent vs yesterday) raises an alert.
pub const CAC_ALERT_THRESHOLD_PERCENT: f64 = 20.0;

pub const ALERT_NEGATIVE_PROFIT: &str = "Negative profit: the business lost money today";
pub const ALERT_CAC_INCREASE: &str =
    "Customer acquisition cost rose more than 20% vs yesterday";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub profit: f64,
    pub cac_today: f64,
    pub cac_change_percent: f64,
    pub revenue_change_percent: f64,
    pub cost_change_percent: f64,
    pub alerts: Vec<String>,
}

/// Derive the day's metrics and alerts from a snapshot.
///
/// Pure and total: every zero denominator (yesterday's value, today's
/// customer count) yields 0 for the dependent field instead of an error.
pub fn compute(snapshot: &BusinessSnapshot) -> DerivedMetrics {
    let profit = snapshot.today_revenue - snapshot.today_cost;

    let cac_today = per_customer_cost(snapshot.today_cost, snapshot.today_customers);
    let cac_yesterday = per_customer_cost(snapshot.yesterday_cost, snapshot.yesterday_customers);

    let cac_change_percent = percent_change(cac_today, cac_yesterday);
    let revenue_change_percent =
        percent_change(snapshot.today_revenue, snapshot.yesterday_revenue);
    let cost_change_percent = percent_change(snapshot.today_cost, snapshot.yesterday_cost);

    // Evaluation order is fixed: profit first, then CAC drift.
    let mut alerts = Vec::new();
    if profit < 0.0 {
        alerts.push(ALERT_NEGATIVE_PROFIT.to_string());
    }
    if cac_change_percent > CAC_ALERT_THRESHOLD_PERCENT {
        alerts.push(ALERT_CAC_INCREASE.to_string());
    }

    DerivedMetrics {
        profit,
        cac_today,
        cac_change_percent,
        revenue_change_percent,
        cost_change_percent,
        alerts,
    }
}

fn per_customer_cost(cost: f64, customers: u64) -> f64 {
    if customers > 0 {
        cost / customers as f64
    } else {
        0.0
    }
}

fn percent_change(today: f64, yesterday: f64) -> f64 {
    if yesterday != 0.0 {
        (today - yesterday) / yesterday * 100.0
    } else {
        0.0
    }
}
