use serde::{Deserialize, Serialize};

/// One day's figures plus the previous day's, supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSnapshot {
    pub today_revenue: f64,
    pub today_cost: f64,
    pub today_customers: u64,
    pub yesterday_revenue: f64,
    pub yesterday_cost: f64,
    pub yesterday_customers: u64,
}
