//! Dashboard statistics.
//!
//! The dataset is re-read from disk and aggregated on every call; nothing is
//! cached between requests.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use churnwise_core::aggregate::{aggregate, AggregateSnapshot};

use crate::config::Config;
use crate::data;
use crate::error::ServiceResult;

/// Wire shape of `GET /dashboard-data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_customers: usize,
    pub churn_rate: f64,
    pub avg_tenure: f64,
    pub avg_monthly_charge: f64,
    pub active_customers: usize,
    pub churn_distribution: ChurnDistributionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnDistributionBody {
    #[serde(rename = "Yes")]
    pub yes: usize,
    #[serde(rename = "No")]
    pub no: usize,
}

impl From<AggregateSnapshot> for DashboardResponse {
    fn from(s: AggregateSnapshot) -> Self {
        Self {
            total_customers: s.total,
            churn_rate: s.churn_rate,
            avg_tenure: s.avg_tenure,
            avg_monthly_charge: s.avg_monthly_charge,
            active_customers: s.distribution.retained,
            churn_distribution: ChurnDistributionBody {
                yes: s.distribution.churned,
                no: s.distribution.retained,
            },
        }
    }
}

/// Reload the dataset and aggregate it. Blocking; call from a blocking task.
pub fn dashboard_data(config: &Config) -> ServiceResult<DashboardResponse> {
    let table = data::load_table(&config.data.customers_csv, config.data.drop_incomplete_rows)?;
    let snapshot = aggregate(&table)?;
    Ok(snapshot.into())
}

/// CLI entry point.
pub fn run_dashboard(config: &Config) -> Result<()> {
    let d = dashboard_data(config)?;

    println!("ChurnWise — Dashboard");
    println!("=====================");
    println!();
    println!("  Customers:        {}", d.total_customers);
    println!("  Active:           {}", d.active_customers);
    println!("  Churned:          {}", d.churn_distribution.yes);
    println!("  Churn rate:       {:.1}%", d.churn_rate * 100.0);
    println!("  Avg tenure:       {:.2} months", d.avg_tenure);
    println!("  Avg monthly:      ${:.2}", d.avg_monthly_charge);

    Ok(())
}
