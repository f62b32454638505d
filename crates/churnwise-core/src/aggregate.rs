//! Dashboard statistics over the customer dataset.
//!
//! Required columns are checked in the order `Churn`, `tenure`,
//! `MonthlyCharges`. `Churn` maps `"Yes"` to 1 and everything else to 0;
//! the numeric columns coerce unparseable cells to 0.

use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::table::{coerce_number, Table};

pub const CHURN_COLUMN: &str = "Churn";
pub const TENURE_COLUMN: &str = "tenure";
pub const MONTHLY_CHARGES_COLUMN: &str = "MonthlyCharges";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateSnapshot {
    pub total: usize,
    pub churn_rate: f64,
    pub avg_tenure: f64,
    pub avg_monthly_charge: f64,
    pub distribution: ChurnDistribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChurnDistribution {
    pub churned: usize,
    pub retained: usize,
}

/// `"Yes"` -> 1, `"No"` -> 0; unmapped or missing values count as 0.
pub fn churn_indicator(cell: &str) -> u8 {
    match cell.trim() {
        "Yes" => 1,
        _ => 0,
    }
}

pub fn aggregate(table: &Table) -> Result<AggregateSnapshot> {
    let churn_col = table.require_column(CHURN_COLUMN)?;
    let tenure_col = table.require_column(TENURE_COLUMN)?;
    let charges_col = table.require_column(MONTHLY_CHARGES_COLUMN)?;

    let total = table.len();
    if total == 0 {
        return Err(CoreError::EmptyDataset);
    }

    let mut churned = 0usize;
    let mut tenure_sum = 0.0;
    let mut charges_sum = 0.0;
    for row in table.rows() {
        churned += churn_indicator(&row[churn_col]) as usize;
        tenure_sum += coerce_number(&row[tenure_col]);
        charges_sum += coerce_number(&row[charges_col]);
    }

    let n = total as f64;
    Ok(AggregateSnapshot {
        total,
        churn_rate: churned as f64 / n,
        avg_tenure: tenure_sum / n,
        avg_monthly_charge: charges_sum / n,
        distribution: ChurnDistribution {
            churned,
            retained: total - churned,
        },
    })
}
