//! Customer record lookup.
//!
//! Ids are not guaranteed unique in the source data; the first row in file
//! order wins.

use anyhow::Result;

use churnwise_core::table::Record;
use churnwise_core::CoreError;

use crate::config::Config;
use crate::context::AppContext;
use crate::error::ServiceResult;

pub fn customer_profile(ctx: &AppContext, customer_id: &str) -> ServiceResult<Record> {
    let id_column = &ctx.config.data.id_column;
    let record = ctx
        .customers
        .find_first(id_column, customer_id)?
        .ok_or_else(|| CoreError::NotFound(customer_id.to_string()))?;
    Ok(record)
}

/// CLI entry point: print the record as pretty JSON.
pub fn run_profile(config: &Config, customer_id: &str) -> Result<()> {
    let ctx = AppContext::load(config)?;
    let record = customer_profile(&ctx, customer_id)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
