use anyhow::Result;

use churnwise_core::classifier::Classifier;

use crate::config::Config;
use crate::data;

/// Print the load status of every configured input.
///
/// Fails only when the customer dataset cannot be loaded, since the server
/// refuses to start without it.
pub fn list_sources(config: &Config) -> Result<()> {
    println!("{:<12} {:<10} DETAIL", "SOURCE", "STATUS");

    let customers = data::load_table(&config.data.customers_csv, config.data.drop_incomplete_rows);
    match &customers {
        Ok(t) => println!("{:<12} {:<10} {} rows", "customers", "OK", t.len()),
        Err(e) => println!("{:<12} {:<10} {:#}", "customers", "ERROR", e),
    }

    match data::load_documents(&config.data.documents_json) {
        Ok(docs) => println!("{:<12} {:<10} {} documents", "documents", "OK", docs.len()),
        Err(e) => println!("{:<12} {:<10} {:#} (chat uses fallback)", "documents", "MISSING", e),
    }

    match data::load_model(&config.data.model_path) {
        Ok(m) => println!(
            "{:<12} {:<10} {} with {} features",
            "model",
            "OK",
            m.kind(),
            m.feature_names().len()
        ),
        Err(e) => println!("{:<12} {:<10} {:#}", "model", "DOWN", e),
    }

    let users = if config.data.users_csv.exists() {
        "OK"
    } else {
        "NOT CREATED"
    };
    println!(
        "{:<12} {:<10} {}",
        "users",
        users,
        config.data.users_csv.display()
    );

    customers.map(|_| ())
}
