//! `srm get <id>` – fetch a single record by id.

use anyhow::Result;
use srm_core::fetcher::ResilientFetcher;

pub async fn run_get(fetcher: &ResilientFetcher, id: &str) -> Result<()> {
    match fetcher.fetch_by_id(id).await? {
        Some(record) => {
            let mut names: Vec<&String> = record.fields().keys().collect();
            names.sort();
            for name in names {
                println!("{name}: {}", record.get(name).unwrap_or(""));
            }
        }
        None => println!("No record with id {id}."),
    }
    Ok(())
}
