//! `srm delete <id>` – delete a record.

use anyhow::Result;
use srm_core::endpoint::Write;
use srm_core::fetcher::ResilientFetcher;

pub async fn run_delete(fetcher: &ResilientFetcher, id: &str) -> Result<()> {
    let write = Write::Delete { id: id.to_string() };
    let ack = fetcher.submit(&write).await?;
    match ack.message {
        Some(message) => println!("Deleted record {id}: {message}"),
        None => println!("Deleted record {id}."),
    }
    Ok(())
}
