//! `srm update <id>` – update a record.

use anyhow::Result;
use srm_core::endpoint::Write;
use srm_core::fetcher::ResilientFetcher;

pub async fn run_update(
    fetcher: &ResilientFetcher,
    id: &str,
    fields: Vec<(String, String)>,
) -> Result<()> {
    anyhow::ensure!(
        !fields.is_empty(),
        "at least one --field NAME=VALUE is required"
    );
    let write = Write::Update {
        id: id.to_string(),
        fields,
    };
    let ack = fetcher.submit(&write).await?;
    match ack.message {
        Some(message) => println!("Updated record {id}: {message}"),
        None => println!("Updated record {id}."),
    }
    Ok(())
}
