//! `srm add` – add a record.

use anyhow::Result;
use srm_core::endpoint::Write;
use srm_core::fetcher::ResilientFetcher;

pub async fn run_add(
    fetcher: &ResilientFetcher,
    id: Option<String>,
    fields: Vec<(String, String)>,
) -> Result<()> {
    anyhow::ensure!(
        !fields.is_empty(),
        "at least one --field NAME=VALUE is required"
    );
    let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let write = Write::Add {
        id: Some(id.clone()),
        fields,
    };
    let ack = fetcher.submit(&write).await?;
    match ack.message {
        Some(message) => println!("Added record {id}: {message}"),
        None => println!("Added record {id}."),
    }
    Ok(())
}
