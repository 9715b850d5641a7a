//! `srm headers` – show the sheet's column headers.

use anyhow::Result;
use srm_core::fetcher::ResilientFetcher;

pub async fn run_headers(fetcher: &ResilientFetcher) -> Result<()> {
    let headers = fetcher.fetch_headers().await?;
    if headers.is_empty() {
        println!("No headers.");
    } else {
        for header in headers {
            println!("{header}");
        }
    }
    Ok(())
}
