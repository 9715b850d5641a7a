//! `srm list` – refresh and render all records.

use anyhow::Result;
use srm_core::config::SrmConfig;
use srm_core::fetcher::ResilientFetcher;
use srm_core::record::Record;
use srm_core::retry::RetryNotice;

pub async fn run_list(fetcher: &ResilientFetcher, cfg: &SrmConfig) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel::<RetryNotice>(8);
    let notice_handle = tokio::spawn(async move {
        while let Some(n) = rx.recv().await {
            eprintln!(
                "attempt {}/{} failed ({}); retrying in {:?}",
                n.attempt, n.max_attempts, n.error, n.delay
            );
        }
    });

    let outcome = fetcher.refresh(Some(&tx)).await;
    drop(tx);
    let _ = notice_handle.await;

    if outcome.cancelled {
        return Ok(());
    }
    if let Some(err) = &outcome.error {
        eprintln!("could not load records: {err}");
    }
    if outcome.records.is_empty() {
        println!("No records.");
        return Ok(());
    }

    // Column order comes from the header-list action when the deployment
    // supports it; otherwise fall back to the first record's field names.
    let headers = match fetcher.fetch_headers().await {
        Ok(headers) if !headers.is_empty() => headers,
        _ => fallback_headers(&outcome.records, &cfg.id_field),
    };
    render_table(&headers, &outcome.records);
    Ok(())
}

fn fallback_headers(records: &[Record], id_field: &str) -> Vec<String> {
    let mut names: Vec<String> = records
        .first()
        .map(|r| r.fields().keys().cloned().collect())
        .unwrap_or_default();
    names.sort();
    if let Some(pos) = names.iter().position(|n| n == id_field) {
        let id = names.remove(pos);
        names.insert(0, id);
    }
    names
}

fn render_table(headers: &[String], records: &[Record]) {
    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for record in records {
        for (i, header) in headers.iter().enumerate() {
            widths[i] = widths[i].max(record.get(header).unwrap_or("").len());
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .zip(widths.iter().copied())
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    println!("{}", header_line.join("  "));

    for record in records {
        let line: Vec<String> = headers
            .iter()
            .zip(widths.iter().copied())
            .map(|(h, w)| format!("{:<w$}", record.get(h).unwrap_or("")))
            .collect();
        println!("{}", line.join("  "));
    }
}
