use std::time::Duration;

use reqkit::prelude::{HttpClient, RequestOptions};
use serde::Serialize;

#[derive(Serialize)]
struct Search<'a> {
    q: &'a str,
    page: u32,
    limit: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpClient::builder()
        .timeout(Duration::from_secs(60))
        .verify_tls(false)
        .default_header("User-Agent", "reqkit-example/1.0")
        .default_header("Authorization", "Bearer your-token-here")
        .build()?;

    let response = client.get(
        "https://httpbin.org/get",
        RequestOptions::new().query_params(&Search {
            q: "search term",
            page: 1,
            limit: 10,
        })?,
    )?;
    println!("search status={}", response.status());

    let response = client.put(
        "https://httpbin.org/put",
        RequestOptions::new()
            .header("X-Custom-Header", "value")
            .json(&serde_json::json!({ "status": "active" }))?,
    )?;
    println!("update status={}", response.status());
    Ok(())
}
