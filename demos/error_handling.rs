use reqkit::prelude::{Error, ExponentialBackoff, HttpClient, RequestOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpClient::builder()
        .client_name("reqkit-example-error-handling")
        .retry_strategy(ExponentialBackoff::disabled())
        .build()?;

    let result = client.get("https://httpbin.org/status/500", RequestOptions::new());
    match result {
        Ok(response) => {
            println!("unexpected success: status={}", response.status());
        }
        Err(error) => {
            println!("error_code={}", error.code());
            match &error {
                Error::RateLimitExceeded { limit, window } => {
                    println!(
                        "rate limit exceeded: limit={limit} window={}s, try again later",
                        window.as_secs()
                    );
                }
                Error::Timeout { timeout, .. } => {
                    println!("request timed out after {:.1}s", timeout.as_secs_f64());
                }
                Error::Network { detail, .. } => {
                    println!("network error: {detail}");
                }
                Error::HttpStatus {
                    status,
                    reason_phrase,
                    ..
                } => {
                    println!("http status error: status={status} reason={reason_phrase}");
                }
                other => {
                    println!("request failed: {other}");
                }
            }
        }
    }

    Ok(())
}
