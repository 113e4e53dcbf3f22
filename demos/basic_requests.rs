use reqkit::prelude::{HttpClient, Message, RequestOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpClient::standard();

    let response = client.get("https://httpbin.org/get", RequestOptions::new())?;
    println!("GET status={}", response.status());
    println!("body={}", response.text_lossy());

    let response = client.post(
        "https://httpbin.org/post",
        RequestOptions::new().json(&serde_json::json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
        }))?,
    )?;
    println!(
        "POST status={} content-type={}",
        response.status(),
        response.header_line("content-type")
    );
    Ok(())
}
