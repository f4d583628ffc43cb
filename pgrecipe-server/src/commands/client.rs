use anyhow::{Context, Result};
use pgrecipe_models::{ErrorResponse, InstanceMetadata, ScheduleResponse, WorkflowRequest};
use serde_json::Value;

fn api_url() -> String {
    std::env::var("PGRECIPE_API_URL").unwrap_or_else(|_| "http://localhost:7999".to_string())
}

/// Inline JSON, or `@path` to read JSON from a file
fn parse_input(raw: &str) -> Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path))?,
        None => raw.to_string(),
    };
    serde_json::from_str(&text).context("Workflow input must be valid JSON")
}

async fn api_error(response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => anyhow::anyhow!("API error ({}): {} - {}", status, body.error.code, body.error.message),
        Err(_) => anyhow::anyhow!("API error: {}", status),
    }
}

pub async fn schedule(name: &str, input: &str, id: Option<String>) -> Result<()> {
    let request = WorkflowRequest {
        name: name.to_string(),
        input: Some(parse_input(input)?),
        id,
    };

    let response = reqwest::Client::new()
        .put(format!("{}/workflows", api_url()))
        .json(&request)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to API: {}", e))?;

    if !response.status().is_success() {
        return Err(api_error(response).await);
    }

    let scheduled: ScheduleResponse = response.json().await?;

    println!("✓ Workflow scheduled");
    println!("  Name: {}", name);
    println!("  ID:   {}", scheduled.id);
    println!();
    println!("Use 'pgrecipe-server status {}' to follow it", scheduled.id);

    Ok(())
}

pub async fn status(id: &str) -> Result<()> {
    let response = reqwest::get(format!("{}/workflows/{}", api_url(), id))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to API: {}", e))?;

    if !response.status().is_success() {
        return Err(api_error(response).await);
    }

    let metadata: InstanceMetadata = response.json().await?;

    println!("Workflow: {}", metadata.id);
    println!("{}", "=".repeat(80));
    println!();
    println!("Status:          {:?}", metadata.runtime_status);
    println!("Type:            {}", if metadata.name.is_empty() { "-" } else { metadata.name.as_str() });
    println!();
    println!("Timeline:");
    println!(
        "  Created:       {}",
        metadata.created_at.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string())
    );
    println!(
        "  Updated:       {}",
        metadata.last_updated_at.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string())
    );
    println!();

    if let Some(output) = &metadata.serialized_output {
        println!("Output:");
        match serde_json::from_str::<Value>(output) {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json).unwrap_or_else(|_| output.clone())),
            Err(_) => println!("{}", output),
        }
        println!();
    }

    if let Some(failure) = &metadata.failure_details {
        println!("Failure:");
        println!("  {}", failure.message);
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_inline_input() {
        assert_eq!(
            parse_input(r#"{"resource":{"name":"db1"}}"#).unwrap(),
            json!({ "resource": { "name": "db1" } })
        );
    }

    #[test]
    fn test_parse_input_from_file() {
        let path = std::env::temp_dir().join(format!("pgrecipe-input-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"resource":{"name":"db2"}}"#).unwrap();

        let parsed = parse_input(&format!("@{}", path.display())).unwrap();
        assert_eq!(parsed["resource"]["name"], "db2");

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_parse_invalid_input() {
        assert!(parse_input("{oops").is_err());
        assert!(parse_input("@/definitely/not/here.json").is_err());
    }
}
