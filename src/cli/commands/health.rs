use std::time::Duration;

use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

fn health_url(base: &str) -> anyhow::Result<url::Url> {
    let base = url::Url::parse(base)?;
    Ok(base.join("/health")?)
}

pub async fn handle(url: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let target = health_url(&url)?;

    let response = reqwest::Client::new()
        .get(target.clone())
        .timeout(Duration::from_secs(5))
        .send()
        .await;

    match response {
        Ok(response) => {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);

            if status.is_success() {
                output_success(
                    output_format,
                    &format!("{} is healthy", url),
                    Some(json!({ "status": status.as_u16(), "health": body })),
                )
            } else {
                output_error(
                    output_format,
                    &format!("{} answered {} (database unavailable?)", target, status),
                    Some("SERVICE_UNAVAILABLE"),
                )?;
                anyhow::bail!("server is degraded")
            }
        }
        Err(e) => {
            output_error(output_format, &format!("{} unreachable: {}", target, e), Some("UNREACHABLE"))?;
            anyhow::bail!("server unreachable")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_path_replaces_any_base_path() {
        assert_eq!(health_url("http://localhost:3000").unwrap().as_str(), "http://localhost:3000/health");
        assert_eq!(health_url("http://api.local/v1/").unwrap().as_str(), "http://api.local/health");
        assert!(health_url("not a url").is_err());
    }
}
