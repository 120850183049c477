use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "failover-cli")]
#[command(about = "Management CLI for the provider failover service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "FAILOVER_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// List provider health, breaker state and latency
    Providers,
    /// Show raw latency statistics
    Latency,
    /// Dry-run provider selection for a model key
    Select {
        /// Model key, e.g. "gpt-4o"
        model: String,
    },
}

impl Commands {
    fn segments(&self) -> Vec<&str> {
        match self {
            Commands::Status => vec!["admin", "status"],
            Commands::Providers => vec!["admin", "providers"],
            Commands::Latency => vec!["admin", "latency"],
            Commands::Select { model } => vec!["admin", "select", model.as_str()],
        }
    }
}

/// Append the command's path to `base`, percent-encoding each segment so
/// model keys containing `/` stay one segment.
fn endpoint(base: &str, command: &Commands) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("admin URL {} cannot carry a path", base))?
        .pop_if_empty()
        .extend(command.segments());
    Ok(url)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let url = endpoint(&cli.url, &cli.command)?;
    let res = client.get(url).headers(headers).send().await?;
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        let url = endpoint("http://localhost:8081", &Commands::Status).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/admin/status");

        let url = endpoint("http://localhost:8081/", &Commands::Latency).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/admin/latency");
    }

    #[test]
    fn test_select_encodes_model_key() {
        let select = Commands::Select {
            model: "meta-llama/Llama-3-8b-chat-hf".to_string(),
        };
        let url = endpoint("http://localhost:8081", &select).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8081/admin/select/meta-llama%2FLlama-3-8b-chat-hf"
        );
    }
}
