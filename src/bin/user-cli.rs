use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "user-cli")]
#[command(about = "Command-line client for the user service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the service is up
    Health,
    /// Register a new user
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Look up a user by ID
    Get {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/", base)).send().await?,
        Commands::Create { id, name, email } => {
            let mut body = json!({ "id": id, "name": name });
            if let Some(email) = email {
                body["email"] = Value::String(email);
            }
            client
                .post(format!("{}/users", base))
                .json(&body)
                .send()
                .await?
        }
        Commands::Get { id } => {
            let mut url = reqwest::Url::parse(base)?;
            url.path_segments_mut()
                .map_err(|_| "service URL cannot be a base")?
                .pop_if_empty()
                .extend(["users", id.as_str()]);
            client.get(url).send().await?
        }
    };

    let ok = print_response(res).await?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: service returned status {}", status);
        eprintln!("{}", rendered);
    }
    Ok(status.is_success())
}
