use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "lab-cli")]
#[command(about = "Command-line client for the gateway lab API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check lab server status
    Status,
    /// List the configured route table
    Routes,
    /// Start a new learner session
    New,
    /// End a learner session
    End { session: String },
    /// Match a request path against the route table
    Route { session: String, path: String },
    /// Submit one request to the rate limiter
    Submit { session: String },
    /// Reset the rate limit window
    ResetLimit { session: String },
    /// Send one request through the circuit breaker
    Breaker {
        session: String,
        /// Simulate an unhealthy backend
        #[arg(long)]
        fail: bool,
    },
    /// Force the circuit breaker back to CLOSED
    ResetBreaker { session: String },
    /// Validate a bearer token
    Auth { session: String, token: String },
    /// Fetch through the edge cache
    Cache { session: String },
    /// Advance the request lifecycle walkthrough
    Journey {
        session: String,
        #[arg(long)]
        back: bool,
    },
    /// Run the order orchestration demo
    Order { session: String },
    /// Answer the current quiz question
    Answer { session: String, option: String },
    /// Ask the tutor a question
    Ask { question: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');
    let session_url = |id: &str, tail: &str| format!("{}/sessions/{}{}", base, id, tail);

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/status", base)).send().await?,
        Commands::Routes => client.get(format!("{}/routes", base)).send().await?,
        Commands::New => client.post(format!("{}/sessions", base)).send().await?,
        Commands::End { session } => client.delete(session_url(&session, "")).send().await?,
        Commands::Route { session, path } => {
            client
                .post(session_url(&session, "/route"))
                .json(&json!({ "path": path }))
                .send()
                .await?
        }
        Commands::Submit { session } => {
            client
                .post(session_url(&session, "/rate-limit/submit"))
                .send()
                .await?
        }
        Commands::ResetLimit { session } => {
            client
                .post(session_url(&session, "/rate-limit/reset"))
                .send()
                .await?
        }
        Commands::Breaker { session, fail } => {
            client
                .post(session_url(&session, "/breaker/evaluate"))
                .json(&json!({ "healthy": !fail }))
                .send()
                .await?
        }
        Commands::ResetBreaker { session } => {
            client
                .post(session_url(&session, "/breaker/reset"))
                .send()
                .await?
        }
        Commands::Auth { session, token } => {
            client
                .post(session_url(&session, "/auth"))
                .json(&json!({ "token": token }))
                .send()
                .await?
        }
        Commands::Cache { session } => {
            client
                .post(session_url(&session, "/cache/fetch"))
                .send()
                .await?
        }
        Commands::Journey { session, back } => {
            let tail = if back { "/journey/prev" } else { "/journey/next" };
            client.post(session_url(&session, tail)).send().await?
        }
        Commands::Order { session } => {
            client.post(session_url(&session, "/order")).send().await?
        }
        Commands::Answer { session, option } => {
            client
                .post(session_url(&session, "/quiz/answer"))
                .json(&json!({ "option": option }))
                .send()
                .await?
        }
        Commands::Ask { question } => {
            client
                .post(format!("{}/tutor/ask", base))
                .json(&json!({ "question": question }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: lab API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if status == reqwest::StatusCode::NO_CONTENT {
        println!("{}", status);
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
