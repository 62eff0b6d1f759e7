mod client;
mod display;
mod inputs;
mod session;

use crate::client::BugfinderClient;
use crate::session::{Session, SessionState};
use clap::Parser;
use colored::*;
use env_logger::Env;
use log::error;
use std::io;
use std::path::PathBuf;
use std::process::exit;

#[derive(Parser, Debug)]
#[command(
    name = "bugfinder",
    bin_name = "bugfinder",
    about = "Find bugs in an SQL query by checking it against a database schema"
)]
struct Args {
    /// Base url of the sql_bugfinder service
    #[arg(long, env = "BUGFINDER_URL", default_value = "http://localhost:8080")]
    url: String,
    /// Schema as text, e.g. a list of CREATE TABLE statements
    #[arg(long, conflicts_with = "schema_file")]
    schema: Option<String>,
    #[arg(long)]
    schema_file: Option<PathBuf>,
    /// Query to analyze
    #[arg(long, conflicts_with = "query_file")]
    query: Option<String>,
    #[arg(long)]
    query_file: Option<PathBuf>,
    /// Use the built-in example schema and query for anything not given
    #[arg(long)]
    example: bool,
}

async fn run(args: Args) -> Result<bool, anyhow::Error> {
    let schema = inputs::resolve(
        args.schema,
        args.schema_file.as_deref(),
        args.example.then_some(inputs::EXAMPLE_SCHEMA),
    )?;
    let query = inputs::resolve(
        args.query,
        args.query_file.as_deref(),
        args.example.then_some(inputs::EXAMPLE_QUERY),
    )?;

    let client = BugfinderClient::new(&args.url)?;
    let mut session = Session::new();

    if session.can_submit(&schema, &query) {
        println!("{} Analyzing...", "→".cyan());
    }
    if let Err(err) = session.submit(&client, &schema, &query).await {
        eprintln!("{}", err.to_string().red());
        return Ok(false);
    }

    match session.state() {
        SessionState::Resolved(analysis) => {
            display::render(analysis, &mut io::stdout().lock())?;
            Ok(true)
        }
        SessionState::Failed(message) => {
            eprintln!("{}", message.red());
            Ok(false)
        }
        state => anyhow::bail!("analysis ended in unexpected state {state:?}"),
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let rt = tokio::runtime::Runtime::new().unwrap();

    match rt.block_on(run(args)) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(err) => {
            error!("{}", err);
            exit(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SCHEMA: &str = "CREATE TABLE Users (UserID int PRIMARY KEY, FirstName varchar(255));";
    const QUERY: &str = "SELECT FirsName FROM Users";

    /// Serves `reply` for every analyze call and counts the calls.
    async fn spawn_service(reply: (StatusCode, Value)) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/api/v1/analyze",
            post(move || {
                let reply = reply.clone();
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (reply.0, Json(reply.1)).into_response()
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        (format!("http://{addr}"), calls)
    }

    fn args(url: String, schema: &str, query: &str) -> Args {
        Args {
            url,
            schema: Some(schema.to_string()),
            schema_file: None,
            query: Some(query.to_string()),
            query_file: None,
            example: false,
        }
    }

    #[tokio::test]
    async fn resolved_analysis_succeeds() {
        let (url, calls) = spawn_service((
            StatusCode::OK,
            json!({
                "isBuggy": true,
                "bugDescription": "Column 'FirsName' does not exist; did you mean 'FirstName'?",
                "suggestedFix": "SELECT FirstName FROM Users",
            }),
        ))
        .await;

        assert!(run(args(url, SCHEMA, QUERY)).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_analysis_fails() {
        let (url, calls) = spawn_service((
            StatusCode::BAD_GATEWAY,
            json!({"code": 502, "message": "failed to analyze the SQL query"}),
        ))
        .await;

        assert!(!run(args(url, SCHEMA, QUERY)).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_input_fails_without_calling_the_service() {
        let (url, calls) = spawn_service((StatusCode::OK, json!({}))).await;

        assert!(!run(args(url.clone(), "  \n", QUERY)).await.unwrap());
        assert!(!run(args(url, SCHEMA, "")).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn example_fills_missing_inputs() {
        let (url, calls) = spawn_service((
            StatusCode::OK,
            json!({
                "isBuggy": true,
                "bugDescription": "Column 'FirsName' does not exist.",
                "suggestedFix": "SELECT UserID, FirstName FROM Users WHERE Email = 'test@example.com'",
            }),
        ))
        .await;

        let args = Args {
            url,
            schema: None,
            schema_file: None,
            query: None,
            query_file: None,
            example: true,
        };
        assert!(run(args).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn schema_and_schema_file_conflict() {
        let parsed = Args::try_parse_from([
            "bugfinder",
            "--schema",
            SCHEMA,
            "--schema-file",
            "schema.sql",
        ]);
        assert!(parsed.is_err());
    }
}
