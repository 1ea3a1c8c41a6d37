//! Storefront search - terminal client
//!
//! Loads the catalog once, then runs a conversational search session against
//! the recommendation backend, reading queries from stdin.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use storefront_search::presenter::{Presenter, TextPresenter};
use storefront_search::state_machine::{SessionContext, SessionView};
use storefront_search::transport::{AskRequest, Product};
use storefront_search::{
    LoggingTransport, SessionError, SessionEvent, SessionHandle, SessionId, SessionRuntime,
    StorefrontClient, StorefrontConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
Type what you are looking for, e.g. 'serums for dry skin'.
  /follow              stage the follow-up question as your next query
  /send                submit the staged query
  /clear               clear the conversation
  /products [category] list the catalog
  /ask <id> <question> ask about one product
  /quit                exit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_search=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(io::stderr),
        )
        .init();

    let config = StorefrontConfig::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Starting storefront search"
    );

    let client = Arc::new(StorefrontClient::new(&config)?);

    match client.health().await {
        Ok(status) => tracing::info!(status = %status, "Backend reachable"),
        Err(e) => tracing::warn!(error = %e, "Backend health check failed"),
    }

    let catalog = Catalog::load(&client).await;
    println!(
        "{} products in {} categories: {}",
        catalog.products.len(),
        catalog.categories.len(),
        catalog.categories.join(", ")
    );
    println!("{HELP}");

    let handle =
        SessionRuntime::spawn(SessionContext::default(), LoggingTransport::new(client.clone()));
    spawn_presenter(&handle);
    let mut ask_sessions = AskSessions::default();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Query(text) => searching(report(handle.submit_query(text).await)),
            Command::Send => searching(report(handle.submit_input().await)),
            Command::Follow => {
                let Some(question) = follow_up(&handle.view()) else {
                    println!("No follow-up question to answer.");
                    continue;
                };
                if report(handle.select_follow_up().await) {
                    println!("Staged: {question} (edit by typing a new query, or /send)");
                }
            }
            Command::Clear => {
                report(handle.clear().await);
            }
            Command::Products(category) => {
                let mut out = TextPresenter::new(io::stdout());
                out.products(&catalog.filter(category.as_deref()))?;
            }
            Command::Ask {
                product_id,
                question,
            } => {
                let session_id = ask_sessions.session_for(product_id);
                ask(&client, product_id, &question, session_id).await?;
            }
            Command::Invalid(reason) => println!("{reason}"),
        }
    }

    Ok(())
}

/// Render presentations as the session publishes them
fn spawn_presenter(handle: &SessionHandle) {
    let mut events = handle.subscribe();
    let view_rx = handle.watch();
    tokio::spawn(async move {
        let mut presenter = TextPresenter::new(io::stdout());
        loop {
            let result = match events.recv().await {
                Ok(SessionEvent::Presented(presentation)) => {
                    let view = view_rx.borrow().clone();
                    presenter.present(&presentation, &view)
                }
                Ok(SessionEvent::Cleared) => presenter.cleared(),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Presenter fell behind");
                    Ok(())
                }
                Err(RecvError::Closed) => break,
            };
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to write output");
            }
        }
    });
}

/// Print why a command was not applied; true when it was
fn report(outcome: Result<(), SessionError>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(SessionError::Rejected(e)) => {
            println!("{e}");
            false
        }
        Err(SessionError::Closed) => {
            tracing::error!("Search session is no longer running");
            false
        }
    }
}

fn searching(accepted: bool) {
    if accepted {
        println!("Finding your perfect products...");
    }
}

/// Pending follow-up question, if the last reply asked one
fn follow_up(view: &SessionView) -> Option<String> {
    view.has_follow_up().then(|| view.pending_follow_up.clone())
}

async fn ask(
    client: &StorefrontClient,
    product_id: i64,
    question: &str,
    session_id: SessionId,
) -> io::Result<()> {
    let request = AskRequest::about_product(question, Some(product_id), session_id);
    match client.ask(&request).await {
        Ok(response) => TextPresenter::new(io::stdout()).answer(&response),
        Err(e) => {
            tracing::warn!(product_id, error = %e, "Product question failed");
            println!("Sorry, I couldn't answer that right now.");
            Ok(())
        }
    }
}

/// One ask session per product, kept apart from the search session
#[derive(Debug, Default)]
struct AskSessions(HashMap<i64, SessionId>);

impl AskSessions {
    fn session_for(&mut self, product_id: i64) -> SessionId {
        self.0
            .entry(product_id)
            .or_insert_with(SessionId::generate)
            .clone()
    }
}

/// Catalog snapshot fetched once at startup
#[derive(Debug, Default)]
struct Catalog {
    products: Vec<Product>,
    categories: Vec<String>,
}

impl Catalog {
    async fn load(client: &StorefrontClient) -> Self {
        let products = client.products().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load products");
            Vec::new()
        });
        let categories = client.categories().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load categories");
            Vec::new()
        });
        Self {
            products,
            categories,
        }
    }

    fn filter(&self, category: Option<&str>) -> Vec<Product> {
        match category {
            None => self.products.clone(),
            Some(category) => self
                .products
                .iter()
                .filter(|p| p.category.eq_ignore_ascii_case(category))
                .cloned()
                .collect(),
        }
    }
}

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Empty,
    Query(String),
    Follow,
    Send,
    Clear,
    Products(Option<String>),
    Ask { product_id: i64, question: String },
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Query(line.to_string());
        };

        let (name, args) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, args)| (name, args.trim()));

        match name {
            "follow" => Command::Follow,
            "send" => Command::Send,
            "clear" => Command::Clear,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "products" => Command::Products((!args.is_empty()).then(|| args.to_string())),
            "ask" => {
                let Some((id, question)) = args.split_once(char::is_whitespace) else {
                    return Command::Invalid("Usage: /ask <product_id> <question>".to_string());
                };
                match id.parse() {
                    Ok(product_id) if !question.trim().is_empty() => Command::Ask {
                        product_id,
                        question: question.trim().to_string(),
                    },
                    _ => Command::Invalid("Usage: /ask <product_id> <question>".to_string()),
                }
            }
            other => Command::Invalid(format!("Unknown command /{other}, try /help")),
        }
    }
}
