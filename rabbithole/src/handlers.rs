use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rabbithole_core::SearchResult;
use rabbithole_provider::ExaClient;
use rabbithole_server::{ApiServer, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

// Helper functions for the one-shot handlers

/// Parse a URL argument, trying to add https:// if the bare form lacks a
/// scheme.
pub fn normalize_url_arg(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if Url::parse(trimmed).is_ok() {
        return Some(trimmed.to_string());
    }

    let with_scheme = format!("https://{}", trimmed);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    None
}

/// Format one result for plain terminal output.
pub fn format_result_line(index: usize, result: &SearchResult) -> String {
    let mut meta = vec![format!("score {:.2}", result.score)];
    if let Some(date) = &result.published_date {
        meta.push(date.clone());
    }
    if let Some(author) = &result.author {
        meta.push(author.clone());
    }

    format!(
        "{}. {}\n   {}\n   {}",
        index + 1,
        result.title,
        result.url,
        meta.join(" | ")
    )
}

/// Serialize results the way the proxy endpoints do: `{"results": [...]}`.
pub fn results_to_json(results: &[SearchResult]) -> String {
    serde_json::to_string_pretty(&serde_json::json!({ "results": results }))
        .expect("results serialize to JSON")
}

fn start_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    spinner
}

fn provider_client() -> ExaClient {
    match ExaClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("{}", "No results found".yellow());
        return;
    }

    for (index, result) in results.iter().enumerate() {
        println!(
            "{} {}",
            format!("{}.", index + 1).bright_blue().bold(),
            result.title.bright_white().bold()
        );
        println!("   {}", result.url.blue());

        let mut meta = vec![format!("score {:.2}", result.score)];
        if let Some(date) = &result.published_date {
            meta.push(date.clone());
        }
        if let Some(author) = &result.author {
            meta.push(author.clone());
        }
        println!("   {}", meta.join(" | ").bright_black());

        if let Some(text) = &result.text {
            let excerpt: String = text.chars().take(200).collect();
            println!("   {}", excerpt.trim());
        }
        println!();
    }
}

pub fn handle_ui() {
    let client = provider_client();
    if let Err(e) = rabbithole_tui::run(Arc::new(client)) {
        eprintln!("Error running TUI: {}", e);
        std::process::exit(1);
    }
}

pub async fn handle_serve(args: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let host = args.get_one::<String>("host").unwrap();
    let port = args.get_one::<u16>("port").unwrap();
    let client = provider_client();

    let config = ServerConfig {
        host: host.clone(),
        port: *port,
    };

    let server = match ApiServer::start(Arc::new(client), &config).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    println!(
        "{} Listening on {}",
        "✓".green().bold(),
        format!("http://{}", server.addr()).bright_white()
    );
    println!("  POST /api/search        {{\"query\": \"...\"}}");
    println!("  POST /api/find-similar  {{\"url\": \"...\"}}");
    println!("\nPress Ctrl+C to stop.");

    tokio::signal::ctrl_c().await.ok();
    server.shutdown();
    println!("\n{} Server stopped", "✓".green().bold());
}

pub async fn handle_search(args: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let query = args.get_one::<String>("QUERY").unwrap();
    let json = args.get_flag("json");
    let client = provider_client();

    let spinner = start_spinner(&format!("Searching for: {}", query));
    let outcome = client.search(query).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(results) => {
            if json {
                println!("{}", results_to_json(&results));
            } else {
                print_results(&results);
            }
        }
        Err(e) => {
            eprintln!("{} Search failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_similar(args: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let raw_url = args.get_one::<String>("URL").unwrap();
    let json = args.get_flag("json");

    let Some(url) = normalize_url_arg(raw_url) else {
        eprintln!("{} Invalid URL: {}", "✗".red().bold(), raw_url);
        std::process::exit(1);
    };

    let client = provider_client();

    let spinner = start_spinner(&format!("Finding content similar to: {}", url));
    let outcome = client.find_similar(&url).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(results) => {
            if json {
                println!("{}", results_to_json(&results));
            } else {
                print_results(&results);
            }
        }
        Err(e) => {
            eprintln!("{} Find similar failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
