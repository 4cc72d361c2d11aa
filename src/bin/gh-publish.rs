//! CLI for the gh-publish tool.

use anyhow::{Context, Result};
use clap::Parser;
use gh_publish::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gh-publish")]
#[command(author, version, about = "Publish a file to GitHub through a pull request", long_about = None)]
struct Cli {
    /// Path to the JSON config file holding `githubToken`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read the token from GITHUB_TOKEN instead of a config file
    #[arg(long, conflicts_with = "config")]
    env_token: bool,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long, default_value = "https://api.github.com")]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Branch to create
    #[arg(short, long, default_value = "test")]
    branch: String,

    /// Branch to start from and merge into
    #[arg(long, default_value = "main")]
    base: String,

    /// Path of the file in the repository
    #[arg(short, long, default_value = "Hello.txt")]
    path: String,

    /// File content
    #[arg(long, default_value = "Hello world", conflicts_with = "content_file")]
    content: String,

    /// Read the file content from a local file
    #[arg(long)]
    content_file: Option<PathBuf>,

    /// Pull request title (defaults to "Add <path>")
    #[arg(short, long)]
    title: Option<String>,

    /// Pull request body (defaults to "Added <path>")
    #[arg(long)]
    body: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let settings = ClientSettings::new()
        .base_url(&cli.api_url)
        .timeout(cli.timeout);
    let client = GitHubClient::new(&settings).context("Failed to create GitHub client")?;

    let tokens: Box<dyn TokenSource> = if cli.env_token {
        Box::new(EnvTokenSource)
    } else {
        let path = match cli.config {
            Some(path) => path,
            None => Config::default_path().context("No config file given")?,
        };
        Box::new(FileTokenSource::new(path))
    };

    let content = match &cli.content_file {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => cli.content.clone().into_bytes(),
    };

    let mut request = PublishRequest::new(&cli.branch, &cli.base, &cli.path, content);
    if let Some(title) = cli.title {
        request = request.title(title);
    }
    if let Some(body) = cli.body {
        request = request.body(body);
    }

    let ui = ConsoleInteraction::new();
    let report = Workflow::new(&client, tokens.as_ref(), &ui).run(&request);

    match report {
        WorkflowReport::Completed {
            repository,
            branch,
            pull_request,
            ..
        } => {
            println!(
                "Published {} to {}/{} on branch {}",
                request.path,
                repository.owner_login(),
                repository.name,
                branch
            );
            if let Some(url) = pull_request.url() {
                println!("Link: {}", url);
            }
        }
        WorkflowReport::NotCompleted { stage } => {
            println!("Not completed: stopped at {}. Exiting program.", stage);
        }
    }

    Ok(())
}
