//! design-extract CLI
//!
//! `extract` prints one extraction response as JSON; `serve` runs the MCP
//! stdio server. Logs go to stderr.

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use design_extract::{BrowserConfig, DesignExtractor, ExtractOptions, FileConfig, McpServer};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Extract a design system from a live website
#[derive(Parser, Debug)]
#[command(name = "design-extract")]
#[command(version)]
#[command(about = "Extract colors, typography, spacing and component styles from a website")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract one URL and print the result as JSON
    Extract {
        /// Target URL
        url: String,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,

        /// Skip the viewport screenshot
        #[arg(long)]
        no_screenshot: bool,

        #[command(flatten)]
        browser: BrowserArgs,
    },
    /// Run the MCP server over stdio
    Serve {
        #[command(flatten)]
        browser: BrowserArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct BrowserArgs {
    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Disable the Chromium sandbox (containers)
    #[arg(long)]
    no_sandbox: bool,

    /// JSON file overriding heuristics and timing
    #[arg(long)]
    config: Option<PathBuf>,
}

impl BrowserArgs {
    fn options(&self) -> anyhow::Result<ExtractOptions> {
        let mut builder = BrowserConfig::builder()
            .headless(!self.headed)
            .sandbox(!self.no_sandbox);
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_path(path.clone());
        }

        let mut options = ExtractOptions {
            browser: builder.build(),
            ..Default::default()
        };

        if let Some(path) = &self.config {
            FileConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?
                .apply(&mut options);
        }
        Ok(options)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Extract {
            url,
            output,
            pretty,
            no_screenshot,
            browser,
        } => {
            let mut options = browser.options()?;
            if no_screenshot {
                options.screenshot = false;
            }

            let response = DesignExtractor::new(options).extract(&url).await;
            let json = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => println!("{}", json),
            }

            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Serve { browser } => {
            let server = McpServer::new(browser.options()?);
            server.run().await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
