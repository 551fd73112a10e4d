//! Scholar CLI — terminal client for the research service.
//!
//! Posts a topic to a running Scholar server, renders the brief and
//! comparison table in the terminal, and can export the generated
//! baseline notebook to disk.

mod render;

use clap::Parser;
use scholar_core::{
    Notebook, ResearchClient, clean_error_message, load_config, notebook_filename,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scholar: AI research briefs, comparisons, and baseline notebooks
#[derive(Parser, Debug)]
#[command(name = "scholar", version, about, long_about = None)]
struct Cli {
    /// Research topic to investigate
    topic: String,

    /// Research service endpoint (overrides configuration)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Directory to write the baseline notebook into
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print the raw result as JSON instead of rendering it
    #[arg(long)]
    json: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    if let Err(message) = run(&cli).await {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), String> {
    let cwd = std::env::current_dir().map_err(|e| e.to_string())?;
    let mut config = load_config(Some(&cwd), None).map_err(|e| e.to_string())?;
    if let Some(endpoint) = &cli.endpoint {
        config.client.endpoint = endpoint.clone();
    }

    let client = ResearchClient::new(&config.client)
        .map_err(|e| clean_error_message(&e.to_string()))?;
    let result = client
        .generate(&cli.topic)
        .await
        .map_err(|e| clean_error_message(&e.to_string()))?;

    if cli.json {
        let rendered = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
        println!("{rendered}");
    } else {
        println!("{}", render::render_brief(&result.research_brief));
        let table = render::render_table(&result);
        if !table.is_empty() {
            println!("{table}");
        }
        if !result.notebook_code.is_empty() {
            println!("{}", render::render_brief("## Baseline Notebook Code"));
            println!("{}", render::render_code(&result.notebook_code));
        }
    }

    if let Some(dir) = &cli.out {
        let notebook = Notebook::baseline(&result.notebook_code);
        let bytes = notebook.to_bytes().map_err(|e| e.to_string())?;
        let path = dir.join(notebook_filename(&cli.topic));
        std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
        std::fs::write(&path, bytes).map_err(|e| e.to_string())?;
        println!("Notebook written to {}", path.display());
    }

    Ok(())
}
