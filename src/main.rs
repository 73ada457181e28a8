//! slides_export CLI - Export slide images and speaker notes.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use slides_export::{extract_presentation_id, ExportConfig, Exporter, ThumbnailSize};

/// Export every slide of a Google Slides deck as an image, plus its speaker notes.
#[derive(Parser)]
#[command(name = "slides_export")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Presentation URL or ID.
    #[arg(env = "SLIDES_PRESENTATION_ID")]
    presentation: String,

    /// Path to the OAuth client credentials JSON file.
    #[arg(long, env = "SLIDES_CREDENTIALS", default_value = "credentials.json")]
    credentials: PathBuf,

    /// Path where the OAuth token is cached.
    #[arg(long, env = "SLIDES_TOKEN_FILE", default_value = "token.json")]
    token: PathBuf,

    /// Directory receiving image<N>.jpg and notes.txt.
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,

    /// Rendered thumbnail size (service default when omitted).
    #[arg(long, value_enum)]
    thumbnail_size: Option<SizeArg>,

    /// Discard the cached token and authorize again.
    #[arg(long)]
    reauth: bool,

    /// Enable debug logging.
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SizeArg {
    Large,
    Medium,
    Small,
}

impl From<SizeArg> for ThumbnailSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Large => ThumbnailSize::Large,
            SizeArg::Medium => ThumbnailSize::Medium,
            SizeArg::Small => ThumbnailSize::Small,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let presentation_id = extract_presentation_id(&cli.presentation)
        .with_context(|| format!("Invalid presentation URL or ID: {}", cli.presentation))?;

    let mut config = ExportConfig::new(presentation_id);
    config.credentials_path = cli.credentials;
    config.token_path = cli.token;
    config.output_dir = cli.output_dir;
    config.thumbnail_size = cli.thumbnail_size.map(Into::into);
    config.reauth = cli.reauth;

    let presentation_id = config.presentation_id.clone();
    let summary = Exporter::new(config)
        .run()
        .await
        .map_err(|e| {
            let kind = e.kind();
            anyhow::Error::new(e).context(format!("{:?} error", kind))
        })
        .with_context(|| format!("Failed to export presentation: {}", presentation_id))?;

    println!(
        "Exported {} slide(s); notes saved to {}",
        summary.slide_count,
        summary.notes_path.display()
    );

    Ok(())
}
