//! slides_export - Export a Google Slides deck to local files.
//!
//! This library provides functionality to:
//! - Authorize against Google with a cached OAuth token
//! - Fetch a presentation and render each slide as an image
//! - Collect the speaker notes of every slide into a single text file
//!
//! # Example
//!
//! ```no_run
//! use slides_export::{ExportConfig, Exporter};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ExportConfig::new("presentation-id");
//!     let summary = Exporter::new(config).run().await?;
//!
//!     println!("exported {} slides", summary.slide_count);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod credentials;
pub mod download;
pub mod error;
pub mod export;
pub mod models;
pub mod notes;
pub mod token_store;
pub mod url_parser;

// Re-exports for convenience
pub use auth::{AuthorizedSession, Authenticator, CodeSupplier, FixedCodeSupplier, StdinCodeSupplier};
pub use client::{SlidesClient, ThumbnailSize};
pub use credentials::ClientDescriptor;
pub use download::ThumbnailDownloader;
pub use error::{ErrorKind, ExportError, Result};
pub use export::{ExportConfig, ExportSummary, Exporter};
pub use models::{Deck, Slide, ThumbnailRef};
pub use notes::{extract_notes, NotesSink};
pub use token_store::{Token, TokenStore};
pub use url_parser::extract_presentation_id;
