//! Export orchestration: authorize, fetch the deck, then write one image per
//! slide and the notes file, strictly in slide order.

use std::path::PathBuf;

use tracing::info;

use crate::auth::{Authenticator, CodeSupplier, StdinCodeSupplier, PRESENTATIONS_READONLY_SCOPE};
use crate::client::{SlidesClient, ThumbnailSize, SLIDES_API_BASE};
use crate::credentials::ClientDescriptor;
use crate::download::ThumbnailDownloader;
use crate::error::{ExportError, Result};
use crate::models::Deck;
use crate::notes::{extract_notes, NotesSink};
use crate::token_store::TokenStore;

/// Name of the notes file inside the output directory.
pub const NOTES_FILE_NAME: &str = "notes.txt";

/// Inputs of one export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub presentation_id: String,
    pub credentials_path: PathBuf,
    pub token_path: PathBuf,
    pub output_dir: PathBuf,
    pub api_base: String,
    pub thumbnail_size: Option<ThumbnailSize>,
    pub scopes: Vec<String>,
    /// Discard any cached token before authorizing.
    pub reauth: bool,
}

impl ExportConfig {
    pub fn new(presentation_id: impl Into<String>) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            credentials_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            output_dir: PathBuf::from("."),
            api_base: SLIDES_API_BASE.to_string(),
            thumbnail_size: None,
            scopes: vec![PRESENTATIONS_READONLY_SCOPE.to_string()],
            reauth: false,
        }
    }

    /// Path of the image written for the slide at `index` (1-based).
    pub fn image_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("image{}.jpg", index))
    }

    pub fn notes_path(&self) -> PathBuf {
        self.output_dir.join(NOTES_FILE_NAME)
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub slide_count: usize,
    pub images: Vec<PathBuf>,
    pub notes_path: PathBuf,
}

/// Runs an export described by an [`ExportConfig`].
pub struct Exporter {
    config: ExportConfig,
    code_supplier: Box<dyn CodeSupplier>,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            code_supplier: Box::new(StdinCodeSupplier),
        }
    }

    pub fn with_code_supplier(mut self, supplier: Box<dyn CodeSupplier>) -> Self {
        self.code_supplier = supplier;
        self
    }

    /// Run the export. The first failure aborts the run; files written up to
    /// that point are left in place.
    pub async fn run(self) -> Result<ExportSummary> {
        let Exporter {
            config,
            code_supplier,
        } = self;

        let descriptor = ClientDescriptor::from_file(&config.credentials_path)?;

        let store = TokenStore::new(&config.token_path);
        if config.reauth {
            store.clear()?;
        }

        let session = Authenticator::new(descriptor, store)
            .with_scopes(config.scopes.clone())
            .with_code_supplier(code_supplier)
            .authorize()
            .await?;

        let client = SlidesClient::with_base_url(session, config.api_base.as_str());
        let downloader = ThumbnailDownloader::new()?;

        let deck = client.get_deck(&config.presentation_id).await?;
        match deck.title.as_deref() {
            Some(title) => info!("Exporting \"{}\" ({} slides)", title, deck.len()),
            None => info!("The presentation contains {} slides", deck.len()),
        }

        tokio::fs::create_dir_all(&config.output_dir)
            .await
            .map_err(|e| ExportError::output(&config.output_dir, e))?;

        let mut sink = NotesSink::create(config.notes_path()).await?;
        let exported = export_slides(&config, &client, &downloader, &deck, &mut sink).await;
        let closed = sink.finish().await;

        let images = exported?;
        let notes_path = closed?;

        Ok(ExportSummary {
            slide_count: deck.len(),
            images,
            notes_path,
        })
    }
}

async fn export_slides(
    config: &ExportConfig,
    client: &SlidesClient,
    downloader: &ThumbnailDownloader,
    deck: &Deck,
    sink: &mut NotesSink,
) -> Result<Vec<PathBuf>> {
    let mut images = Vec::with_capacity(deck.len());

    for slide in &deck.slides {
        info!("Slide {}:", slide.index);
        sink.write_header(slide.index).await?;

        let thumbnail = client
            .get_thumbnail(&deck.presentation_id, slide, config.thumbnail_size)
            .await?;
        let image_path = config.image_path(slide.index);
        let bytes = downloader.download(&thumbnail, &image_path).await?;
        info!("  saved {} ({} bytes)", image_path.display(), bytes);
        images.push(image_path);

        sink.write_notes(&extract_notes(slide)).await?;
    }

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ExportConfig::new("deck");
        assert_eq!(config.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(config.token_path, PathBuf::from("token.json"));
        assert_eq!(config.api_base, SLIDES_API_BASE);
        assert_eq!(config.scopes, vec![PRESENTATIONS_READONLY_SCOPE.to_string()]);
        assert!(!config.reauth);
    }

    #[test]
    fn test_output_paths() {
        let mut config = ExportConfig::new("deck");
        config.output_dir = PathBuf::from("out");
        assert_eq!(config.image_path(3), PathBuf::from("out/image3.jpg"));
        assert_eq!(config.notes_path(), PathBuf::from("out/notes.txt"));
    }
}
