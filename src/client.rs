//! Google Slides API client for reading decks and slide thumbnails.

use reqwest::{Response, StatusCode};
use tracing::debug;

use crate::auth::AuthorizedSession;
use crate::error::{ExportError, Result};
use crate::models::{
    ApiErrorResponse, Deck, Presentation, Slide, ThumbnailRef, ThumbnailResponse,
};

/// Base URL for Google Slides API.
pub const SLIDES_API_BASE: &str = "https://slides.googleapis.com";

/// Rendered thumbnail size requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSize {
    Large,
    Medium,
    Small,
}

impl ThumbnailSize {
    fn as_api_str(self) -> &'static str {
        match self {
            ThumbnailSize::Large => "LARGE",
            ThumbnailSize::Medium => "MEDIUM",
            ThumbnailSize::Small => "SMALL",
        }
    }
}

/// Client for the presentations and pages endpoints.
pub struct SlidesClient {
    session: AuthorizedSession,
    base_url: String,
}

impl SlidesClient {
    /// Create a new SlidesClient talking to the public API.
    pub fn new(session: AuthorizedSession) -> Self {
        Self::with_base_url(session, SLIDES_API_BASE)
    }

    /// Create a client against a different API host.
    pub fn with_base_url(session: AuthorizedSession, base_url: impl Into<String>) -> Self {
        Self {
            session,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a presentation and its slides in display order.
    pub async fn get_deck(&self, presentation_id: &str) -> Result<Deck> {
        let token = self.session.access_token().await?;

        let response = self
            .session
            .http()
            .get(format!("{}/v1/presentations/{}", self.base_url, presentation_id))
            .bearer_auth(&token)
            .send()
            .await?;

        let response = check_status(response, presentation_id).await?;
        let presentation: Presentation = response.json().await?;

        debug!(
            "fetched presentation {} with {} slides",
            presentation.presentation_id,
            presentation.slides.len()
        );
        Ok(Deck::from_presentation(presentation))
    }

    /// Ask the service to render a slide and return the image URL.
    pub async fn get_thumbnail(
        &self,
        presentation_id: &str,
        slide: &Slide,
        size: Option<ThumbnailSize>,
    ) -> Result<ThumbnailRef> {
        let token = self.session.access_token().await?;

        let mut request = self
            .session
            .http()
            .get(format!(
                "{}/v1/presentations/{}/pages/{}/thumbnail",
                self.base_url, presentation_id, slide.object_id
            ))
            .bearer_auth(&token);

        if let Some(size) = size {
            request = request.query(&[("thumbnailProperties.thumbnailSize", size.as_api_str())]);
        }

        let response = request.send().await?;
        let response = check_status(response, &slide.object_id).await?;
        let thumbnail: ThumbnailResponse = response.json().await?;

        Ok(ThumbnailRef {
            content_url: thumbnail.content_url,
            slide_index: slide.index,
            width: thumbnail.width,
            height: thumbnail.height,
        })
    }
}

/// Map a non-success response to an error, naming `resource` for 404/403.
async fn check_status(response: Response, resource: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ApiErrorResponse>(&error_body) {
        Ok(api_error) => (api_error.error.code, api_error.error.message),
        Err(_) => (status.as_u16(), error_body),
    };

    Err(match StatusCode::from_u16(code).unwrap_or(status) {
        StatusCode::NOT_FOUND => ExportError::NotFound(format!("{}: {}", resource, message)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ExportError::PermissionDenied(format!("{}: {}", resource, message))
        }
        _ => ExportError::Api {
            status: code,
            message,
        },
    })
}
