//! Data models for Google Slides API responses.

use serde::Deserialize;

/// A presentation as returned by `presentations.get`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub presentation_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slides: Vec<Page>,
}

/// A slide or a notes page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
    #[serde(default)]
    pub slide_properties: Option<SlideProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideProperties {
    #[serde(default)]
    pub notes_page: Option<Box<Page>>,
}

/// A visual element on a page. Only the parts needed to find text are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub element_group: Option<Group>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub children: Vec<PageElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(default)]
    pub shape_type: Option<String>,
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
}

/// One segment of a text body. Paragraph markers and auto text carry no
/// run and are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(default)]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub content: Option<String>,
}

/// Response from `presentations.pages.getThumbnail`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailResponse {
    pub content_url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// OAuth2 token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// A fetched presentation, reduced to what the export needs.
#[derive(Debug, Clone)]
pub struct Deck {
    pub presentation_id: String,
    pub title: Option<String>,
    pub slides: Vec<Slide>,
}

/// A slide in display order.
#[derive(Debug, Clone)]
pub struct Slide {
    /// 1-based position in the deck.
    pub index: usize,
    pub object_id: String,
    pub notes_page: Option<Page>,
}

impl Deck {
    pub fn from_presentation(presentation: Presentation) -> Self {
        let slides = presentation
            .slides
            .into_iter()
            .enumerate()
            .map(|(i, page)| Slide {
                index: i + 1,
                object_id: page.object_id,
                notes_page: page
                    .slide_properties
                    .and_then(|props| props.notes_page)
                    .map(|notes| *notes),
            })
            .collect();

        Self {
            presentation_id: presentation.presentation_id,
            title: presentation.title,
            slides,
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// A short-lived thumbnail image URL for one slide. Must be downloaded
/// right away; the URL expires.
#[derive(Debug, Clone)]
pub struct ThumbnailRef {
    pub content_url: String,
    pub slide_index: usize,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl std::fmt::Display for ThumbnailRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.width, self.height) {
            (Some(w), Some(h)) => write!(f, "slide {} ({}x{})", self.slide_index, w, h),
            _ => write!(f, "slide {}", self.slide_index),
        }
    }
}
