//! Speaker notes extraction and the `notes.txt` writer.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{ExportError, Result};
use crate::models::{PageElement, Slide};

/// Flatten a slide's speaker notes into text.
///
/// Every shape with a text body on the notes page contributes the
/// concatenation of its text runs as one line. Groups are searched
/// recursively. Shapes without text contribute nothing.
pub fn extract_notes(slide: &Slide) -> String {
    let mut notes = String::new();
    if let Some(page) = &slide.notes_page {
        collect_elements(&page.page_elements, &mut notes);
    }
    notes
}

fn collect_elements(elements: &[PageElement], out: &mut String) {
    for element in elements {
        if let Some(text) = element.shape.as_ref().and_then(|s| s.text.as_ref()) {
            let line: String = text
                .text_elements
                .iter()
                .filter_map(|e| e.text_run.as_ref())
                .filter_map(|run| run.content.as_deref())
                .collect();

            if !line.is_empty() {
                out.push_str(&line);
                if !line.ends_with('\n') {
                    out.push('\n');
                }
            }
        }

        if let Some(group) = &element.element_group {
            collect_elements(&group.children, out);
        }
    }
}

/// Writer for the notes file. Each slide gets a `Slide <n>:` header
/// followed by its notes.
pub struct NotesSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl NotesSink {
    /// Create the notes file, truncating any previous content.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .await
            .map_err(|e| ExportError::output(&path, e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub async fn write_header(&mut self, slide_index: usize) -> Result<()> {
        self.write(format!("Slide {}:\n", slide_index).as_bytes())
            .await
    }

    pub async fn write_notes(&mut self, notes: &str) -> Result<()> {
        if notes.is_empty() {
            return Ok(());
        }
        self.write(notes.as_bytes()).await
    }

    /// Flush buffered output and close the file.
    pub async fn finish(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .await
            .map_err(|e| ExportError::output(&self.path, e))?;
        Ok(self.path)
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .await
            .map_err(|e| ExportError::output(&self.path, e))
    }
}
