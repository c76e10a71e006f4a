use crate::application::render::types::{CapturedCodeBlock, ContentSegment, RenderError};

use super::rewrite::PlaceholderMarker;

/// Formatted document whose fenced code blocks are still markers.
pub(crate) struct RenderedDocument {
    pub(crate) html: String,
    pub(crate) code_blocks: Vec<CapturedCodeBlock>,
    pub(crate) marker: PlaceholderMarker,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DocumentPiece<'a> {
    Html(&'a str),
    Code(usize),
}

impl RenderedDocument {
    /// Split the document on its markers, in order. Every captured block must
    /// appear exactly where the walk put it; a missing marker is an error.
    pub(crate) fn pieces(&self) -> Result<Vec<DocumentPiece<'_>>, RenderError> {
        let mut pieces = Vec::with_capacity(self.code_blocks.len() * 2 + 1);
        let mut cursor = 0;

        for ordinal in 0..self.code_blocks.len() {
            let needle = self.marker.for_ordinal(ordinal);
            let offset = self.html[cursor..]
                .find(&needle)
                .ok_or(RenderError::MissingPlaceholder { ordinal })?;
            pieces.push(DocumentPiece::Html(&self.html[cursor..cursor + offset]));
            pieces.push(DocumentPiece::Code(ordinal));
            cursor += offset + needle.len();
        }

        pieces.push(DocumentPiece::Html(&self.html[cursor..]));
        Ok(pieces)
    }

    /// Segments in document order; whitespace-only HTML is dropped.
    pub(crate) fn segments(&self) -> Result<Vec<ContentSegment>, RenderError> {
        let segments = self
            .pieces()?
            .into_iter()
            .filter_map(|piece| match piece {
                DocumentPiece::Html(markup) if markup.trim().is_empty() => None,
                DocumentPiece::Html(markup) => Some(ContentSegment::html(markup)),
                DocumentPiece::Code(ordinal) => {
                    let block = &self.code_blocks[ordinal];
                    Some(ContentSegment::code(
                        block.source.clone(),
                        block.language_or_auto(),
                        ordinal,
                    ))
                }
            })
            .collect();
        Ok(segments)
    }

    /// Single HTML string with every marker replaced by `render_code`'s output.
    pub(crate) fn to_html<F>(&self, mut render_code: F) -> Result<String, RenderError>
    where
        F: FnMut(&CapturedCodeBlock) -> String,
    {
        let mut html = String::with_capacity(self.html.len());
        for piece in self.pieces()? {
            match piece {
                DocumentPiece::Html(markup) => html.push_str(markup),
                DocumentPiece::Code(ordinal) => {
                    html.push_str(&render_code(&self.code_blocks[ordinal]));
                }
            }
        }
        Ok(html)
    }
}
