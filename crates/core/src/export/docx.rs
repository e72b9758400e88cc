//! Office Open XML (`.docx`) export built with `docx-rs`.

use std::io::Cursor;

use docx_rs::{AlignmentType, Docx, Paragraph, Run};

use super::{ExportDocument, ExportError};

/// A4 in twentieths of a point.
const A4_WIDTH_TWIPS: u32 = 11906;
const A4_HEIGHT_TWIPS: u32 = 16838;

/// Tabs become spaces; other control characters are not valid XML 1.0.
fn clean_text(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

fn text_paragraph(text: &str) -> Paragraph {
    let paragraph = Paragraph::new();
    if text.is_empty() {
        paragraph
    } else {
        paragraph.add_run(Run::new().add_text(clean_text(text)))
    }
}

fn build_docx(doc: &ExportDocument) -> Docx {
    let mut docx = Docx::new()
        .page_size(A4_WIDTH_TWIPS, A4_HEIGHT_TWIPS)
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(clean_text(&doc.title)).bold().size(32))
                .align(AlignmentType::Center),
        )
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(doc.generated_on()).italic().size(20)),
        )
        .add_paragraph(Paragraph::new());

    for line in doc.body.lines() {
        docx = docx.add_paragraph(text_paragraph(line));
    }

    docx.add_paragraph(Paragraph::new()).add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(clean_text(&doc.footer())).italic().size(18)),
    )
}

/// Package the document as a `.docx` file.
pub fn render_docx(doc: &ExportDocument) -> Result<Vec<u8>, ExportError> {
    let mut cursor = Cursor::new(Vec::new());
    build_docx(doc)
        .build()
        .pack(&mut cursor)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(cursor.into_inner())
}
