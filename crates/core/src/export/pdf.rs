//! Minimal PDF 1.4 writer for document export.
//!
//! Produces A4 pages using the standard Type1 Helvetica faces with
//! WinAnsi encoding, so no fonts are embedded. Characters outside that
//! encoding are written as `?`.

use std::fmt::Write as _;

use super::ExportDocument;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;

/// Width of the text column between the side margins.
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

// Object numbers of the fixed objects; pages follow.
const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const FONT_ITALIC_ID: usize = 5;
const INFO_ID: usize = 6;
const FIRST_PAGE_ID: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }
}

#[derive(Debug, Clone)]
struct Line {
    font: Font,
    size: f32,
    leading: f32,
    text: String,
}

impl Line {
    fn new(font: Font, size: f32, text: impl Into<String>) -> Self {
        Self {
            font,
            size,
            leading: size * 1.5,
            text: text.into(),
        }
    }

    fn blank(size: f32) -> Self {
        Self::new(Font::Regular, size, "")
    }
}

/// Advance widths of printable ASCII (0x20..=0x7E) in Helvetica, from the
/// Adobe core font metrics, in 1/1000 em. Oblique shares these.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for WinAnsi glyphs without an entry below; no glyph is wider.
const FALLBACK_WIDTH: u16 = 1000;

fn ascii_width(font: Font, c: char) -> u16 {
    let table = match font {
        Font::Bold => &HELVETICA_BOLD_WIDTHS,
        Font::Regular | Font::Italic => &HELVETICA_WIDTHS,
    };
    table[c as usize - 0x20]
}

/// Advance width of `c` as it will be drawn, in 1/1000 em.
fn char_width(font: Font, c: char) -> u16 {
    let bold = font == Font::Bold;
    let base = match c {
        ' '..='~' => c,
        '\t' | '\u{a0}' => ' ',
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'Ì'..='Ï' | 'ì'..='ï' => return 278,
        'æ' => return 889,
        'œ' => return 944,
        '€' | '«' | '»' | '–' => return 556,
        '°' => return 400,
        '‘' | '’' => return if bold { 278 } else { 222 },
        '“' | '”' => return if bold { 500 } else { 333 },
        // Drawn as `?` when the encoding lacks it.
        c if win_ansi(c) == b'?' => '?',
        _ => return FALLBACK_WIDTH,
    };
    ascii_width(font, base)
}

fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(font, c))).sum();
    units as f32 * size / 1000.0
}

/// Split `word` so the head fits in `max_width`. The head keeps at least
/// one character.
fn split_at_width(word: &str, font: Font, size: f32, max_width: f32) -> (String, String) {
    let mut width = 0.0;
    let mut split = word.len();
    for (i, c) in word.char_indices() {
        let w = f32::from(char_width(font, c)) * size / 1000.0;
        if i > 0 && width + w > max_width {
            split = i;
            break;
        }
        width += w;
    }
    (word[..split].to_string(), word[split..].to_string())
}

/// Greedy word wrap measured in points. Over-long words are split.
fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let space = text_width(" ", font, size);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        let mut word_width = text_width(&word, font, size);
        while word_width > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            let (head, tail) = split_at_width(&word, font, size, max_width);
            lines.push(head);
            word = tail;
            word_width = text_width(&word, font, size);
        }
        if word.is_empty() {
            continue;
        }
        if !current.is_empty() && current_width + space + word_width > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += space;
        }
        current.push_str(&word);
        current_width += word_width;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn layout(doc: &ExportDocument) -> Vec<Line> {
    let mut lines = Vec::new();
    for t in wrap(&doc.title, Font::Bold, 18.0, TEXT_WIDTH) {
        lines.push(Line::new(Font::Bold, 18.0, t));
    }
    for t in wrap(&doc.generated_on(), Font::Italic, 10.0, TEXT_WIDTH) {
        lines.push(Line::new(Font::Italic, 10.0, t));
    }
    lines.push(Line::blank(12.0));

    for paragraph in doc.body.lines() {
        for l in wrap(paragraph, Font::Regular, 12.0, TEXT_WIDTH) {
            lines.push(Line::new(Font::Regular, 12.0, l));
        }
    }

    lines.push(Line::blank(12.0));
    for l in wrap(&doc.footer(), Font::Italic, 10.0, TEXT_WIDTH) {
        lines.push(Line::new(Font::Italic, 10.0, l));
    }
    lines
}

/// Map a char to its WinAnsiEncoding byte.
fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        '\t' => b' ',
        _ => b'?',
    }
}

/// Encode text as a PDF literal string body (without the parentheses).
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match win_ansi(c) {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b @ 0x20..=0x7e => out.push(b as char),
            b => {
                let _ = write!(out, "\\{b:03o}");
            }
        }
    }
    out
}

fn paginate(lines: Vec<Line>) -> Vec<Vec<(f32, Line)>> {
    let mut pages = Vec::new();
    let mut page = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        if y - line.leading < MARGIN && !page.is_empty() {
            pages.push(std::mem::take(&mut page));
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= line.leading;
        page.push((y, line));
    }
    if !page.is_empty() || pages.is_empty() {
        pages.push(page);
    }
    pages
}

fn content_stream(page: &[(f32, Line)]) -> String {
    let mut s = String::new();
    for (y, line) in page {
        if line.text.is_empty() {
            continue;
        }
        let _ = writeln!(
            s,
            "BT /{} {:.0} Tf {:.2} {:.2} Td ({}) Tj ET",
            line.font.resource_name(),
            line.size,
            MARGIN,
            y,
            pdf_string(&line.text)
        );
    }
    s
}

struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// Append object `id`. Objects must be written in increasing id order.
    fn object(&mut self, id: usize, body: &str) {
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.buf
            .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    fn stream(&mut self, id: usize, data: &str) {
        let body = format!(
            "<< /Length {} >>\nstream\n{data}endstream",
            data.len()
        );
        self.object(id, &body);
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for off in &self.offsets {
            let _ = writeln!(xref, "{off:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R /Info {INFO_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            self.offsets.len() + 1
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

fn font_object(base: &str) -> String {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
}

/// Render the document as a complete PDF file.
pub fn render_pdf(doc: &ExportDocument) -> Vec<u8> {
    let pages = paginate(layout(doc));
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| FIRST_PAGE_ID + 2 * i).collect();

    let mut w = PdfWriter::new();
    w.object(CATALOG_ID, &format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"));

    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    w.object(
        PAGES_ID,
        &format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
    );
    w.object(FONT_REGULAR_ID, &font_object("Helvetica"));
    w.object(FONT_BOLD_ID, &font_object("Helvetica-Bold"));
    w.object(FONT_ITALIC_ID, &font_object("Helvetica-Oblique"));
    w.object(
        INFO_ID,
        &format!(
            "<< /Title ({}) /Producer (DocBuilder) >>",
            pdf_string(&doc.title)
        ),
    );

    for (page, id) in pages.iter().zip(&page_ids) {
        w.object(
            *id,
            &format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {PAGE_WIDTH:.0} {PAGE_HEIGHT:.0}] \
                 /Resources << /Font << /F1 {FONT_REGULAR_ID} 0 R /F2 {FONT_BOLD_ID} 0 R /F3 {FONT_ITALIC_ID} 0 R >> >> \
                 /Contents {} 0 R >>",
                id + 1
            ),
        );
        w.stream(id + 1, &content_stream(page));
    }

    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_doc;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn header_and_trailer() {
        let pdf = render_pdf(&sample_doc("Hello"));
        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = render_pdf(&sample_doc("Line 1\nLine 2"));
        let marker = b"startxref\n";
        let pos = pdf
            .windows(marker.len())
            .rposition(|w| w == marker)
            .unwrap()
            + marker.len();
        let tail = std::str::from_utf8(&pdf[pos..]).unwrap();
        let xref_offset: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(pdf[xref_offset..].starts_with(b"xref\n"));

        let xref = std::str::from_utf8(&pdf[xref_offset..]).unwrap();
        let entries: Vec<&str> = xref
            .lines()
            .skip(3)
            .take_while(|l| !l.starts_with("trailer"))
            .collect();
        assert_eq!(entries.len(), 8);
        for (i, entry) in entries.iter().enumerate() {
            let off: usize = entry[..10].parse().unwrap();
            let expected = format!("{} 0 obj", i + 1);
            assert!(pdf[off..].starts_with(expected.as_bytes()), "object {}", i + 1);
        }
    }

    #[test]
    fn stream_length_matches_data() {
        let pdf = as_text(&render_pdf(&sample_doc("abc")));
        let start = pdf.find("/Length ").unwrap() + "/Length ".len();
        let len: usize = pdf[start..].split_whitespace().next().unwrap().parse().unwrap();
        let data_start = pdf[start..].find("stream\n").unwrap() + start + "stream\n".len();
        assert_eq!(&pdf[data_start + len..data_start + len + 9], "endstream");
    }

    #[test]
    fn long_body_spans_multiple_pages() {
        let body = (0..200).map(|i| format!("Line {i}")).collect::<Vec<_>>().join("\n");
        let pdf = as_text(&render_pdf(&sample_doc(&body)));
        assert!(count(&pdf, "/Type /Page ") > 1);
        assert!(pdf.contains("(Line 199) Tj"));
    }

    #[test]
    fn text_is_escaped_and_encoded() {
        assert_eq!(pdf_string(r"a (b) \c"), r"a \(b\) \\c");
        assert_eq!(pdf_string("é€"), "\\351\\200");
        assert_eq!(pdf_string("日本"), "??");
    }

    #[test]
    fn wrapping_uses_glyph_widths() {
        assert_eq!(wrap("aa bb cc", Font::Regular, 10.0, 26.0), vec!["aa bb", "cc"]);
        assert_eq!(
            wrap("abcdefgh", Font::Regular, 10.0, 16.0),
            vec!["ab", "cd", "efg", "h"]
        );
        assert_eq!(wrap("", Font::Regular, 10.0, 100.0), vec![""]);
    }

    #[test]
    fn widths_follow_helvetica_metrics() {
        assert_eq!(char_width(Font::Regular, 'W'), 944);
        assert_eq!(char_width(Font::Regular, 'i'), 222);
        assert_eq!(char_width(Font::Bold, 'i'), 278);
        assert_eq!(char_width(Font::Regular, 'é'), char_width(Font::Regular, 'e'));
        assert_eq!(char_width(Font::Regular, '日'), char_width(Font::Regular, '?'));
        assert!((text_width("1234567890", Font::Regular, 12.0) - 66.72).abs() < 0.001);
    }

    #[test]
    fn every_line_fits_the_text_column() {
        let mut doc = sample_doc(&format!(
            "{}\n{}\n{}\n{}",
            "1234567890 ".repeat(20),
            "CONTRAT A DUREE INDETERMINEE ".repeat(6),
            "W".repeat(200),
            "Rémunération annuelle brute: 45 000 € ".repeat(5),
        ));
        doc.title = "CONTRAT DE TRAVAIL A DUREE INDETERMINEE - ANNEXE".to_string();

        let lines = layout(&doc);
        assert!(lines.len() > 10);
        for line in &lines {
            let width = text_width(&line.text, line.font, line.size);
            assert!(
                width <= PAGE_WIDTH - 2.0 * MARGIN,
                "{width}pt: {:?}",
                line.text
            );
        }
    }
}
