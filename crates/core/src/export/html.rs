//! Standalone HTML page export.

use super::ExportDocument;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn body_to_html(body: &str) -> String {
    body.lines()
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("<br>\n")
}

const STYLE: &str = "\
body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; line-height: 1.6; }
.header { text-align: center; margin-bottom: 30px; border-bottom: 2px solid #333; padding-bottom: 20px; }
.content { margin: 20px 0; }
.footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #ccc; font-size: 12px; color: #666; }";

/// Render a full HTML document. All user-provided text is escaped.
pub fn render_html(doc: &ExportDocument) -> String {
    let title = escape_html(&doc.title);
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <style>\n{STYLE}\n</style>\n\
         </head>\n\
         <body>\n\
         <div class=\"header\">\n<h1>{title}</h1>\n<p>{generated}</p>\n</div>\n\
         <div class=\"content\">\n{content}\n</div>\n\
         <div class=\"footer\">\n<p>{footer}</p>\n</div>\n\
         </body>\n\
         </html>\n",
        generated = escape_html(&doc.generated_on()),
        content = body_to_html(&doc.body),
        footer = escape_html(&doc.footer()),
    )
}
