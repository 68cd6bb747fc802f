//! # Inference Reports
//!
//! Packages an analysis for the customer: a standalone HTML page or an A4
//! PDF receipt.
//!
//! ## PDF Layout
//! ```text
//! ┌──────────────────────────────────────┐
//! │ KAMPS Royal Pharmacy - RX Pro Receipt│  ← bold title
//! │                                      │
//! │ Customer: asha                       │
//! │ Date: 2026-10-19                     │
//! │                                      │
//! │ RX Content:                          │  ← bold headings
//! │ ...wrapped text...                   │
//! │ Inference Instructions:              │
//! │ AI Inference Result:                 │
//! │ POS Transaction Summary:             │  ← only with an order
//! └──────────────────────────────────────┘
//! ```
//! Text is drawn with the built-in Helvetica font, which only covers
//! Latin-1; anything else is printed as `?`.

use chrono::NaiveDate;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use rxpro_core::OrderRecord;
use serde::Serialize;

use crate::error::{InferenceError, InferenceResult};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 6.0;
/// Characters per line at 11pt Helvetica across the text width.
const WRAP_COLUMNS: usize = 90;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT_MM - 2.0 * MARGIN_MM) / LINE_HEIGHT_MM) as usize;

/// The order an analysis was run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    pub order_id: String,
    pub items: String,
    pub quantities: String,
}

impl From<&OrderRecord> for TransactionSummary {
    fn from(order: &OrderRecord) -> Self {
        TransactionSummary {
            order_id: order.id.clone(),
            items: order.items.clone(),
            quantities: order.quantities.clone(),
        }
    }
}

/// Everything printed on an RX Pro report.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceReport {
    pub store: String,
    pub customer: String,
    pub date: NaiveDate,
    /// `(Image provided)` when the prescription was only a photo.
    pub rx_content: String,
    pub instructions: String,
    pub result: String,
    pub transaction: Option<TransactionSummary>,
}

/// Shown as RX content when only an image was analysed.
pub const IMAGE_ONLY_RX: &str = "(Image provided)";

/// Download name for a customer's PDF report.
pub fn rxpro_report_file_name(customer: &str) -> String {
    format!("{}_rxpro_receipt.pdf", customer)
}

// =============================================================================
// HTML
// =============================================================================

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Standalone HTML page for the report.
pub fn render_html(report: &InferenceReport) -> String {
    let section = |heading: &str, body: &str| {
        format!(
            "<h2>{}</h2>\n<pre>{}</pre>\n",
            escape_html(heading),
            escape_html(body)
        )
    };

    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>RX Pro Inference</title>\n\
         <style>body{font-family:sans-serif;max-width:48rem;margin:2rem auto}\
         pre{white-space:pre-wrap}</style>\n</head>\n<body>\n",
    );
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&report.store)));
    html.push_str(&format!(
        "<p>Customer: {}<br>Date: {}</p>\n",
        escape_html(&report.customer),
        report.date.format("%Y-%m-%d")
    ));
    html.push_str(&section("RX Content", &report.rx_content));
    html.push_str(&section("Inference Instructions", &report.instructions));
    html.push_str(&section("AI Inference Result", &report.result));
    if let Some(tx) = &report.transaction {
        html.push_str(&section(
            "POS Transaction Summary",
            &format!(
                "Items: {}\nQuantities: {}\nOrder ID: {}",
                tx.items, tx.quantities, tx.order_id
            ),
        ));
    }
    html.push_str("</body>\n</html>\n");
    html
}

// =============================================================================
// PDF
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    Title,
    Heading,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PdfLine {
    text: String,
    style: LineStyle,
}

impl PdfLine {
    fn new(text: impl Into<String>, style: LineStyle) -> Self {
        PdfLine {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        PdfLine::new("", LineStyle::Body)
    }
}

/// Replaces characters outside Latin-1 with `?` and tabs with a space.
/// Newlines are kept for wrapping.
fn sanitize_latin1(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => '\n',
            '\t' => ' ',
            c if (c as u32) > 0xFF || c.is_control() => '?',
            c => c,
        })
        .collect()
}

/// Word-wraps each paragraph to `columns`, splitting overlong words.
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > columns {
                if !line.is_empty() {
                    out.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(columns);
                out.push(word.into_iter().collect());
                word = rest;
            }
            let line_len = line.chars().count();
            if line_len > 0 && line_len + 1 + word.len() > columns {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.extend(word);
        }
        out.push(line);
    }
    out
}

fn pdf_lines(report: &InferenceReport) -> Vec<PdfLine> {
    let mut lines = vec![
        PdfLine::new(format!("{} - RX Pro Receipt", report.store), LineStyle::Title),
        PdfLine::blank(),
    ];

    let mut section = |heading: Option<&str>, body: &str| {
        if let Some(heading) = heading {
            lines.push(PdfLine::new(heading, LineStyle::Heading));
        }
        for text in wrap(&sanitize_latin1(body), WRAP_COLUMNS) {
            lines.push(PdfLine::new(text, LineStyle::Body));
        }
        lines.push(PdfLine::blank());
    };

    section(
        None,
        &format!(
            "Customer: {}\nDate: {}",
            report.customer,
            report.date.format("%Y-%m-%d")
        ),
    );
    section(Some("RX Content:"), &report.rx_content);
    section(Some("Inference Instructions:"), &report.instructions);
    section(Some("AI Inference Result:"), &report.result);
    if let Some(tx) = &report.transaction {
        section(
            Some("POS Transaction Summary:"),
            &format!(
                "Items: {}\nQuantities: {}\nOrder ID: {}",
                tx.items, tx.quantities, tx.order_id
            ),
        );
    }

    for line in &mut lines {
        line.text = sanitize_latin1(&line.text);
    }
    lines
}

fn paginate(lines: Vec<PdfLine>) -> Vec<Vec<PdfLine>> {
    let mut pages: Vec<Vec<PdfLine>> = lines
        .chunks(LINES_PER_PAGE)
        .map(|chunk| chunk.to_vec())
        .collect();
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    pages
}

/// A4 PDF receipt for the report.
pub fn render_pdf(report: &InferenceReport) -> InferenceResult<Vec<u8>> {
    let title = sanitize_latin1(&format!("{} - RX Pro Receipt", report.store));
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| InferenceError::Pdf(format!("{:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| InferenceError::Pdf(format!("{:?}", e)))?;

    for (index, page_lines) in paginate(pdf_lines(report)).into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        for line in page_lines {
            if !line.text.is_empty() {
                let (font, size) = match line.style {
                    LineStyle::Title => (&bold, 14.0),
                    LineStyle::Heading => (&bold, 11.0),
                    LineStyle::Body => (&regular, 11.0),
                };
                layer.use_text(line.text, size, Mm(MARGIN_MM), Mm(y), font);
            }
            y -= LINE_HEIGHT_MM;
        }
    }

    doc.save_to_bytes()
        .map_err(|e| InferenceError::Pdf(format!("{:?}", e)))
}
