//! Order PDF export
//!
//! A single A4 page: title band, optional design snapshot, product details,
//! notes, order volume, total quantity and a footer. Coordinates below are
//! millimeters from the top-left corner and flipped for PDF on output.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Polygon, Rgb,
};

use crate::order::OrderSummary;
use crate::snapshot::SnapshotImage;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const SNAPSHOT_BOX: f32 = 50.0;
const LINE_HEIGHT: f32 = 9.0;
const NOTES_WRAP_CHARS: usize = 48;

const INK: (u8, u8, u8) = (15, 23, 42);
const MUTED: (u8, u8, u8) = (100, 116, 139);
const BAND: (u8, u8, u8) = (241, 245, 249);
const RULE: (u8, u8, u8) = (226, 232, 240);
const FOOTER: (u8, u8, u8) = (148, 163, 184);

/// PDF export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Snapshot image error: {0}")]
    Image(String),
}

/// Render the order summary to PDF bytes
pub fn export_order_pdf(
    summary: &OrderSummary,
    snapshot: Option<&SnapshotImage>,
) -> Result<Vec<u8>, ExportError> {
    let (doc, page, layer) =
        PdfDocument::new("Order Configuration", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let italic = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let page = Page { layer: &layer };

    // Title band
    page.fill_rect(0.0, 0.0, PAGE_WIDTH, 40.0, BAND);
    page.text("ORDER CONFIGURATION", 22.0, MARGIN, 22.0, &bold, INK);
    if let Some(date) = &summary.generated_on {
        page.text(&format!("Generated on {}", date), 10.0, MARGIN, 32.0, &regular, MUTED);
    }

    // Snapshot on the left, details beside it
    let mut details_x = MARGIN;
    if let Some(snapshot) = snapshot {
        match page.snapshot(snapshot) {
            Ok(()) => details_x = 100.0,
            Err(e) => tracing::warn!("Leaving snapshot out of PDF: {}", e),
        }
    }

    page.text("Product Details", 14.0, details_x, 55.0, &bold, INK);
    let mut y = 65.0;
    for row in &summary.specifications {
        page.text(row.label, 10.0, details_x, y, &bold, MUTED);
        page.text(&row.value, 10.0, details_x + 40.0, y, &regular, INK);
        y += LINE_HEIGHT;
    }

    if let Some(notes) = &summary.notes {
        y += 5.0;
        page.text("Notes:", 10.0, details_x, y, &bold, MUTED);
        y += 5.0;
        for line in wrap_words(notes, NOTES_WRAP_CHARS) {
            page.text(&line, 10.0, details_x, y, &italic, (51, 65, 85));
            y += 6.0;
        }
    }

    // Order volume
    let mut y = f32::max(140.0, y + 20.0);
    page.fill_rect(MARGIN, y - 10.0, PAGE_WIDTH - 2.0 * MARGIN, 12.0, BAND);
    page.text("Order Volume", 12.0, 25.0, y - 2.0, &bold, INK);
    y += 10.0;
    for (figure, x) in summary.volume.iter().zip([25.0, 80.0, 135.0]) {
        page.text(&figure.label.to_uppercase(), 8.0, x, y + 5.0, &regular, MUTED);
        page.text(&figure.value, 12.0, x, y + 15.0, &bold, INK);
    }

    // Total
    y += 35.0;
    page.rule(MARGIN, PAGE_WIDTH - MARGIN, y - 10.0, RULE);
    page.text("Total Quantity", 14.0, MARGIN, y, &regular, INK);
    let total = summary.total_formatted();
    page.text_right(&total, 24.0, PAGE_WIDTH - MARGIN, y, &bold, INK);
    page.text_right("Straws", 10.0, PAGE_WIDTH - MARGIN, y + 6.0, &regular, MUTED);

    page.text_centered(
        "Generated by Straw Configurator",
        8.0,
        PAGE_WIDTH / 2.0,
        PAGE_HEIGHT - 10.0,
        &regular,
        FOOTER,
    );

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

/// Drawing helpers working in top-left millimeter coordinates
struct Page<'a> {
    layer: &'a PdfLayerReference,
}

impl Page<'_> {
    fn color((r, g, b): (u8, u8, u8)) -> Color {
        Color::Rgb(Rgb::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            None,
        ))
    }

    fn point(x: f32, y: f32) -> Point {
        Point::new(Mm(x), Mm(PAGE_HEIGHT - y))
    }

    fn text(
        &self,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        font: &IndirectFontRef,
        color: (u8, u8, u8),
    ) {
        self.layer.set_fill_color(Self::color(color));
        self.layer
            .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT - y), font);
    }

    fn text_right(
        &self,
        text: &str,
        size: f32,
        right: f32,
        y: f32,
        font: &IndirectFontRef,
        color: (u8, u8, u8),
    ) {
        self.text(text, size, right - text_width(text, size), y, font, color);
    }

    fn text_centered(
        &self,
        text: &str,
        size: f32,
        center: f32,
        y: f32,
        font: &IndirectFontRef,
        color: (u8, u8, u8),
    ) {
        self.text(text, size, center - text_width(text, size) / 2.0, y, font, color);
    }

    fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32, color: (u8, u8, u8)) {
        self.layer.set_fill_color(Self::color(color));
        self.layer.add_polygon(Polygon {
            rings: vec![vec![
                (Self::point(x, y), false),
                (Self::point(x + width, y), false),
                (Self::point(x + width, y + height), false),
                (Self::point(x, y + height), false),
            ]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn rule(&self, x0: f32, x1: f32, y: f32, color: (u8, u8, u8)) {
        self.layer.set_outline_color(Self::color(color));
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![(Self::point(x0, y), false), (Self::point(x1, y), false)],
            is_closed: false,
        });
    }

    /// Snapshot framed in a box, fitted into a square keeping its aspect ratio
    fn snapshot(&self, snapshot: &SnapshotImage) -> Result<(), ExportError> {
        let image = printpdf::image_crate::load_from_memory(&snapshot.png)
            .map_err(|e| ExportError::Image(e.to_string()))?;
        let (width, height) = (image.width().max(1) as f32, image.height().max(1) as f32);

        self.fill_rect(MARGIN, 50.0, 70.0, 70.0, RULE);
        self.fill_rect(MARGIN + 0.5, 50.5, 69.0, 69.0, (255, 255, 255));

        let aspect = width / height;
        let (fit_w, fit_h) = if aspect > 1.0 {
            (SNAPSHOT_BOX, SNAPSHOT_BOX / aspect)
        } else {
            (SNAPSHOT_BOX * aspect, SNAPSHOT_BOX)
        };
        let x = 30.0 + (SNAPSHOT_BOX - fit_w) / 2.0;
        let y = 60.0 + (SNAPSHOT_BOX - fit_h) / 2.0;

        // At this dpi the image is exactly fit_w millimeters wide
        let dpi = width * 25.4 / fit_w;
        Image::from_dynamic_image(&image).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(PAGE_HEIGHT - y - fit_h)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }
}

/// Approximate Helvetica advance width in millimeters
fn text_width(text: &str, size_pt: f32) -> f32 {
    const PT_TO_MM: f32 = 25.4 / 72.0;
    text.chars().count() as f32 * size_pt * 0.55 * PT_TO_MM
}

/// Greedy word wrap; words longer than `max` get a line of their own
fn wrap_words(text: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    fn summary() -> OrderSummary {
        let config = Configuration {
            comments: "Please ship in two batches.\nLabel every master carton.".to_string(),
            num_master_cartons: Some(10),
            qty_per_inner_box: Some(500),
            inner_boxes_per_carton: Some(20),
            ..Configuration::default()
        };
        OrderSummary::from_config(&config).with_generated_on("2024-05-17")
    }

    #[test]
    fn test_pdf_header() {
        let bytes = export_order_pdf(&summary(), None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_pdf_with_snapshot() {
        let pixels = vec![200u8; 8 * 6 * 4];
        let snapshot = SnapshotImage::from_rgba(8, 6, pixels).unwrap();
        let with_image = export_order_pdf(&summary(), Some(&snapshot)).unwrap();
        assert!(with_image.starts_with(b"%PDF"));
    }

    #[test]
    fn test_broken_snapshot_is_left_out() {
        let snapshot = SnapshotImage {
            width: 1,
            height: 1,
            png: b"not a png".to_vec(),
        };
        let bytes = export_order_pdf(&summary(), Some(&snapshot)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_pdf_written_to_file() {
        let bytes = export_order_pdf(&summary(), None).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(crate::constants::ORDER_PDF_FILE_NAME);
        std::fs::write(&path, &bytes).unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), bytes.len());
    }

    #[test]
    fn test_wrap_words() {
        let lines = wrap_words("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
        assert_eq!(wrap_words("a\nb", 10), vec!["a", "b"]);
    }
}
