//! Snapshot download and PDF export handlers

use straw_core::{
    CaptureRequest, ORDER_PDF_FILE_NAME, OrderSummary, SnapshotImage, export_order_pdf,
    iso_date_from_unix,
};

use crate::state::{AppAction, CapturePurpose};

use super::{ActionContext, save_bytes};

/// Request id used for download captures
const DOWNLOAD_REQUEST: CaptureRequest = CaptureRequest(u64::MAX);

/// Handle export actions
pub fn handle_export_action(action: AppAction, ctx: &mut ActionContext) {
    match action {
        AppAction::DownloadSnapshot => handle_download_snapshot(ctx),
        AppAction::ExportPdf => handle_export_pdf(ctx),
        _ => {}
    }
}

fn handle_download_snapshot(ctx: &mut ActionContext) {
    let Some(viewport_state) = ctx.viewport_state else {
        tracing::warn!("Snapshot download needs a rendering context");
        return;
    };
    if let Err(e) = viewport_state
        .lock()
        .capture(DOWNLOAD_REQUEST, CapturePurpose::Download)
    {
        tracing::warn!("Snapshot download not started: {}", e);
    }
}

fn handle_export_pdf(ctx: &mut ActionContext) {
    let document = {
        let state = ctx.app_state.lock();
        let mut summary = OrderSummary::from_config(state.config());
        if let Some(date) = today() {
            summary = summary.with_generated_on(date);
        }
        export_order_pdf(&summary, state.review.snapshot())
    };

    match document {
        Ok(bytes) => save_bytes(ORDER_PDF_FILE_NAME, "PDF document", &["pdf"], &bytes),
        Err(e) => tracing::warn!("PDF export failed: {}", e),
    }
}

/// Save a captured snapshot as PNG
pub fn save_snapshot(image: &SnapshotImage) {
    save_bytes(
        SnapshotImage::file_name(),
        "PNG image",
        &["png"],
        &image.png,
    );
}

/// Today's date as `YYYY-MM-DD`, UTC
pub fn today() -> Option<String> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let elapsed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?;
        Some(iso_date_from_unix(elapsed.as_secs()))
    }

    #[cfg(target_arch = "wasm32")]
    {
        let millis = js_sys::Date::now();
        (millis >= 0.0).then(|| iso_date_from_unix((millis / 1000.0) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_is_iso_date() {
        let date = today().unwrap();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
        assert_eq!(&date[7..8], "-");
    }
}
