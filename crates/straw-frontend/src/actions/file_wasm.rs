//! WASM file output through browser downloads

use eframe::wasm_bindgen::JsCast;

/// Offer `data` as a browser download named `file_name`
pub fn save_bytes(file_name: &str, _filter_name: &str, _extensions: &[&str], data: &[u8]) {
    match trigger_download(file_name, data) {
        Ok(()) => tracing::info!("Downloaded {} ({} bytes)", file_name, data.len()),
        Err(e) => tracing::warn!("Download of {} failed: {}", file_name, e),
    }
}

fn trigger_download(file_name: &str, data: &[u8]) -> Result<(), &'static str> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or("no document")?;

    let bytes = js_sys::Uint8Array::new_with_length(data.len() as u32);
    bytes.copy_from(data);
    let parts = js_sys::Array::new();
    parts.push(&bytes.buffer());

    let blob =
        web_sys::Blob::new_with_u8_array_sequence(&parts).map_err(|_| "failed to create blob")?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|_| "failed to create object URL")?;

    let anchor = document
        .create_element("a")
        .map_err(|_| "failed to create link")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "link is not an anchor")?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}
