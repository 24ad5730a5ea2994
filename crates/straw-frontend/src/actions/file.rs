//! Native file output

/// Ask for a destination and write `data` there
pub fn save_bytes(file_name: &str, filter_name: &str, extensions: &[&str], data: &[u8]) {
    let Some(path) = rfd::FileDialog::new()
        .add_filter(filter_name, extensions)
        .set_file_name(file_name)
        .save_file()
    else {
        tracing::debug!("Save of {} cancelled", file_name);
        return;
    };

    match std::fs::write(&path, data) {
        Ok(()) => tracing::info!("Saved {} ({} bytes)", path.display(), data.len()),
        Err(e) => tracing::warn!("Failed to save {}: {}", path.display(), e),
    }
}
