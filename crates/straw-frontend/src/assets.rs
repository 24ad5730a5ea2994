//! Part library loading
//!
//! On native, OBJ bundles under `assets/parts/` load on a background thread
//! and the result is handed over through a mutex. Parts missing from the
//! bundles are filled from the built-in procedural set, so loading always
//! ends with a ready library. On the web the built-in set is used directly.

use std::sync::Arc;

use parking_lot::Mutex;

use straw_core::PartLibrary;

/// Directory searched for part bundles
pub const PARTS_DIR: &str = "assets/parts";

/// Part library that becomes available once loading finishes
pub struct PartAssets {
    slot: Arc<Mutex<Option<PartLibrary>>>,
    library: Option<Arc<PartLibrary>>,
}

impl PartAssets {
    /// Start loading parts
    pub fn load() -> Self {
        let slot = Arc::new(Mutex::new(None));

        #[cfg(not(target_arch = "wasm32"))]
        {
            let slot = Arc::clone(&slot);
            let spawned = std::thread::Builder::new()
                .name("part-loader".to_string())
                .spawn(move || {
                    *slot.lock() = Some(load_library(std::path::Path::new(PARTS_DIR)));
                });
            if let Err(e) = spawned {
                tracing::warn!("Could not start part loader thread: {}", e);
                return Self::ready(PartLibrary::builtin());
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            *slot.lock() = Some(PartLibrary::builtin());
        }

        Self {
            slot,
            library: None,
        }
    }

    /// Already loaded library
    pub fn ready(library: PartLibrary) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            library: Some(Arc::new(library)),
        }
    }

    /// Pick up a finished load. Returns the library the first time it is
    /// seen, `None` before and after.
    pub fn poll(&mut self) -> Option<Arc<PartLibrary>> {
        if self.library.is_some() {
            return None;
        }
        let library = Arc::new(self.slot.lock().take()?);
        tracing::info!("Part library ready ({} parts)", library.len());
        self.library = Some(Arc::clone(&library));
        Some(library)
    }

    /// Loaded library, if any
    pub fn library(&self) -> Option<&Arc<PartLibrary>> {
        self.library.as_ref()
    }
}

/// Load every `.obj` bundle in `dir`, then fill gaps with built-in parts
#[cfg(not(target_arch = "wasm32"))]
fn load_library(dir: &std::path::Path) -> PartLibrary {
    let mut library = PartLibrary::new();

    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut paths: Vec<_> = entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| {
                    path.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"))
                })
                .collect();
            paths.sort();

            for path in paths {
                match straw_core::load_obj_bundle(&path) {
                    Ok(parts) => {
                        tracing::info!("Loaded {} parts from {}", parts.len(), path.display());
                        for (kind, part) in parts {
                            library.insert(kind, part);
                        }
                    }
                    Err(e) => tracing::warn!("Skipping bundle {}: {}", path.display(), e),
                }
            }
        }
        Err(e) => tracing::debug!("No part bundles in {}: {}", dir.display(), e),
    }

    let missing = library.missing_parts();
    if !missing.is_empty() {
        tracing::debug!("Using built-in meshes for {:?}", missing);
    }
    library.with_builtin_fallback()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_library_is_not_reported_again() {
        let mut assets = PartAssets::ready(PartLibrary::builtin());
        assert!(assets.library().is_some());
        assert!(assets.poll().is_none());
    }

    #[test]
    fn test_missing_directory_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let library = load_library(&dir.path().join("missing"));
        assert!(library.is_ready());
    }

    #[test]
    fn test_background_load_becomes_ready() {
        let mut assets = PartAssets::load();
        let start = std::time::Instant::now();
        let library = loop {
            if let Some(library) = assets.poll() {
                break library;
            }
            assert!(start.elapsed() < std::time::Duration::from_secs(30));
            std::thread::sleep(std::time::Duration::from_millis(10));
        };
        assert!(library.is_ready());
        assert!(assets.poll().is_none());
    }
}
