//! eframe storage as configuration persistence

use straw_core::{CONFIG_STORAGE_KEY, ConfigStore, KeyValueStorage, MemoryStorage};

/// Adapts eframe storage (local storage on web, an app data file on native)
/// to the configuration store.
///
/// eframe cannot delete keys, so removal writes an empty value and empty
/// values read back as absent.
pub struct EframeStorage<'a>(pub &'a mut dyn eframe::Storage);

impl KeyValueStorage for EframeStorage<'_> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.0.get_string(key).filter(|value| !value.is_empty())
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.0.set_string(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.0.set_string(key, String::new());
    }
}

/// Load the configuration from eframe storage, or defaults without storage
pub fn load_store(storage: Option<&dyn eframe::Storage>) -> ConfigStore {
    let mut seed = MemoryStorage::new();
    if let Some(text) = storage
        .and_then(|s| s.get_string(CONFIG_STORAGE_KEY))
        .filter(|text| !text.is_empty())
    {
        seed.set_string(CONFIG_STORAGE_KEY, text);
    }
    ConfigStore::load(&seed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use straw_core::{ConfigUpdate, EndType};

    use super::*;

    #[derive(Default)]
    struct FakeStorage(HashMap<String, String>);

    impl eframe::Storage for FakeStorage {
        fn get_string(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }

        fn set_string(&mut self, key: &str, value: String) {
            self.0.insert(key.to_string(), value);
        }

        fn flush(&mut self) {}
    }

    #[test]
    fn test_persist_and_reload() {
        let mut backend = FakeStorage::default();
        let mut store = load_store(Some(&backend as &dyn eframe::Storage));
        store.update(
            &mut EframeStorage(&mut backend),
            ConfigUpdate::EndType(EndType::Scoop),
        );

        let reloaded = load_store(Some(&backend as &dyn eframe::Storage));
        assert_eq!(reloaded.config(), store.config());
    }

    #[test]
    fn test_reset_reads_back_as_defaults() {
        let mut backend = FakeStorage::default();
        let mut store = load_store(Some(&backend as &dyn eframe::Storage));
        store.update(&mut EframeStorage(&mut backend), ConfigUpdate::Length(120.0));
        store.reset(&mut EframeStorage(&mut backend));

        assert_eq!(EframeStorage(&mut backend).get_string(CONFIG_STORAGE_KEY), None);
        assert_eq!(load_store(Some(&backend as &dyn eframe::Storage)).config().length_mm, 300.0);
    }

    #[test]
    fn test_no_storage_gives_defaults() {
        assert_eq!(load_store(None).config(), ConfigStore::default().config());
    }
}
