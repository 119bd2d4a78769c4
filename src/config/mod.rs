//! Configuration management for snaptile

pub mod settings;
pub mod store;

pub use settings::{GapChange, Settings, TilingConfig};
pub use store::{
    FileSettingsStore, FileStoreConfig, InMemorySettingsStore, SettingsStore, SettingsStoreError,
};
