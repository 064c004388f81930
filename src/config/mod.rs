//! Configuration loaded from `.hsevault.toml`.

pub mod settings;

pub use settings::Settings;
