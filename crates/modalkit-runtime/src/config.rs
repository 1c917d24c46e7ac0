#![forbid(unsafe_code)]

//! Session configuration.
//!
//! Defaults reproduce the stock look: layers from 1000 in steps of 10, a
//! blue header over a dark body, medium dialogs, OS-entropy ids.
//!
//! With the `policy-config` feature a config can be read from TOML:
//!
//! ```toml
//! default_size = "md"
//! id_strategy = "entropy"
//!
//! [layers]
//! base = 1000
//! step = 10
//!
//! [theme]
//! header_style = "bg-blue-500 text-white"
//! body_style = "bg-gray-800 text-white"
//!
//! [confirmation]
//! title = "Confirm"
//! confirm_label = "Confirm"
//! cancel_label = "Cancel"
//! warn_style = "bg-red-600 text-white"
//! notify_style = "bg-blue-600 text-white"
//! ```
//!
//! Every key is optional. Unknown size or id strategy names fall back to the
//! default with a warning; only unreadable or syntactically invalid
//! documents are errors.

use modalkit_core::IdStrategy;
use modalkit_widgets::modal::{ConfirmationStyle, LayerPolicy, ModalSize, ModalTheme};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalConfig {
    pub layers: LayerPolicy,
    pub theme: ModalTheme,
    /// Size used when a spec leaves it out.
    pub default_size: ModalSize,
    pub id_strategy: IdStrategy,
    pub confirmation: ConfirmationStyle,
}

impl ModalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_layers(mut self, layers: LayerPolicy) -> Self {
        self.layers = layers;
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: ModalTheme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_default_size(mut self, size: ModalSize) -> Self {
        self.default_size = size;
        self
    }

    #[must_use]
    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_confirmation(mut self, confirmation: ConfirmationStyle) -> Self {
        self.confirmation = confirmation;
        self
    }
}

#[cfg(feature = "policy-config")]
mod file {
    use std::path::Path;

    use serde::Deserialize;

    use super::ModalConfig;
    use crate::error::ModalError;
    use modalkit_core::IdStrategy;
    use modalkit_widgets::modal::{LayerPolicy, ModalSize};

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct RawConfig {
        default_size: Option<String>,
        id_strategy: Option<String>,
        layers: RawLayers,
        theme: RawTheme,
        confirmation: RawConfirmation,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct RawLayers {
        base: Option<u32>,
        step: Option<u32>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct RawTheme {
        header_style: Option<String>,
        body_style: Option<String>,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct RawConfirmation {
        title: Option<String>,
        confirm_label: Option<String>,
        cancel_label: Option<String>,
        warn_style: Option<String>,
        notify_style: Option<String>,
        body_style: Option<String>,
    }

    fn overlay(slot: &mut String, value: Option<String>) {
        if let Some(v) = value {
            *slot = v;
        }
    }

    impl ModalConfig {
        /// Parse a TOML document on top of the defaults.
        pub fn from_toml_str(input: &str) -> Result<Self, ModalError> {
            let raw: RawConfig =
                toml::from_str(input).map_err(|e| ModalError::Config(e.to_string()))?;
            Ok(Self::from_raw(raw))
        }

        /// Read and parse a TOML file.
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ModalError> {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path)
                .map_err(|e| ModalError::Config(format!("{}: {e}", path.display())))?;
            let config = Self::from_toml_str(&text)?;
            tracing::debug!(path = %path.display(), "modal config loaded");
            Ok(config)
        }

        fn from_raw(raw: RawConfig) -> Self {
            let mut config = Self::default();

            if let Some(name) = raw.default_size {
                match ModalSize::parse(&name) {
                    Some(size) => config.default_size = size,
                    None => tracing::warn!(size = %name, "unknown modal size, keeping default"),
                }
            }
            if let Some(name) = raw.id_strategy {
                match IdStrategy::parse(&name) {
                    Some(strategy) => config.id_strategy = strategy,
                    None => tracing::warn!(strategy = %name, "unknown id strategy, keeping default"),
                }
            }

            let layers = config.layers;
            config.layers = LayerPolicy::new(
                raw.layers.base.unwrap_or(layers.base()),
                raw.layers.step.unwrap_or(layers.step()),
            );

            overlay(&mut config.theme.header_style, raw.theme.header_style);
            overlay(&mut config.theme.body_style, raw.theme.body_style);

            let c = raw.confirmation;
            let style = &mut config.confirmation;
            overlay(&mut style.title, c.title);
            overlay(&mut style.confirm_label, c.confirm_label);
            overlay(&mut style.cancel_label, c.cancel_label);
            overlay(&mut style.warn_style, c.warn_style);
            overlay(&mut style.notify_style, c.notify_style);
            overlay(&mut style.body_style, c.body_style);

            config
        }
    }
}
