// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Configuration sources

use std::sync::Arc;

use parking_lot::RwLock;

use super::document::HostDocument;
use crate::error::Result;

/// Where the reporter reads its configuration text from.
///
/// Consulted once per violation event. `Ok(None)` means reporting is
/// disabled; `Err` is logged by the reporter and halts that event only.
pub trait ConfigSource: Send + Sync {
    /// Raw configuration text, if any
    fn config_text(&self) -> Result<Option<String>>;
}

impl ConfigSource for HostDocument {
    fn config_text(&self) -> Result<Option<String>> {
        self.get_element_text_by_id(self.config_id())
    }
}

/// Configuration text handed to the reporter directly
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    text: Arc<RwLock<Option<String>>>,
}

impl StaticConfig {
    /// Source that always returns `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Arc::new(RwLock::new(Some(text.into()))),
        }
    }

    /// Source with no configuration (reporting disabled)
    pub fn absent() -> Self {
        Self::default()
    }

    /// Replace the configuration text
    pub fn set(&self, text: impl Into<String>) {
        *self.text.write() = Some(text.into());
    }

    /// Remove the configuration
    pub fn clear(&self) {
        *self.text.write() = None;
    }
}

impl ConfigSource for StaticConfig {
    fn config_text(&self) -> Result<Option<String>> {
        Ok(self.text.read().clone())
    }
}

impl<T: ConfigSource + ?Sized> ConfigSource for Arc<T> {
    fn config_text(&self) -> Result<Option<String>> {
        (**self).config_text()
    }
}
