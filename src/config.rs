// ABOUTME: Configuration module for the upgrade deck generator
// ABOUTME: Provides output naming, caption policy and PPTX document settings

use crate::pptx::PptxConfig;
use std::path::PathBuf;

/// Settings for a deck generation run
#[derive(Debug, Clone)]
pub struct DeckConfig {
    /// Directory the deck is written to
    pub output_dir: PathBuf,
    /// File name prefix, followed by `_<YYYY-MM-DD_HHMMSS>`
    pub file_prefix: String,
    /// File extension without the dot
    pub extension: String,
    /// Document title stored in the core properties
    pub title: String,
    /// Document author stored in the core properties
    pub creator: String,
    /// When set, a rectangle caption is only written if a text color was given.
    /// Captions with a fill but no text color are left empty.
    pub caption_requires_text_color: bool,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: "Odoo_Database_Upgrade_Process".to_string(),
            extension: "pptx".to_string(),
            title: "Upgrade Process for Odoo Database".to_string(),
            creator: "odoo-upgrade-deck".to_string(),
            caption_requires_text_color: true,
        }
    }
}

impl DeckConfig {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the deck into another directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Get a PPTX configuration with this run's document properties
    pub fn get_pptx_config(&self) -> PptxConfig {
        PptxConfig {
            title: self.title.clone(),
            creator: self.creator.clone(),
            ..PptxConfig::default()
        }
    }
}
