//! # Editor configuration: `richtext.toml`
//!
//! Optional TOML file read by hosts that want to tune the editor without
//! recompiling (filename: [`EditorConfig::filename`] = `"richtext.toml"`).
//!
//! ## Structure
//!
//! ```toml
//! [editor]
//! placeholder = "Write something..."
//! tab_width = 4                # non-breaking spaces inserted by Tab
//! toolbar_position = "top"     # or "bottom"
//! link_prompt = "Enter URL:"
//!
//! [markup]
//! empty_sentinels = ["<br>", "<p><br></p>", "<p></p>", "<div><br></div>"]
//! ```
//!
//! Every field has a default, so a missing or empty file is equivalent to
//! [`EditorConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Top-level configuration stored in `richtext.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub editor: EditorSection,
    #[serde(default)]
    pub markup: MarkupSection,
}

/// Where the formatting toolbar sits relative to the editable region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolbarPosition {
    #[default]
    Top,
    Bottom,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorSection {
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Number of non-breaking spaces Tab inserts.
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,
    #[serde(default)]
    pub toolbar_position: ToolbarPosition,
    /// Message shown by the blocking URL prompt.
    #[serde(default = "default_link_prompt")]
    pub link_prompt: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkupSection {
    /// Markup that renders as an empty editor. Drives the placeholder.
    #[serde(default = "default_empty_sentinels")]
    pub empty_sentinels: Vec<String>,
}

fn default_placeholder() -> String {
    "Start writing...".to_string()
}

fn default_tab_width() -> usize {
    4
}

fn default_link_prompt() -> String {
    "Enter URL:".to_string()
}

fn default_empty_sentinels() -> Vec<String> {
    crate::markup::DEFAULT_EMPTY_SENTINELS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            tab_width: default_tab_width(),
            toolbar_position: ToolbarPosition::default(),
            link_prompt: default_link_prompt(),
        }
    }
}

impl Default for MarkupSection {
    fn default() -> Self {
        Self {
            empty_sentinels: default_empty_sentinels(),
        }
    }
}

impl EditorConfig {
    /// Builder method to move the toolbar.
    pub fn with_toolbar_position(mut self, position: ToolbarPosition) -> Self {
        self.editor.toolbar_position = position;
        self
    }

    /// Builder method to set the Tab indentation width.
    pub fn with_tab_width(mut self, width: usize) -> Self {
        self.editor.tab_width = width;
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "richtext.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Read `richtext.toml` from `dir`, `None` when there is no such file.
    pub fn find(dir: &Path) -> Result<Option<Self>, Error> {
        let path = dir.join(Self::filename());
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no editor config");
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(Some(Self::from_toml(&text)?))
    }

    /// Like [`EditorConfig::find`], with the defaults for a missing file.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        Ok(Self::find(dir)?.unwrap_or_default())
    }

    /// The run of non-breaking spaces inserted by Tab.
    pub fn tab_run(&self) -> String {
        "\u{a0}".repeat(self.editor.tab_width)
    }
}
