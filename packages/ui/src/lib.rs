//! This crate contains all shared UI for the workspace.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub mod rich_text_editor;
pub use rich_text_editor::{RichTextEditor, Toolbar, ToolbarAction};

pub use richtext::{EditorConfig, ToolbarPosition};
