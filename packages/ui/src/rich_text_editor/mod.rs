mod bridge;
mod component;
mod toolbar;

pub use component::RichTextEditor;
pub use toolbar::{Toolbar, ToolbarAction};
