//! # Rich text surface: controlled-value editing core
//!
//! Everything in here is independent of any rendering backend. A host owns the
//! markup string; [`RichTextSurface`] renders it into an editable region,
//! applies formatting commands, tracks the active formats at the cursor and
//! reports every change back as a complete markup snapshot.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`markup`] | Lenient HTML-fragment reader and canonical writer, emptiness checks. |
//! | [`document`] | Attributed text model (blocks of marked runs) and the edits on it. |
//! | [`command`] | Formatting commands and their native verb names. |
//! | [`format`] | The active format set shown by a toolbar. |
//! | [`host`] | Focus, selection-change events and prompts of the hosting document. |
//! | [`sync`] | Render and emission rules shared with the browser binding. |
//! | [`surface`] | The controller tying it all together. |
//! | [`config`] | `richtext.toml` editor configuration. |

pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod host;
pub mod markup;
pub mod surface;
pub mod sync;

pub use command::{BlockFormat, Command};
pub use config::{EditorConfig, ToolbarPosition};
pub use document::{Block, BlockKind, Document, Marks, Position, Run, Selection};
pub use error::Error;
pub use format::{ActiveFormats, Format};
pub use host::{ElementId, Host, Subscription};
pub use surface::{InputEvent, Key, KeyOutcome, RichTextSurface, SurfaceOptions};
