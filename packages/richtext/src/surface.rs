//! # RichTextSurface: controlled rich text editing
//!
//! The host owns the markup string. The surface keeps a rendered copy in an
//! editable region it owns exclusively and follows two rules:
//!
//! - **Render sync**: an external value replaces the rendered content only
//!   while the region is not focused, so pushes from the host never clobber
//!   in-progress typing. The last external value is applied again on blur.
//! - **Emission**: every edit and every command reports the complete markup
//!   through `on_change`, with the empty-line sentinel reported as `""`.
//!
//! The active format set is recomputed from the selection whenever the
//! document-wide selection change event fires while focus is inside the
//! region, and after every command. It is cleared on blur, or as soon as a
//! selection change shows focus has moved to another element; the pending
//! external value is rendered at that point too.
//!
//! Without a selection API (see [`Host::headless`]) every selection-dependent
//! operation is a no-op; render sync keeps working.

use std::cell::RefCell;
use std::rc::Rc;

use crate::command::{BlockFormat, Command};
use crate::config::{EditorConfig, ToolbarPosition};
use crate::document::{Document, Marks, Selection};
use crate::format::ActiveFormats;
use crate::host::{ElementId, Host, Subscription};
use crate::markup;
use crate::sync;

/// Presentation options of a surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceOptions {
    pub placeholder: Option<String>,
    pub disabled: bool,
    pub toolbar_position: ToolbarPosition,
    pub tab_width: usize,
    pub link_prompt: String,
    pub empty_sentinels: Vec<String>,
}

impl From<&EditorConfig> for SurfaceOptions {
    fn from(config: &EditorConfig) -> Self {
        Self {
            placeholder: Some(config.editor.placeholder.clone()),
            disabled: false,
            toolbar_position: config.editor.toolbar_position,
            tab_width: config.editor.tab_width,
            link_prompt: config.editor.link_prompt.clone(),
            empty_sentinels: config.markup.empty_sentinels.clone(),
        }
    }
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl SurfaceOptions {
    pub fn with_placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_toolbar_position(mut self, position: ToolbarPosition) -> Self {
        self.toolbar_position = position;
        self
    }
}

/// Direct edits coming from the user, as a browser reports them through its
/// input events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Typed text replacing the selection.
    Text(String),
    /// Pasted markup replacing the selection.
    Paste(String),
    /// Enter.
    LineBreak,
    DeleteBackward,
    DeleteForward,
    /// The region's content was changed in place, e.g. by a native command.
    Replace(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Tab,
    Enter,
    Backspace,
    Delete,
    Character(String),
    Other(String),
}

/// Whether the platform's default key handling must be suppressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Default,
    PreventDefault,
}

/// The rendered content of the editable region.
struct Region {
    document: Document,
    selection: Selection,
    /// Marks for the next typed text, set by toggling a mark on a caret.
    pending: Option<Marks>,
}

impl Region {
    fn rendering(value: &str) -> Self {
        let document = markup::parse(value);
        let selection = Selection::caret(document.end());
        Self {
            document,
            selection,
            pending: None,
        }
    }
}

struct State {
    region: Region,
    active: ActiveFormats,
    /// Last value the host handed over or accepted from us.
    value: String,
    /// Focus was inside the region when last observed.
    focused: bool,
}

impl State {
    fn refresh(&mut self) {
        let region = &self.region;
        self.active = ActiveFormats::derive(&region.document, &region.selection, region.pending.as_ref());
    }

    /// Apply the render sync rule to the remembered value.
    fn sync(&mut self, root: ElementId, focused: bool) {
        let wanted = markup::normalize(&self.value);
        let rendered = markup::serialize(&self.region.document);
        if sync::needs_render(&rendered, &wanted, focused) {
            tracing::debug!(?root, "rendering external value");
            self.region = Region::rendering(&self.value);
        } else if rendered != wanted {
            tracing::debug!(?root, "external value deferred while focused");
        }
    }

    /// Focus left the region: drop the cursor-derived state and catch up
    /// with the host's value.
    fn focus_lost(&mut self, root: ElementId) {
        self.focused = false;
        self.active.clear();
        self.region.pending = None;
        self.sync(root, false);
    }
}

pub struct RichTextSurface {
    host: Host,
    root: ElementId,
    state: Rc<RefCell<State>>,
    options: SurfaceOptions,
    on_change: Box<dyn FnMut(String)>,
    on_insert_image: Option<Box<dyn FnMut()>>,
    _selection_change: Subscription,
}

impl std::fmt::Debug for RichTextSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RichTextSurface")
            .field("root", &self.root)
            .field("value", &self.state.borrow().value)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl RichTextSurface {
    pub fn new(
        host: &Host,
        value: impl Into<String>,
        options: SurfaceOptions,
        on_change: impl FnMut(String) + 'static,
    ) -> Self {
        let value = value.into();
        let root = host.create_element(None);
        let state = Rc::new(RefCell::new(State {
            region: Region::rendering(&value),
            active: ActiveFormats::default(),
            value,
            focused: false,
        }));

        let weak = Rc::downgrade(&state);
        let subscription = host.on_selection_change(move |event| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let Ok(mut state) = shared.try_borrow_mut() else {
                return;
            };
            if event.is_within(root) {
                state.focused = true;
                state.refresh();
            } else if state.focused {
                state.focus_lost(root);
            }
        });

        Self {
            host: host.clone(),
            root,
            state,
            options,
            on_change: Box::new(on_change),
            on_insert_image: None,
            _selection_change: subscription,
        }
    }

    /// Hand image insertion to the host.
    pub fn with_image_handler(mut self, handler: impl FnMut() + 'static) -> Self {
        self.on_insert_image = Some(Box::new(handler));
        self
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn options(&self) -> &SurfaceOptions {
        &self.options
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.options.disabled = disabled;
    }

    pub fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    /// Canonical markup currently rendered in the region.
    pub fn rendered(&self) -> String {
        markup::serialize(&self.state.borrow().region.document)
    }

    pub fn selection(&self) -> Selection {
        self.state.borrow().region.selection
    }

    pub fn active_formats(&self) -> ActiveFormats {
        self.state.borrow().active.clone()
    }

    pub fn is_focused(&self) -> bool {
        self.host.contains(self.root, self.host.active_element())
    }

    pub fn is_empty(&self) -> bool {
        markup::is_visually_empty(&self.state.borrow().value, self.options.empty_sentinels.as_slice())
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.options.placeholder.as_deref()
    }

    pub fn show_placeholder(&self) -> bool {
        self.options.placeholder.is_some() && self.is_empty()
    }

    /// A new value from the host.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let focused = self.is_focused();
        let mut state = self.state.borrow_mut();
        state.value = value.into();
        state.sync(self.root, focused);
    }

    fn can_edit(&self) -> bool {
        !self.options.disabled && self.host.has_selection_api()
    }

    pub fn focus(&mut self) {
        if self.options.disabled {
            return;
        }
        self.host.focus(self.root);
        self.host.dispatch_selection_change();
    }

    /// The region lost focus. By the time this is reported focus may
    /// already sit on another element.
    pub fn blur(&mut self) {
        if self.is_focused() {
            self.host.blur();
        }
        self.state.borrow_mut().focus_lost(self.root);
    }

    /// Move the selection, as the user does with mouse or arrow keys.
    pub fn select(&mut self, selection: Selection) {
        if !self.host.has_selection_api() {
            return;
        }
        {
            let mut state = self.state.borrow_mut();
            let region = &mut state.region;
            region.selection = region.document.clamp_selection(selection);
            region.pending = None;
        }
        self.host.dispatch_selection_change();
    }

    /// Run a formatting command on the current selection.
    pub fn execute(&mut self, command: Command) {
        if !self.can_edit() {
            tracing::debug!(verb = command.native_verb(), "command ignored");
            return;
        }
        tracing::trace!(verb = command.native_verb(), "executing command");
        {
            let mut state = self.state.borrow_mut();
            let region = &mut state.region;
            command.apply(&mut region.document, &mut region.selection, &mut region.pending);
        }
        self.host.focus(self.root);
        {
            let mut state = self.state.borrow_mut();
            state.focused = true;
            state.refresh();
        }
        self.emit();
    }

    /// Toolbar behaviour for block buttons, see [`BlockFormat::toggled`].
    pub fn toggle_block(&mut self, block: BlockFormat) {
        let target = block.toggled(&self.state.borrow().active);
        self.execute(Command::FormatBlock(target));
    }

    /// Apply a direct user edit and report the result.
    pub fn input(&mut self, event: InputEvent) {
        if self.options.disabled {
            return;
        }
        if !matches!(event, InputEvent::Replace(_)) && !self.host.has_selection_api() {
            return;
        }
        let focused = self.is_focused();
        {
            let mut state = self.state.borrow_mut();
            let region = &mut state.region;
            region.selection = region.document.clamp_selection(region.selection);
            let selection = region.selection;
            let (start, end) = selection.range();
            let doc = &mut region.document;

            let caret = match event {
                InputEvent::Text(text) => {
                    // Replacing a range keeps the style of its first char.
                    let marks = match region.pending.take() {
                        Some(marks) => marks,
                        None => doc
                            .range_marks(start, end)
                            .into_iter()
                            .next()
                            .unwrap_or_else(|| doc.marks_at(start)),
                    };
                    let caret = doc.delete_range(start, end);
                    doc.insert_text(caret, &text, &marks)
                }
                InputEvent::Paste(html) => {
                    let fragment = markup::parse(&html);
                    let caret = doc.delete_range(start, end);
                    if fragment.is_blank() {
                        caret
                    } else {
                        doc.insert_fragment(caret, &fragment)
                    }
                }
                InputEvent::LineBreak => {
                    let caret = doc.delete_range(start, end);
                    doc.split_block(caret)
                }
                InputEvent::DeleteBackward => doc.delete_backward(selection),
                InputEvent::DeleteForward => doc.delete_forward(selection),
                InputEvent::Replace(html) => {
                    *doc = markup::parse(&html);
                    doc.clamp(selection.focus)
                }
            };
            region.selection = Selection::caret(caret);
            region.pending = None;
            if focused {
                state.refresh();
            }
        }
        self.emit();
    }

    /// Keys handled by the surface itself. Tab indents with non-breaking
    /// spaces instead of moving focus to the next control.
    pub fn key_down(&mut self, key: &Key) -> KeyOutcome {
        match key {
            Key::Tab if !self.options.disabled => {
                let run = "\u{a0}".repeat(self.options.tab_width);
                self.input(InputEvent::Text(run));
                KeyOutcome::PreventDefault
            }
            _ => KeyOutcome::Default,
        }
    }

    /// Ask for a URL and link the selection to it. Cancel or an empty answer
    /// changes nothing.
    pub fn insert_link(&mut self) {
        if !self.can_edit() {
            return;
        }
        let answer = self.host.prompt(&self.options.link_prompt);
        match answer.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => self.execute(Command::CreateLink(url.to_string())),
            _ => tracing::debug!("link prompt cancelled"),
        }
    }

    pub fn insert_image(&mut self) {
        if self.options.disabled {
            return;
        }
        if let Some(handler) = self.on_insert_image.as_mut() {
            handler();
        }
    }

    fn emit(&mut self) {
        let content = sync::normalize_output(&self.rendered());
        self.state.borrow_mut().value = content.clone();
        (self.on_change)(content);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::document::Position;
    use crate::format::Format;

    type Emitted = Rc<RefCell<Vec<String>>>;

    fn surface_with(host: &Host, value: &str, options: SurfaceOptions) -> (RichTextSurface, Emitted) {
        let emitted: Emitted = Rc::default();
        let sink = emitted.clone();
        let surface = RichTextSurface::new(host, value, options, move |v| sink.borrow_mut().push(v));
        (surface, emitted)
    }

    fn surface(host: &Host, value: &str) -> (RichTextSurface, Emitted) {
        surface_with(host, value, SurfaceOptions::default())
    }

    fn last(emitted: &Emitted) -> String {
        emitted.borrow().last().cloned().expect("nothing emitted")
    }

    fn span(from: usize, to: usize) -> Selection {
        Selection::new(Position::new(0, from), Position::new(0, to))
    }

    #[test]
    fn test_unfocused_value_round_trips() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "");
        for value in [
            "<p>Hello</p>",
            "<h2>Agenda</h2><ul><li>Keynote</li><li>Lunch</li></ul>",
            "<blockquote>Quote</blockquote><p><a href=\"https://x.org\">link</a></p>",
            "",
        ] {
            s.set_value(value);
            assert_eq!(s.rendered(), markup::normalize(value));
            assert_eq!(sync::normalize_output(&s.rendered()), sync::normalize_output(&markup::normalize(value)));
        }
        assert!(emitted.borrow().is_empty());
    }

    #[test]
    fn test_external_push_while_focused_keeps_edit() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "<p>draft</p>");
        s.focus();
        s.select(span(5, 5));
        s.input(InputEvent::Text("!".to_string()));
        assert_eq!(last(&emitted), "<p>draft!</p>");

        s.set_value("<p>server copy</p>");
        assert_eq!(s.rendered(), "<p>draft!</p>");

        s.blur();
        assert_eq!(s.rendered(), "<p>server copy</p>");
    }

    #[test]
    fn test_focus_moving_elsewhere_converges() {
        let host = Host::interactive();
        let other = host.create_element(None);
        let (mut s, _) = surface(&host, "<p><strong>draft</strong></p>");
        s.focus();
        s.select(span(2, 2));
        assert!(s.active_formats().contains(Format::Bold));

        s.set_value("<p>server copy</p>");
        assert_eq!(s.rendered(), "<p><strong>draft</strong></p>");

        host.focus(other);
        host.dispatch_selection_change();
        assert!(!s.is_focused());
        assert_eq!(s.rendered(), "<p>server copy</p>");
        assert!(s.active_formats().is_empty());

        s.blur();
        assert_eq!(s.rendered(), "<p>server copy</p>");
        assert_eq!(host.active_element(), Some(other));
    }

    #[test]
    fn test_blur_reported_after_focus_moved() {
        let host = Host::interactive();
        let other = host.create_element(None);
        let (mut s, _) = surface(&host, "<p><strong>draft</strong></p>");
        s.focus();
        s.select(span(2, 2));
        s.set_value("<p>server copy</p>");

        // No selection change reaches the surface before the blur.
        host.focus(other);
        s.blur();
        assert_eq!(s.rendered(), "<p>server copy</p>");
        assert!(s.active_formats().is_empty());
        assert_eq!(host.active_element(), Some(other));
    }

    #[test]
    fn test_accepted_emission_survives_blur() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "<p>a</p>");
        s.focus();
        s.select(span(1, 1));
        s.input(InputEvent::Text("b".to_string()));
        s.blur();
        assert_eq!(s.rendered(), "<p>ab</p>");
        assert_eq!(s.value(), last(&emitted));
    }

    #[test]
    fn test_bold_twice_restores_original() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "<p>Hello</p>");
        s.focus();
        s.select(span(0, 5));
        assert!(!s.active_formats().contains(Format::Bold));

        s.execute(Command::Bold);
        assert!(s.active_formats().contains(Format::Bold));
        assert_eq!(last(&emitted), "<p><strong>Hello</strong></p>");

        s.execute(Command::Bold);
        assert!(!s.active_formats().contains(Format::Bold));
        assert_eq!(last(&emitted), "<p>Hello</p>");
        assert_eq!(s.rendered(), "<p>Hello</p>");
    }

    #[test]
    fn test_emptied_document_reports_empty_string() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "<p>Hello</p>");
        assert!(!s.show_placeholder());
        s.focus();
        s.select(span(0, 5));
        s.input(InputEvent::DeleteBackward);
        assert_eq!(last(&emitted), "");
        assert!(s.is_empty());
        assert!(s.show_placeholder());
    }

    #[test]
    fn test_tab_indents_and_keeps_focus() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "<p>ab</p>");
        s.focus();
        s.select(span(2, 2));
        assert_eq!(s.key_down(&Key::Tab), KeyOutcome::PreventDefault);
        assert_eq!(host.active_element(), Some(s.root()));
        assert_eq!(last(&emitted), "<p>ab&nbsp;&nbsp;&nbsp;&nbsp;</p>");
        assert_eq!(s.key_down(&Key::Enter), KeyOutcome::Default);
    }

    #[test]
    fn test_cancelled_link_prompt_changes_nothing() {
        let host = Host::interactive();
        let answers = Rc::new(RefCell::new(vec![None, Some("   ".to_string())]));
        {
            let answers = answers.clone();
            host.set_prompt(move |_| answers.borrow_mut().remove(0));
        }
        let (mut s, emitted) = surface(&host, "<p><em>see</em> docs</p>");
        s.focus();
        s.select(span(0, 3));
        let before = s.active_formats();

        s.insert_link();
        s.insert_link();
        assert!(answers.borrow().is_empty());
        assert_eq!(s.rendered(), "<p><em>see</em> docs</p>");
        assert_eq!(s.active_formats(), before);
        assert!(emitted.borrow().is_empty());
    }

    #[test]
    fn test_link_prompt_links_selection() {
        let host = Host::interactive();
        host.set_prompt(|message| {
            assert_eq!(message, "Enter URL:");
            Some(" https://docs.rs ".to_string())
        });
        let (mut s, emitted) = surface(&host, "<p>see docs</p>");
        s.focus();
        s.select(span(4, 8));
        s.insert_link();
        assert_eq!(last(&emitted), r#"<p>see <a href="https://docs.rs">docs</a></p>"#);
    }

    #[test]
    fn test_formats_follow_selection_only_while_focused() {
        let host = Host::interactive();
        let (mut s, _) = surface(&host, "<h1><strong>B</strong>old</h1>");
        s.select(span(1, 1));
        assert!(s.active_formats().is_empty());

        s.focus();
        assert!(s.active_formats().contains(Format::Bold));
        assert!(s.active_formats().contains(Format::Heading1));

        s.select(span(3, 3));
        assert!(!s.active_formats().contains(Format::Bold));

        s.select(span(1, 1));
        assert!(s.active_formats().contains(Format::Bold));

        let elsewhere = host.create_element(None);
        host.focus(elsewhere);
        host.dispatch_selection_change();
        assert!(s.active_formats().is_empty());

        s.focus();
        assert!(s.active_formats().contains(Format::Bold));
        s.blur();
        assert!(s.active_formats().is_empty());
    }

    #[test]
    fn test_descendant_focus_counts_as_inside() {
        let host = Host::interactive();
        let (mut s, _) = surface(&host, "<p><u>x</u></p>");
        let inner = host.create_element(Some(s.root()));
        s.select(span(1, 1));
        host.focus(inner);
        host.dispatch_selection_change();
        assert!(s.active_formats().contains(Format::Underline));
    }

    #[test]
    fn test_drop_releases_subscription() {
        let host = Host::interactive();
        let (s, _) = surface(&host, "");
        assert_eq!(host.listener_count(), 1);
        drop(s);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_headless_commands_are_noops() {
        let host = Host::headless();
        let (mut s, emitted) = surface(&host, "<p>Hi</p>");
        s.select(span(0, 2));
        s.execute(Command::Bold);
        s.insert_link();
        s.input(InputEvent::Text("x".to_string()));
        assert_eq!(s.rendered(), "<p>Hi</p>");
        assert!(emitted.borrow().is_empty());

        s.set_value("<p>Rendered on the server</p>");
        assert_eq!(s.rendered(), "<p>Rendered on the server</p>");
    }

    #[test]
    fn test_disabled_surface_ignores_edits() {
        let host = Host::interactive();
        let options = SurfaceOptions::default().with_disabled(true);
        let (mut s, emitted) = surface_with(&host, "<p>Hi</p>", options);
        s.focus();
        s.execute(Command::Italic);
        s.input(InputEvent::DeleteBackward);
        assert_eq!(s.key_down(&Key::Tab), KeyOutcome::Default);
        assert!(emitted.borrow().is_empty());
        assert!(!s.is_focused());
    }

    #[test]
    fn test_image_insert_is_delegated() {
        let host = Host::interactive();
        let calls = Rc::new(Cell::new(0));
        let (s, emitted) = surface(&host, "<p>x</p>");
        let mut s = {
            let calls = calls.clone();
            s.with_image_handler(move || calls.set(calls.get() + 1))
        };
        s.insert_image();
        assert_eq!(calls.get(), 1);
        assert!(emitted.borrow().is_empty());
    }

    #[test]
    fn test_enter_after_heading_starts_paragraph() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "<h1>Title</h1>");
        s.focus();
        s.select(span(5, 5));
        s.input(InputEvent::LineBreak);
        s.input(InputEvent::Text("Body".to_string()));
        assert_eq!(last(&emitted), "<h1>Title</h1><p>Body</p>");
    }

    #[test]
    fn test_toggle_block_reverts_active_heading() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "<p>Title</p>");
        s.focus();
        s.select(span(0, 0));
        s.toggle_block(BlockFormat::Heading1);
        assert_eq!(last(&emitted), "<h1>Title</h1>");
        assert!(s.active_formats().contains(Format::Heading1));
        s.toggle_block(BlockFormat::Heading1);
        assert_eq!(last(&emitted), "<p>Title</p>");
    }

    #[test]
    fn test_bold_on_caret_applies_to_next_text() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "<p>ab</p>");
        s.focus();
        s.select(span(2, 2));
        s.execute(Command::Bold);
        assert!(s.active_formats().contains(Format::Bold));
        s.input(InputEvent::Text("c".to_string()));
        assert_eq!(last(&emitted), "<p>ab<strong>c</strong></p>");
    }

    #[test]
    fn test_paste_markup_replaces_selection() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "<p>one two</p>");
        s.focus();
        s.select(span(4, 7));
        s.input(InputEvent::Paste("<b>2</b>".to_string()));
        assert_eq!(last(&emitted), "<p>one <strong>2</strong></p>");
    }

    #[test]
    fn test_native_replace_is_reported() {
        let host = Host::interactive();
        let (mut s, emitted) = surface(&host, "<p>x</p>");
        s.focus();
        s.input(InputEvent::Replace("<div><b>x</b></div>".to_string()));
        assert_eq!(last(&emitted), "<p><strong>x</strong></p>");
    }

    #[test]
    fn test_options_from_config() {
        let config = EditorConfig::default()
            .with_toolbar_position(ToolbarPosition::Bottom)
            .with_tab_width(2);
        let options = SurfaceOptions::from(&config);
        assert_eq!(options.toolbar_position, ToolbarPosition::Bottom);
        assert_eq!(options.tab_width, 2);
        assert_eq!(options.placeholder.as_deref(), Some("Start writing..."));
    }
}
