//! # Host environment
//!
//! [`Host`] stands for the document a surface is mounted in: an element tree
//! (only parent links matter), which element has focus, a blocking prompt and
//! the document-wide `selectionchange` event. A browser binding backs these
//! with the real DOM; tests and headless renderers use this model directly.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`), like the UI event loop
//! it models.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

/// Payload of a document-level selection change: the focused element and its
/// ancestors, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub focus_path: Vec<ElementId>,
}

impl SelectionChange {
    /// Whether focus sits on `root` or one of its descendants.
    pub fn is_within(&self, root: ElementId) -> bool {
        self.focus_path.contains(&root)
    }
}

type Listener = Box<dyn FnMut(&SelectionChange)>;
type Prompt = Box<dyn FnMut(&str) -> Option<String>>;

struct HostInner {
    selection_api: bool,
    next_element: Cell<u64>,
    parents: RefCell<HashMap<ElementId, Option<ElementId>>>,
    active: Cell<Option<ElementId>>,
    next_listener: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    /// Unsubscribed while a dispatch had the listeners checked out.
    dropped: RefCell<HashSet<u64>>,
    prompt: RefCell<Option<Prompt>>,
}

#[derive(Clone)]
pub struct Host {
    inner: Rc<HostInner>,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("selection_api", &self.inner.selection_api)
            .field("active", &self.inner.active.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Host {
    fn with_selection_api(selection_api: bool) -> Self {
        Self {
            inner: Rc::new(HostInner {
                selection_api,
                next_element: Cell::new(1),
                parents: RefCell::new(HashMap::new()),
                active: Cell::new(None),
                next_listener: Cell::new(1),
                listeners: RefCell::new(Vec::new()),
                dropped: RefCell::new(HashSet::new()),
                prompt: RefCell::new(None),
            }),
        }
    }

    /// An interactive document with focus, selection and prompts.
    pub fn interactive() -> Self {
        Self::with_selection_api(true)
    }

    /// No selection API, e.g. server-side rendering. Subscriptions never fire
    /// and prompts are always cancelled.
    pub fn headless() -> Self {
        Self::with_selection_api(false)
    }

    pub fn has_selection_api(&self) -> bool {
        self.inner.selection_api
    }

    pub fn create_element(&self, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.inner.next_element.get());
        self.inner.next_element.set(id.0 + 1);
        self.inner.parents.borrow_mut().insert(id, parent);
        id
    }

    /// Focused element followed by its ancestors.
    fn path_of(&self, mut node: Option<ElementId>) -> Vec<ElementId> {
        let parents = self.inner.parents.borrow();
        let mut path = Vec::new();
        while let Some(id) = node {
            path.push(id);
            node = parents.get(&id).copied().flatten();
        }
        path
    }

    /// Whether `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: ElementId, node: Option<ElementId>) -> bool {
        self.path_of(node).contains(&ancestor)
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.inner.active.get()
    }

    pub fn focus(&self, element: ElementId) {
        self.inner.active.set(Some(element));
    }

    pub fn blur(&self) {
        self.inner.active.set(None);
    }

    /// Install the handler answering [`Host::prompt`].
    pub fn set_prompt(&self, prompt: impl FnMut(&str) -> Option<String> + 'static) {
        *self.inner.prompt.borrow_mut() = Some(Box::new(prompt));
    }

    /// Blocking text prompt. `None` when cancelled or unavailable.
    pub fn prompt(&self, message: &str) -> Option<String> {
        if !self.inner.selection_api {
            return None;
        }
        let mut prompt = self.inner.prompt.borrow_mut();
        prompt.as_mut().and_then(|p| p(message))
    }

    /// Subscribe to the document-wide selection change event. The listener
    /// stays registered until the returned guard is dropped.
    pub fn on_selection_change(&self, listener: impl FnMut(&SelectionChange) + 'static) -> Subscription {
        if !self.inner.selection_api {
            return Subscription::inert();
        }
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, Box::new(listener)));
        Subscription {
            host: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Fire a selection change to every subscriber. Listeners may subscribe
    /// or unsubscribe while being notified.
    pub fn dispatch_selection_change(&self) {
        if !self.inner.selection_api {
            return;
        }
        let event = SelectionChange {
            focus_path: self.path_of(self.active_element()),
        };
        let mut current = std::mem::take(&mut *self.inner.listeners.borrow_mut());
        for (_, listener) in current.iter_mut() {
            listener(&event);
        }
        let mut listeners = self.inner.listeners.borrow_mut();
        let mut dropped = self.inner.dropped.borrow_mut();
        current.retain(|(id, _)| !dropped.remove(id));
        current.append(&mut listeners);
        *listeners = current;
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

/// Registration guard returned by [`Host::on_selection_change`].
#[must_use = "the listener is removed when the subscription is dropped"]
pub struct Subscription {
    host: Weak<HostInner>,
    id: u64,
}

impl Subscription {
    fn inert() -> Self {
        Self {
            host: Weak::new(),
            id: 0,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.host.upgrade() else {
            return;
        };
        let mut listeners = inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        if listeners.len() == before {
            inner.dropped.borrow_mut().insert(self.id);
        }
    }
}
