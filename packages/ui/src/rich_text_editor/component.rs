use dioxus::prelude::*;
use richtext::markup::is_visually_empty;
use richtext::{sync, ActiveFormats, EditorConfig, ToolbarPosition};

use super::bridge::{self, BridgeEvent, RegionState, Snapshot};
use super::toolbar::{Toolbar, ToolbarAction};

const STYLE_CSS: Asset = asset!("./style.css");

/// Simple counter for unique IDs
static EDITOR_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// An explicit position wins over the configured one.
fn toolbar_position_for(explicit: Option<ToolbarPosition>, config: &EditorConfig) -> ToolbarPosition {
    explicit.unwrap_or(config.editor.toolbar_position)
}

/// Overwrite the region with `value` when it differs and focus is elsewhere.
async fn sync_region(eid: String, value: String) {
    let mut inspect = document::eval(&bridge::inspect_script(&eid));
    let Ok(Some(region)) = inspect.recv::<Option<RegionState>>().await else {
        return;
    };
    if sync::needs_render(&region.html, &value, region.focused) {
        tracing::debug!(editor = %eid, "rendering external value");
        document::eval(&bridge::render_script(&eid, &value));
    }
}

/// Run a script answering with a [`Snapshot`] and report its outcome.
async fn run_native(script: String, on_change: EventHandler<String>, mut active: Signal<ActiveFormats>) {
    let mut eval = document::eval(&script);
    match eval.recv::<Option<Snapshot>>().await {
        Ok(Some(snapshot)) => {
            active.set(snapshot.active_formats());
            on_change.call(sync::normalize_output(&snapshot.html));
        }
        Ok(None) => {}
        Err(e) => tracing::error!("Editor command failed: {e:?}"),
    }
}

/// Controlled rich text editor.
///
/// The host owns `value` and receives the full markup through `on_change`
/// after every edit. An external value is rendered only while the region is
/// unfocused, so typing is never overwritten; a pending value lands on blur.
/// Settings come from a `Signal<EditorConfig>` in context when one is provided;
/// `toolbar_position` overrides the configured position.
#[component]
pub fn RichTextEditor(
    value: Signal<String>,
    on_change: EventHandler<String>,
    #[props(default)] placeholder: Option<String>,
    #[props(default)] disabled: bool,
    #[props(default)] toolbar_position: Option<ToolbarPosition>,
    #[props(default)] actions: Option<Element>,
    #[props(default)] on_insert_image: Option<EventHandler<()>>,
) -> Element {
    let config = try_use_context::<Signal<EditorConfig>>()
        .map(|config| config())
        .unwrap_or_default();
    let editor_id = use_signal(|| {
        let n = EDITOR_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("rt-editor-{n}")
    });
    let mut active = use_signal(ActiveFormats::default);

    // ── Event bridge: input, blur and selection changes ──
    use_effect(move || {
        let eid = editor_id.peek().clone();
        spawn(async move {
            let mut eval = document::eval(&bridge::mount_script(&eid));
            loop {
                match eval.recv::<Option<BridgeEvent>>().await {
                    Ok(Some(BridgeEvent::Input { html })) => {
                        on_change.call(sync::normalize_output(&html));
                    }
                    Ok(Some(BridgeEvent::Selection { states, block })) => {
                        active.set(bridge::formats_of(&states, &block));
                    }
                    Ok(Some(BridgeEvent::Blur)) => {
                        active.set(ActiveFormats::default());
                        let text = value.peek().clone();
                        spawn(sync_region(eid.clone(), text));
                    }
                    Ok(None) | Err(_) => break,
                }
            }
        });
    });

    use_drop(move || {
        document::eval(&bridge::unmount_script(&editor_id.peek()));
    });

    // ── Sync external value changes into the region ──
    use_effect(move || {
        let text = value();
        let eid = editor_id.peek().clone();
        spawn(sync_region(eid, text));
    });

    let link_prompt = config.editor.link_prompt.clone();
    let run_action = move |action: ToolbarAction| {
        if disabled {
            return;
        }
        let eid = editor_id.peek().clone();
        match action {
            ToolbarAction::Image => {
                if let Some(handler) = on_insert_image {
                    handler.call(());
                }
            }
            ToolbarAction::Link => {
                spawn(run_native(bridge::link_script(&eid, &link_prompt), on_change, active));
            }
            other => {
                if let Some(command) = other.command(&active.peek()) {
                    spawn(run_native(bridge::exec_script(&eid, &command), on_change, active));
                }
            }
        }
    };

    let tab_run = config.tab_run();
    let on_keydown = move |evt: KeyboardEvent| {
        use dioxus::prelude::keyboard_types::Key;
        if disabled || evt.key() != Key::Tab {
            return;
        }
        evt.prevent_default();
        let eid = editor_id.peek().clone();
        spawn(run_native(bridge::insert_script(&eid, &tab_run), on_change, active));
    };

    let show_placeholder = placeholder.is_some()
        && is_visually_empty(&value(), config.markup.empty_sentinels.as_slice());

    let toolbar = rsx! {
        Toolbar {
            active,
            on_action: run_action,
            disabled,
            show_image: on_insert_image.is_some(),
            actions,
        }
    };
    let (top, bottom) = match toolbar_position_for(toolbar_position, &config) {
        ToolbarPosition::Top => (Some(toolbar), None),
        ToolbarPosition::Bottom => (None, Some(toolbar)),
    };

    rsx! {
        document::Link { rel: "stylesheet", href: STYLE_CSS }
        div {
            class: if disabled { "rt-editor rt-editor-disabled" } else { "rt-editor" },
            {top}
            div {
                class: "rt-surface-wrap",
                if show_placeholder {
                    div {
                        class: "rt-placeholder",
                        "aria-hidden": "true",
                        {placeholder.clone().unwrap_or_default()}
                    }
                }
                div {
                    id: "{editor_id}",
                    class: "rt-surface",
                    role: "textbox",
                    "aria-multiline": "true",
                    contenteditable: if disabled { "false" } else { "true" },
                    onkeydown: on_keydown,
                }
            }
            {bottom}
        }
    }
}
