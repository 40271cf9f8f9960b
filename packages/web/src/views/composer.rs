use dioxus::prelude::*;

use richtext::markup::is_visually_empty;
use richtext::EditorConfig;
use ui::icons::FaWandMagicSparkles;
use ui::{Icon, RichTextEditor};

use super::Post;

#[component]
pub fn Composer() -> Element {
    let config = use_context::<Signal<EditorConfig>>()();
    let mut posts = use_context::<Signal<Vec<Post>>>();
    let mut draft = use_signal(String::new);
    let mut suggesting = use_signal(|| false);

    let sentinels = config.markup.empty_sentinels.clone();
    let empty = is_visually_empty(&draft(), sentinels.as_slice());

    let publish = move |_| {
        let body = draft();
        if is_visually_empty(&body, sentinels.as_slice()) {
            return;
        }
        let id = posts.read().len();
        posts.write().insert(0, Post { id, body });
        draft.set(String::new());
        tracing::info!("Published post {}", id);
    };

    let suggest = move |_| {
        if suggesting() {
            return;
        }
        suggesting.set(true);
        let context = draft();
        spawn(async move {
            match api::suggest_copy("post".to_string(), context).await {
                Ok(suggestion) => {
                    if suggestion.fallback {
                        tracing::info!("Assistant unavailable, using canned copy");
                    }
                    draft.set(suggestion.markup);
                }
                Err(e) => tracing::error!("Failed to fetch suggestion: {}", e),
            }
            suggesting.set(false);
        });
    };

    rsx! {
        section {
            class: "composer",
            h1 { class: "composer-title", "New post" }

            RichTextEditor {
                value: draft,
                on_change: move |markup: String| draft.set(markup),
                placeholder: config.editor.placeholder.clone(),
                actions: rsx! {
                    button {
                        r#type: "button",
                        class: "composer-suggest",
                        title: "Suggest copy",
                        disabled: suggesting(),
                        onclick: suggest,
                        Icon { icon: FaWandMagicSparkles, width: 14, height: 14 }
                        if suggesting() { " Thinking..." } else { " Suggest" }
                    }
                    button {
                        r#type: "button",
                        class: "composer-publish",
                        disabled: empty,
                        onclick: publish,
                        "Publish"
                    }
                },
            }
        }
    }
}
