use dioxus::prelude::*;
use richtext::markup;

use super::Post;

#[component]
pub fn Published() -> Element {
    let posts = use_context::<Signal<Vec<Post>>>();

    rsx! {
        section {
            class: "published",
            if posts.read().is_empty() {
                p { class: "published-empty", "Nothing published yet." }
            }
            for post in posts.read().iter() {
                article {
                    key: "{post.id}",
                    class: "published-post",
                    div { class: "published-post-body", dangerous_inner_html: markup::normalize(&post.body) }
                }
            }
        }
    }
}
