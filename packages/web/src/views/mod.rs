use dioxus::prelude::*;

use crate::Route;

mod composer;
pub use composer::Composer;

mod published;
pub use published::Published;

/// A published post, kept in memory for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: usize,
    pub body: String,
}

/// Navigation around every page.
#[component]
pub fn Shell() -> Element {
    let posts = use_context::<Signal<Vec<Post>>>();
    let count = posts.read().len();

    rsx! {
        header {
            class: "app-header",
            Link { to: Route::Composer {}, class: "app-nav-link", "Write" }
            Link { to: Route::Published {}, class: "app-nav-link", "Published ({count})" }
        }
        main {
            class: "app-main",
            Outlet::<Route> {}
        }
    }
}
