use dioxus::prelude::*;
use richtext::{ActiveFormats, BlockFormat, Command, Format};

use crate::icons::{FaBold, FaImage, FaItalic, FaLink, FaListOl, FaListUl, FaQuoteLeft, FaUnderline};
use crate::Icon;

/// A toolbar button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarAction {
    Bold,
    Italic,
    Underline,
    UnorderedList,
    OrderedList,
    Block(BlockFormat),
    Link,
    Image,
}

impl ToolbarAction {
    pub const ALL: [ToolbarAction; 10] = [
        ToolbarAction::Bold,
        ToolbarAction::Italic,
        ToolbarAction::Underline,
        ToolbarAction::UnorderedList,
        ToolbarAction::OrderedList,
        ToolbarAction::Block(BlockFormat::Heading1),
        ToolbarAction::Block(BlockFormat::Heading2),
        ToolbarAction::Block(BlockFormat::Quote),
        ToolbarAction::Link,
        ToolbarAction::Image,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ToolbarAction::Bold => "Bold",
            ToolbarAction::Italic => "Italic",
            ToolbarAction::Underline => "Underline",
            ToolbarAction::UnorderedList => "Bulleted list",
            ToolbarAction::OrderedList => "Numbered list",
            ToolbarAction::Block(BlockFormat::Heading1) => "Heading 1",
            ToolbarAction::Block(BlockFormat::Heading2) => "Heading 2",
            ToolbarAction::Block(BlockFormat::Quote) => "Quote",
            ToolbarAction::Block(BlockFormat::Paragraph) => "Paragraph",
            ToolbarAction::Link => "Insert link",
            ToolbarAction::Image => "Insert image",
        }
    }

    /// The format this button highlights.
    pub fn format(&self) -> Option<Format> {
        match self {
            ToolbarAction::Bold => Some(Format::Bold),
            ToolbarAction::Italic => Some(Format::Italic),
            ToolbarAction::Underline => Some(Format::Underline),
            ToolbarAction::UnorderedList => Some(Format::UnorderedList),
            ToolbarAction::OrderedList => Some(Format::OrderedList),
            ToolbarAction::Block(block) => block.format(),
            ToolbarAction::Link | ToolbarAction::Image => None,
        }
    }

    /// Command to run for a press. Link and image need the host and have none.
    pub fn command(&self, active: &ActiveFormats) -> Option<Command> {
        match self {
            ToolbarAction::Bold => Some(Command::Bold),
            ToolbarAction::Italic => Some(Command::Italic),
            ToolbarAction::Underline => Some(Command::Underline),
            ToolbarAction::UnorderedList => Some(Command::InsertUnorderedList),
            ToolbarAction::OrderedList => Some(Command::InsertOrderedList),
            ToolbarAction::Block(block) => Some(Command::FormatBlock(block.toggled(active))),
            ToolbarAction::Link | ToolbarAction::Image => None,
        }
    }
}

fn action_icon(action: ToolbarAction) -> Element {
    match action {
        ToolbarAction::Bold => rsx! { Icon { icon: FaBold, width: 14, height: 14 } },
        ToolbarAction::Italic => rsx! { Icon { icon: FaItalic, width: 14, height: 14 } },
        ToolbarAction::Underline => rsx! { Icon { icon: FaUnderline, width: 14, height: 14 } },
        ToolbarAction::UnorderedList => rsx! { Icon { icon: FaListUl, width: 14, height: 14 } },
        ToolbarAction::OrderedList => rsx! { Icon { icon: FaListOl, width: 14, height: 14 } },
        ToolbarAction::Block(BlockFormat::Quote) => rsx! { Icon { icon: FaQuoteLeft, width: 14, height: 14 } },
        ToolbarAction::Block(BlockFormat::Heading1) => rsx! { span { class: "rt-btn-label", "H1" } },
        ToolbarAction::Block(BlockFormat::Heading2) => rsx! { span { class: "rt-btn-label", "H2" } },
        ToolbarAction::Block(BlockFormat::Paragraph) => rsx! { span { class: "rt-btn-label", "P" } },
        ToolbarAction::Link => rsx! { Icon { icon: FaLink, width: 14, height: 14 } },
        ToolbarAction::Image => rsx! { Icon { icon: FaImage, width: 14, height: 14 } },
    }
}

/// Formatting buttons plus the host's action slot.
///
/// Buttons cancel their `mousedown` so the editable region keeps its
/// selection while a button is pressed.
#[component]
pub fn Toolbar(
    active: Signal<ActiveFormats>,
    on_action: EventHandler<ToolbarAction>,
    #[props(default)] disabled: bool,
    #[props(default)] show_image: bool,
    #[props(!optional)] actions: Option<Element>,
) -> Element {
    let current = active();
    rsx! {
        div {
            class: "rt-toolbar",
            role: "toolbar",
            div {
                class: "rt-toolbar-buttons",
                for action in ToolbarAction::ALL {
                    if action != ToolbarAction::Image || show_image {
                        {
                            let pressed = action.format().is_some_and(|f| current.contains(f));
                            let title = action.title();
                            rsx! {
                                button {
                                    key: "{title}",
                                    r#type: "button",
                                    class: if pressed { "rt-btn rt-btn-active" } else { "rt-btn" },
                                    title: title,
                                    "aria-label": title,
                                    "aria-pressed": if pressed { "true" } else { "false" },
                                    disabled: disabled,
                                    onmousedown: move |evt: MouseEvent| evt.prevent_default(),
                                    onclick: move |_| on_action.call(action),
                                    {action_icon(action)}
                                }
                            }
                        }
                    }
                }
            }
            {actions.map(|actions| rsx! {
                div { class: "rt-toolbar-actions", {actions} }
            })}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_buttons_toggle_back_to_paragraph() {
        let active: ActiveFormats = [Format::Quote].into_iter().collect();
        assert_eq!(
            ToolbarAction::Block(BlockFormat::Quote).command(&active),
            Some(Command::FormatBlock(BlockFormat::Paragraph))
        );
        assert_eq!(
            ToolbarAction::Block(BlockFormat::Heading1).command(&active),
            Some(Command::FormatBlock(BlockFormat::Heading1))
        );
    }

    #[test]
    fn test_host_actions_have_no_command() {
        let active = ActiveFormats::default();
        assert_eq!(ToolbarAction::Link.command(&active), None);
        assert_eq!(ToolbarAction::Image.command(&active), None);
        assert_eq!(ToolbarAction::Bold.command(&active), Some(Command::Bold));
    }

    #[test]
    fn test_every_format_has_a_button() {
        for format in Format::ALL {
            assert!(ToolbarAction::ALL.iter().any(|a| a.format() == Some(format)), "{format:?}");
        }
    }
}
