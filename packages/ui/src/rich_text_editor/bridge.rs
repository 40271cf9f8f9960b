//! JavaScript side of the editor. Every script looks its region up by id and
//! answers through `dioxus.send`.

use std::collections::HashMap;

use richtext::{ActiveFormats, Command, Format};
use serde::Deserialize;

/// Escape a string so it's safe to embed inside a JS string literal (double-quoted).
pub(crate) fn js_string_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c < '\x20' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `["bold","italic",...]`, the verbs `queryCommandState` is asked about.
fn queryable_verbs() -> String {
    let verbs: Vec<String> = Format::QUERYABLE
        .iter()
        .map(|(_, verb)| js_string_escape(verb))
        .collect();
    format!("[{}]", verbs.join(","))
}

/// Shared prelude: `el`, `inside()` and `snapshot()`. Scripts return early
/// when the region is gone.
fn prelude(eid: &str) -> String {
    format!(
        r#"var el = document.getElementById({eid_js});
        if (!el) {{ dioxus.send(null); return; }}
        function inside() {{
            var a = document.activeElement;
            return !!a && (a === el || el.contains(a));
        }}
        function snapshot() {{
            var states = {{}};
            {verbs}.forEach(function(v) {{
                try {{ states[v] = document.queryCommandState(v); }} catch (e) {{ states[v] = false; }}
            }});
            var block = '';
            try {{ block = String(document.queryCommandValue('formatBlock') || ''); }} catch (e) {{}}
            return {{ html: el.innerHTML, states: states, block: block }};
        }}"#,
        eid_js = js_string_escape(eid),
        verbs = queryable_verbs(),
    )
}

/// Messages of the long-lived event bridge.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub(crate) enum BridgeEvent {
    /// Direct edit, carries the region's content.
    Input { html: String },
    /// Selection moved while focus is inside the region.
    Selection { states: HashMap<String, bool>, block: String },
    Blur,
}

/// Region content and command states after a native edit.
#[derive(Debug, Deserialize, PartialEq)]
pub(crate) struct Snapshot {
    pub html: String,
    pub states: HashMap<String, bool>,
    pub block: String,
}

impl Snapshot {
    pub fn active_formats(&self) -> ActiveFormats {
        formats_of(&self.states, &self.block)
    }
}

pub(crate) fn formats_of(states: &HashMap<String, bool>, block: &str) -> ActiveFormats {
    ActiveFormats::from_native(states.iter().map(|(verb, on)| (verb.as_str(), *on)), block)
}

/// Answer of [`inspect_script`].
#[derive(Debug, Deserialize, PartialEq)]
pub(crate) struct RegionState {
    pub html: String,
    pub focused: bool,
}

/// Installs input, blur and document `selectionchange` listeners. The
/// listeners stay until [`unmount_script`] runs.
pub(crate) fn mount_script(eid: &str) -> String {
    format!(
        r#"(function() {{
            {prelude}
            if (el._rtCleanup) el._rtCleanup();
            var onInput = function() {{
                dioxus.send({{ kind: 'input', html: el.innerHTML }});
            }};
            var onBlur = function() {{
                dioxus.send({{ kind: 'blur' }});
            }};
            var onSelection = function() {{
                if (!inside()) return;
                var s = snapshot();
                dioxus.send({{ kind: 'selection', states: s.states, block: s.block }});
            }};
            el.addEventListener('input', onInput);
            el.addEventListener('blur', onBlur);
            document.addEventListener('selectionchange', onSelection);
            el._rtCleanup = function() {{
                el.removeEventListener('input', onInput);
                el.removeEventListener('blur', onBlur);
                document.removeEventListener('selectionchange', onSelection);
                el._rtCleanup = null;
            }};
        }})();"#,
        prelude = prelude(eid),
    )
}

pub(crate) fn unmount_script(eid: &str) -> String {
    format!(
        r#"(function() {{
            var el = document.getElementById({eid_js});
            if (el && el._rtCleanup) el._rtCleanup();
        }})();"#,
        eid_js = js_string_escape(eid),
    )
}

pub(crate) fn inspect_script(eid: &str) -> String {
    format!(
        r#"(function() {{
            {prelude}
            dioxus.send({{ html: el.innerHTML, focused: inside() }});
        }})();"#,
        prelude = prelude(eid),
    )
}

/// Replaces the content unless focus moved into the region since it was inspected.
pub(crate) fn render_script(eid: &str, value: &str) -> String {
    format!(
        r#"(function() {{
            var el = document.getElementById({eid_js});
            if (!el) return;
            var a = document.activeElement;
            if (a && (a === el || el.contains(a))) return;
            el.innerHTML = {value_js};
        }})();"#,
        eid_js = js_string_escape(eid),
        value_js = js_string_escape(value),
    )
}

/// Runs a native command, puts focus back into the region and answers with
/// a [`Snapshot`].
pub(crate) fn exec_script(eid: &str, command: &Command) -> String {
    let arg = match command.native_argument() {
        Some(arg) => js_string_escape(&arg),
        None => "null".to_string(),
    };
    format!(
        r#"(function() {{
            {prelude}
            document.execCommand({verb}, false, {arg});
            el.focus();
            dioxus.send(snapshot());
        }})();"#,
        prelude = prelude(eid),
        verb = js_string_escape(command.native_verb()),
    )
}

/// Asks for a URL and links the selection with it. A cancelled or blank
/// answer leaves everything untouched and answers `null`.
pub(crate) fn link_script(eid: &str, message: &str) -> String {
    format!(
        r#"(function() {{
            {prelude}
            var url = window.prompt({message_js});
            if (url === null || url.trim() === '') {{ dioxus.send(null); return; }}
            document.execCommand('createLink', false, url.trim());
            el.focus();
            dioxus.send(snapshot());
        }})();"#,
        prelude = prelude(eid),
        message_js = js_string_escape(message),
    )
}

/// Inserts `run` (non-breaking spaces) at the cursor.
pub(crate) fn insert_script(eid: &str, run: &str) -> String {
    let html: String = run
        .chars()
        .map(|c| if c == '\u{a0}' { "&nbsp;".to_string() } else { c.to_string() })
        .collect();
    format!(
        r#"(function() {{
            {prelude}
            document.execCommand('insertHTML', false, {html_js});
            dioxus.send(snapshot());
        }})();"#,
        prelude = prelude(eid),
        html_js = js_string_escape(&html),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use richtext::BlockFormat;

    #[test]
    fn test_js_string_escape() {
        assert_eq!(js_string_escape(r#"<a href="x">"#), r#""<a href=\"x\">""#);
        assert_eq!(js_string_escape("a\nb\\"), r#""a\nb\\""#);
        assert_eq!(js_string_escape("\u{1}"), r#""\u0001""#);
    }

    #[test]
    fn test_bridge_events_deserialize() {
        let input: BridgeEvent = serde_json::from_str(r#"{"kind":"input","html":"<p>x</p>"}"#).unwrap();
        assert_eq!(input, BridgeEvent::Input { html: "<p>x</p>".to_string() });

        let blur: BridgeEvent = serde_json::from_str(r#"{"kind":"blur"}"#).unwrap();
        assert_eq!(blur, BridgeEvent::Blur);

        let selection: BridgeEvent =
            serde_json::from_str(r#"{"kind":"selection","states":{"bold":true},"block":"h2"}"#).unwrap();
        let BridgeEvent::Selection { states, block } = selection else {
            panic!("expected a selection event");
        };
        let active = formats_of(&states, &block);
        assert!(active.contains(Format::Bold));
        assert!(active.contains(Format::Heading2));
    }

    #[test]
    fn test_exec_script_carries_native_verb() {
        let js = exec_script("rt-editor-0", &Command::FormatBlock(BlockFormat::Heading1));
        assert!(js.contains(r#"document.execCommand("formatBlock", false, "<h1>")"#));
        let js = exec_script("rt-editor-0", &Command::Bold);
        assert!(js.contains(r#"document.execCommand("bold", false, null)"#));
    }

    #[test]
    fn test_insert_script_uses_entities() {
        let js = insert_script("rt-editor-0", "\u{a0}\u{a0}");
        assert!(js.contains(r#""&nbsp;&nbsp;""#));
    }

    #[test]
    fn test_render_script_escapes_value() {
        let js = render_script("rt-editor-1", "<p class=\"x\">a</p>");
        assert!(js.contains(r#"el.innerHTML = "<p class=\"x\">a</p>";"#));
    }
}
