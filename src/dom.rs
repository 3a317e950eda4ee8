//! Browser glue over plain `js_sys` reflection: delegated event listeners on
//! the mount root, and a console sink for `tracing`.

use js_sys::{Array, Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Encoded action for a DOM interaction.
///
/// `action` is the `data-action` of the clicked element or its nearest
/// ancestor. For a changed `<select>`, `prefix` is its `data-action-prefix`
/// and `value` the chosen option's value.
pub fn resolve_action(
    action: Option<String>,
    prefix: Option<String>,
    value: Option<String>,
) -> Option<String> {
    match (action, prefix) {
        (Some(action), _) => Some(action),
        (None, Some(prefix)) => Some(format!("{}{}", prefix, value.unwrap_or_default())),
        (None, None) => None,
    }
}

/// Action carried by a `click` event, if any element on its path has one.
pub(crate) fn clicked_action(event: &JsValue) -> Option<String> {
    let target = Reflect::get(event, &JsValue::from_str("target")).ok()?;
    let element = call_method(&target, "closest", &[JsValue::from_str("[data-action]")]).ok()?;
    resolve_action(attribute(&element, "data-action"), None, None)
}

/// Action carried by a `change` event on a prefixed `<select>`.
pub(crate) fn changed_action(event: &JsValue) -> Option<String> {
    let target = Reflect::get(event, &JsValue::from_str("target")).ok()?;
    let value = Reflect::get(&target, &JsValue::from_str("value"))
        .ok()
        .and_then(|v| v.as_string());
    resolve_action(None, attribute(&target, "data-action-prefix"), value)
}

fn attribute(element: &JsValue, name: &str) -> Option<String> {
    if element.is_null() || element.is_undefined() {
        return None;
    }
    call_method(element, "getAttribute", &[JsValue::from_str(name)])
        .ok()?
        .as_string()
}

fn call_method(target: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
    let args: Array = args.iter().collect();
    method.apply(target, &args)
}

/// An `addEventListener` registration, removed again on drop.
pub(crate) struct Listener {
    target: JsValue,
    event: &'static str,
    closure: Closure<dyn FnMut(JsValue)>,
}

impl Listener {
    pub(crate) fn attach(
        target: &JsValue,
        event: &'static str,
        handler: impl FnMut(JsValue) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(JsValue)>);
        call_method(
            target,
            "addEventListener",
            &[JsValue::from_str(event), closure.as_ref().clone()],
        )?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = call_method(
            &self.target,
            "removeEventListener",
            &[JsValue::from_str(self.event), self.closure.as_ref().clone()],
        );
    }
}

/// `tracing` writer that sends each formatted event to `console.log`.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub(crate) struct ConsoleWriter {
    buf: Vec<u8>,
}

#[cfg(target_arch = "wasm32")]
impl std::io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        if let Ok(console) = Reflect::get(&js_sys::global(), &JsValue::from_str("console")) {
            let _ = call_method(&console, "log", &[JsValue::from_str(line)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_uses_data_action() {
        assert_eq!(
            resolve_action(Some("tab:operations".into()), None, None),
            Some("tab:operations".to_string())
        );
    }

    #[test]
    fn test_select_appends_value_to_prefix() {
        assert_eq!(
            resolve_action(None, Some("entity:".into()), Some("book_authors".into())),
            Some("entity:book_authors".to_string())
        );
    }

    #[test]
    fn test_placeholder_option_selects_empty_key() {
        let action = resolve_action(None, Some("entity:".into()), Some(String::new())).unwrap();
        assert_eq!(action, "entity:");
        let state = crate::state::SelectionState::default().apply(&action.parse().unwrap());
        assert_eq!(state.active_entity(), Some(""));
    }

    #[test]
    fn test_unmarked_element_yields_nothing() {
        assert_eq!(resolve_action(None, None, Some("books".into())), None);
    }

    #[test]
    fn test_resolved_actions_parse() {
        let state = crate::state::SelectionState::default();
        let action = resolve_action(Some("operation:issue_book".into()), None, None).unwrap();
        let state = state.apply(&action.parse().unwrap());
        assert_eq!(state.active_operation(), Some("issue_book"));
        assert_eq!(state.active_entity(), None);
    }
}
