pub mod catalog;
mod dom;
pub mod html;
pub mod layout;
pub mod measure;
pub mod operations;
pub mod schema;
pub mod session;
pub mod state;
pub mod svg;
pub mod text;
pub mod view_model;
pub mod workflow;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use catalog::CatalogError;
use dom::Listener;
use session::Session;

pub use dom::resolve_action;

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("Failed to find the root element")]
    MissingMountPoint,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Initialize panic hook, console logging and the process shim in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        init_console_logging();
        install_process_shim();
    }
}

#[cfg(target_arch = "wasm32")]
fn init_console_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(dom::ConsoleWriter::default)
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init();
}

/// Define `globalThis.process = { env: {} }` when the host has none, so
/// scripts that read `process.env` keep working in the browser.
#[cfg(target_arch = "wasm32")]
fn install_process_shim() {
    let global = js_sys::global();
    let key = JsValue::from_str("process");
    let missing = js_sys::Reflect::get(&global, &key)
        .map(|v| v.is_falsy())
        .unwrap_or(true);
    if missing {
        let process = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&process, &JsValue::from_str("env"), &js_sys::Object::new());
        let _ = js_sys::Reflect::set(&global, &key, &process);
    }
}

fn require_root(root: Option<JsValue>) -> Result<JsValue, MountError> {
    root.ok_or(MountError::MissingMountPoint)
}

/// The live session plus the element it paints into, shared with the
/// event listeners.
struct Mounted {
    root: JsValue,
    session: RefCell<Session<'static>>,
}

impl Mounted {
    fn dispatch(&self, action: &str) -> Result<(), String> {
        self.session
            .borrow_mut()
            .dispatch(action)
            .map_err(|e| e.to_string())?;
        self.paint()
    }

    fn paint(&self) -> Result<(), String> {
        let html = self.session.borrow().render_html();
        js_sys::Reflect::set(
            &self.root,
            &JsValue::from_str("innerHTML"),
            &JsValue::from_str(&html),
        )
        .map(|_| ())
        .map_err(|e| format!("Failed to render into root element: {:?}", e))
    }
}

fn listen(
    mounted: &Rc<Mounted>,
    event: &'static str,
    read: fn(&JsValue) -> Option<String>,
) -> Result<Listener, String> {
    let target = Rc::clone(mounted);
    Listener::attach(&mounted.root, event, move |e: JsValue| {
        if let Some(action) = read(&e) {
            if let Err(err) = target.dispatch(&action) {
                tracing::warn!(%action, error = %err, "interaction rejected");
            }
        }
    })
    .map_err(|e| format!("Failed to listen for {} events: {:?}", event, e))
}

/// Browser handle: keeps the session and its DOM listeners alive.
#[wasm_bindgen]
pub struct Visualizer {
    mounted: Rc<Mounted>,
    _listeners: Vec<Listener>,
}

/// Attach the visualizer to `root`, paint the initial state and route
/// clicks and dropdown changes on `root` back into the session.
#[wasm_bindgen]
pub fn mount(root: JsValue) -> Result<Visualizer, String> {
    let present = !(root.is_null() || root.is_undefined());
    let root = require_root(present.then_some(root)).map_err(|e| e.to_string())?;
    let catalog = catalog::library()
        .map_err(MountError::from)
        .map_err(|e| e.to_string())?;

    let mounted = Rc::new(Mounted {
        root,
        session: RefCell::new(Session::new(catalog)),
    });
    mounted.paint()?;
    let listeners = vec![
        listen(&mounted, "click", dom::clicked_action)?,
        listen(&mounted, "change", dom::changed_action)?,
    ];
    tracing::info!("visualizer mounted");
    Ok(Visualizer {
        mounted,
        _listeners: listeners,
    })
}

#[wasm_bindgen]
impl Visualizer {
    /// Apply one encoded interaction (`tab:operations`, `entity:books`,
    /// `operation:issue_book`, `toggle-relationships`) and repaint.
    pub fn dispatch(&self, action: &str) -> Result<(), String> {
        self.mounted.dispatch(action)
    }

    #[wasm_bindgen(js_name = "renderHtml")]
    pub fn render_html(&self) -> String {
        self.mounted.session.borrow().render_html()
    }

    #[wasm_bindgen(js_name = "renderSvg")]
    pub fn render_svg(&self) -> String {
        self.mounted.session.borrow().render_svg()
    }

    #[wasm_bindgen(js_name = "viewModelJson")]
    pub fn view_model_json(&self) -> Result<String, String> {
        self.mounted
            .session
            .borrow()
            .view_model_json()
            .map_err(|e| e.to_string())
    }
}

/// Render the schema diagram for the initial state to SVG
#[wasm_bindgen(js_name = "schemaToSvg")]
pub fn render_schema_svg() -> Result<String, String> {
    let catalog = catalog::library().map_err(|e| e.to_string())?;
    Ok(Session::new(catalog).render_svg())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaError;

    #[test]
    fn test_missing_root_is_fatal() {
        let err = require_root(None).unwrap_err();
        assert!(matches!(err, MountError::MissingMountPoint));
        assert_eq!(err.to_string(), "Failed to find the root element");
    }

    #[test]
    fn test_catalog_error_surfaces_through_mount() {
        let err = MountError::from(CatalogError::from(SchemaError::UnknownTarget {
            from: "books".into(),
            to: "shelves".into(),
        }));
        assert!(matches!(err, MountError::Catalog(CatalogError::Schema(_))));
        assert_eq!(
            err.to_string(),
            "Invalid schema: Relationship books -> shelves targets an unregistered entity"
        );
    }
}
