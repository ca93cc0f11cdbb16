//! WASM utilities for browser interop
//!
//! Listeners attached through a `Closure` must outlive the registration. Rather
//! than `Closure::forget()`, which leaks and never detaches, [`EventListener`]
//! owns the closure and removes the listener when dropped, so a listener's
//! lifetime follows whoever holds it (a playback session, the page).

use wasm_bindgen_x::prelude::*;
use wasm_bindgen_x::JsCast;

/// An event listener that removes itself when dropped.
pub struct EventListener {
    target: web_sys_x::EventTarget,
    event_name: &'static str,
    callback: Closure<dyn FnMut(JsValue)>,
}

impl EventListener {
    /// Attaches `callback` to `target` for `event_name`.
    pub fn new(
        target: &web_sys_x::EventTarget,
        event_name: &'static str,
        callback: impl FnMut(JsValue) + 'static,
    ) -> Self {
        let callback: Closure<dyn FnMut(JsValue)> = Closure::wrap(Box::new(callback));

        target
            .add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())
            .ok();

        Self {
            target: target.clone(),
            event_name,
            callback,
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback(
            self.event_name,
            self.callback.as_ref().unchecked_ref(),
        );
    }
}

/// Milliseconds since the epoch, from the JS clock.
pub fn now_ms() -> f64 {
    js_sys_x::Date::now()
}

#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u64) {
    gloo_timers::future::TimeoutFuture::new(ms as u32).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

/// Bytes of the file picked in the `<input type="file">` with `input_id`,
/// or None when nothing is selected. Clears the selection afterwards.
pub async fn read_selected_file(input_id: &str) -> Result<Option<Vec<u8>>, String> {
    let input = web_sys_x::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(input_id))
        .and_then(|el| el.dyn_into::<web_sys_x::HtmlInputElement>().ok())
        .ok_or_else(|| format!("No file input #{input_id}"))?;

    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return Ok(None);
    };
    let buffer = wasm_bindgen_futures_x::JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Failed to read {}: {e:?}", file.name()))?;
    input.set_value("");

    Ok(Some(js_sys_x::Uint8Array::new(&buffer).to_vec()))
}
