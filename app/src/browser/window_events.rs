use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{EventTarget, StorageEvent, VisibilityState};

use crate::booking::events::{EventBus, PageEvent};

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

/// Forwards visibility, focus and storage events into an [`EventBus`] until
/// dropped.
pub struct WindowEventBridge {
    listeners: Vec<Listener>,
}

impl WindowEventBridge {
    pub fn attach(bus: &EventBus) -> Self {
        let mut bridge = Self {
            listeners: Vec::new(),
        };
        let Some(window) = web_sys::window() else {
            return bridge;
        };

        if let Some(document) = window.document() {
            let weak = bus.downgrade();
            let doc = document.clone();
            bridge.listen(
                document.into(),
                "visibilitychange",
                Closure::new(move |_event: web_sys::Event| {
                    if doc.visibility_state() == VisibilityState::Visible {
                        weak.publish(&PageEvent::Visible);
                    }
                }),
            );
        }

        let weak = bus.downgrade();
        bridge.listen(
            window.clone().into(),
            "focus",
            Closure::new(move |_event: web_sys::Event| {
                weak.publish(&PageEvent::Focus);
            }),
        );

        let weak = bus.downgrade();
        bridge.listen(
            window.into(),
            "storage",
            Closure::new(move |event: web_sys::Event| {
                if let Some(event) = event.dyn_ref::<StorageEvent>() {
                    weak.publish(&PageEvent::StorageChanged {
                        key: event.key(),
                        new_value: event.new_value(),
                    });
                }
            }),
        );

        bridge
    }

    fn listen(
        &mut self,
        target: EventTarget,
        event: &'static str,
        callback: Closure<dyn FnMut(web_sys::Event)>,
    ) {
        match target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
            Ok(()) => self.listeners.push(Listener {
                target,
                event,
                callback,
            }),
            Err(e) => debug!("Could not listen for {event}: {e:?}"),
        }
    }
}

impl Drop for WindowEventBridge {
    fn drop(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
    }
}
