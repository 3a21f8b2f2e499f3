//! Google Maps Places autocomplete, bound through `wasm-bindgen`.

use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::js_sys::{Function, JSON, Reflect};
use web_sys::{HtmlInputElement, HtmlScriptElement};

use crate::booking::events::{EventBus, PageEvent};
use crate::booking::places::{
    AutocompleteOptions, ExistingScript, LocationField, PlaceResult, PlacesError, PlacesProvider,
    SCRIPT_STATE_ATTR, SCRIPT_STATE_FAILED, SCRIPT_STATE_LOADED, places_script_url,
};

const SCRIPT_ELEMENT_ID: &str = "places-autocomplete-script";

#[wasm_bindgen(js_namespace = ["google", "maps", "places"])]
extern "C" {
    #[derive(Debug, Clone)]
    type Autocomplete;

    #[wasm_bindgen(constructor, catch)]
    fn new(input: &HtmlInputElement, options: &JsValue) -> Result<Autocomplete, JsValue>;

    #[wasm_bindgen(method, js_name = addListener)]
    fn add_listener(this: &Autocomplete, event: &str, handler: &Function);

    #[wasm_bindgen(method, js_name = getPlace)]
    fn get_place(this: &Autocomplete) -> JsValue;
}

#[wasm_bindgen(js_namespace = ["google", "maps", "event"])]
extern "C" {
    #[wasm_bindgen(js_name = clearInstanceListeners, catch)]
    fn clear_instance_listeners(instance: &Autocomplete) -> Result<(), JsValue>;
}

pub type PlaceCallback = Rc<dyn Fn(LocationField, PlaceResult)>;

/// Whether `google.maps.places` is present on the page.
pub fn places_library_loaded() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    ["google", "maps", "places"]
        .into_iter()
        .try_fold(JsValue::from(window), |obj, key| {
            Reflect::get(&obj, &JsValue::from_str(key))
                .ok()
                .filter(|v| !v.is_undefined() && !v.is_null())
        })
        .is_some()
}

fn js_error_text(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| JSON::stringify(value).ok().and_then(|s| s.as_string()))
        .unwrap_or_else(|| "unknown error".to_string())
}

fn read_place(autocomplete: &Autocomplete) -> Option<PlaceResult> {
    let raw = JSON::stringify(&autocomplete.get_place()).ok()?.as_string()?;
    match serde_json::from_str(&raw) {
        Ok(place) => Some(place),
        Err(e) => {
            debug!("Unreadable place result: {e}");
            None
        }
    }
}

pub struct GoogleBinding {
    autocomplete: Autocomplete,
    _listener: Closure<dyn FnMut()>,
}

pub struct GooglePlaces {
    pickup: HtmlInputElement,
    drop: HtmlInputElement,
    on_place: PlaceCallback,
}

impl GooglePlaces {
    pub fn new(pickup: HtmlInputElement, drop: HtmlInputElement, on_place: PlaceCallback) -> Self {
        Self {
            pickup,
            drop,
            on_place,
        }
    }

    pub fn is_bound_to(&self, pickup: &HtmlInputElement, drop: &HtmlInputElement) -> bool {
        self.pickup == *pickup && self.drop == *drop
    }

    pub fn set_inputs(&mut self, pickup: HtmlInputElement, drop: HtmlInputElement) {
        self.pickup = pickup;
        self.drop = drop;
    }

    fn input(&self, field: LocationField) -> &HtmlInputElement {
        match field {
            LocationField::Pickup => &self.pickup,
            LocationField::Drop => &self.drop,
        }
    }
}

impl PlacesProvider for GooglePlaces {
    type Handle = GoogleBinding;

    fn library_available(&self) -> bool {
        places_library_loaded()
    }

    fn input_mounted(&self, field: LocationField) -> bool {
        self.input(field).is_connected()
    }

    fn bind(
        &mut self,
        field: LocationField,
        options: &AutocompleteOptions,
    ) -> Result<GoogleBinding, PlacesError> {
        let options = JSON::parse(&options.to_json())
            .map_err(|e| PlacesError::Provider(js_error_text(&e)))?;
        let autocomplete = Autocomplete::new(self.input(field), &options)
            .map_err(|e| PlacesError::Provider(js_error_text(&e)))?;

        let source = autocomplete.clone();
        let on_place = Rc::clone(&self.on_place);
        let listener = Closure::<dyn FnMut()>::new(move || match read_place(&source) {
            Some(place) => on_place(field, place),
            None => debug!("{field:?} selection without place details"),
        });
        autocomplete.add_listener("place_changed", listener.as_ref().unchecked_ref());

        Ok(GoogleBinding {
            autocomplete,
            _listener: listener,
        })
    }

    fn unbind(&mut self, handle: GoogleBinding) -> Result<(), PlacesError> {
        clear_instance_listeners(&handle.autocomplete)
            .map_err(|e| PlacesError::Provider(js_error_text(&e)))
    }
}

fn insert_script(document: &web_sys::Document, api_key: &str) -> Result<HtmlScriptElement, PlacesError> {
    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(|e| PlacesError::ScriptLoad(js_error_text(&e)))?
        .dyn_into()
        .map_err(|_| PlacesError::ScriptLoad("unexpected element".to_string()))?;
    script.set_id(SCRIPT_ELEMENT_ID);
    script.set_src(&places_script_url(api_key));
    script.set_async(true);
    let head = document
        .head()
        .ok_or_else(|| PlacesError::ScriptLoad("no document head".to_string()))?;
    head.append_child(&script)
        .map_err(|e| PlacesError::ScriptLoad(js_error_text(&e)))?;
    Ok(script)
}

fn mark_script(script: &HtmlScriptElement, state: &str) {
    if let Err(e) = script.set_attribute(SCRIPT_STATE_ATTR, state) {
        debug!("Could not record script state: {}", js_error_text(&e));
    }
}

/// Insert the places script once and report its outcome on `bus`.
///
/// When the library is already present `ScriptLoaded` is published right
/// away. A script element left by an earlier mount is reused while it is
/// still loading, reported as loaded once it has loaded, and replaced once it
/// has failed so a remount can retry.
pub fn load_places_script(api_key: &str, bus: &EventBus) -> Result<(), PlacesError> {
    if places_library_loaded() {
        bus.publish(&PageEvent::ScriptLoaded);
        return Ok(());
    }

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| PlacesError::ScriptLoad("no document".to_string()))?;

    let script: HtmlScriptElement = match document.get_element_by_id(SCRIPT_ELEMENT_ID) {
        Some(existing) => {
            let state = existing.get_attribute(SCRIPT_STATE_ATTR);
            match ExistingScript::from_state_attr(state.as_deref()) {
                ExistingScript::Wait => existing
                    .dyn_into()
                    .map_err(|_| PlacesError::ScriptLoad("unexpected element".to_string()))?,
                ExistingScript::Loaded => {
                    bus.publish(&PageEvent::ScriptLoaded);
                    return Ok(());
                }
                ExistingScript::Replace => {
                    debug!("Replacing failed places script");
                    existing.remove();
                    insert_script(&document, api_key)?
                }
            }
        }
        None => insert_script(&document, api_key)?,
    };

    let weak = bus.downgrade();
    let target = script.clone();
    let on_load = Closure::once_into_js(move || {
        mark_script(&target, SCRIPT_STATE_LOADED);
        weak.publish(&PageEvent::ScriptLoaded);
    });
    let weak = bus.downgrade();
    let target = script.clone();
    let on_error = Closure::once_into_js(move || {
        warn!("Places script failed to load");
        mark_script(&target, SCRIPT_STATE_FAILED);
        weak.publish(&PageEvent::ScriptFailed("script error".to_string()));
    });

    script
        .add_event_listener_with_callback("load", on_load.unchecked_ref())
        .and_then(|()| script.add_event_listener_with_callback("error", on_error.unchecked_ref()))
        .map_err(|e| PlacesError::ScriptLoad(js_error_text(&e)))
}
