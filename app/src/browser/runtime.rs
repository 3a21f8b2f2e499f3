use leptos::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

use super::FormHandles;
use super::google::{GooglePlaces, PlaceCallback, load_places_script};
use super::storage::{API_KEY_OVERRIDE_KEY, LocalSessionStore, read_local};
use super::window_events::WindowEventBridge;
use crate::api::BookingConfigDto;
use crate::booking::events::{EventBus, PageEvent, Subscription};
use crate::booking::places::{PlacesManager, apply_place_selection, resolve_api_key};
use crate::booking::session::SessionObserver;
use crate::components_impl::integration_banner;

/// Everything the mounted form keeps alive in the browser. Dropping it
/// unsubscribes the handlers, removes the window listeners and releases the
/// autocomplete bindings.
struct BookingRuntime {
    _subscriptions: Vec<Subscription>,
    _window: WindowEventBridge,
    places: Rc<RefCell<PlacesManager<GooglePlaces>>>,
    bus: EventBus,
    set_banner: WriteSignal<Option<String>>,
}

impl BookingRuntime {
    fn mount(
        config: &BookingConfigDto,
        pickup: web_sys::HtmlInputElement,
        drop: web_sys::HtmlInputElement,
        handles: FormHandles,
    ) -> Self {
        let bus = EventBus::new();
        let draft = handles.draft;
        let set_banner = handles.set_banner;
        let set_logged_in = handles.set_logged_in;

        let country = config.service_country.clone();
        let on_place: PlaceCallback = Rc::new(move |field, place| {
            draft.update(|d| {
                apply_place_selection(d, field, &place, &country);
            });
        });
        let places = Rc::new(RefCell::new(PlacesManager::new(
            GooglePlaces::new(pickup, drop, on_place),
            &config.service_country,
        )));

        let places_sub = {
            let places = Rc::clone(&places);
            bus.subscribe(move |event| {
                let mut manager = places.borrow_mut();
                if let Some(outcome) = manager.handle_event(event) {
                    debug!("Places re-arm after {event:?}: {outcome:?}");
                }
                set_banner.set(integration_banner(&manager.status()));
            })
        };

        let session_sub = {
            let session = RefCell::new(SessionObserver::new(LocalSessionStore));
            bus.subscribe(move |event| {
                if let Some(logged_in) = session.borrow_mut().handle_event(event) {
                    set_logged_in.set(logged_in);
                }
            })
        };

        let window = WindowEventBridge::attach(&bus);
        let runtime = Self {
            _subscriptions: vec![places_sub, session_sub],
            _window: window,
            places,
            bus,
            set_banner,
        };
        runtime.load_script(config);
        runtime.bus.publish(&PageEvent::SessionReady);
        runtime
    }

    fn load_script(&self, config: &BookingConfigDto) {
        let local_override = read_local(API_KEY_OVERRIDE_KEY);
        let Some(key) = resolve_api_key(config.places_api_key.as_deref(), local_override.as_deref())
        else {
            let mut places = self.places.borrow_mut();
            places.mark_missing_key();
            self.set_banner.set(integration_banner(&places.status()));
            return;
        };

        self.places.borrow_mut().mark_script_loading();
        if let Err(e) = load_places_script(&key, &self.bus) {
            warn!("Could not insert places script: {e}");
            self.bus.publish(&PageEvent::ScriptFailed(e.to_string()));
        }
    }

    /// The form re-rendered. Bindings follow the inputs now on the page.
    fn remount(&self, pickup: web_sys::HtmlInputElement, drop: web_sys::HtmlInputElement) {
        {
            let mut places = self.places.borrow_mut();
            let moved = !places.provider().is_bound_to(&pickup, &drop);
            if moved {
                debug!("Booking inputs replaced, moving autocomplete bindings");
                places.retarget(|p| p.set_inputs(pickup, drop));
            }
        }
        self.bus.publish(&PageEvent::Remounted);
    }
}

pub fn attach(handles: FormHandles) {
    let runtime = StoredValue::new_local(None::<BookingRuntime>);

    Effect::new(move |_| {
        let config = match handles.config.get() {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                warn!("Booking config unavailable, autocomplete disabled: {e}");
                BookingConfigDto::default()
            }
            None => return,
        };
        let (Some(pickup), Some(drop)) = (handles.pickup_input.get(), handles.drop_input.get())
        else {
            return;
        };

        if runtime.with_value(Option::is_some) {
            runtime.with_value(|r| {
                if let Some(r) = r {
                    r.remount(pickup, drop);
                }
            });
            return;
        }
        runtime.set_value(Some(BookingRuntime::mount(&config, pickup, drop, handles)));
    });

    on_cleanup(move || {
        // Already disposed means the runtime was dropped with the owner.
        let _ = runtime.try_set_value(None);
    });
}
