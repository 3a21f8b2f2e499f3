//! Booking form flow tests
//!
//! Drives the platform-independent core the way the browser runtime does:
//! page events go through an `EventBus`, the places manager and the session
//! observer react to them, and the draft is validated before submission.

#![allow(clippy::unwrap_used)]

use app::booking::draft::{BookingDraft, FieldError};
use app::booking::events::{EventBus, PageEvent};
use app::booking::places::{
    AddressComponent, AutocompleteOptions, InitOutcome, IntegrationStatus, LOCATION_ERROR_MESSAGE,
    LocationField, PlaceDecision, PlaceResult, PlacesError, PlacesManager, PlacesProvider,
    apply_place_selection,
};
use app::booking::session::{SessionObserver, SessionStore};
use app::booking::submission::{SubmissionFlow, SubmitGuard, choose_flow};
use app::booking::trip::{DraftField, TripType};
use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Provider double that records live bindings by id.
#[derive(Default)]
struct FakeProvider {
    library: bool,
    mounted: Rc<Cell<bool>>,
    next_id: u32,
    live: Rc<RefCell<Vec<u32>>>,
}

impl FakeProvider {
    fn ready() -> Self {
        Self {
            library: true,
            mounted: Rc::new(Cell::new(true)),
            ..Self::default()
        }
    }
}

impl PlacesProvider for FakeProvider {
    type Handle = u32;

    fn library_available(&self) -> bool {
        self.library
    }

    fn input_mounted(&self, _field: LocationField) -> bool {
        self.mounted.get()
    }

    fn bind(
        &mut self,
        _field: LocationField,
        options: &AutocompleteOptions,
    ) -> Result<u32, PlacesError> {
        assert_eq!(options.component_restrictions.country, "in");
        self.next_id += 1;
        self.live.borrow_mut().push(self.next_id);
        Ok(self.next_id)
    }

    fn unbind(&mut self, handle: u32) -> Result<(), PlacesError> {
        self.live.borrow_mut().retain(|id| *id != handle);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct MemoryStore(Rc<RefCell<Option<String>>>);

impl SessionStore for MemoryStore {
    fn read_raw(&self) -> Option<String> {
        self.0.borrow().clone()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn place_in(country: &str, address: &str) -> PlaceResult {
    PlaceResult {
        formatted_address: Some(address.to_string()),
        name: None,
        address_components: vec![AddressComponent {
            long_name: country.to_string(),
            short_name: country.to_string(),
            types: vec!["country".to_string(), "political".to_string()],
        }],
    }
}

fn round_trip_draft(pickup_date: &str, return_date: &str) -> BookingDraft {
    let mut draft = BookingDraft::new();
    draft.select_trip_type(TripType::RoundTrip);
    draft.set_field(DraftField::Pickup, "Pune Station".to_string());
    draft.set_field(DraftField::Drop, "Mumbai Airport".to_string());
    draft.set_field(DraftField::PickupDate, pickup_date.to_string());
    draft.set_field(DraftField::ReturnDate, return_date.to_string());
    draft.set_field(DraftField::PickupTime, "09:00".to_string());
    draft
}

/// Mirror of the form submit handler up to the point where navigation starts.
fn submit(draft: &mut BookingDraft, guard: &mut SubmitGuard) -> Option<SubmissionFlow> {
    if !guard.try_begin() {
        return None;
    }
    match draft.validate(today()) {
        Ok(_) => Some(choose_flow(false, false)),
        Err(e) => {
            draft.fail(e.to_string());
            guard.finish();
            None
        }
    }
}

// === Validation blocks submission ===

#[test]
fn test_round_trip_return_before_pickup_blocks_submission() {
    let mut draft = round_trip_draft("2025-03-12", "2025-03-11");
    let mut guard = SubmitGuard::default();

    assert_eq!(
        draft.validate(today()).unwrap_err(),
        FieldError::ReturnBeforePickup
    );
    assert_eq!(FieldError::ReturnBeforePickup.field(), DraftField::ReturnDate);

    assert_eq!(submit(&mut draft, &mut guard), None);
    assert!(draft.error.as_deref().unwrap().contains("Return date"));
    assert!(draft.calculated_distance.is_none());
    assert!(!guard.is_in_flight());
}

#[test]
fn test_round_trip_same_day_return_submits() {
    let mut draft = round_trip_draft("2025-03-12", "2025-03-12");
    let mut guard = SubmitGuard::default();

    assert_eq!(
        submit(&mut draft, &mut guard),
        Some(SubmissionFlow::Direct)
    );
    assert!(guard.is_in_flight());
    assert!(draft.error.is_none());
}

#[test]
fn test_second_submit_ignored_while_in_flight() {
    let mut draft = round_trip_draft("2025-03-12", "2025-03-13");
    let mut guard = SubmitGuard::default();

    assert!(submit(&mut draft, &mut guard).is_some());
    assert_eq!(submit(&mut draft, &mut guard), None);

    guard.finish();
    assert!(submit(&mut draft, &mut guard).is_some());
}

#[test]
fn test_switching_trip_type_keeps_values_and_relaxes_rules() {
    let mut draft = round_trip_draft("2025-03-12", "2025-03-11");
    assert!(draft.validate(today()).is_err());

    draft.select_trip_type(TripType::OneWay);
    let booking = draft.validate(today()).unwrap();

    assert_eq!(booking.pickup_location, "Pune Station");
    assert_eq!(booking.return_date, None);
    assert_eq!(draft.return_date, "2025-03-11");
}

// === Place selection ===

#[test]
fn test_foreign_pickup_rejected_drop_untouched() {
    let mut draft = BookingDraft::new();
    draft.set_field(DraftField::Pickup, "Seattle".to_string());
    draft.set_field(DraftField::Drop, "Mumbai Airport".to_string());

    let decision = apply_place_selection(
        &mut draft,
        LocationField::Pickup,
        &place_in("US", "Seattle, WA, USA"),
        "in",
    );

    assert_eq!(decision, PlaceDecision::Rejected);
    assert_eq!(draft.pickup_location, "");
    assert_eq!(draft.location_error.as_deref(), Some(LOCATION_ERROR_MESSAGE));
    assert!(LOCATION_ERROR_MESSAGE.contains("India"));
    assert_eq!(draft.drop_location, "Mumbai Airport");
    assert!(draft.error.is_none());
}

#[test]
fn test_accepted_place_clears_location_error() {
    let mut draft = BookingDraft::new();
    apply_place_selection(
        &mut draft,
        LocationField::Pickup,
        &place_in("US", "Seattle, WA, USA"),
        "in",
    );

    let decision = apply_place_selection(
        &mut draft,
        LocationField::Pickup,
        &place_in("IN", "Pune Station, Pune, Maharashtra, India"),
        "in",
    );

    assert_eq!(
        decision,
        PlaceDecision::Accepted("Pune Station, Pune, Maharashtra, India".to_string())
    );
    assert_eq!(draft.pickup_location, "Pune Station, Pune, Maharashtra, India");
    assert!(draft.location_error.is_none());
}

// === Places manager driven through the event bus ===

#[test]
fn test_script_load_event_initializes_bindings() {
    let bus = EventBus::new();
    let provider = FakeProvider::ready();
    let live = provider.live.clone();
    let manager = Rc::new(RefCell::new(PlacesManager::new(provider, "IN")));

    let _sub = {
        let manager = manager.clone();
        bus.subscribe(move |event| {
            manager.borrow_mut().handle_event(event);
        })
    };

    manager.borrow_mut().mark_script_loading();
    assert_eq!(manager.borrow().status(), IntegrationStatus::Pending);

    bus.publish(&PageEvent::ScriptLoaded);

    assert!(manager.borrow().is_initialized());
    assert_eq!(manager.borrow().status(), IntegrationStatus::Ready);
    assert_eq!(live.borrow().len(), 2);

    // Focus with live bindings is a no-op.
    bus.publish(&PageEvent::Focus);
    assert_eq!(live.borrow().as_slice(), &[1, 2]);
}

#[test]
fn test_reset_then_reinit_leaves_exactly_two_bindings() {
    let provider = FakeProvider::ready();
    let live = provider.live.clone();
    let mut manager = PlacesManager::new(provider, "in");

    manager.handle_event(&PageEvent::ScriptLoaded);
    manager.cleanup();
    assert!(live.borrow().is_empty());
    assert!(!manager.is_initialized());

    assert_eq!(
        manager.handle_event(&PageEvent::Remounted),
        Some(InitOutcome::Initialized)
    );
    assert_eq!(live.borrow().len(), 2);
    assert!(manager.has_binding(LocationField::Pickup));
    assert!(manager.has_binding(LocationField::Drop));
}

#[test]
fn test_visibility_rearms_after_input_unmount() {
    let provider = FakeProvider::ready();
    let live = provider.live.clone();
    let mut manager = PlacesManager::new(provider, "in");
    manager.handle_event(&PageEvent::ScriptLoaded);

    manager.input_unmounted(LocationField::Drop);
    assert_eq!(live.borrow().len(), 1);

    manager.handle_event(&PageEvent::Visible);
    assert_eq!(live.borrow().len(), 2);
}

#[test]
fn test_remount_moves_bindings_to_fresh_inputs() {
    let bus = EventBus::new();
    let old_inputs = Rc::new(Cell::new(true));
    let provider = FakeProvider {
        mounted: old_inputs.clone(),
        ..FakeProvider::ready()
    };
    let live = provider.live.clone();
    let manager = Rc::new(RefCell::new(PlacesManager::new(provider, "in")));
    let _sub = {
        let manager = manager.clone();
        bus.subscribe(move |event| {
            manager.borrow_mut().handle_event(event);
        })
    };
    bus.publish(&PageEvent::ScriptLoaded);
    assert_eq!(live.borrow().as_slice(), &[1, 2]);

    // The old inputs leave the page before the new ones are handed over.
    old_inputs.set(false);
    bus.publish(&PageEvent::Remounted);
    assert!(live.borrow().is_empty());
    assert!(!manager.borrow().is_initialized());

    let new_inputs = Rc::new(Cell::new(true));
    manager.borrow_mut().retarget(|p| p.mounted = new_inputs.clone());
    bus.publish(&PageEvent::Remounted);
    assert_eq!(live.borrow().as_slice(), &[3, 4]);
    assert_eq!(manager.borrow().status(), IntegrationStatus::Ready);
}

#[test]
fn test_dropping_manager_releases_bindings() {
    let provider = FakeProvider::ready();
    let live = provider.live.clone();
    {
        let mut manager = PlacesManager::new(provider, "in");
        manager.handle_event(&PageEvent::ScriptLoaded);
        assert_eq!(live.borrow().len(), 2);
    }
    assert!(live.borrow().is_empty());
}

#[test]
fn test_missing_library_degrades_without_blocking_submission() {
    let provider = FakeProvider {
        library: false,
        mounted: Rc::new(Cell::new(true)),
        ..FakeProvider::default()
    };
    let mut manager = PlacesManager::new(provider, "in");

    assert_eq!(
        manager.handle_event(&PageEvent::ScriptLoaded),
        Some(InitOutcome::Degraded(PlacesError::LibraryUnavailable))
    );
    assert!(matches!(manager.status(), IntegrationStatus::Degraded(_)));

    let mut draft = round_trip_draft("2025-03-12", "2025-03-13");
    let mut guard = SubmitGuard::default();
    assert!(submit(&mut draft, &mut guard).is_some());
}

#[test]
fn test_script_failure_event_degrades() {
    let bus = EventBus::new();
    let manager = Rc::new(RefCell::new(PlacesManager::new(FakeProvider::ready(), "in")));
    let _sub = {
        let manager = manager.clone();
        bus.subscribe(move |event| {
            manager.borrow_mut().handle_event(event);
        })
    };

    bus.publish(&PageEvent::ScriptFailed("network".to_string()));

    assert_eq!(
        manager.borrow().status(),
        IntegrationStatus::Degraded(PlacesError::ScriptLoad("network".to_string()))
    );
    assert!(!manager.borrow().is_initialized());
}

// === Session observer ===

#[test]
fn test_session_flag_follows_ready_signal_and_other_tabs() {
    let bus = EventBus::new();
    let store = MemoryStore::default();
    *store.0.borrow_mut() = Some(r#"{"isLoggedIn":true}"#.to_string());

    let observer = Rc::new(RefCell::new(SessionObserver::new(store.clone())));
    let changes = Rc::new(RefCell::new(Vec::new()));
    let _sub = {
        let observer = observer.clone();
        let changes = changes.clone();
        bus.subscribe(move |event| {
            if let Some(flag) = observer.borrow_mut().handle_event(event) {
                changes.borrow_mut().push(flag);
            }
        })
    };

    bus.publish(&PageEvent::Focus);
    assert!(changes.borrow().is_empty());
    bus.publish(&PageEvent::SessionReady);

    bus.publish(&PageEvent::StorageChanged {
        key: Some("user".to_string()),
        new_value: Some(r#"{"isLoggedIn":false}"#.to_string()),
    });
    bus.publish(&PageEvent::StorageChanged {
        key: Some("theme".to_string()),
        new_value: Some("dark".to_string()),
    });

    assert_eq!(changes.borrow().as_slice(), &[true, false]);
}

#[test]
fn test_unsubscribed_handlers_stop_receiving_events() {
    let bus = EventBus::new();
    let manager = Rc::new(RefCell::new(PlacesManager::new(FakeProvider::ready(), "in")));
    let sub = {
        let manager = manager.clone();
        bus.subscribe(move |event| {
            manager.borrow_mut().handle_event(event);
        })
    };
    assert_eq!(bus.subscriber_count(), 1);

    drop(sub);
    assert_eq!(bus.subscriber_count(), 0);

    bus.publish(&PageEvent::ScriptLoaded);
    assert!(!manager.borrow().is_initialized());
}
