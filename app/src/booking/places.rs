//! Places autocomplete integration.
//!
//! [`PlacesManager`] is the single owner of the two autocomplete bindings
//! (pickup, drop). It only creates bindings once the provider library is
//! loaded and both inputs are mounted, always releases stale bindings before
//! creating new ones, and re-arms itself on script load, visibility, focus and
//! remount when a binding is missing. The actual widget lives behind
//! [`PlacesProvider`], so the browser implementation and test doubles share
//! the same lifecycle rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use super::draft::BookingDraft;
use super::events::PageEvent;
use super::trip::DraftField;

pub const LOCATION_ERROR_MESSAGE: &str = "Service is limited to India only";
pub const PLACE_FIELDS: [&str; 3] = ["address_components", "formatted_address", "name"];
const PLACES_SCRIPT_BASE: &str = "https://maps.googleapis.com/maps/api/js";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationField {
    Pickup,
    Drop,
}

impl LocationField {
    pub fn draft_field(self) -> DraftField {
        match self {
            Self::Pickup => DraftField::Pickup,
            Self::Drop => DraftField::Drop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddressComponent {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Subset of a provider place result that the form relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlaceResult {
    pub formatted_address: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

impl PlaceResult {
    /// Text written back into the input: the formatted address, else the name.
    pub fn display_text(&self) -> String {
        self.formatted_address
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

/// Whether `place` has a country component with `country_code` (case-insensitive).
pub fn is_in_service_country(place: &PlaceResult, country_code: &str) -> bool {
    place.address_components.iter().any(|c| {
        c.types.iter().any(|t| t == "country") && c.short_name.eq_ignore_ascii_case(country_code)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceDecision {
    Accepted(String),
    Rejected,
}

/// Apply a selected place to the draft field it belongs to.
///
/// Accepted places fill the field and clear the location error; rejected ones
/// clear the field and set it. The other location field is left alone.
pub fn apply_place_selection(
    draft: &mut BookingDraft,
    field: LocationField,
    place: &PlaceResult,
    country_code: &str,
) -> PlaceDecision {
    let target = match field {
        LocationField::Pickup => &mut draft.pickup_location,
        LocationField::Drop => &mut draft.drop_location,
    };

    if is_in_service_country(place, country_code) {
        let text = place.display_text();
        *target = text.clone();
        draft.location_error = None;
        debug!("Accepted {field:?} place: {text}");
        PlaceDecision::Accepted(text)
    } else {
        target.clear();
        draft.location_error = Some(LOCATION_ERROR_MESSAGE.to_string());
        info!("Rejected {field:?} place outside service country {country_code}");
        PlaceDecision::Rejected
    }
}

/// Options handed to the provider when binding an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteOptions {
    pub component_restrictions: ComponentRestrictions,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRestrictions {
    pub country: String,
}

impl AutocompleteOptions {
    pub fn for_country(country_code: &str) -> Self {
        Self {
            component_restrictions: ComponentRestrictions {
                country: country_code.to_ascii_lowercase(),
            },
            fields: PLACE_FIELDS.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// URL of the provider script for `api_key`.
pub fn places_script_url(api_key: &str) -> String {
    format!(
        "{PLACES_SCRIPT_BASE}?key={}&libraries=places",
        urlencoding::encode(api_key)
    )
}

/// Attribute recording how the places script element finished loading.
pub const SCRIPT_STATE_ATTR: &str = "data-load-state";
pub const SCRIPT_STATE_LOADED: &str = "loaded";
pub const SCRIPT_STATE_FAILED: &str = "failed";

/// What a later mount does with a script element an earlier mount inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingScript {
    /// Still loading; listen for its outcome.
    Wait,
    /// Already fired `load`; report success right away.
    Loaded,
    /// Already fired `error`; it will never load, insert a fresh one.
    Replace,
}

impl ExistingScript {
    pub fn from_state_attr(value: Option<&str>) -> Self {
        match value {
            Some(SCRIPT_STATE_LOADED) => Self::Loaded,
            Some(SCRIPT_STATE_FAILED) => Self::Replace,
            _ => Self::Wait,
        }
    }
}

/// Pick the API key: a non-empty local override wins over configuration.
/// There is no built-in fallback key.
pub fn resolve_api_key(configured: Option<&str>, local_override: Option<&str>) -> Option<String> {
    local_override
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| configured.map(str::trim).filter(|k| !k.is_empty()))
        .map(ToString::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacesError {
    MissingApiKey,
    ScriptLoad(String),
    LibraryUnavailable,
    InputMissing(LocationField),
    AlreadyBound(LocationField),
    Provider(String),
}

impl fmt::Display for PlacesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "places API key is not configured"),
            Self::ScriptLoad(msg) => write!(f, "places script failed to load: {msg}"),
            Self::LibraryUnavailable => write!(f, "places library is not available"),
            Self::InputMissing(field) => write!(f, "{field:?} input is not mounted"),
            Self::AlreadyBound(field) => write!(f, "{field:?} input is already bound"),
            Self::Provider(msg) => write!(f, "provider error: {msg}"),
        }
    }
}

impl std::error::Error for PlacesError {}

/// The external autocomplete widget.
pub trait PlacesProvider {
    type Handle;

    fn library_available(&self) -> bool;
    fn input_mounted(&self, field: LocationField) -> bool;
    fn bind(
        &mut self,
        field: LocationField,
        options: &AutocompleteOptions,
    ) -> Result<Self::Handle, PlacesError>;
    fn unbind(&mut self, handle: Self::Handle) -> Result<(), PlacesError>;
}

/// A live binding between one input and the provider widget.
///
/// The handle is never exposed; the only way out is [`AutocompleteBinding::release`].
pub struct AutocompleteBinding<H> {
    field: LocationField,
    handle: H,
}

impl<H> AutocompleteBinding<H> {
    pub fn acquire<P>(
        provider: &mut P,
        field: LocationField,
        options: &AutocompleteOptions,
    ) -> Result<Self, PlacesError>
    where
        P: PlacesProvider<Handle = H>,
    {
        let handle = provider.bind(field, options)?;
        Ok(Self { field, handle })
    }

    pub fn release<P>(self, provider: &mut P) -> Result<(), PlacesError>
    where
        P: PlacesProvider<Handle = H>,
    {
        provider.unbind(self.handle)
    }

    pub fn field(&self) -> LocationField {
        self.field
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptState {
    NotRequested,
    MissingKey,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Initialized,
    AlreadyInitialized,
    /// Preconditions not met yet; a later trigger will retry.
    Deferred(DeferReason),
    /// Running without autocomplete; the inputs stay plain text fields.
    Degraded(PlacesError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    ScriptNotLoaded,
    InputsNotMounted,
}

/// Integration state as seen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationStatus {
    Pending,
    Ready,
    Degraded(PlacesError),
}

pub struct PlacesManager<P: PlacesProvider> {
    provider: P,
    options: AutocompleteOptions,
    script: ScriptState,
    pickup: Option<AutocompleteBinding<P::Handle>>,
    drop: Option<AutocompleteBinding<P::Handle>>,
    initialized: bool,
    degraded: Option<PlacesError>,
}

impl<P: PlacesProvider> PlacesManager<P> {
    pub fn new(provider: P, country_code: &str) -> Self {
        Self {
            provider,
            options: AutocompleteOptions::for_country(country_code),
            script: ScriptState::NotRequested,
            pickup: None,
            drop: None,
            initialized: false,
            degraded: None,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Point the provider at new inputs. Bindings held on the old ones are
    /// released first; the next re-arm trigger binds the new ones.
    pub fn retarget(&mut self, update: impl FnOnce(&mut P)) {
        self.cleanup();
        update(&mut self.provider);
    }

    pub fn script_state(&self) -> &ScriptState {
        &self.script
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn has_binding(&self, field: LocationField) -> bool {
        self.slot(field).is_some()
    }

    fn has_live_bindings(&self) -> bool {
        self.pickup.is_some() && self.drop.is_some()
    }

    fn slot(&self, field: LocationField) -> Option<&AutocompleteBinding<P::Handle>> {
        match field {
            LocationField::Pickup => self.pickup.as_ref(),
            LocationField::Drop => self.drop.as_ref(),
        }
    }

    pub fn status(&self) -> IntegrationStatus {
        if let Some(e) = &self.degraded {
            return IntegrationStatus::Degraded(e.clone());
        }
        match &self.script {
            ScriptState::MissingKey => IntegrationStatus::Degraded(PlacesError::MissingApiKey),
            ScriptState::Failed(msg) => {
                IntegrationStatus::Degraded(PlacesError::ScriptLoad(msg.clone()))
            }
            _ if self.initialized => IntegrationStatus::Ready,
            _ => IntegrationStatus::Pending,
        }
    }

    pub fn mark_missing_key(&mut self) {
        warn!("Places API key missing, autocomplete disabled");
        self.script = ScriptState::MissingKey;
    }

    pub fn mark_script_loading(&mut self) {
        if self.script != ScriptState::Loaded {
            self.script = ScriptState::Loading;
        }
    }

    pub fn on_script_failed(&mut self, reason: &str) {
        warn!("Places script failed to load: {reason}");
        self.script = ScriptState::Failed(reason.to_string());
    }

    /// Create both bindings if everything is in place.
    ///
    /// Idempotent: a manager with both bindings live returns
    /// [`InitOutcome::AlreadyInitialized`]. Any stale binding is released
    /// before new ones are created.
    pub fn initialize(&mut self) -> InitOutcome {
        if self.script != ScriptState::Loaded {
            return InitOutcome::Deferred(DeferReason::ScriptNotLoaded);
        }
        if self.initialized && self.has_live_bindings() {
            return InitOutcome::AlreadyInitialized;
        }
        if !self.provider.library_available() {
            debug!("Places library absent, leaving inputs as plain text");
            self.degraded = Some(PlacesError::LibraryUnavailable);
            return InitOutcome::Degraded(PlacesError::LibraryUnavailable);
        }
        if !self.provider.input_mounted(LocationField::Pickup)
            || !self.provider.input_mounted(LocationField::Drop)
        {
            return InitOutcome::Deferred(DeferReason::InputsNotMounted);
        }

        self.cleanup();

        let pickup =
            match AutocompleteBinding::acquire(&mut self.provider, LocationField::Pickup, &self.options)
            {
                Ok(binding) => binding,
                Err(e) => return self.degrade(e),
            };
        let drop =
            match AutocompleteBinding::acquire(&mut self.provider, LocationField::Drop, &self.options) {
                Ok(binding) => binding,
                Err(e) => {
                    if let Err(release_err) = pickup.release(&mut self.provider) {
                        debug!("Ignoring pickup release failure: {release_err}");
                    }
                    return self.degrade(e);
                }
            };

        self.pickup = Some(pickup);
        self.drop = Some(drop);
        self.initialized = true;
        self.degraded = None;
        info!("Places autocomplete bound to pickup and drop inputs");
        InitOutcome::Initialized
    }

    fn degrade(&mut self, error: PlacesError) -> InitOutcome {
        warn!("Places autocomplete unavailable: {error}");
        self.degraded = Some(error.clone());
        InitOutcome::Degraded(error)
    }

    /// React to a page event, re-initializing only when a binding is missing.
    pub fn handle_event(&mut self, event: &PageEvent) -> Option<InitOutcome> {
        match event {
            PageEvent::ScriptLoaded => {
                self.script = ScriptState::Loaded;
            }
            PageEvent::ScriptFailed(reason) => {
                self.on_script_failed(reason);
                return None;
            }
            PageEvent::Visible | PageEvent::Focus | PageEvent::Remounted => {}
            PageEvent::StorageChanged { .. } | PageEvent::SessionReady => return None,
        }

        self.drop_unmounted_bindings();
        if self.has_live_bindings() {
            return None;
        }
        Some(self.initialize())
    }

    fn drop_unmounted_bindings(&mut self) {
        for field in [LocationField::Pickup, LocationField::Drop] {
            if self.has_binding(field) && !self.provider.input_mounted(field) {
                debug!("{field:?} input detached, releasing its binding");
                self.input_unmounted(field);
            }
        }
    }

    /// The input behind `field` went away; its binding must not outlive it.
    pub fn input_unmounted(&mut self, field: LocationField) {
        let binding = match field {
            LocationField::Pickup => self.pickup.take(),
            LocationField::Drop => self.drop.take(),
        };
        if let Some(binding) = binding {
            self.release_quietly(binding);
        }
        self.initialized = false;
    }

    /// Release both bindings. Failures are logged and swallowed; the slots are
    /// emptied regardless.
    pub fn cleanup(&mut self) {
        if let Some(binding) = self.pickup.take() {
            self.release_quietly(binding);
        }
        if let Some(binding) = self.drop.take() {
            self.release_quietly(binding);
        }
        self.initialized = false;
    }

    fn release_quietly(&mut self, binding: AutocompleteBinding<P::Handle>) {
        let field = binding.field();
        if let Err(e) = binding.release(&mut self.provider) {
            debug!("Ignoring {field:?} binding release failure: {e}");
        }
    }
}

impl<P: PlacesProvider> Drop for PlacesManager<P> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
