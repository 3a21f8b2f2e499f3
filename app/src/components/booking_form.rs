use chrono::Local;
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;
use tracing::{error, warn};

use crate::api::{BookingConfigDto, calculate_distance, get_booking_config};
use crate::booking::draft::{BookingDraft, ValidatedBooking};
use crate::booking::submission::{
    ContactDetails, DEFAULT_RESULTS_PATH, GENERIC_SUBMIT_ERROR, SearchQuery, SubmissionFlow,
    SubmitGuard, choose_flow,
};
use crate::booking::trip::{DraftField, RentalPackage, TripType};
use crate::browser::{FormHandles, attach_booking_runtime};
use crate::components_impl::{drop_placeholder, min_date_attr, submit_label, tab_class};

type ConfigResource = Resource<Result<BookingConfigDto, ServerFnError>>;

fn current_config(config: ConfigResource) -> BookingConfigDto {
    config.get_untracked().and_then(Result::ok).unwrap_or_default()
}

fn today_attr() -> String {
    min_date_attr(Local::now().date_naive())
}

#[component]
pub fn CabBookingForm() -> impl IntoView {
    let config: ConfigResource = Resource::new(|| (), |()| async { get_booking_config().await });
    let draft = RwSignal::new(BookingDraft::new());
    let guard = RwSignal::new(SubmitGuard::default());
    let pending = RwSignal::new(None::<ValidatedBooking>);
    let (banner, set_banner) = signal::<Option<String>>(None);
    let (logged_in, set_logged_in) = signal(false);
    let (nav_target, set_nav_target) = signal::<Option<String>>(None);

    let pickup_input = NodeRef::<leptos::html::Input>::new();
    let drop_input = NodeRef::<leptos::html::Input>::new();

    attach_booking_runtime(FormHandles {
        config,
        draft,
        pickup_input,
        drop_input,
        set_banner,
        set_logged_in,
    });

    let navigate = use_navigate();
    Effect::new(move |_| {
        if let Some(url) = nav_target.get() {
            navigate(&url, NavigateOptions::default());
        }
    });

    // Awaits the distance, then hands the query to the router. The guard is
    // already held by the caller.
    let submit_booking = move |booking: ValidatedBooking, contact: Option<ContactDetails>| {
        let cfg = current_config(config);
        leptos::task::spawn_local(async move {
            let distance = match calculate_distance(booking.distance_request()).await {
                Ok(km) => km,
                Err(e) => {
                    warn!("Distance lookup failed, using default: {e}");
                    cfg.default_distance_km
                }
            };
            draft.update(|d| d.calculated_distance = Some(distance));

            let mut query = SearchQuery::from_booking(&booking, distance);
            if let Some(contact) = contact {
                query = query.with_contact(contact);
            }

            match query.results_url(DEFAULT_RESULTS_PATH) {
                Ok(url) => {
                    draft.update(BookingDraft::reset);
                    guard.update(SubmitGuard::finish);
                    set_nav_target.set(Some(url));
                }
                Err(e) => {
                    error!("Booking submission failed: {e}");
                    draft.update(|d| d.fail(GENERIC_SUBMIT_ERROR));
                    guard.update(SubmitGuard::finish);
                }
            }
        });
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if !guard.try_update(SubmitGuard::try_begin).unwrap_or(false) {
            return;
        }

        let today = Local::now().date_naive();
        let booking = match draft.with_untracked(|d| d.validate(today)) {
            Ok(booking) => booking,
            Err(e) => {
                draft.update(|d| d.fail(e.to_string()));
                guard.update(SubmitGuard::finish);
                return;
            }
        };

        let cfg = current_config(config);
        match choose_flow(cfg.detailed_submit, logged_in.get_untracked()) {
            SubmissionFlow::Direct => submit_booking(booking, None),
            // The guard stays held until the popup submits or is dismissed.
            SubmissionFlow::Detailed => pending.set(Some(booking)),
        }
    };

    let on_contact = move |contact: ContactDetails| {
        if let Some(booking) = pending.try_update(Option::take).flatten() {
            submit_booking(booking, Some(contact));
        }
    };

    let on_contact_cancel = move || {
        pending.set(None);
        guard.update(SubmitGuard::finish);
    };

    let in_flight = move || guard.with(SubmitGuard::is_in_flight);

    view! {
        <form class="booking-form card p-6 space-y-4" on:submit=on_submit>
            <div class="trip-tabs flex gap-2">
                {TripType::ALL
                    .into_iter()
                    .map(|trip| {
                        view! {
                            <button
                                type="button"
                                class=move || tab_class(draft.with(|d| d.trip_type == trip))
                                on:click=move |_| {
                                    draft.update(|d| {
                                        d.select_trip_type(trip);
                                    });
                                }
                            >
                                {trip.label()}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>

            {move || banner.get().map(|text| view! { <p class="banner-warning">{text}</p> })}

            <div class="grid grid-cols-2 gap-4">
                <input
                    type="text"
                    name="pickup"
                    class="form-input"
                    placeholder="Pickup location"
                    autocomplete="off"
                    node_ref=pickup_input
                    prop:value=move || draft.with(|d| d.pickup_location.clone())
                    on:input=move |ev| {
                        draft.update(|d| d.set_field(DraftField::Pickup, event_target_value(&ev)));
                    }
                />
                <input
                    type="text"
                    name="drop"
                    class="form-input"
                    placeholder=move || draft.with(|d| drop_placeholder(d.trip_type))
                    autocomplete="off"
                    node_ref=drop_input
                    prop:value=move || draft.with(|d| d.drop_location.clone())
                    on:input=move |ev| {
                        draft.update(|d| d.set_field(DraftField::Drop, event_target_value(&ev)));
                    }
                />
            </div>

            {move || {
                draft
                    .with(|d| d.location_error.clone())
                    .map(|msg| view! { <p class="location-error text-danger-600">{msg}</p> })
            }}

            <div class="grid grid-cols-3 gap-4">
                <label class="form-label">
                    "Pickup date"
                    <input
                        type="date"
                        name="pickupDate"
                        class="form-input"
                        min=today_attr()
                        prop:value=move || draft.with(|d| d.pickup_date.clone())
                        on:input=move |ev| {
                            draft.update(|d| d.set_field(DraftField::PickupDate, event_target_value(&ev)));
                        }
                    />
                </label>

                <Show when=move || draft.with(|d| d.trip_type.shows(DraftField::ReturnDate))>
                    <label class="form-label">
                        "Return date"
                        <input
                            type="date"
                            name="returnDate"
                            class="form-input"
                            min=move || {
                                let pickup = draft.with(|d| d.pickup_date.clone());
                                if pickup.is_empty() { today_attr() } else { pickup }
                            }
                            prop:value=move || draft.with(|d| d.return_date.clone())
                            on:input=move |ev| {
                                draft.update(|d| d.set_field(DraftField::ReturnDate, event_target_value(&ev)));
                            }
                        />
                    </label>
                </Show>

                <label class="form-label">
                    "Pickup time"
                    <input
                        type="time"
                        name="pickupTime"
                        class="form-input"
                        prop:value=move || draft.with(|d| d.pickup_time.clone())
                        on:input=move |ev| {
                            draft.update(|d| d.set_field(DraftField::PickupTime, event_target_value(&ev)));
                        }
                    />
                </label>
            </div>

            <Show when=move || draft.with(|d| d.trip_type.shows(DraftField::Package))>
                <select
                    name="packageName"
                    class="form-select"
                    prop:value=move || draft.with(|d| d.field(DraftField::Package).to_string())
                    on:change=move |ev| {
                        draft.update(|d| d.set_field(DraftField::Package, event_target_value(&ev)));
                    }
                >
                    <option value="">"Select package"</option>
                    {RentalPackage::ALL
                        .into_iter()
                        .map(|p| view! { <option value=p.label()>{p.label()}</option> })
                        .collect_view()}
                </select>
            </Show>

            {move || {
                draft
                    .with(|d| d.error.clone())
                    .map(|msg| view! { <p class="form-error text-danger-600">{msg}</p> })
            }}

            <button type="submit" class="btn-primary w-full" disabled=in_flight>
                {move || submit_label(in_flight())}
            </button>
        </form>

        <Show when=move || pending.with(Option::is_some)>
            <ContactPopup on_submit=on_contact on_cancel=on_contact_cancel/>
        </Show>
    }
}

/// Collects name and mobile before navigating, for the detailed flow.
#[component]
fn ContactPopup(
    on_submit: impl Fn(ContactDetails) + 'static + Copy + Send + Sync,
    on_cancel: impl Fn() + 'static + Copy + Send + Sync,
) -> impl IntoView {
    let (name, set_name) = signal(String::new());
    let (mobile, set_mobile) = signal(String::new());
    let (contact_error, set_contact_error) = signal::<Option<String>>(None);

    let handle_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        match ContactDetails::parse(&name.get_untracked(), &mobile.get_untracked()) {
            Ok(contact) => on_submit(contact),
            Err(e) => set_contact_error.set(Some(e.to_string())),
        }
    };

    view! {
        <div class="modal-backdrop">
            <div class="modal-content">
                <form on:submit=handle_submit>
                    <div class="modal-header">
                        <h2 class="text-xl font-semibold text-surface-900">"Almost there"</h2>
                    </div>
                    <div class="modal-body space-y-4">
                        <input
                            type="text"
                            name="name"
                            class="form-input"
                            placeholder="Full name"
                            prop:value=name
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                        />
                        <input
                            type="tel"
                            name="mobile"
                            class="form-input"
                            placeholder="Mobile number"
                            prop:value=mobile
                            on:input=move |ev| set_mobile.set(event_target_value(&ev))
                        />
                        {move || contact_error.get().map(|msg| view! { <p class="text-danger-600">{msg}</p> })}
                    </div>
                    <div class="modal-footer">
                        <button type="button" class="btn-secondary" on:click=move |_| on_cancel()>
                            "Cancel"
                        </button>
                        <button type="submit" class="btn-primary">"Continue"</button>
                    </div>
                </form>
            </div>
        </div>
    }
}
