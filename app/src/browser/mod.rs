//! Browser glue for the booking form.
//!
//! Only compiled for `wasm32`; on the server the form renders as plain markup
//! and [`attach_booking_runtime`] is a no-op.

#[cfg(target_arch = "wasm32")]
mod google;
#[cfg(target_arch = "wasm32")]
mod runtime;
#[cfg(target_arch = "wasm32")]
mod storage;
#[cfg(target_arch = "wasm32")]
mod window_events;

use leptos::prelude::*;

use crate::api::BookingConfigDto;
use crate::booking::draft::BookingDraft;

/// Reactive handles the browser runtime needs from the booking form.
#[derive(Clone, Copy)]
pub struct FormHandles {
    pub config: Resource<Result<BookingConfigDto, ServerFnError>>,
    pub draft: RwSignal<BookingDraft>,
    pub pickup_input: NodeRef<leptos::html::Input>,
    pub drop_input: NodeRef<leptos::html::Input>,
    pub set_banner: WriteSignal<Option<String>>,
    pub set_logged_in: WriteSignal<bool>,
}

/// Wire the places integration and the session observer to the form.
#[cfg(target_arch = "wasm32")]
pub fn attach_booking_runtime(handles: FormHandles) {
    runtime::attach(handles);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn attach_booking_runtime(_handles: FormHandles) {}
