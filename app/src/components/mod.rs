use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{A, Route, Router, Routes},
};

use crate::components_impl::{ServiceMode, tab_class};

pub mod booking_form;
pub mod search_results;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Corporate Cab Service"/>

        <Router>
            <nav class="bg-gray-800 text-white p-4">
                <div class="container mx-auto flex gap-4">
                    <A href="/" attr:class="hover:text-blue-400">"Book a Cab"</A>
                </div>
            </nav>

            <main class="container mx-auto p-4">
                <Routes fallback=|| "Page not found.">
                    <Route path=StaticSegment("") view=HomePage/>
                    <Route path=StaticSegment("cab-search") view=search_results::SearchResultsPage/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let (mode, set_mode) = signal(ServiceMode::Cab);

    view! {
        <div class="py-10 space-y-6">
            <div class="text-center">
                <h1 class="text-4xl font-bold mb-4">"Corporate Cab Service"</h1>
                <p class="text-gray-600">"Airport transfers, outstation trips and hourly rentals across India"</p>
            </div>

            <div class="service-tabs flex gap-2 justify-center">
                {ServiceMode::ALL
                    .into_iter()
                    .map(|m| {
                        view! {
                            <button
                                type="button"
                                class=move || tab_class(mode.get() == m)
                                on:click=move |_| set_mode.set(m)
                            >
                                {m.label()}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>

            {move || {
                let m = mode.get();
                if m.is_bookable() {
                    view! { <booking_form::CabBookingForm/> }.into_any()
                } else {
                    view! {
                        <p class="card text-center py-12 text-surface-500">
                            {m.label()} " booking is coming soon."
                        </p>
                    }
                        .into_any()
                }
            }}
        </div>
    }
}
