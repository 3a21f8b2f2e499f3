use leptos::prelude::*;
use leptos_router::{components::A, hooks::use_query_map};

use crate::booking::submission::SearchQuery;
use crate::components_impl::trip_summary_rows;

#[component]
pub fn SearchResultsPage() -> impl IntoView {
    let query = use_query_map();
    let search = move || query.with(|params| SearchQuery::from_params(|key| params.get(key)));

    view! {
        <div class="space-y-6">
            <h1 class="text-2xl font-bold text-surface-900">"Available Cabs"</h1>
            {move || match search() {
                Some(q) => view! { <TripSummary query=q/> }.into_any(),
                None => {
                    view! {
                        <div class="card text-center py-12">
                            <p class="text-danger-600 mb-4">"Missing trip details. Please start a new search."</p>
                            <A href="/" attr:class="btn-primary">"Back to booking"</A>
                        </div>
                    }
                        .into_any()
                }
            }}
        </div>
    }
}

#[component]
fn TripSummary(query: SearchQuery) -> impl IntoView {
    let greeting = query.name.clone().map(|name| format!("Thanks, {name}! We will call you shortly."));

    view! {
        <div class="card p-4">
            {greeting.map(|text| view! { <p class="mb-2 text-surface-700">{text}</p> })}
            <dl class="trip-summary grid grid-cols-2 gap-2">
                {trip_summary_rows(&query)
                    .into_iter()
                    .map(|(label, value)| {
                        view! {
                            <dt class="font-medium text-surface-500">{label}</dt>
                            <dd class="text-surface-900">{value}</dd>
                        }
                    })
                    .collect_view()}
            </dl>
        </div>
    }
}
