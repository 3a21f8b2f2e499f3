//! Server library module.
//!
//! Router construction lives here so the binary and the integration tests
//! build the exact same application.

#![recursion_limit = "512"]

use app::{components::App, config::AppConfig, distance_client::DistanceClient};
use axum::extract::FromRef;
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use leptos::context::provide_context;
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list, handle_server_fns_with_context};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub leptos_options: LeptosOptions,
    pub config: Arc<AppConfig>,
    pub distance: Arc<DistanceClient>,
}

impl FromRef<AppState> for LeptosOptions {
    fn from_ref(state: &AppState) -> Self {
        state.leptos_options.clone()
    }
}

impl AppState {
    pub fn new(config: AppConfig, distance: DistanceClient) -> Self {
        Self {
            leptos_options: default_leptos_options(),
            config: Arc::new(config),
            distance: Arc::new(distance),
        }
    }

    /// Context provider shared by SSR rendering and server functions.
    fn context(&self) -> impl Fn() + Clone + Send + Sync + 'static + use<> {
        let config = self.config.clone();
        let distance = self.distance.clone();
        move || {
            provide_context(config.clone());
            provide_context(distance.clone());
        }
    }
}

pub fn default_leptos_options() -> LeptosOptions {
    LeptosOptions::builder()
        .output_name("frontend")
        .site_pkg_dir("pkg")
        .site_root("target/site")
        .build()
}

pub fn shell(options: LeptosOptions) -> impl IntoView {
    use leptos::hydration::{AutoReload, HydrationScripts};
    use leptos_meta::MetaTags;
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <link rel="stylesheet" href="/pkg/frontend.css"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Full application router: server functions, SSR routes and static assets.
pub fn build_router(state: AppState) -> Router {
    let routes = generate_route_list(App);

    Router::new()
        .route(
            "/api/{*fn_name}",
            get(server_fn_handler).post(server_fn_handler),
        )
        .leptos_routes_with_context(&state, routes, state.context(), {
            let options = state.leptos_options.clone();
            move || shell(options.clone())
        })
        .fallback(file_and_error_handler)
        .nest_service("/pkg", ServeDir::new("target/site/pkg"))
        .with_state(state)
}

async fn server_fn_handler(State(state): State<AppState>, req: Request<Body>) -> impl IntoResponse {
    debug!("Server function call: {}", req.uri().path());
    handle_server_fns_with_context(state.context(), req).await
}

async fn file_and_error_handler(State(state): State<AppState>, req: Request<Body>) -> Response {
    let path = req.uri().path();

    if path.starts_with("/pkg") {
        return (StatusCode::NOT_FOUND, Html("<h1>404 Not Found</h1>")).into_response();
    }

    let options = state.leptos_options.clone();
    let handler = leptos_axum::render_app_to_stream_with_context(state.context(), move || {
        shell(options.clone())
    });
    handler(req).await.into_response()
}
