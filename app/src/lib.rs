#![recursion_limit = "256"]

pub mod api;
#[cfg(feature = "ssr")]
pub mod api_impl;
pub mod booking;
pub mod browser;
pub mod components;
pub mod components_impl;
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod distance_client;
pub mod error;
