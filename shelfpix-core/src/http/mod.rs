//! Outbound HTTP: client trait, production client, and test mock.
//!
//! All outgoing requests go through the `HttpClient` trait so the
//! pipeline can run against canned responses in tests.

mod client;

pub use client::{HttpClient, MockClient, MockResponse, WebClient, WebClientBuilder};
