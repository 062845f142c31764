//! Client core for the government services concierge application.
//!
//! The crate covers everything the mobile and CLI front-ends share: typed
//! access to the concierge REST API, the session context required by
//! authenticated calls, and the service application submission workflow
//! (form validation, document attachment, payment, multipart dispatch).
//! Rendering and navigation stay with the front-end.

pub mod api;
pub mod config;
pub mod session;
pub mod workflows;
