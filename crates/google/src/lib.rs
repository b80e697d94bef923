//! Google Slides backend for slide composition.
//!
//! Talks to the Slides v1 and Drive v3 REST APIs with a pre-issued OAuth
//! access token. Acquiring that token is the caller's job.

pub mod client;
pub mod config;
pub mod wire;

pub use client::{AccessReport, GoogleSlidesClient};
pub use config::GoogleConfig;
