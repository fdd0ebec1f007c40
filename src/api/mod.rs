pub mod client;

pub use client::{ApiClient, CallOptions, ProbeOutcome, RateLimit};
