//! Canvas LMS client for the study guide agent.
//!
//! [`CanvasClient`] handles authentication, 429 backoff and `Link`
//! pagination. [`CanvasApi`] shapes the parameters for each course-content
//! operation the toolset exposes.

pub mod api;
pub mod client;
pub mod link;

#[cfg(test)]
mod test_support;

pub use api::CanvasApi;
pub use client::{CANVAS_ACCEPT, CanvasClient};
pub use link::{LinkEntry, next_link, parse_link_header};
