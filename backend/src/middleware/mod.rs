//! Request middleware.
//!
//! [`Trace`] scopes a [`TraceId`](crate::TraceId) to each request and echoes
//! it in the `trace-id` response header.

pub mod trace;

pub use trace::Trace;
