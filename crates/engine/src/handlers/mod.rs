//! Job-type-specific handlers.
//!
//! Every handler takes the job's input payload and returns either a success
//! payload or a [`HandlerError`](crate::dispatch::HandlerError). Expected
//! bad input (missing fields, empty arrays) is always a described error,
//! never a panic.

pub mod analysis;
pub mod prediction;
pub mod remote_call;
pub mod transform;
