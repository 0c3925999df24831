//! Segment-interval seat reservation engine.
//!
//! Books seats on scheduled vehicles whose route is a sequence of stops
//! at increasing distances from an origin. Several passengers may hold
//! the same physical seat on the same travel date as long as their
//! segments do not overlap along the route. The engine decides which
//! seat each passenger gets, which passengers are waitlisted, and which
//! waiting passenger may take capacity freed by a cancellation.

pub mod catalog;
pub mod domain;
pub mod engine;
pub mod ledger;
pub mod notify;
pub mod route;
