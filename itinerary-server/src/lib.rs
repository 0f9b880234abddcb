//! Day itinerary planner server.
//!
//! A web application that answers: "I have these trips to make today,
//! when should I leave for each one?"

pub mod cache;
pub mod domain;
pub mod planner;
pub mod routing;
pub mod web;
