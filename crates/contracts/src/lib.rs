//! Shared contracts for the campus inventory service.
//!
//! Everything in this crate is pure: aggregates, enums, DTOs and the
//! status rules. Storage and transport live in the backend.

pub mod dashboards;
pub mod domain;
pub mod enums;
pub mod shared;
pub mod system;
pub mod usecases;
