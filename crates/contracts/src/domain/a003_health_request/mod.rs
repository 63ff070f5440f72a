//! Health Request Domain Module
//!
//! Заявка на выдачу лекарств/позиций со склада. Создается рядовым
//! пользователем, решение принимает менеджер.

pub mod aggregate;

pub use aggregate::{HealthRequest, HealthRequestDto, RequestDecisionDto, RequestStatus};
