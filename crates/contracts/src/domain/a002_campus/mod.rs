pub mod aggregate;

pub use aggregate::{Campus, CampusDto};
