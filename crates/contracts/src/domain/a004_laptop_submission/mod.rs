pub mod aggregate;

pub use aggregate::{LaptopSubmission, LaptopSubmissionDto};
