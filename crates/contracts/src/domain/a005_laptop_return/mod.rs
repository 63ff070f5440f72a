pub mod aggregate;

pub use aggregate::{LaptopReturn, LaptopReturnDto};
