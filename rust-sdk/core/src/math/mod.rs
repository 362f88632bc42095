pub mod fixed;
pub mod lending;
pub mod price;

pub use fixed::*;
pub use lending::*;
pub use price::*;
