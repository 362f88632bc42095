#![allow(clippy::too_many_arguments)]

mod consts;
mod error;
mod macros;
mod math;
mod quote;
mod types;
mod utils;

pub use consts::*;
pub use error::*;
pub use math::*;
pub use quote::*;
pub use types::*;
pub use utils::*;
