mod tuna_lp_position;
mod tuna_spot_position;

pub use tuna_lp_position::*;
pub use tuna_spot_position::*;
