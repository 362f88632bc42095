mod lp_deposit;
mod pool_token;
mod rates;

pub use lp_deposit::*;
pub use pool_token::*;
pub use rates::*;
