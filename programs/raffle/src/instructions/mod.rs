pub mod check_upkeep;
pub mod enter_raffle;
pub mod fulfill_randomness;
pub mod initialize;
pub mod perform_upkeep;

pub use check_upkeep::*;
pub use enter_raffle::*;
pub use fulfill_randomness::*;
pub use initialize::*;
pub use perform_upkeep::*;
