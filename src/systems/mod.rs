mod autoplay;
mod bookkeeping;
mod construction;
mod economy;

pub use autoplay::{AutoplayConfig, AutoplaySystem};
pub use bookkeeping::BookkeepingSystem;
pub use construction::ConstructionSystem;
pub use economy::EconomySystem;
