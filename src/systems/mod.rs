mod crops;
mod daily;
mod dispatch;
mod power;
mod production;

pub use crops::CropSystem;
pub use daily::{DailyResetSystem, DAY_MS};
pub use dispatch::DispatchSystem;
pub use power::PowerSystem;
pub use production::ProductionSystem;
