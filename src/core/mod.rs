pub mod daily;
pub mod ending;
pub mod engine;
pub mod executor;
pub mod focus;
pub mod lottery;
pub mod progression;
pub mod trigger;
