pub mod chapter;
pub mod character;
pub mod state;
