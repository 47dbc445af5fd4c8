pub mod engine;
pub mod implementations;
pub mod traits;
