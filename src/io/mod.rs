pub mod demand;
pub mod reporting;
pub mod tables;
