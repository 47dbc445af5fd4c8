pub mod decision;
pub mod records;
