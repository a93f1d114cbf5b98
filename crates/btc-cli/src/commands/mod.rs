pub mod migrate;
pub mod sql;
