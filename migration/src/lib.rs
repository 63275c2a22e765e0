pub mod migrations;
pub mod migrator;
pub mod tables;

pub use migrator::Migrator;
