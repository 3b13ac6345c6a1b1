pub mod catalog;
pub mod config;
pub mod decide;
pub mod simulate;
