pub mod config;
pub mod label_bugs;
pub mod report;
pub mod themes;
