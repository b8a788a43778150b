pub mod config;
pub mod db;
pub mod followup;
pub mod init;
pub mod log;
pub mod login;
pub mod punch;
pub mod report;
pub mod status;
pub mod visit;
