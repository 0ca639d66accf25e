pub mod autosave;
pub mod backend;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod logging;
pub mod notifications;
pub mod shortcuts;
pub mod status;
pub mod storage;
pub mod toast;
pub mod weather;
