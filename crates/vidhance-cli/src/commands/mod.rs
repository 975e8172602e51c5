pub mod config;
pub mod export;
pub mod histogram;
pub mod info;
pub mod preview;
