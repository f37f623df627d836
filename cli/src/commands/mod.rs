pub mod access;
pub mod config;
pub mod guard;
pub mod replay;
