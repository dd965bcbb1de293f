//! Database schema and models shared by Huddle services

pub mod init;
pub mod models;

pub use init::init_database;
