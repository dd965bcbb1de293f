//! Shared API types for Huddle services

pub mod types;
