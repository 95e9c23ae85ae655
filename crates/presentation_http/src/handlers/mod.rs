//! HTTP request handlers

pub mod circuits;
pub mod common;
pub mod health;
pub mod simulate;
pub mod stress;
