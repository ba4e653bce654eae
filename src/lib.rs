//! Library crate for bracket-vote-back: bracket assembly, vote submission and the HTTP surface.

pub mod bracket;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
