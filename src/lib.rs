//! Intern donation and reward dashboard.
//!
//! The [`store`] module is the only path to the database; [`http`] handlers
//! go through [`auth`] and [`store`] and render [`models`] views.

pub mod auth;
pub mod config;
pub mod entities;
pub mod fixtures;
pub mod http;
pub mod models;
pub mod state;
pub mod store;
