pub mod catalog;
pub mod config;
pub mod error;
pub mod icons;
pub mod pipeline;
pub mod remote;
pub mod routes;
pub mod session;
pub mod state;
pub mod types;
pub mod uploads;
