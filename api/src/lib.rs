pub mod clients;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod metrics;
pub mod observability;
pub mod pipeline;
pub mod routes;
pub mod side_effects;
pub mod state;
