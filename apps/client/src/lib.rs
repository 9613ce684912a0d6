pub mod app;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gamification;
pub mod geocode;
pub mod history;
pub mod language;
pub mod relay;
pub mod session;
pub mod store;
pub mod strategy;
pub mod view;

pub use app::CivicApp;
pub use error::{ClientError, Result};
pub use strategy::ReportStrategy;
