//! Debug utilities: opt-in action logging
//!
//! The store itself never logs. Register [`ActionLoggerMiddleware`] to trace
//! dispatched actions and keep a bounded history of them.

pub mod action_logger;

pub use action_logger::{
    glob_match, ActionLog, ActionLogConfig, ActionLogEntry, ActionLoggerConfig,
    ActionLoggerMiddleware,
};
