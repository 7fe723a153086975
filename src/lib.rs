//! Back-end of the exam seating administration app: settings document,
//! SQLite gateway, module registry, navigation shell and the feature screens
//! it mounts, served to the front-end over a JSON-line protocol.

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod ipc;
pub mod registry;
pub mod screens;
pub mod shell;
pub mod supervisors;
pub mod view;
pub mod watch;
pub mod workspace;
