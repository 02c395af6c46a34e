pub mod app;
pub mod commands;
pub mod event;
pub mod keys;
pub mod ui;
