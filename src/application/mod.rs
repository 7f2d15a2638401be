pub mod error;
pub mod form;
pub mod notifier;
pub mod service;
