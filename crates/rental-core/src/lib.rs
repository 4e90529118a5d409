//! Core domain logic for the rental report.
//!
//! Holds the record and series models, the monthly aggregation and seasonal
//! calendar adjustment, number formatting, the error type and the persisted
//! CLI settings. Apart from settings persistence, everything here is pure
//! with respect to the filesystem; data loading lives in the data layer.

pub mod aggregation;
pub mod calendar;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
