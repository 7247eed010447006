//! A tui based browser for property allotment records.

pub mod columns;
pub mod controller;
pub mod domain;
pub mod export;
pub mod inputter;
pub mod model;
pub mod pipeline;
pub mod records;
pub mod state;
pub mod ui;
