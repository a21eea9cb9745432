//! View-layer logic for the roster and records pages, kept free of I/O.

pub mod chart;
pub mod csv;
pub mod roster;
pub mod table;
