//! Calendar day resolution and timeline layout.
//!
//! # Responsibility
//! - Resolve which weekday schedule applies on a date (overrides).
//! - Compose per-date agendas from classes and events.
//! - Lay agendas out on a minute-resolution timeline.
//! - Derive month grids and the next upcoming class.
//!
//! # Invariants
//! - Everything here is a pure function of its inputs; no cached state.

pub mod agenda;
pub mod month;
pub mod next_class;
pub mod resolver;
pub mod timeline;
