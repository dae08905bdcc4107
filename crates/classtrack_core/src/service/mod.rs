//! Planner use-case services.
//!
//! # Responsibility
//! - Own application state and expose explicit transition operations.
//! - Keep UI/CLI layers decoupled from storage details.

pub mod assignment_query;
pub mod course_merge;
pub mod planner_service;
