//! Flutter-facing bridge for the player form core.

pub mod api;
