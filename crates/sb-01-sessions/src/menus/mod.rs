//! The menus users interact with.

pub mod buttons;
pub mod confirmable;
pub mod selection;
