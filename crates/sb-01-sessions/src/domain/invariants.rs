//! Construction-time checks for menus.

use crate::domain::errors::MenuError;
use shared_types::Button;
use std::collections::HashSet;

/// Maximum components (or selection options) on one message.
pub const MAX_COMPONENTS: usize = 25;

/// Every button must produce interactions.
pub fn invariant_actionable(buttons: &[&Button]) -> Result<(), MenuError> {
    match buttons.iter().find(|b| !b.is_actionable()) {
        Some(link) => Err(MenuError::LinkButton(link.id.clone())),
        None => Ok(()),
    }
}

/// Ids must be unique within one message.
pub fn invariant_unique_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<(), MenuError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(MenuError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

/// At least one action, at most `MAX_COMPONENTS`.
pub fn invariant_action_count(count: usize) -> Result<(), MenuError> {
    if count == 0 {
        return Err(MenuError::NoActions);
    }
    if count > MAX_COMPONENTS {
        return Err(MenuError::TooManyComponents {
            count,
            maximum: MAX_COMPONENTS,
        });
    }
    Ok(())
}
