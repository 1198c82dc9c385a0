//! Error types for the layout engine

use thiserror::Error;

use super::types::{AnchorRef, WidgetId};

/// Errors that can occur while building or laying out a widget tree
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The anchor types cannot be connected to each other
    #[error("cannot connect {from} to {to}: incompatible anchor types")]
    InvalidConnection { from: AnchorRef, to: AnchorRef },

    /// The connection would close a loop back to the source widget
    #[error("connecting {from} to {to} would create a cycle")]
    CircularConnection { from: AnchorRef, to: AnchorRef },

    /// Targets must be the parent or a sibling
    #[error("{to} is neither the parent nor a sibling of {from}")]
    ForeignTarget { from: AnchorRef, to: AnchorRef },

    /// Children can only be added to containers
    #[error("widget {widget} is not a container")]
    NotAContainer { widget: WidgetId },

    #[error("widget {widget} does not exist")]
    UnknownWidget { widget: WidgetId },
}

impl LayoutError {
    pub fn invalid_connection(from: AnchorRef, to: AnchorRef) -> Self {
        Self::InvalidConnection { from, to }
    }

    pub fn circular(from: AnchorRef, to: AnchorRef) -> Self {
        Self::CircularConnection { from, to }
    }

    pub fn foreign_target(from: AnchorRef, to: AnchorRef) -> Self {
        Self::ForeignTarget { from, to }
    }

    pub fn not_a_container(widget: WidgetId) -> Self {
        Self::NotAContainer { widget }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::AnchorType;

    #[test]
    fn test_circular_display() {
        let from = AnchorRef::new(WidgetId(1), AnchorType::Left);
        let to = AnchorRef::new(WidgetId(2), AnchorType::Right);
        let err = LayoutError::circular(from, to);
        assert_eq!(err.to_string(), "connecting #1.left to #2.right would create a cycle");
    }

    #[test]
    fn test_foreign_target_display() {
        let from = AnchorRef::new(WidgetId(3), AnchorType::Top);
        let to = AnchorRef::new(WidgetId(7), AnchorType::Top);
        let err = LayoutError::foreign_target(from, to);
        assert_eq!(err.to_string(), "#7.top is neither the parent nor a sibling of #3.top");
    }
}
