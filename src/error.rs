//! Errors of the scene pipeline

use thiserror::Error;

use crate::layout::LayoutError;
use crate::scene::SceneError;

/// Errors that can occur while loading and laying out a scene
#[derive(Debug, Error)]
pub enum Error {
    /// The scene could not be read or built
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Error during layout
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::WidgetId;

    #[test]
    fn test_layout_error_wraps() {
        let err: Error = LayoutError::not_a_container(WidgetId(4)).into();
        assert_eq!(err.to_string(), "layout error: widget #4 is not a container");
    }
}
