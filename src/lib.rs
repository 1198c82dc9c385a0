//! Anchor Layout - a constraint-based layout engine
//!
//! Widgets are placed by connecting their anchors (edges, centers and
//! baselines) to the anchors of their parent or siblings. Chains, barriers,
//! guidelines, flows and placeholders build on the same connections, and a
//! Cassowary solver turns them into frames.
//!
//! # Example
//!
//! ```rust
//! use anchor_layout::layout_scene;
//!
//! let scene = layout_scene(r#"
//!     [root]
//!     width = 400
//!     height = 300
//!
//!     [[widgets]]
//!     name = "button"
//!     width = 100
//!     height = 40
//!     left = { to = "parent.left" }
//!     right = { to = "parent.right" }
//! "#).unwrap();
//!
//! let (_, frame) = &scene.frames()[1];
//! assert_eq!(frame.x, 150);
//! ```

pub mod error;
pub mod layout;
pub mod scene;

pub use error::Error;
pub use layout::{layout, LayoutConfig, LayoutError, LayoutStats, WidgetTree};
pub use scene::{Scene, SceneError};

/// Parse a TOML scene and lay it out with the configuration it carries
pub fn layout_scene(source: &str) -> Result<Scene, Error> {
    let mut scene = Scene::parse(source)?;
    let stats = scene.layout()?;
    log::debug!("scene laid out in {} passes", stats.passes);
    Ok(scene)
}

/// Same as [`layout_scene`], with a configuration that replaces the scene's own
pub fn layout_scene_with_config(source: &str, config: LayoutConfig) -> Result<Scene, Error> {
    let mut scene = Scene::parse(source)?;
    scene.config = config;
    scene.layout()?;
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_scene_centers() {
        let scene = layout_scene(
            r#"
            [root]
            width = 200
            height = 100

            [[widgets]]
            name = "box"
            width = 50
            height = 20
            center = { to = "parent.center" }
            "#,
        )
        .unwrap();
        let frames = scene.frames();
        assert_eq!(frames[1].1, layout::Frame::new(75, 40, 50, 20));
    }

    #[test]
    fn test_scene_errors_propagate() {
        let err = layout_scene("[[widgets]]\nname = 3").unwrap_err();
        assert!(matches!(err, Error::Scene(SceneError::Parse(_))));
    }
}
