//! Constraint layout engine
//!
//! Widgets live in a [`WidgetTree`] and are positioned by connecting their
//! anchors to the anchors of their parent or siblings. [`layout`] compiles
//! those connections into linear rows, solves them per container and writes
//! the resulting frames back onto the widgets.

pub mod anchor;
pub mod barrier;
pub mod chain;
mod compile;
pub mod config;
pub mod container;
mod direct;
pub mod error;
pub mod flow;
pub mod guideline;
pub mod measure;
pub mod placeholder;
mod policy;
pub mod solver;
pub mod tree;
pub mod types;
mod virtual_layout;
pub mod widget;

pub use anchor::Anchor;
pub use barrier::{BarrierData, BarrierSide};
pub use chain::ChainHead;
pub use config::{LayoutConfig, Optimizations};
pub use container::{ContainerData, LayoutStats, OverrideReason, SizeOverride};
pub use error::LayoutError;
pub use flow::{FlowAlign, FlowData, FlowStyles, LineStyle, WrapMode};
pub use guideline::{GuidePosition, GuidelineData};
pub use measure::{Intrinsic, IntrinsicMeasurer, MeasureRequest, Measurement, Measurer, NoopMeasurer};
pub use placeholder::PlaceholderData;
pub use solver::{CassowarySystem, LinearSystem, SolverError, Strength};
pub use tree::WidgetTree;
pub use types::*;
pub use widget::{parse_dimension_ratio, Widget, WidgetKind};

use container::LayoutRun;

/// Lay out the container `root` and everything below it with the bundled
/// Cassowary backend.
///
/// # Example
///
/// ```rust
/// use anchor_layout::layout::{layout, AnchorType, LayoutConfig, NoopMeasurer, WidgetTree};
///
/// let mut tree = WidgetTree::new();
/// let root = tree.add_root("root");
/// tree.widget_mut(root).set_size(400, 300);
/// let button = tree.add_widget(root, "button").unwrap();
/// tree.widget_mut(button).set_size(100, 40);
/// tree.connect(button, AnchorType::Right, root, AnchorType::Right, 16);
///
/// layout(&mut tree, root, &LayoutConfig::default(), &mut NoopMeasurer).unwrap();
/// assert_eq!(tree.widget(button).x(), 284);
/// ```
pub fn layout(
    tree: &mut WidgetTree,
    root: WidgetId,
    config: &LayoutConfig,
    measurer: &mut dyn Measurer,
) -> Result<LayoutStats, LayoutError> {
    let mut system = CassowarySystem::new();
    layout_with(tree, root, config, measurer, &mut system)
}

/// Same as [`layout`] with a caller supplied solver backend
pub fn layout_with(
    tree: &mut WidgetTree,
    root: WidgetId,
    config: &LayoutConfig,
    measurer: &mut dyn Measurer,
    system: &mut dyn LinearSystem,
) -> Result<LayoutStats, LayoutError> {
    let widget = tree
        .get(root)
        .ok_or(LayoutError::UnknownWidget { widget: root })?;
    if !widget.is_container() {
        return Err(LayoutError::not_a_container(root));
    }

    let mut run = LayoutRun {
        config,
        measurer,
        system,
        stats: LayoutStats::default(),
    };
    container::layout_container(tree, root, &mut run);
    let stats = run.stats;
    log::debug!(
        "laid out {}: {} containers, {} passes, {} rows, {} solver errors",
        root,
        stats.containers,
        stats.passes,
        stats.rows,
        stats.solver_errors
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_root() {
        let mut tree = WidgetTree::new();
        let err = layout(&mut tree, WidgetId(3), &LayoutConfig::default(), &mut NoopMeasurer)
            .unwrap_err();
        assert!(matches!(err, LayoutError::UnknownWidget { .. }));
    }

    #[test]
    fn test_root_must_be_container() {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        let leaf = tree.add_widget(root, "leaf").unwrap();
        let err = layout(&mut tree, leaf, &LayoutConfig::default(), &mut NoopMeasurer).unwrap_err();
        assert!(matches!(err, LayoutError::NotAContainer { .. }));
    }
}
