//! Container layout: the measure / solve / grow loop
//!
//! Every container solves its children in its own coordinate system, with
//! the origin at the top-left corner of its padding box. Nested containers
//! are laid out before their parent and again once the parent has given
//! them a size.

use std::collections::HashSet;

use super::barrier;
use super::chain::{self, ChainHead};
use super::compile::{self, var, PassContext};
use super::config::{LayoutConfig, Optimizations};
use super::direct;
use super::guideline;
use super::measure::{self, MeasureRequest, Measurer};
use super::solver::{LinearSystem, Strength};
use super::tree::WidgetTree;
use super::types::{AnchorRef, AnchorType, DimensionBehaviour, MatchConstraint, Orientation, Padding, WidgetId};
use super::virtual_layout;
use super::widget::{PassState, WidgetKind};

/// Solved coordinates beyond this are treated as solver garbage
const EXTREME: i32 = 1 << 30;

#[derive(Debug, Clone, Default)]
pub struct ContainerData {
    pub(crate) children: Vec<WidgetId>,
    pub(crate) padding: Padding,
    pub(crate) measured_too_small: [bool; 2],
    pub(crate) overrides: Vec<SizeOverride>,
}

impl ContainerData {
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
    }

    /// The content did not fit within the maximum size along the axis
    pub fn measured_too_small(&self, orientation: Orientation) -> bool {
        self.measured_too_small[orientation.index()]
    }

    /// Sizes pinned by the last layout while growing wrap axes
    pub fn overrides(&self) -> &[SizeOverride] {
        &self.overrides
    }

    fn overridden(&self, orientation: Orientation) -> bool {
        self.overrides.iter().any(|o| o.orientation == orientation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideReason {
    /// The content needs more room than the solver gave it
    Grow,
    /// The content is smaller than the minimum size
    MinSize,
    /// The content is larger than the maximum size
    TooSmall,
}

/// A wrap axis pinned to a fixed length for the remaining passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeOverride {
    pub orientation: Orientation,
    pub reason: OverrideReason,
    pub previous: DimensionBehaviour,
    pub length: i32,
}

/// Counters collected over one call to [`layout`](super::layout)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Container layouts run, nested and repeated ones included
    pub containers: usize,
    /// Solver passes over all containers
    pub passes: usize,
    /// Rows accepted by the solver
    pub rows: usize,
    /// Passes whose solver reported an error
    pub solver_errors: usize,
    /// Passes finished without the solver
    pub direct_layouts: usize,
}

/// Everything one container layout needs besides the tree
pub(crate) struct LayoutRun<'a> {
    pub config: &'a LayoutConfig,
    pub measurer: &'a mut dyn Measurer,
    pub system: &'a mut dyn LinearSystem,
    pub stats: LayoutStats,
}

fn padding_of(tree: &WidgetTree, id: WidgetId) -> Padding {
    tree.widget(id)
        .container()
        .map(|c| c.padding)
        .unwrap_or_default()
}

/// Size of the padding box along each axis
fn content_size(tree: &WidgetTree, id: WidgetId) -> [i32; 2] {
    let widget = tree.widget(id);
    let padding = padding_of(tree, id);
    Orientation::BOTH.map(|o| (widget.length(o) - padding.along(o)).max(0))
}

/// Axes along which the container still sizes itself from its children
fn wrap_axes(tree: &WidgetTree, id: WidgetId) -> [bool; 2] {
    let widget = tree.widget(id);
    Orientation::BOTH.map(|o| {
        measure::wraps(widget, o) && !widget.container().is_some_and(|c| c.overridden(o))
    })
}

pub(crate) fn layout_container(tree: &mut WidgetTree, id: WidgetId, run: &mut LayoutRun<'_>) {
    run.stats.containers += 1;
    if let Some(data) = tree.widget_mut(id).container_mut() {
        data.overrides.clear();
        data.measured_too_small = [false; 2];
    }
    let children = tree.children(id).to_vec();
    for &child in &children {
        tree.widget_mut(child).pass = PassState::default();
    }

    measure_children(tree, id, &children, run);

    let mut remeasured = false;
    let mut converged = false;
    for iteration in 0..run.config.max_iterations.max(1) {
        let wrap = wrap_axes(tree, id);
        log::debug!(
            "container {} pass {} (wrap {:?}, size {}x{})",
            id,
            iteration,
            wrap,
            tree.widget(id).width(),
            tree.widget(id).height()
        );
        run_pass(tree, id, &children, wrap, run);
        run.stats.passes += 1;
        if grow(tree, id, &children) {
            continue;
        }
        if !remeasured {
            remeasured = true;
            if remeasure(tree, &children, &mut *run.measurer) {
                log::debug!("container {} re-measured reflowing children", id);
                continue;
            }
        }
        converged = true;
        break;
    }
    if !converged {
        log::warn!(
            "container {} did not settle within {} passes",
            id,
            run.config.max_iterations
        );
    }

    for &child in &children {
        let widget = tree.widget(child);
        let stretched = Orientation::BOTH.iter().any(|o| {
            matches!(
                widget.behaviour(*o),
                DimensionBehaviour::MatchConstraint | DimensionBehaviour::MatchParent
            )
        });
        if widget.is_container() && stretched && !widget.is_gone() {
            layout_container(tree, child, run);
        }
    }
}

/// Intrinsic sizes first: leaves, nested containers, then virtual layouts
fn measure_children(tree: &mut WidgetTree, id: WidgetId, children: &[WidgetId], run: &mut LayoutRun<'_>) {
    for &child in children {
        let widget = tree.widget(child);
        if widget.is_container() {
            if !widget.is_gone() {
                layout_container(tree, child, run);
            }
            continue;
        }
        if measure::is_measured_leaf(widget) {
            let request = MeasureRequest::for_widget(widget);
            let axes = Orientation::BOTH.map(|o| measure::wraps(widget, o));
            let measurement = run.measurer.measure(widget, &request);
            measure::apply(tree.widget_mut(child), &measurement, axes);
        }
    }
    let wrap = wrap_axes(tree, id);
    let content = content_size(tree, id);
    let bounded = Orientation::BOTH.map(|o| (!wrap[o.index()]).then_some(content[o.index()]));
    for vl in virtual_layout::ordered(tree, children) {
        virtual_layout::measure(tree, vl, bounded);
    }
}

/// Re-measure match-constraint leaves whose other axis follows their content.
/// Returns true when a size changed.
fn remeasure(tree: &mut WidgetTree, children: &[WidgetId], measurer: &mut dyn Measurer) -> bool {
    let mut changed = false;
    for &child in children {
        let widget = tree.widget(child);
        if !matches!(widget.kind, WidgetKind::Plain) || widget.is_gone() {
            continue;
        }
        for o in Orientation::BOTH {
            let stretched = widget.behaviour(o) == DimensionBehaviour::MatchConstraint
                && widget.match_default(o) != MatchConstraint::Wrap;
            if !stretched || !measure::wraps(widget, o.other()) {
                continue;
            }
            let request = MeasureRequest::for_widget(widget).pinned(o, widget.length(o));
            let measurement = measurer.measure(widget, &request);
            let mut axes = [false; 2];
            axes[o.other().index()] = true;
            changed |= measure::apply(tree.widget_mut(child), &measurement, axes);
            break;
        }
    }
    changed
}

fn run_pass(tree: &mut WidgetTree, id: WidgetId, children: &[WidgetId], wrap: [bool; 2], run: &mut LayoutRun<'_>) {
    let config = run.config;
    run.system.reset();
    let system = &mut *run.system;
    let content = content_size(tree, id);

    for &child in children {
        let widget = tree.widget_mut(child);
        let size_override = widget.pass.size_override;
        widget.pass = PassState {
            size_override,
            ..PassState::default()
        };
        tree.reset_final_values(child);
    }
    tree.reset_final_values(id);
    constrain_frame(tree, system, id, wrap, content);

    for &child in children {
        if tree.widget(child).is_barrier() {
            barrier::mark_widgets(tree, child);
        }
    }
    let virtual_layouts = virtual_layout::ordered(tree, children);
    for &vl in &virtual_layouts {
        virtual_layout::wire(tree, vl);
    }
    for &child in children {
        direct::check_match_parent(tree, system, wrap, content, child);
    }

    let bounded = Orientation::BOTH.map(|o| (!wrap[o.index()]).then_some(content[o.index()]));
    if config.optimizes(Optimizations::DIRECT) {
        direct::resolve(tree, id, config, bounded);
    }
    if config.optimizes(Optimizations::GROUPING)
        && (wrap[0] || wrap[1])
        && all_resolved(tree, children)
    {
        for o in Orientation::BOTH {
            if wrap[o.index()] {
                let extent = content_extent(tree, id, children, o);
                set_content_length(tree, id, o, extent);
            }
        }
        run.stats.direct_layouts += 1;
        log::debug!("container {} laid out without the solver", id);
        return;
    }

    let mut ctx = PassContext::new(config, id, wrap);
    for child in compile_order(tree, children, &virtual_layouts, config.dependency_ordering) {
        compile::add_to_solver(tree, system, &mut ctx, child);
    }
    for o in Orientation::BOTH {
        let heads = ctx.chains[o.index()].clone();
        for head in heads {
            let mut chain = ChainHead::new(head, o, config.rtl);
            chain::apply_chain_constraints(tree, system, &ctx, &mut chain);
        }
    }

    if let Err(e) = system.minimize() {
        log::error!("solving container {} failed: {}", id, e);
        run.stats.solver_errors += 1;
    }
    run.stats.rows += system.row_count();
    update_from_solver(tree, system, id, children, wrap);
}

/// Pin the container's own edges: origin at zero, far edges fixed or free
fn constrain_frame(
    tree: &mut WidgetTree,
    system: &mut dyn LinearSystem,
    id: WidgetId,
    wrap: [bool; 2],
    content: [i32; 2],
) {
    let padding = padding_of(tree, id);
    for o in Orientation::BOTH {
        let i = o.index();
        let begin = var(system, id, o.begin());
        let end = var(system, id, o.end());
        system.set_final(begin, 0);
        tree.set_final_value(AnchorRef::new(id, o.begin()), 0);
        if wrap[i] {
            let widget = tree.widget(id);
            let min = (widget.min_length(o) - padding.along(o)).max(0);
            let max = widget.max_dimension[i];
            system.add_equality(end, begin, 0, Strength::High);
            system.add_greater_than(end, begin, min, Strength::Fixed);
            if max < i32::MAX {
                system.add_lower_than(end, begin, (max - padding.along(o)).max(0), Strength::Fixed);
            }
        } else {
            system.set_final(end, content[i]);
            tree.set_final_value(AnchorRef::new(id, o.end()), content[i]);
        }
    }
}

fn all_resolved(tree: &WidgetTree, children: &[WidgetId]) -> bool {
    children.iter().all(|&child| {
        let widget = tree.widget(child);
        if widget.is_gone() && !tree.has_dependents(child) {
            return true;
        }
        (0..2).all(|i| widget.pass.resolved[i] || widget.pass.direct[i])
    })
}

/// Guidelines, then virtual layouts, then everything else
fn compile_order(
    tree: &WidgetTree,
    children: &[WidgetId],
    virtual_layouts: &[WidgetId],
    dependency_ordering: bool,
) -> Vec<WidgetId> {
    let mut order: Vec<WidgetId> = children
        .iter()
        .copied()
        .filter(|c| tree.widget(*c).is_guideline())
        .collect();
    order.extend_from_slice(virtual_layouts);
    let rest: Vec<WidgetId> = children
        .iter()
        .copied()
        .filter(|c| !tree.widget(*c).add_first())
        .collect();
    if !dependency_ordering {
        order.extend(rest);
        return order;
    }
    let mut visited: HashSet<WidgetId> = order.iter().copied().collect();
    for child in rest {
        visit(tree, child, children, &mut visited, &mut order);
    }
    order
}

/// Depth-first: the siblings a widget is connected to come before it
fn visit(
    tree: &WidgetTree,
    id: WidgetId,
    siblings: &[WidgetId],
    visited: &mut HashSet<WidgetId>,
    order: &mut Vec<WidgetId>,
) {
    if !visited.insert(id) {
        return;
    }
    for kind in AnchorType::ALL {
        if let Some(target) = tree.target_of(AnchorRef::new(id, kind)) {
            if target.widget != id && siblings.contains(&target.widget) {
                visit(tree, target.widget, siblings, visited, order);
            }
        }
    }
    order.push(id);
}

fn update_from_solver(
    tree: &mut WidgetTree,
    system: &mut dyn LinearSystem,
    id: WidgetId,
    children: &[WidgetId],
    wrap: [bool; 2],
) {
    for o in Orientation::BOTH {
        if wrap[o.index()] {
            let end = var(system, id, o.end());
            let extent = system.value(end);
            set_content_length(tree, id, o, extent);
        }
    }
    let content = content_size(tree, id);
    for &child in children {
        match tree.widget(child).kind {
            WidgetKind::Guideline(_) => guideline::update_from_solver(tree, system, child, content),
            WidgetKind::Barrier(_) => barrier::update_from_solver(tree, system, child),
            _ => update_widget(tree, system, child),
        }
    }
}

/// Size the container around a content extent, within its min and max
fn set_content_length(tree: &mut WidgetTree, id: WidgetId, orientation: Orientation, extent: i32) {
    let padding = padding_of(tree, id);
    let widget = tree.widget_mut(id);
    let max = widget.max_dimension[orientation.index()];
    let length = (extent.max(0) + padding.along(orientation)).min(max);
    widget.set_length(orientation, length);
}

/// Read back the frame of one widget, enforcing its size limits
pub(crate) fn update_widget(tree: &mut WidgetTree, system: &mut dyn LinearSystem, id: WidgetId) {
    let edges = [AnchorType::Left, AnchorType::Top, AnchorType::Right, AnchorType::Bottom].map(|kind| {
        let v = var(system, id, kind);
        system.value(v)
    });
    let [left, top, right, bottom] = edges;
    let raw = [right - left, bottom - top];
    let widget = tree.widget_mut(id);
    if raw[0] < 0 || raw[1] < 0 || edges.iter().any(|v| v.abs() >= EXTREME) {
        log::debug!("degenerate frame for {}: {:?}", id, edges);
        widget.x = 0;
        widget.y = 0;
        widget.width = 0;
        widget.height = 0;
        return;
    }
    widget.x = left;
    widget.y = top;
    if widget.is_gone() {
        return;
    }
    for o in Orientation::BOTH {
        let i = o.index();
        let mut size = raw[i];
        match widget.behaviour(o) {
            DimensionBehaviour::Fixed => size = size.max(widget.length(o)),
            DimensionBehaviour::MatchConstraint => {
                size = size.max(widget.match_min[i]);
                if widget.match_max[i] > 0 {
                    size = size.min(widget.match_max[i]);
                }
            }
            _ => {}
        }
        size = size.max(widget.min_length(o));
        widget.set_length(o, size);
        if size != raw[i] {
            widget.pass.size_override[i] = Some(size);
        }
    }
}

/// Room the children need along an axis, padding excluded
fn content_extent(tree: &WidgetTree, id: WidgetId, children: &[WidgetId], orientation: Orientation) -> i32 {
    let parent_begin = AnchorRef::new(id, orientation.begin());
    let parent_end = AnchorRef::new(id, orientation.end());
    children
        .iter()
        .filter_map(|&child| {
            let widget = tree.widget(child);
            if widget.is_gone() || widget.is_guideline() || widget.is_barrier() {
                return None;
            }
            let begin = AnchorRef::new(child, orientation.begin());
            let end = AnchorRef::new(child, orientation.end());
            let lead = if tree.target_of(begin) == Some(parent_begin) {
                tree.effective_margin(begin)
            } else {
                widget.position(orientation).max(0)
            };
            let trail = if tree.target_of(end) == Some(parent_end) {
                tree.effective_margin(end)
            } else {
                0
            };
            Some(lead + widget.length(orientation) + trail)
        })
        .max()
        .unwrap_or(0)
}

/// Compare the solved size of each wrap axis with what the children need.
/// Returns true when an axis was pinned and the pass must run again.
fn grow(tree: &mut WidgetTree, id: WidgetId, children: &[WidgetId]) -> bool {
    let wrap = wrap_axes(tree, id);
    let padding = padding_of(tree, id);
    let mut pinned = false;
    for o in Orientation::BOTH {
        let i = o.index();
        if !wrap[i] {
            continue;
        }
        let extent = content_extent(tree, id, children, o);
        let widget = tree.widget(id);
        let solved = widget.length(o);
        let previous = widget.behaviour(o);
        let mut length = extent + padding.along(o);
        let mut reason = OverrideReason::Grow;
        let mut too_small = false;
        if length < widget.min_length(o) {
            length = widget.min_length(o);
            reason = OverrideReason::MinSize;
        }
        let max = widget.max_dimension[i];
        if length > max {
            length = max;
            reason = OverrideReason::TooSmall;
            too_small = true;
        }

        let widget = tree.widget_mut(id);
        if let Some(data) = widget.container_mut() {
            data.measured_too_small[i] = too_small;
        }
        if length == solved {
            continue;
        }
        log::debug!(
            "container {} {:?} axis pinned at {} (solved {}, {:?})",
            id,
            o,
            length,
            solved,
            reason
        );
        widget.set_length(o, length);
        if let Some(data) = widget.container_mut() {
            data.overrides.push(SizeOverride {
                orientation: o,
                reason,
                previous,
                length,
            });
        }
        pinned = true;
    }
    pinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::measure::NoopMeasurer;
    use crate::layout::solver::CassowarySystem;
    use pretty_assertions::assert_eq;

    fn run_layout(tree: &mut WidgetTree, root: WidgetId, config: &LayoutConfig) -> LayoutStats {
        let mut measurer = NoopMeasurer;
        let mut system = CassowarySystem::new();
        let mut run = LayoutRun {
            config,
            measurer: &mut measurer,
            system: &mut system,
            stats: LayoutStats::default(),
        };
        layout_container(tree, root, &mut run);
        run.stats
    }

    fn wrap_root(tree: &mut WidgetTree) -> WidgetId {
        let root = tree.add_root("root");
        for o in Orientation::BOTH {
            tree.widget_mut(root).set_behaviour(o, DimensionBehaviour::WrapContent);
        }
        root
    }

    #[test]
    fn test_unconstrained_widget_keeps_its_frame() {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        tree.widget_mut(root).set_size(400, 300);
        tree.widget_mut(root)
            .container_mut()
            .unwrap()
            .set_padding(Padding::uniform(12));
        let card = tree.add_widget(root, "card").unwrap();
        tree.widget_mut(card).set_size(80, 40);

        run_layout(&mut tree, root, &LayoutConfig::default());
        assert_eq!(tree.widget(card).frame(), crate::layout::Frame::new(0, 0, 80, 40));
        assert_eq!(tree.absolute_frame(card), crate::layout::Frame::new(12, 12, 80, 40));
    }

    #[test]
    fn test_wrap_container_grows_around_margins() {
        let mut tree = WidgetTree::new();
        let root = wrap_root(&mut tree);
        let child = tree.add_widget(root, "child").unwrap();
        tree.widget_mut(child).set_size(500, 500);
        for kind in [AnchorType::Left, AnchorType::Top, AnchorType::Right, AnchorType::Bottom] {
            tree.connect(child, kind, root, kind, 50);
        }

        let stats = run_layout(&mut tree, root, &LayoutConfig::default());
        assert_eq!((tree.widget(root).width(), tree.widget(root).height()), (600, 600));
        assert!(stats.passes <= 8);
        assert_eq!(tree.widget(child).frame(), crate::layout::Frame::new(50, 50, 500, 500));
    }

    #[test]
    fn test_max_size_marks_too_small() {
        let mut tree = WidgetTree::new();
        let root = wrap_root(&mut tree);
        tree.widget_mut(root).set_max_dimension(Orientation::Horizontal, 200);
        let child = tree.add_widget(root, "child").unwrap();
        tree.widget_mut(child).set_size(500, 20);

        run_layout(&mut tree, root, &LayoutConfig::default());
        let data = tree.widget(root).container().unwrap();
        assert!(data.measured_too_small(Orientation::Horizontal));
        assert!(!data.measured_too_small(Orientation::Vertical));
        assert_eq!(tree.widget(root).width(), 200);
        assert_eq!(tree.widget(root).height(), 20);
    }

    #[test]
    fn test_degenerate_frame_is_zeroed() {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        let w = tree.add_widget(root, "w").unwrap();
        tree.widget_mut(w).set_size(10, 10);
        let mut system = CassowarySystem::new();
        let left = var(&mut system, w, AnchorType::Left);
        let right = var(&mut system, w, AnchorType::Right);
        system.set_final(left, 30);
        system.set_final(right, 5);
        system.minimize().unwrap();

        update_widget(&mut tree, &mut system, w);
        assert_eq!(tree.widget(w).frame(), crate::layout::Frame::new(0, 0, 0, 0));
    }

    #[test]
    fn test_dependency_order_puts_targets_first() {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        let a = tree.add_widget(root, "a").unwrap();
        let b = tree.add_widget(root, "b").unwrap();
        let guide = tree
            .add_guideline(root, "guide", Orientation::Vertical)
            .unwrap();
        tree.connect(a, AnchorType::Left, b, AnchorType::Right, 0);

        let children = tree.children(root).to_vec();
        assert_eq!(compile_order(&tree, &children, &[], false), vec![guide, a, b]);
        assert_eq!(compile_order(&tree, &children, &[], true), vec![guide, b, a]);
    }

    #[test]
    fn test_grouping_skips_the_solver() {
        let mut tree = WidgetTree::new();
        let root = wrap_root(&mut tree);
        let a = tree.add_widget(root, "a").unwrap();
        tree.widget_mut(a).set_size(40, 30);
        let b = tree.add_widget(root, "b").unwrap();
        tree.widget_mut(b).set_size(60, 10);
        tree.connect(b, AnchorType::Left, a, AnchorType::Right, 5);

        let config = LayoutConfig::default()
            .with_optimizations(Optimizations::STANDARD | Optimizations::GROUPING);
        let stats = run_layout(&mut tree, root, &config);
        assert_eq!(stats.direct_layouts, 1);
        assert_eq!(tree.widget(b).x(), 45);
        assert_eq!((tree.widget(root).width(), tree.widget(root).height()), (105, 30));
    }
}
