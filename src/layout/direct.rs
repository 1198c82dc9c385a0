//! Direct resolution: widgets whose edges follow arithmetically from
//! already resolved anchors get final values before the solver runs.

use super::barrier;
use super::chain::ChainHead;
use super::compile::var;
use super::config::{LayoutConfig, Optimizations};
use super::guideline;
use super::solver::LinearSystem;
use super::tree::WidgetTree;
use super::types::{
    AnchorRef, AnchorType, ChainStyle, DimensionBehaviour, Orientation, WidgetId,
};
use super::widget::WidgetKind;

fn round(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}

/// Record a resolved axis on the widget and its anchors
fn set_resolved(tree: &mut WidgetTree, id: WidgetId, orientation: Orientation, begin: i32, end: i32) {
    tree.set_final_value(AnchorRef::new(id, orientation.begin()), begin);
    tree.set_final_value(AnchorRef::new(id, orientation.end()), end);
    let widget = tree.widget_mut(id);
    widget.set_position(orientation, begin);
    if !widget.is_gone() {
        widget.set_length(orientation, end - begin);
    }
    widget.pass.resolved[orientation.index()] = true;
    if orientation == Orientation::Vertical && widget.has_baseline() {
        let distance = widget.baseline_distance();
        tree.set_final_value(AnchorRef::new(id, AnchorType::Baseline), begin + distance);
    }
}

/// Pin match-parent axes of a child to the container's content box.
/// Only applies when the container does not wrap along the axis.
pub(crate) fn check_match_parent(
    tree: &mut WidgetTree,
    system: &mut dyn LinearSystem,
    wrap: [bool; 2],
    content: [i32; 2],
    id: WidgetId,
) {
    for o in Orientation::BOTH {
        let i = o.index();
        let widget = tree.widget(id);
        if wrap[i] || widget.behaviour(o) != DimensionBehaviour::MatchParent || widget.is_gone() {
            continue;
        }
        let begin_margin = tree.anchor(AnchorRef::new(id, o.begin())).map_or(0, |a| a.raw_margin());
        let end_margin = tree.anchor(AnchorRef::new(id, o.end())).map_or(0, |a| a.raw_margin());
        let begin = begin_margin;
        let end = (content[i] - end_margin).max(begin);
        let begin_var = var(system, id, o.begin());
        let end_var = var(system, id, o.end());
        system.set_final(begin_var, begin);
        system.set_final(end_var, end);
        tree.set_final_value(AnchorRef::new(id, o.begin()), begin);
        tree.set_final_value(AnchorRef::new(id, o.end()), end);
        let widget = tree.widget_mut(id);
        widget.set_position(o, begin);
        widget.set_length(o, end - begin);
        widget.pass.direct[i] = true;
    }
}

/// Whether an axis of a plain widget can be resolved without the solver
fn is_direct_candidate(tree: &WidgetTree, id: WidgetId, orientation: Orientation) -> bool {
    let widget = tree.widget(id);
    let i = orientation.index();
    if widget.pass.resolved[i] || widget.pass.direct[i] {
        return false;
    }
    if !matches!(
        widget.behaviour(orientation),
        DimensionBehaviour::Fixed | DimensionBehaviour::WrapContent
    ) {
        return false;
    }
    if widget.dimension_ratio() > 0.0 || tree.is_connected(AnchorRef::new(id, AnchorType::Center)) {
        return false;
    }
    if orientation == Orientation::Vertical
        && tree.is_connected(AnchorRef::new(id, AnchorType::Baseline))
    {
        return false;
    }
    !tree.is_in_chain(id, orientation)
}

fn resolve_axis(tree: &mut WidgetTree, id: WidgetId, orientation: Orientation) -> bool {
    if !is_direct_candidate(tree, id, orientation) {
        return false;
    }
    let begin = AnchorRef::new(id, orientation.begin());
    let end = AnchorRef::new(id, orientation.end());
    let widget = tree.widget(id);
    let length = widget.length(orientation);
    let bias = widget.bias(orientation);
    let begin_margin = tree.effective_margin(begin);
    let end_margin = tree.effective_margin(end);
    let final_of = |target: Option<AnchorRef>| target.and_then(|t| tree.final_value(t));

    let position = match (tree.target_of(begin), tree.target_of(end)) {
        (Some(b), Some(e)) => {
            let (Some(b), Some(e)) = (final_of(Some(b)), final_of(Some(e))) else {
                return false;
            };
            let start = b + begin_margin;
            let stop = e - end_margin;
            start + round((stop - start - length) as f32 * bias)
        }
        (Some(b), None) => match final_of(Some(b)) {
            Some(b) => b + begin_margin,
            None => return false,
        },
        (None, Some(e)) => match final_of(Some(e)) {
            Some(e) => e - end_margin - length,
            None => return false,
        },
        (None, None) => widget.position(orientation),
    };
    set_resolved(tree, id, orientation, position, position + length);
    true
}

/// Resolve everything that can be resolved inside one container, repeating
/// until nothing changes. `content` is `None` along wrapping axes.
pub(crate) fn resolve(
    tree: &mut WidgetTree,
    container: WidgetId,
    config: &LayoutConfig,
    content: [Option<i32>; 2],
) -> usize {
    let children = tree.children(container).to_vec();
    let mut resolved = 0;
    loop {
        let mut progress = false;
        for &child in &children {
            let widget = tree.widget(child);
            match &widget.kind {
                WidgetKind::Guideline(data) => {
                    let axis = data.axis().index();
                    if !widget.pass.resolved[axis] && guideline::resolve_direct(tree, child, content) {
                        resolved += 1;
                        progress = true;
                    }
                }
                WidgetKind::Barrier(data) => {
                    let axis = data.side().orientation().index();
                    if config.optimizes(Optimizations::BARRIER)
                        && !widget.pass.resolved[axis]
                        && barrier::resolve_direct(tree, child)
                    {
                        resolved += 1;
                        progress = true;
                    }
                }
                _ => {
                    for o in Orientation::BOTH {
                        if resolve_axis(tree, child, o) {
                            resolved += 1;
                            progress = true;
                        }
                    }
                }
            }
        }
        if !progress {
            break;
        }
    }
    if resolved > 0 {
        log::debug!("{} axes resolved directly in {}", resolved, container);
    }
    resolved
}

/// Lay out a chain arithmetically. Returns false, leaving everything
/// untouched, when the chain needs the solver.
pub(crate) fn solve_chain(tree: &mut WidgetTree, system: &mut dyn LinearSystem, chain: &ChainHead) -> bool {
    let o = chain.orientation();
    let axis = o.index();
    let (Some(first_visible), Some(last_visible)) = (chain.first_visible(), chain.last_visible()) else {
        return false;
    };
    let begin_target = tree.target_of(AnchorRef::new(chain.first(), o.begin()));
    let end_target = tree.target_of(AnchorRef::new(chain.last(), o.end()));
    let (Some(start), Some(stop)) = (
        begin_target.and_then(|t| tree.final_value(t)),
        end_target.and_then(|t| tree.final_value(t)),
    ) else {
        return false;
    };
    if chain.has_complex_weights() {
        return false;
    }
    let begin_pos = start + tree.effective_margin(AnchorRef::new(first_visible, o.begin()));
    let end_pos = stop - tree.effective_margin(AnchorRef::new(last_visible, o.end()));
    let extra = end_pos - begin_pos - chain.total_size();
    if extra < 0 {
        return false;
    }
    let visible = chain.visible_count();
    let match_count = chain.match_count();
    if match_count > 0 && match_count != visible {
        return false;
    }
    let extra = extra as f32;
    let head = tree.widget(chain.head());
    let style = head.chain_style(o);
    let bias = head.bias(o);

    let weights_defined = chain.total_weight() > 0.0
        && chain
            .weighted_widgets()
            .iter()
            .all(|w| tree.widget(*w).weight(o) >= 0.0);
    let share = |tree: &WidgetTree, id: WidgetId| -> f32 {
        if weights_defined {
            extra * tree.widget(id).weight(o).max(0.0) / chain.total_weight()
        } else {
            extra / match_count as f32
        }
    };

    let (mut position, gap) = if match_count > 0 {
        (begin_pos as f32, 0.0)
    } else {
        match style {
            ChainStyle::Packed => (begin_pos as f32 + extra * bias, 0.0),
            ChainStyle::Spread => {
                let gap = extra / (visible + 1) as f32;
                (begin_pos as f32 + gap, gap)
            }
            ChainStyle::SpreadInside if visible <= 1 => (begin_pos as f32 + extra / 2.0, 0.0),
            ChainStyle::SpreadInside => (begin_pos as f32, extra / (visible - 1) as f32),
        }
    };

    let mut current = Some(chain.first());
    while let Some(id) = current {
        current = tree.widget(id).pass.chain_next[axis];
        let begin_var = var(system, id, o.begin());
        let end_var = var(system, id, o.end());
        if tree.widget(id).is_gone() {
            let at = round(position);
            system.set_final(begin_var, at);
            system.set_final(end_var, at);
            set_resolved(tree, id, o, at, at);
            continue;
        }
        if id != first_visible {
            position += tree.effective_margin(AnchorRef::new(id, o.begin())) as f32;
        }
        let widget = tree.widget(id);
        let length = if widget.behaviour(o) == DimensionBehaviour::MatchConstraint {
            share(tree, id)
        } else {
            widget.length(o) as f32
        };
        let begin = round(position);
        let end = round(position + length);
        system.set_final(begin_var, begin);
        system.set_final(end_var, end);
        set_resolved(tree, id, o, begin, end);
        position += length + gap;
        if id != last_visible {
            position += tree.effective_margin(AnchorRef::new(id, o.end())) as f32;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::solver::CassowarySystem;

    fn root_with_content(width: i32, height: i32) -> (WidgetTree, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        tree.widget_mut(root).set_size(width, height);
        for (kind, value) in [
            (AnchorType::Left, 0),
            (AnchorType::Top, 0),
            (AnchorType::Right, width),
            (AnchorType::Bottom, height),
        ] {
            tree.set_final_value(AnchorRef::new(root, kind), value);
        }
        (tree, root)
    }

    #[test]
    fn test_centered_fixed_widget_resolves() {
        let (mut tree, root) = root_with_content(400, 300);
        let a = tree.add_widget(root, "a").unwrap();
        tree.widget_mut(a).set_size(100, 50);
        tree.connect(a, AnchorType::Left, root, AnchorType::Left, 0);
        tree.connect(a, AnchorType::Right, root, AnchorType::Right, 0);
        tree.widget_mut(a).set_bias(Orientation::Horizontal, 0.25);

        resolve(&mut tree, root, &LayoutConfig::default(), [Some(400), Some(300)]);
        assert!(tree.widget(a).pass.resolved[0]);
        assert_eq!(tree.widget(a).x(), 75);
        // no vertical connection keeps the current position
        assert_eq!(tree.widget(a).y(), 0);
    }

    #[test]
    fn test_dependent_resolves_on_later_sweep() {
        let (mut tree, root) = root_with_content(400, 300);
        let b = tree.add_widget(root, "b").unwrap();
        let a = tree.add_widget(root, "a").unwrap();
        tree.widget_mut(a).set_size(100, 50);
        tree.widget_mut(b).set_size(20, 20);
        tree.connect(a, AnchorType::Left, root, AnchorType::Left, 10);
        tree.connect(b, AnchorType::Left, a, AnchorType::Right, 5);

        resolve(&mut tree, root, &LayoutConfig::default(), [Some(400), Some(300)]);
        assert_eq!(tree.widget(b).x(), 115);
        assert_eq!(tree.final_value(AnchorRef::new(b, AnchorType::Right)), Some(135));
    }

    #[test]
    fn test_end_connection_needs_final_parent() {
        let (mut tree, root) = root_with_content(400, 300);
        let a = tree.add_widget(root, "a").unwrap();
        tree.widget_mut(a).set_size(100, 50);
        tree.connect(a, AnchorType::Right, root, AnchorType::Right, 0);
        tree.reset_final_values(root);

        resolve(&mut tree, root, &LayoutConfig::default(), [None, None]);
        assert!(!tree.widget(a).pass.resolved[0]);
    }

    #[test]
    fn test_match_parent_is_pinned() {
        let (mut tree, root) = root_with_content(400, 300);
        let a = tree.add_widget(root, "a").unwrap();
        tree.widget_mut(a)
            .set_behaviour(Orientation::Horizontal, DimensionBehaviour::MatchParent);
        tree.set_margin(AnchorRef::new(a, AnchorType::Left), 10);
        tree.set_margin(AnchorRef::new(a, AnchorType::Right), 30);
        let mut system = CassowarySystem::new();
        check_match_parent(&mut tree, &mut system, [false, false], [400, 300], a);
        let widget = tree.widget(a);
        assert!(widget.pass.direct[0]);
        assert!(!widget.pass.direct[1]);
        assert_eq!((widget.x(), widget.width()), (10, 360));
    }
}
