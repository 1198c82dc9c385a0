//! Translation of one widget into solver rows
//!
//! Every widget of a container is compiled against the container's own
//! coordinate system: the container's left and top are pinned at zero and
//! its right and bottom are either pinned (fixed size) or free (wrap).

use super::barrier;
use super::config::LayoutConfig;
use super::guideline;
use super::policy::{self, CenteredInputs, CenteredPlan};
use super::solver::{LinearSystem, Strength, VarId};
use super::tree::WidgetTree;
use super::types::{AnchorRef, AnchorType, DimensionBehaviour, MatchConstraint, Orientation, WidgetId};
use super::widget::WidgetKind;

/// What the compiler needs to know about the container being solved
pub(crate) struct PassContext<'a> {
    pub config: &'a LayoutConfig,
    pub container: WidgetId,
    /// The container sizes itself from its content along the axis
    pub wrap: [bool; 2],
    /// Chain heads found while compiling, per axis
    pub chains: [Vec<WidgetId>; 2],
}

impl<'a> PassContext<'a> {
    pub fn new(config: &'a LayoutConfig, container: WidgetId, wrap: [bool; 2]) -> Self {
        Self {
            config,
            container,
            wrap,
            chains: [Vec::new(), Vec::new()],
        }
    }

    fn register_chain(&mut self, orientation: Orientation, head: WidgetId) {
        let heads = &mut self.chains[orientation.index()];
        if !heads.contains(&head) {
            heads.push(head);
        }
    }
}

/// Solver variable of one anchor
pub(crate) fn var(system: &mut dyn LinearSystem, widget: WidgetId, kind: AnchorType) -> VarId {
    system.anchor_variable(AnchorRef::new(widget, kind))
}

/// Emit the rows of any child widget
pub(crate) fn add_to_solver(
    tree: &mut WidgetTree,
    system: &mut dyn LinearSystem,
    ctx: &mut PassContext<'_>,
    id: WidgetId,
) {
    match tree.widget(id).kind {
        WidgetKind::Guideline(_) => guideline::add_to_solver(tree, system, ctx, id),
        WidgetKind::Barrier(_) => barrier::add_to_solver(tree, system, ctx, id),
        _ => add_widget_to_solver(tree, system, ctx, id),
    }
}

/// Per-axis inputs of [`apply_constraints`]
#[derive(Debug, Clone, Copy)]
struct AxisParams {
    orientation: Orientation,
    apply_position: bool,
    dimension: i32,
    use_ratio: bool,
    match_default: MatchConstraint,
    in_chain: bool,
    opposite_in_chain: bool,
    opposite_variable: bool,
    circular: bool,
}

fn add_widget_to_solver(
    tree: &mut WidgetTree,
    system: &mut dyn LinearSystem,
    ctx: &mut PassContext<'_>,
    id: WidgetId,
) {
    let parent = ctx.container;
    let widget = tree.widget(id);
    let gone = widget.is_gone();
    if gone
        && !widget.animated
        && !tree.has_dependents(id)
        && !widget.pass.in_barrier[0]
        && !widget.pass.in_barrier[1]
    {
        return;
    }

    let left = var(system, id, AnchorType::Left);
    let top = var(system, id, AnchorType::Top);
    let right = var(system, id, AnchorType::Right);
    let bottom = var(system, id, AnchorType::Bottom);
    let baseline = var(system, id, AnchorType::Baseline);
    let parent_right = var(system, parent, AnchorType::Right);
    let parent_bottom = var(system, parent, AnchorType::Bottom);

    let resolved = widget.pass.resolved;
    if resolved[0] {
        let (x, width) = (widget.x, widget.width());
        system.set_final(left, x);
        system.set_final(right, x + width);
        if ctx.wrap[0] {
            system.add_greater_than(parent_right, right, 0, policy::WRAP);
        }
    }
    if resolved[1] {
        let widget = tree.widget(id);
        let (y, height) = (widget.y, widget.height());
        system.set_final(top, y);
        system.set_final(bottom, y + height);
        if tree.anchor(AnchorRef::new(id, AnchorType::Baseline)).is_some_and(|a| a.has_dependents()) {
            system.set_final(baseline, y + widget.baseline_distance());
        }
        if ctx.wrap[1] {
            system.add_greater_than(parent_bottom, bottom, 0, policy::WRAP);
        }
    }
    if resolved[0] && resolved[1] {
        tree.widget_mut(id).pass.resolved = [false; 2];
        return;
    }

    let mut in_chain = [false; 2];
    for o in Orientation::BOTH {
        if tree.is_chain_head(id, o) {
            ctx.register_chain(o, id);
            in_chain[o.index()] = true;
        } else {
            in_chain[o.index()] = tree.is_in_chain(id, o);
        }
    }

    let baseline_target = tree.target_of(AnchorRef::new(id, AnchorType::Baseline));
    for o in Orientation::BOTH {
        let i = o.index();
        if in_chain[i] || !ctx.wrap[i] || gone {
            continue;
        }
        let free = !tree.is_connected(AnchorRef::new(id, o.begin()))
            && !tree.is_connected(AnchorRef::new(id, o.end()));
        if free && (o == Orientation::Horizontal || baseline_target.is_none()) {
            let end = var(system, id, o.end());
            let parent_end = var(system, parent, o.end());
            system.add_greater_than(parent_end, end, 0, Strength::Low);
        }
    }

    let widget = tree.widget(id);
    let mut dimensions = [
        widget.width.max(widget.min_width),
        widget.height.max(widget.min_height),
    ];
    let match_constraint = [
        widget.behaviour(Orientation::Horizontal) == DimensionBehaviour::MatchConstraint,
        widget.behaviour(Orientation::Vertical) == DimensionBehaviour::MatchConstraint,
    ];
    let mut match_default = widget.match_default;
    let mut ratio = widget.dimension_ratio();
    let mut ratio_side = widget.ratio_side();
    let mut use_ratio = false;

    if ratio > 0.0 && !gone {
        use_ratio = true;
        for i in 0..2 {
            if match_constraint[i] && match_default[i] == MatchConstraint::Spread {
                match_default[i] = MatchConstraint::Ratio;
            }
        }
        let ratio_axis = [
            match_constraint[0] && match_default[0] == MatchConstraint::Ratio,
            match_constraint[1] && match_default[1] == MatchConstraint::Ratio,
        ];
        if ratio_axis[0] && ratio_axis[1] {
            (ratio_side, ratio) = setup_dimension_ratio(tree, id, ratio_side, ratio);
        } else if ratio_axis[0] {
            ratio_side = Some(Orientation::Horizontal);
            dimensions[0] = (ratio * dimensions[1] as f32) as i32;
            if !match_constraint[1] {
                match_default[0] = MatchConstraint::RatioResolved;
                use_ratio = false;
            }
        } else if ratio_axis[1] {
            ratio_side = Some(Orientation::Vertical);
            if widget.ratio_side().is_none() {
                ratio = 1.0 / ratio;
            }
            dimensions[1] = (ratio * dimensions[0] as f32) as i32;
            if !match_constraint[0] {
                match_default[1] = MatchConstraint::RatioResolved;
                use_ratio = false;
            }
        } else {
            use_ratio = false;
        }
    }

    {
        let pass = &mut tree.widget_mut(id).pass;
        pass.resolved_match_default = match_default;
        pass.resolved_ratio = ratio;
        pass.resolved_ratio_side = ratio_side;
        pass.has_ratio = use_ratio;
    }

    let use_horizontal_ratio = use_ratio && ratio_side != Some(Orientation::Vertical);
    let use_vertical_ratio = use_ratio && ratio_side != Some(Orientation::Horizontal);
    let circular = tree.is_connected(AnchorRef::new(id, AnchorType::Center))
        && [AnchorType::Left, AnchorType::Top, AnchorType::Right, AnchorType::Bottom]
            .iter()
            .all(|kind| !tree.is_connected(AnchorRef::new(id, *kind)));

    let widget = tree.widget(id);
    if !widget.pass.direct[0] && !resolved[0] {
        let params = AxisParams {
            orientation: Orientation::Horizontal,
            apply_position: true,
            dimension: dimensions[0],
            use_ratio: use_horizontal_ratio,
            match_default: match_default[0],
            in_chain: in_chain[0],
            opposite_in_chain: in_chain[1],
            opposite_variable: match_constraint[1],
            circular,
        };
        apply_constraints(tree, system, ctx, id, params);
    }

    let mut apply_vertical_position = true;
    if !resolved[1] {
        let widget = tree.widget(id);
        let distance = widget.baseline_distance();
        if let Some(target) = baseline_target {
            let baseline_ref = AnchorRef::new(id, AnchorType::Baseline);
            let target_var = var(system, target.widget, target.kind);
            system.add_equality(baseline, top, distance, Strength::Fixed);
            system.add_equality(baseline, target_var, tree.effective_margin(baseline_ref), Strength::Fixed);
            apply_vertical_position = false;
            if ctx.wrap[1] {
                system.add_greater_than(parent_bottom, bottom, 0, policy::WRAP);
            }
        } else if gone {
            let margin = tree
                .anchor(AnchorRef::new(id, AnchorType::Baseline))
                .map_or(0, |a| a.raw_margin());
            system.add_equality(baseline, top, margin, Strength::Fixed);
        } else if distance > 0 {
            system.add_equality(baseline, top, distance, Strength::Fixed);
        }
    }

    let widget = tree.widget(id);
    if !widget.pass.direct[1] && !resolved[1] {
        let params = AxisParams {
            orientation: Orientation::Vertical,
            apply_position: apply_vertical_position,
            dimension: dimensions[1],
            use_ratio: use_vertical_ratio,
            match_default: match_default[1],
            in_chain: in_chain[1],
            opposite_in_chain: in_chain[0],
            opposite_variable: match_constraint[0],
            circular,
        };
        apply_constraints(tree, system, ctx, id, params);
    }

    if use_ratio {
        if ratio_side == Some(Orientation::Vertical) {
            system.add_ratio(bottom, top, right, left, ratio, Strength::Fixed);
        } else {
            system.add_ratio(right, left, bottom, top, ratio, Strength::Fixed);
        }
    }

    if circular {
        if let Some(target) = tree.target_of(AnchorRef::new(id, AnchorType::Center)) {
            let radius = tree
                .anchor(AnchorRef::new(id, AnchorType::Center))
                .map_or(0, |a| a.raw_margin());
            let angle = tree.widget(id).circle_angle();
            let t = target.widget;
            let target_edges = [
                var(system, t, AnchorType::Left),
                var(system, t, AnchorType::Top),
                var(system, t, AnchorType::Right),
                var(system, t, AnchorType::Bottom),
            ];
            system.add_center_point([left, top, right, bottom], target_edges, angle, radius);
        }
    }

    tree.widget_mut(id).pass.resolved = [false; 2];
}

/// Pick the axis derived from the ratio when both axes are ratio driven.
/// Returns the side and the ratio expressed for that side.
fn setup_dimension_ratio(
    tree: &WidgetTree,
    id: WidgetId,
    declared: Option<Orientation>,
    ratio: f32,
) -> (Option<Orientation>, f32) {
    let widget = tree.widget(id);
    let connected = |kind| tree.is_connected(AnchorRef::new(id, kind));
    let horizontal_fixed = widget.is_resolved(Orientation::Horizontal);
    let vertical_fixed = widget.is_resolved(Orientation::Vertical);
    let mut side = declared;
    let mut ratio = ratio;

    if side.is_none() {
        if horizontal_fixed && !vertical_fixed {
            side = Some(Orientation::Horizontal);
        } else if !horizontal_fixed && vertical_fixed {
            side = Some(Orientation::Vertical);
            ratio = 1.0 / ratio;
        }
    }

    let vertical_pair = connected(AnchorType::Top) && connected(AnchorType::Bottom);
    let horizontal_pair = connected(AnchorType::Left) && connected(AnchorType::Right);
    if side == Some(Orientation::Horizontal) && !vertical_pair {
        side = Some(Orientation::Vertical);
    } else if side == Some(Orientation::Vertical) && !horizontal_pair {
        side = Some(Orientation::Horizontal);
    }

    if side.is_none() && !(vertical_pair && horizontal_pair) {
        if vertical_pair {
            side = Some(Orientation::Horizontal);
        } else if horizontal_pair {
            side = Some(Orientation::Vertical);
            if declared.is_none() {
                ratio = 1.0 / ratio;
            }
        }
    }

    if side.is_none() {
        let [min_width, min_height] = widget.match_min;
        if min_width > 0 && min_height == 0 {
            side = Some(Orientation::Horizontal);
        } else if min_width == 0 && min_height > 0 {
            side = Some(Orientation::Vertical);
            if declared.is_none() {
                ratio = 1.0 / ratio;
            }
        }
    }
    (side, ratio)
}

fn apply_constraints(
    tree: &mut WidgetTree,
    system: &mut dyn LinearSystem,
    ctx: &PassContext<'_>,
    id: WidgetId,
    params: AxisParams,
) {
    let o = params.orientation;
    let i = o.index();
    let parent = ctx.container;
    let mut parent_wrap = ctx.wrap[i];

    let begin_ref = AnchorRef::new(id, o.begin());
    let end_ref = AnchorRef::new(id, o.end());
    let parent_begin_ref = AnchorRef::new(parent, o.begin());
    let parent_end_ref = AnchorRef::new(parent, o.end());
    let begin = var(system, id, o.begin());
    let end = var(system, id, o.end());
    let parent_min = var(system, parent, o.begin());
    let parent_max = var(system, parent, o.end());

    let begin_target = tree.target_of(begin_ref);
    let end_target = tree.target_of(end_ref);
    let num_connections = usize::from(begin_target.is_some()) + usize::from(end_target.is_some());
    let begin_margin = tree.effective_margin(begin_ref);
    let end_margin = tree.effective_margin(end_ref);

    let size_override = tree.widget_mut(id).pass.size_override[i].take();
    let widget = tree.widget(id);
    let gone = widget.is_gone();
    let match_default = if params.use_ratio {
        MatchConstraint::Ratio
    } else {
        params.match_default
    };
    let mut variable_size = widget.behaviour(o) == DimensionBehaviour::MatchConstraint
        && match_default != MatchConstraint::RatioResolved;
    let mut dimension = params.dimension;
    if let Some(size) = size_override {
        variable_size = false;
        dimension = size;
    }
    if gone {
        dimension = 0;
        variable_size = false;
    }
    let match_min = widget.match_min[i];
    let match_max = widget.match_max[i];
    let percent = widget.match_percent[i];
    let min_dimension = widget.min_length(o);
    let bias = widget.bias(o);
    let in_barrier = widget.pass.in_barrier[i];
    let position = widget.position(o);

    if params.apply_position {
        match (begin_target, end_target) {
            (None, None) if !params.circular => {
                system.add_equality_constant(begin, position);
            }
            (Some(target), None) => {
                let target_is_barrier = tree.widget(target.widget).is_barrier();
                let target_var = var(system, target.widget, target.kind);
                system.add_equality(
                    begin,
                    target_var,
                    begin_margin,
                    policy::begin_only(parent_wrap, target_is_barrier),
                );
            }
            _ => {}
        }
    }

    if !variable_size {
        system.add_equality(end, begin, dimension, Strength::Fixed);
    } else if num_connections != 2
        && matches!(match_default, MatchConstraint::Spread | MatchConstraint::Wrap)
    {
        variable_size = false;
        let mut size = match_min.max(dimension);
        if match_max > 0 {
            size = size.min(match_max);
        }
        system.add_equality(end, begin, size, Strength::Fixed);
    } else {
        if dimension > 0 && match_default != MatchConstraint::Wrap {
            dimension = 0;
        }
        if match_min > 0 {
            system.add_greater_than(end, begin, match_min, Strength::Fixed);
            dimension = dimension.max(match_min);
        }
        if match_max > 0 {
            if !(parent_wrap && match_default == MatchConstraint::Wrap) {
                system.add_lower_than(end, begin, match_max, Strength::Fixed);
            }
            dimension = dimension.min(match_max);
        }
        match match_default {
            MatchConstraint::Wrap => {
                if parent_wrap {
                    system.add_equality(end, begin, dimension, Strength::Fixed);
                } else {
                    system.add_equality(end, begin, dimension, Strength::Equality);
                    system.add_lower_than(end, begin, dimension, Strength::Fixed);
                }
            }
            MatchConstraint::Percent => {
                system.add_percent_dimension(end, begin, parent_max, parent_min, percent, Strength::Fixed);
                if parent_wrap {
                    variable_size = false;
                }
            }
            _ => {}
        }
    }

    if !params.apply_position || params.in_chain {
        if num_connections < 2 && parent_wrap {
            system.add_greater_than(begin, parent_min, 0, Strength::Fixed);
            let baseline_target = tree.target_of(AnchorRef::new(id, AnchorType::Baseline));
            let apply_end = o == Orientation::Horizontal
                || baseline_target.is_none()
                || baseline_target.is_some_and(|t| {
                    let target = tree.widget(t.widget);
                    target.dimension_ratio() != 0.0
                        && target.behaviour(Orientation::Horizontal) == DimensionBehaviour::MatchConstraint
                        && target.behaviour(Orientation::Vertical) == DimensionBehaviour::MatchConstraint
                });
            if apply_end {
                system.add_greater_than(parent_max, end, 0, Strength::Fixed);
            }
        }
        return;
    }

    match (begin_target, end_target) {
        (None, Some(target)) => {
            let target_var = var(system, target.widget, target.kind);
            system.add_equality(end, target_var, -end_margin, Strength::Fixed);
            if parent_wrap {
                system.add_greater_than(begin, parent_min, 0, policy::WRAP);
            }
        }
        (Some(bt), Some(et)) => {
            let begin_owner = tree.widget(bt.widget);
            let end_owner = tree.widget(et.widget);
            let input = CenteredInputs {
                variable_size,
                match_default,
                has_limits: match_min > 0 || match_max > 0,
                use_ratio: params.use_ratio,
                targets_final: tree.final_value(bt).is_some() && tree.final_value(et).is_some(),
                target_is_parent: bt.widget == parent || et.widget == parent,
                target_is_barrier: begin_owner.is_barrier() || end_owner.is_barrier(),
                target_is_guideline: begin_owner.is_guideline() || end_owner.is_guideline(),
                same_target_widget: bt.widget == et.widget,
                same_target_anchor: bt == et,
                targets_parent_edges: bt == parent_begin_ref && et == parent_end_ref,
                begin_targets_parent_begin: bt == parent_begin_ref,
                end_targets_parent_end: et == parent_end_ref,
                end_target_is_parent: et.widget == parent,
                parent_wrap,
                in_chain: params.in_chain,
                in_barrier,
                opposite_variable: params.opposite_variable,
                opposite_in_chain: params.opposite_in_chain,
                gone,
                end_has_dependents: tree.anchor(end_ref).is_some_and(|a| a.has_dependents()),
                no_min_size: min_dimension == 0 && match_min == 0,
            };
            let begin_target_var = var(system, bt.widget, bt.kind);
            let end_target_var = var(system, et.widget, et.kind);
            match policy::centered(&input) {
                CenteredPlan::PinEdges => {
                    system.add_equality(begin, begin_target_var, begin_margin, Strength::Fixed);
                    system.add_equality(end, end_target_var, -end_margin, Strength::Fixed);
                    return;
                }
                CenteredPlan::PinCentered { wrap_end } => {
                    system.add_centering(
                        begin,
                        begin_target_var,
                        begin_margin,
                        bias,
                        end_target_var,
                        end,
                        end_margin,
                        Strength::Fixed,
                    );
                    if wrap_end {
                        system.add_greater_than(parent_max, end, end_margin, policy::WRAP);
                    }
                    return;
                }
                CenteredPlan::Rows(rows) => {
                    if let Some(strength) = rows.centering {
                        system.add_centering(
                            begin,
                            begin_target_var,
                            begin_margin,
                            bias,
                            end_target_var,
                            end,
                            end_margin,
                            strength,
                        );
                    }
                    if rows.stop {
                        return;
                    }
                    if let Some(strength) = rows.range {
                        system.add_greater_than(begin, begin_target_var, begin_margin, strength);
                        system.add_lower_than(end, end_target_var, -end_margin, strength);
                    }
                    if let Some(strength) = rows.bounds {
                        system.add_equality(begin, begin_target_var, begin_margin, strength);
                        system.add_equality(end, end_target_var, -end_margin, strength);
                    }
                    if rows.wrap_begin {
                        system.add_greater_than(begin, parent_min, 0, policy::WRAP);
                    }
                    if let Some(strength) = rows.wrap_size {
                        system.add_greater_than(end, begin, 0, strength);
                    }
                    parent_wrap = rows.parent_wrap;
                }
            }
        }
        _ => {}
    }

    if parent_wrap && end_target != Some(parent_end_ref) {
        let margin = if end_target.is_some() { end_margin } else { 0 };
        system.add_greater_than(parent_max, end, margin, policy::WRAP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::solver::CassowarySystem;

    fn fixed_root(width: i32, height: i32) -> (WidgetTree, WidgetId, CassowarySystem) {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        tree.widget_mut(root).set_size(width, height);
        let mut system = CassowarySystem::new();
        let right = var(&mut system, root, AnchorType::Right);
        let bottom = var(&mut system, root, AnchorType::Bottom);
        let left = var(&mut system, root, AnchorType::Left);
        let top = var(&mut system, root, AnchorType::Top);
        system.set_final(left, 0);
        system.set_final(top, 0);
        system.set_final(right, width);
        system.set_final(bottom, height);
        (tree, root, system)
    }

    fn solve_one(tree: &mut WidgetTree, system: &mut CassowarySystem, root: WidgetId) {
        let config = LayoutConfig::default();
        let mut ctx = PassContext::new(&config, root, [false, false]);
        for child in tree.children(root).to_vec() {
            add_to_solver(tree, system, &mut ctx, child);
        }
        system.minimize().unwrap();
    }

    #[test]
    fn test_fixed_widget_follows_margins() {
        let (mut tree, root, mut system) = fixed_root(400, 300);
        let a = tree.add_widget(root, "a").unwrap();
        tree.widget_mut(a).set_size(100, 40);
        tree.connect(a, AnchorType::Left, root, AnchorType::Left, 16);
        tree.connect(a, AnchorType::Top, root, AnchorType::Top, 8);
        solve_one(&mut tree, &mut system, root);
        let left = var(&mut system, a, AnchorType::Left);
        let right = var(&mut system, a, AnchorType::Right);
        let bottom = var(&mut system, a, AnchorType::Bottom);
        assert_eq!(system.value(left), 16);
        assert_eq!(system.value(right), 116);
        assert_eq!(system.value(bottom), 48);
    }

    #[test]
    fn test_spread_fills_between_targets() {
        let (mut tree, root, mut system) = fixed_root(400, 300);
        let a = tree.add_widget(root, "a").unwrap();
        tree.widget_mut(a)
            .set_behaviour(Orientation::Horizontal, DimensionBehaviour::MatchConstraint);
        tree.connect(a, AnchorType::Left, root, AnchorType::Left, 10);
        tree.connect(a, AnchorType::Right, root, AnchorType::Right, 30);
        solve_one(&mut tree, &mut system, root);
        let left = var(&mut system, a, AnchorType::Left);
        let right = var(&mut system, a, AnchorType::Right);
        assert_eq!(system.value(left), 10);
        assert_eq!(system.value(right), 370);
    }

    #[test]
    fn test_ratio_derives_height() {
        let (mut tree, root, mut system) = fixed_root(400, 300);
        let a = tree.add_widget(root, "a").unwrap();
        {
            let w = tree.widget_mut(a);
            w.set_width(200);
            w.set_behaviour(Orientation::Vertical, DimensionBehaviour::MatchConstraint);
            w.set_dimension_ratio_str("2:1");
        }
        tree.connect(a, AnchorType::Top, root, AnchorType::Top, 0);
        tree.connect(a, AnchorType::Bottom, root, AnchorType::Bottom, 0);
        solve_one(&mut tree, &mut system, root);
        let top = var(&mut system, a, AnchorType::Top);
        let bottom = var(&mut system, a, AnchorType::Bottom);
        assert_eq!(system.value(bottom) - system.value(top), 100);
    }

    #[test]
    fn test_chain_heads_are_collected_once() {
        let (mut tree, root, mut system) = fixed_root(400, 300);
        let a = tree.add_widget(root, "a").unwrap();
        let b = tree.add_widget(root, "b").unwrap();
        tree.connect(a, AnchorType::Left, root, AnchorType::Left, 0);
        tree.connect(a, AnchorType::Right, b, AnchorType::Left, 0);
        tree.connect(b, AnchorType::Left, a, AnchorType::Right, 0);
        tree.connect(b, AnchorType::Right, root, AnchorType::Right, 0);
        let config = LayoutConfig::default();
        let mut ctx = PassContext::new(&config, root, [false, false]);
        add_to_solver(&mut tree, &mut system, &mut ctx, a);
        add_to_solver(&mut tree, &mut system, &mut ctx, a);
        add_to_solver(&mut tree, &mut system, &mut ctx, b);
        assert_eq!(ctx.chains[0], vec![a]);
        assert!(ctx.chains[1].is_empty());
    }
}
