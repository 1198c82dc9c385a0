//! Chains: widgets linked to each other in both directions along one axis
//!
//! A [`ChainHead`] walks the chain once and caches what the row emitter
//! needs: visible endpoints, match-constraint widgets and their weights,
//! and the space taken by fixed widgets and margins.

use super::compile::{var, PassContext};
use super::config::Optimizations;
use super::direct;
use super::policy;
use super::solver::{LinearSystem, Strength};
use super::tree::WidgetTree;
use super::types::{
    AnchorRef, ChainStyle, DimensionBehaviour, MatchConstraint, Orientation, WidgetId,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ChainHead {
    orientation: Orientation,
    rtl: bool,
    first: WidgetId,
    last: WidgetId,
    first_visible: Option<WidgetId>,
    last_visible: Option<WidgetId>,
    head: WidgetId,
    first_match: Option<WidgetId>,
    last_match: Option<WidgetId>,
    weighted: Vec<WidgetId>,
    widgets_count: usize,
    match_count: usize,
    visible_count: usize,
    total_weight: f32,
    total_size: i32,
    total_margins: i32,
    optimizable: bool,
    has_undefined_weights: bool,
    has_defined_weights: bool,
    has_complex_weights: bool,
    has_ratio: bool,
    defined: bool,
}

impl ChainHead {
    pub fn new(first: WidgetId, orientation: Orientation, rtl: bool) -> Self {
        Self {
            orientation,
            rtl,
            first,
            last: first,
            first_visible: None,
            last_visible: None,
            head: first,
            first_match: None,
            last_match: None,
            weighted: Vec::new(),
            widgets_count: 0,
            match_count: 0,
            visible_count: 0,
            total_weight: 0.0,
            total_size: 0,
            total_margins: 0,
            optimizable: true,
            has_undefined_weights: false,
            has_defined_weights: false,
            has_complex_weights: false,
            has_ratio: false,
            defined: false,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn first(&self) -> WidgetId {
        self.first
    }

    pub fn last(&self) -> WidgetId {
        self.last
    }

    pub fn first_visible(&self) -> Option<WidgetId> {
        self.first_visible
    }

    pub fn last_visible(&self) -> Option<WidgetId> {
        self.last_visible
    }

    /// Widget carrying the chain style and bias
    pub fn head(&self) -> WidgetId {
        self.head
    }

    pub fn first_match(&self) -> Option<WidgetId> {
        self.first_match
    }

    pub fn last_match(&self) -> Option<WidgetId> {
        self.last_match
    }

    /// Match-constraint widgets that share space by weight, in chain order
    pub fn weighted_widgets(&self) -> &[WidgetId] {
        &self.weighted
    }

    pub fn widgets_count(&self) -> usize {
        self.widgets_count
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn total_weight(&self) -> f32 {
        self.total_weight
    }

    /// Fixed sizes plus inner margins
    pub fn total_size(&self) -> i32 {
        self.total_size
    }

    pub fn total_margins(&self) -> i32 {
        self.total_margins
    }

    pub fn is_optimizable(&self) -> bool {
        self.optimizable
    }

    pub fn has_complex_weights(&self) -> bool {
        self.has_complex_weights
    }

    pub fn has_ratio(&self) -> bool {
        self.has_ratio
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Walk the chain and fill in the cached values. Calling it again is a no-op.
    pub fn define(&mut self, tree: &mut WidgetTree) {
        if self.defined {
            return;
        }
        self.defined = true;
        let o = self.orientation;
        let axis = o.index();
        let mut current = Some(self.first);
        let mut previous_match: Option<WidgetId> = None;
        let mut steps = 0;

        while let Some(id) = current {
            steps += 1;
            self.widgets_count += 1;
            let begin = AnchorRef::new(id, o.begin());
            let end = AnchorRef::new(id, o.end());
            {
                let widget = tree.widget_mut(id);
                widget.pass.chain_next[axis] = None;
                widget.pass.next_match[axis] = None;
            }
            let widget = tree.widget(id);
            if !widget.is_gone() {
                self.visible_count += 1;
                if widget.behaviour(o) != DimensionBehaviour::MatchConstraint {
                    self.total_size += widget.length(o);
                }
                let margins = tree.effective_margin(begin) + tree.effective_margin(end);
                self.total_size += margins;
                self.total_margins += margins;
                if self.first_visible.is_none() {
                    self.first_visible = Some(id);
                }
                self.last_visible = Some(id);

                if widget.behaviour(o) == DimensionBehaviour::MatchConstraint {
                    let resolved = widget.pass.resolved_match_default[axis];
                    if matches!(
                        resolved,
                        MatchConstraint::Spread | MatchConstraint::Ratio | MatchConstraint::Percent
                    ) {
                        self.match_count += 1;
                        let weight = widget.weight(o);
                        if weight > 0.0 {
                            self.total_weight += weight;
                        }
                        if matches!(resolved, MatchConstraint::Spread | MatchConstraint::Ratio) {
                            if weight < 0.0 {
                                self.has_undefined_weights = true;
                            } else {
                                self.has_defined_weights = true;
                            }
                            self.weighted.push(id);
                        }
                        if self.first_match.is_none() {
                            self.first_match = Some(id);
                        }
                        if let Some(previous) = previous_match {
                            tree.widget_mut(previous).pass.next_match[axis] = Some(id);
                        }
                        previous_match = Some(id);
                    }
                    let widget = tree.widget(id);
                    if widget.pass.resolved_match_default[axis] != MatchConstraint::Spread
                        || widget.match_min[axis] != 0
                        || widget.match_max[axis] != 0
                    {
                        self.optimizable = false;
                    }
                    if widget.dimension_ratio() != 0.0 {
                        self.optimizable = false;
                        self.has_ratio = true;
                    }
                }
            }

            let next = if steps < tree.len() {
                tree.chain_successor(id, o)
            } else {
                None
            };
            if let Some(next) = next {
                tree.widget_mut(id).pass.chain_next[axis] = Some(next);
            } else {
                self.last = id;
            }
            current = next;
        }
        self.last_match = previous_match;

        if let Some(first_visible) = self.first_visible {
            self.total_size -= tree.effective_margin(AnchorRef::new(first_visible, o.begin()));
        }
        if let Some(last_visible) = self.last_visible {
            self.total_size -= tree.effective_margin(AnchorRef::new(last_visible, o.end()));
        }
        self.head = if o == Orientation::Horizontal && self.rtl {
            self.last
        } else {
            self.first
        };
        self.has_complex_weights = self.has_defined_weights && self.has_undefined_weights;
    }
}

/// Emit the rows of one chain
pub(crate) fn apply_chain_constraints(
    tree: &mut WidgetTree,
    system: &mut dyn LinearSystem,
    ctx: &PassContext<'_>,
    chain: &mut ChainHead,
) {
    chain.define(tree);
    let o = chain.orientation;
    let axis = o.index();
    let container = ctx.container;
    let parent_wrap = ctx.wrap[axis];
    let style = tree.widget(chain.head).chain_style(o);
    let packed = style == ChainStyle::Packed;

    if ctx.config.optimizes(Optimizations::CHAINS)
        && !parent_wrap
        && chain.optimizable
        && direct::solve_chain(tree, system, chain)
    {
        log::debug!("chain at {} solved directly", chain.first);
        return;
    }

    let begin_of = |w: WidgetId| AnchorRef::new(w, o.begin());
    let end_of = |w: WidgetId| AnchorRef::new(w, o.end());
    let spread_only = |tree: &WidgetTree, w: WidgetId| {
        let widget = tree.widget(w);
        widget.behaviour(o) == DimensionBehaviour::MatchConstraint
            && widget.pass.resolved_match_default[axis] == MatchConstraint::Spread
    };
    let container_begin = var(system, container, o.begin());
    let container_end = var(system, container, o.end());

    // links between consecutive widgets
    let mut current = Some(chain.first);
    while let Some(id) = current {
        let is_first = id == chain.first;
        let is_first_visible = Some(id) == chain.first_visible;
        let strength = policy::chain_link(
            style,
            is_first,
            is_first_visible,
            spread_only(tree, id),
            tree.widget(id).pass.in_barrier[axis],
        );
        let begin = begin_of(id);
        let begin_var = var(system, id, o.begin());
        if let Some(target) = tree.target_of(begin) {
            let mut margin = tree.effective_margin(begin);
            if !is_first {
                margin += tree.effective_margin(target);
            }
            let target_var = var(system, target.widget, target.kind);
            system.add_greater_than(begin_var, target_var, margin, policy::chain_order(is_first_visible));
            system.add_equality(begin_var, target_var, margin, strength);
        }
        if parent_wrap {
            let widget = tree.widget(id);
            let end_var = var(system, id, o.end());
            if !widget.is_gone() && widget.behaviour(o) == DimensionBehaviour::MatchConstraint {
                system.add_greater_than(end_var, begin_var, 0, Strength::Equality);
            }
            system.add_greater_than(begin_var, container_begin, 0, Strength::Fixed);
        }
        current = tree.widget(id).pass.chain_next[axis];
    }

    let last_end = end_of(chain.last);
    let last_target = tree.target_of(last_end);

    if let (Some(last_visible), Some(last_target)) = (chain.last_visible, last_target) {
        let end = end_of(last_visible);
        let end_var = var(system, last_visible, o.end());
        let margin = tree.effective_margin(end);
        if let Some(target) = tree.target_of(end) {
            if let Some(strength) =
                policy::chain_tail(style, spread_only(tree, last_visible), target.widget == container)
            {
                let target_var = var(system, target.widget, target.kind);
                system.add_equality(end_var, target_var, -margin, strength);
            }
        }
        let last_target_var = var(system, last_target.widget, last_target.kind);
        system.add_lower_than(end_var, last_target_var, -margin, Strength::Barrier);
    }

    if parent_wrap && last_target.is_some() {
        let last_end_var = var(system, chain.last, o.end());
        let margin = tree.effective_margin(last_end);
        system.add_greater_than(container_end, last_end_var, margin, Strength::Fixed);
    }

    apply_weights(tree, system, chain);

    let (Some(first_visible), Some(last_visible)) = (chain.first_visible, chain.last_visible) else {
        return;
    };
    let first_target = tree.target_of(begin_of(chain.first));

    if first_visible == last_visible || packed {
        if let (Some(begin_target), Some(end_target)) = (first_target, last_target) {
            let begin = begin_of(first_visible);
            let end = end_of(last_visible);
            let bias = tree.widget(chain.head).bias(o);
            let begin_var = var(system, first_visible, o.begin());
            let begin_target_var = var(system, begin_target.widget, begin_target.kind);
            let end_target_var = var(system, end_target.widget, end_target.kind);
            let end_var = var(system, last_visible, o.end());
            system.add_centering(
                begin_var,
                begin_target_var,
                tree.effective_margin(begin),
                bias,
                end_target_var,
                end_var,
                tree.effective_margin(end),
                Strength::Centering,
            );
        }
    } else if style == ChainStyle::Spread {
        apply_spread(tree, system, chain, first_target, last_target);
    } else if style == ChainStyle::SpreadInside {
        apply_spread_inside(tree, system, chain, first_target, last_target);
    }

    if first_visible != last_visible && !packed {
        let begin = begin_of(first_visible);
        let end = end_of(last_visible);
        let begin_target = tree.target_of(begin);
        let end_target = if chain.last != last_visible {
            last_target
        } else {
            tree.target_of(end)
        };
        if let (Some(begin_target), Some(end_target)) = (begin_target, end_target) {
            let begin_var = var(system, first_visible, o.begin());
            let begin_target_var = var(system, begin_target.widget, begin_target.kind);
            let end_target_var = var(system, end_target.widget, end_target.kind);
            let end_var = var(system, last_visible, o.end());
            system.add_centering(
                begin_var,
                begin_target_var,
                tree.effective_margin(begin),
                0.5,
                end_target_var,
                end_var,
                tree.effective_margin(end),
                Strength::Equality,
            );
        }
    }
}

fn apply_weights(tree: &WidgetTree, system: &mut dyn LinearSystem, chain: &ChainHead) {
    if chain.weighted.len() <= 1 {
        return;
    }
    let o = chain.orientation;
    let mut total_weight = chain.total_weight;
    if chain.has_undefined_weights && !chain.has_complex_weights {
        total_weight = chain.match_count as f32;
    }
    let mut previous: Option<(WidgetId, f32)> = None;
    for &id in &chain.weighted {
        let mut weight = tree.widget(id).weight(o);
        let begin = var(system, id, o.begin());
        let end = var(system, id, o.end());
        if weight < 0.0 {
            if chain.has_complex_weights {
                system.add_equality(end, begin, 0, Strength::Highest);
                continue;
            }
            weight = 1.0;
        }
        if weight == 0.0 {
            system.add_equality(end, begin, 0, Strength::Fixed);
            continue;
        }
        if let Some((previous_id, previous_weight)) = previous {
            let previous_begin = var(system, previous_id, o.begin());
            let previous_end = var(system, previous_id, o.end());
            system.add_equal_match_dimensions(
                previous_weight,
                total_weight,
                weight,
                previous_begin,
                previous_end,
                begin,
                end,
                Strength::Fixed,
            );
        }
        previous = Some((id, weight));
    }
}

/// Equal gaps between consecutive visible widgets and the chain's ends
fn apply_spread(
    tree: &WidgetTree,
    system: &mut dyn LinearSystem,
    chain: &ChainHead,
    first_target: Option<AnchorRef>,
    last_target: Option<AnchorRef>,
) {
    let o = chain.orientation;
    let all_match = chain.match_count > 0 && chain.widgets_count == chain.match_count;
    let strength = policy::chain_spacing(ChainStyle::Spread, all_match);
    let visible = visible_widgets(tree, chain);

    for (i, &id) in visible.iter().enumerate() {
        let previous = i.checked_sub(1).map(|p| visible[p]);
        let next = visible.get(i + 1).copied();
        let begin = AnchorRef::new(id, o.begin());
        let end = AnchorRef::new(id, o.end());
        let begin_target = match previous {
            Some(p) => Some(AnchorRef::new(p, o.end())),
            None => first_target,
        };
        let next_anchor = match next {
            Some(n) => Some(AnchorRef::new(n, o.begin())),
            None => last_target,
        };
        let (Some(begin_target), Some(next_anchor)) = (begin_target, next_anchor) else {
            continue;
        };
        let mut begin_margin = tree.effective_margin(begin);
        if let Some(p) = previous {
            begin_margin += tree.effective_margin(AnchorRef::new(p, o.end()));
        }
        let mut end_margin = tree.effective_margin(end);
        if next.is_some() {
            end_margin += tree.effective_margin(next_anchor);
        }
        let begin_var = var(system, id, o.begin());
        let begin_target_var = var(system, begin_target.widget, begin_target.kind);
        let next_var = var(system, next_anchor.widget, next_anchor.kind);
        let end_var = var(system, id, o.end());
        system.add_centering(
            begin_var,
            begin_target_var,
            begin_margin,
            0.5,
            next_var,
            end_var,
            end_margin,
            strength,
        );
    }
}

/// Interior widgets spread evenly, the ends stick to the chain's targets
fn apply_spread_inside(
    tree: &WidgetTree,
    system: &mut dyn LinearSystem,
    chain: &ChainHead,
    first_target: Option<AnchorRef>,
    last_target: Option<AnchorRef>,
) {
    let o = chain.orientation;
    let visible = visible_widgets(tree, chain);
    let all_match = chain.match_count > 0 && chain.widgets_count == chain.match_count;
    let strength = policy::chain_spacing(ChainStyle::SpreadInside, all_match);

    for window in visible.windows(3) {
        let [prev, id, next] = [window[0], window[1], window[2]];
        let begin = AnchorRef::new(id, o.begin());
        let end = AnchorRef::new(id, o.end());
        let begin_var = var(system, id, o.begin());
        let end_var = var(system, id, o.end());
        let prev_end = var(system, prev, o.end());
        let next_begin = var(system, next, o.begin());
        let begin_margin =
            tree.effective_margin(begin) + tree.effective_margin(AnchorRef::new(prev, o.end()));
        let end_margin =
            tree.effective_margin(end) + tree.effective_margin(AnchorRef::new(next, o.begin()));
        system.add_centering(
            begin_var,
            prev_end,
            begin_margin,
            0.5,
            next_begin,
            end_var,
            end_margin,
            strength,
        );
    }

    let (Some(first_visible), Some(last_visible)) = (chain.first_visible, chain.last_visible) else {
        return;
    };
    if let Some(target) = first_target {
        let begin = AnchorRef::new(first_visible, o.begin());
        let begin_var = var(system, first_visible, o.begin());
        let target_var = var(system, target.widget, target.kind);
        system.add_equality(begin_var, target_var, tree.effective_margin(begin), Strength::Equality);
    }
    if let Some(target) = last_target {
        let end = AnchorRef::new(last_visible, o.end());
        let end_var = var(system, last_visible, o.end());
        let target_var = var(system, target.widget, target.kind);
        system.add_equality(end_var, target_var, -tree.effective_margin(end), Strength::Equality);
    }
}

fn visible_widgets(tree: &WidgetTree, chain: &ChainHead) -> Vec<WidgetId> {
    let axis = chain.orientation.index();
    let mut visible = Vec::with_capacity(chain.visible_count);
    let mut current = Some(chain.first);
    while let Some(id) = current {
        if !tree.widget(id).is_gone() {
            visible.push(id);
        }
        current = tree.widget(id).pass.chain_next[axis];
    }
    visible
}
