//! Barriers: a line that follows the most extreme edge of its references

use serde::Deserialize;

use super::compile::{var, PassContext};
use super::solver::{LinearSystem, Strength};
use super::policy;
use super::tree::WidgetTree;
use super::types::{AnchorRef, AnchorType, DimensionBehaviour, Orientation, WidgetId};

/// Edge aggregated by a barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl BarrierSide {
    pub fn anchor(self) -> AnchorType {
        match self {
            BarrierSide::Left => AnchorType::Left,
            BarrierSide::Right => AnchorType::Right,
            BarrierSide::Top => AnchorType::Top,
            BarrierSide::Bottom => AnchorType::Bottom,
        }
    }

    /// Axis the barrier moves along
    pub fn orientation(self) -> Orientation {
        match self {
            BarrierSide::Left | BarrierSide::Right => Orientation::Horizontal,
            BarrierSide::Top | BarrierSide::Bottom => Orientation::Vertical,
        }
    }

    /// Left and top barriers follow the smallest edge
    pub fn is_lower(self) -> bool {
        matches!(self, BarrierSide::Left | BarrierSide::Top)
    }
}

#[derive(Debug, Clone)]
pub struct BarrierData {
    side: BarrierSide,
    pub(crate) references: Vec<WidgetId>,
    allows_gone: bool,
    margin: i32,
}

impl BarrierData {
    pub fn new(side: BarrierSide) -> Self {
        Self {
            side,
            references: Vec::new(),
            allows_gone: false,
            margin: 0,
        }
    }

    pub fn side(&self) -> BarrierSide {
        self.side
    }

    pub fn references(&self) -> &[WidgetId] {
        &self.references
    }

    pub fn add_reference(&mut self, widget: WidgetId) {
        if !self.references.contains(&widget) {
            self.references.push(widget);
        }
    }

    pub fn allows_gone_widget(&self) -> bool {
        self.allows_gone
    }

    /// Let gone references still contribute their (collapsed) edge
    pub fn set_allows_gone_widget(&mut self, allows: bool) {
        self.allows_gone = allows;
    }

    pub fn margin(&self) -> i32 {
        self.margin
    }

    pub fn set_margin(&mut self, margin: i32) {
        self.margin = margin;
    }
}

fn eligible(tree: &WidgetTree, data: &BarrierData) -> Vec<WidgetId> {
    data.references
        .iter()
        .copied()
        .filter(|r| tree.get(*r).is_some())
        .filter(|r| data.allows_gone_widget() || tree.widget(*r).allowed_in_barrier())
        .collect()
}

/// Flag references so that their rows leave room for the barrier
pub(crate) fn mark_widgets(tree: &mut WidgetTree, id: WidgetId) {
    let Some(data) = tree.widget(id).barrier().cloned() else {
        return;
    };
    let axis = data.side().orientation().index();
    for reference in eligible(tree, &data) {
        tree.widget_mut(reference).pass.in_barrier[axis] = true;
    }
}

/// Barrier position when every reference is resolved on the barrier's axis
pub(crate) fn all_solved(tree: &WidgetTree, id: WidgetId) -> Option<i32> {
    let data = tree.widget(id).barrier()?;
    let side = data.side();
    let references = eligible(tree, data);
    if references.is_empty() {
        return None;
    }
    let mut edges = Vec::with_capacity(references.len());
    for reference in references {
        if !tree.widget(reference).is_resolved(side.orientation()) {
            return None;
        }
        edges.push(tree.final_value(AnchorRef::new(reference, side.anchor()))?);
    }
    let edge = if side.is_lower() {
        edges.into_iter().min()
    } else {
        edges.into_iter().max()
    }?;
    Some(edge + data.margin())
}

/// Resolve the barrier without the solver. Returns true on success.
pub(crate) fn resolve_direct(tree: &mut WidgetTree, id: WidgetId) -> bool {
    let Some(position) = all_solved(tree, id) else {
        return false;
    };
    let Some(side) = tree.widget(id).barrier().map(|d| d.side()) else {
        return false;
    };
    let axis = side.orientation();
    tree.set_final_value(AnchorRef::new(id, axis.begin()), position);
    tree.set_final_value(AnchorRef::new(id, axis.end()), position);
    let widget = tree.widget_mut(id);
    widget.set_position(axis, position);
    widget.pass.resolved[axis.index()] = true;
    log::debug!("barrier {} resolved directly at {}", id, position);
    true
}

pub(crate) fn add_to_solver(
    tree: &mut WidgetTree,
    system: &mut dyn LinearSystem,
    ctx: &PassContext<'_>,
    id: WidgetId,
) {
    let Some(data) = tree.widget(id).barrier().cloned() else {
        return;
    };
    let side = data.side();
    let axis = side.orientation();
    let position = var(system, id, side.anchor());
    let opposite = var(
        system,
        id,
        side.anchor().opposite().unwrap_or(side.anchor()),
    );

    if tree.widget(id).pass.resolved[axis.index()] {
        if let Some(value) = tree.final_value(AnchorRef::new(id, side.anchor())) {
            system.set_final(position, value);
            system.set_final(opposite, value);
        }
        tree.widget_mut(id).pass.resolved[axis.index()] = false;
        return;
    }

    let references = eligible(tree, &data);
    let has_match = references.iter().any(|r| {
        let w = tree.widget(*r);
        w.behaviour(axis) == DimensionBehaviour::MatchConstraint
            && tree.is_connected(AnchorRef::new(*r, axis.begin()))
            && tree.is_connected(AnchorRef::new(*r, axis.end()))
    });
    let centered_dependents = tree.has_centered_dependents(AnchorRef::new(id, axis.begin()))
        || tree.has_centered_dependents(AnchorRef::new(id, axis.end()));
    let equality = policy::barrier_reference(has_match, centered_dependents);

    for reference in references {
        let anchor = AnchorRef::new(reference, side.anchor());
        let target = var(system, reference, side.anchor());
        let ref_margin = match tree.target_of(anchor) {
            Some(t) if t.widget == id => tree.effective_margin(anchor),
            _ => 0,
        };
        if side.is_lower() {
            system.add_lower_barrier(position, target, data.margin() - ref_margin, has_match);
        } else {
            system.add_greater_barrier(position, target, data.margin() + ref_margin, has_match);
        }
        if ctx.config.relax_gone_in_barriers && tree.widget(reference).is_gone() {
            continue;
        }
        system.add_equality(position, target, data.margin() + ref_margin, equality);
    }

    let parent = ctx.container;
    let parent_begin = var(system, parent, axis.begin());
    let parent_end = var(system, parent, axis.end());
    system.add_equality(opposite, position, 0, Strength::Fixed);
    let (pull, rest) = if side.is_lower() {
        (parent_end, parent_begin)
    } else {
        (parent_begin, parent_end)
    };
    system.add_equality(position, pull, 0, Strength::Highest);
    system.add_equality(position, rest, 0, Strength::None);
}

/// Read back a degenerate line at the barrier position
pub(crate) fn update_from_solver(tree: &mut WidgetTree, system: &mut dyn LinearSystem, id: WidgetId) {
    let Some(side) = tree.widget(id).barrier().map(|d| d.side()) else {
        return;
    };
    let line = var(system, id, side.anchor());
    let position = system.value(line);
    let widget = tree.widget_mut(id);
    widget.x = 0;
    widget.y = 0;
    widget.width = 0;
    widget.height = 0;
    widget.set_position(side.orientation(), position);
}
