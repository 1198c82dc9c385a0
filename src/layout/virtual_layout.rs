//! Virtual layouts: helpers that position other widgets by rewriting their connections

use super::flow;
use super::placeholder;
use super::tree::WidgetTree;
use super::types::{AnchorRef, DimensionBehaviour, Orientation, WidgetId};
use super::widget::WidgetKind;

/// Widgets whose connections a virtual layout takes over
pub(crate) fn references(tree: &WidgetTree, id: WidgetId) -> Vec<WidgetId> {
    match &tree.widget(id).kind {
        WidgetKind::Flow(data) => data.references().to_vec(),
        WidgetKind::Placeholder(data) => data.content().into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Space a virtual layout may fill along each axis, `None` when unbounded.
/// `content` is the parent's content size, `None` on its wrapping axes.
pub(crate) fn available_space(tree: &WidgetTree, id: WidgetId, content: [Option<i32>; 2]) -> [Option<i32>; 2] {
    let widget = tree.widget(id);
    Orientation::BOTH.map(|o| {
        let i = o.index();
        let space = match widget.behaviour(o) {
            DimensionBehaviour::Fixed => Some(widget.length(o)),
            _ => content[i].map(|c| {
                let margins: i32 = [o.begin(), o.end()]
                    .into_iter()
                    .map(|kind| tree.anchor(AnchorRef::new(id, kind)).map_or(0, |a| a.raw_margin()))
                    .sum();
                (c - margins).max(0)
            }),
        };
        let max = widget.max_dimension[i];
        match space {
            Some(s) if max < i32::MAX => Some(s.min(max)),
            None if max < i32::MAX => Some(max),
            other => other,
        }
    })
}

pub(crate) fn measure(tree: &mut WidgetTree, id: WidgetId, content: [Option<i32>; 2]) {
    if tree.widget(id).is_gone() {
        return;
    }
    match tree.widget(id).kind {
        WidgetKind::Flow(_) => {
            let available = available_space(tree, id, content);
            flow::measure(tree, id, available);
        }
        WidgetKind::Placeholder(_) => placeholder::measure(tree, id),
        _ => {}
    }
}

pub(crate) fn wire(tree: &mut WidgetTree, id: WidgetId) {
    match tree.widget(id).kind {
        WidgetKind::Flow(_) => flow::wire(tree, id),
        WidgetKind::Placeholder(_) => placeholder::wire(tree, id),
        _ => {}
    }
}

/// Virtual layouts among `children`, each one after the virtual layouts it
/// references. Reference cycles keep child order.
pub(crate) fn ordered(tree: &WidgetTree, children: &[WidgetId]) -> Vec<WidgetId> {
    let mut pending: Vec<WidgetId> = children
        .iter()
        .copied()
        .filter(|c| tree.widget(*c).is_virtual_layout())
        .collect();
    let mut order = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let (ready, blocked): (Vec<WidgetId>, Vec<WidgetId>) = pending.iter().copied().partition(|vl| {
            !references(tree, *vl)
                .iter()
                .any(|r| r != vl && pending.contains(r))
        });
        if ready.is_empty() {
            log::warn!("virtual layouts reference each other: {:?}", blocked);
            order.extend(blocked);
            break;
        }
        order.extend(ready);
        pending = blocked;
    }
    order
}
