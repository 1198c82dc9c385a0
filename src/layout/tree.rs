//! Arena of widgets and the connection graph between their anchors

use std::collections::HashSet;

use super::anchor::{is_valid_connection, Anchor};
use super::barrier::{BarrierData, BarrierSide};
use super::container::ContainerData;
use super::error::LayoutError;
use super::flow::FlowData;
use super::guideline::GuidelineData;
use super::placeholder::PlaceholderData;
use super::types::{AnchorRef, AnchorType, Frame, Orientation, WidgetId};
use super::widget::{Widget, WidgetKind};

/// Owner of every widget of a layout, addressed by [`WidgetId`]
#[derive(Debug, Clone, Default)]
pub struct WidgetTree {
    widgets: Vec<Widget>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.widgets.iter().map(|w| w.id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id.0)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id.0)
    }

    /// Widget by id. Ids are only handed out by this tree.
    pub fn widget(&self, id: WidgetId) -> &Widget {
        &self.widgets[id.0]
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> &mut Widget {
        &mut self.widgets[id.0]
    }

    /// First widget with the given name
    pub fn find(&self, name: &str) -> Option<WidgetId> {
        self.widgets.iter().find(|w| w.name() == name).map(|w| w.id)
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        match self.get(id).and_then(|w| w.container()) {
            Some(data) => &data.children,
            None => &[],
        }
    }

    pub fn anchor(&self, reference: AnchorRef) -> Option<&Anchor> {
        self.get(reference.widget)?.anchor(reference.kind)
    }

    pub(crate) fn anchor_mut(&mut self, reference: AnchorRef) -> Option<&mut Anchor> {
        self.get_mut(reference.widget)?.anchor_mut(reference.kind)
    }

    pub(crate) fn target_of(&self, reference: AnchorRef) -> Option<AnchorRef> {
        self.anchor(reference).and_then(|a| a.target())
    }

    pub(crate) fn is_connected(&self, reference: AnchorRef) -> bool {
        self.target_of(reference).is_some()
    }

    /// Position an anchor was resolved to during the current pass
    pub(crate) fn final_value(&self, reference: AnchorRef) -> Option<i32> {
        self.anchor(reference).and_then(|a| a.final_value())
    }

    pub(crate) fn set_final_value(&mut self, reference: AnchorRef, value: i32) {
        if let Some(anchor) = self.anchor_mut(reference) {
            anchor.set_final_value(value);
        }
    }

    pub(crate) fn reset_final_values(&mut self, widget: WidgetId) {
        if let Some(w) = self.get_mut(widget) {
            for anchor in w.anchors.iter_mut() {
                anchor.reset_final_value();
            }
        }
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    fn push(&mut self, parent: Option<WidgetId>, name: &str, kind: WidgetKind) -> Result<WidgetId, LayoutError> {
        if let Some(parent) = parent {
            match self.get(parent) {
                None => return Err(LayoutError::UnknownWidget { widget: parent }),
                Some(w) if !w.is_container() => return Err(LayoutError::not_a_container(parent)),
                Some(_) => {}
            }
        }
        let id = WidgetId(self.widgets.len());
        let mut widget = Widget::new(id, name, kind);
        widget.parent = parent;
        self.widgets.push(widget);
        if let Some(parent) = parent {
            if let Some(data) = self.widget_mut(parent).container_mut() {
                data.children.push(id);
            }
        }
        Ok(id)
    }

    /// A container without a parent
    pub fn add_root(&mut self, name: &str) -> WidgetId {
        let id = WidgetId(self.widgets.len());
        self.widgets
            .push(Widget::new(id, name, WidgetKind::Container(ContainerData::default())));
        id
    }

    pub fn add_container(&mut self, parent: WidgetId, name: &str) -> Result<WidgetId, LayoutError> {
        self.push(Some(parent), name, WidgetKind::Container(ContainerData::default()))
    }

    pub fn add_widget(&mut self, parent: WidgetId, name: &str) -> Result<WidgetId, LayoutError> {
        self.push(Some(parent), name, WidgetKind::Plain)
    }

    /// A guideline line with the given orientation (a vertical line has an x position)
    pub fn add_guideline(
        &mut self,
        parent: WidgetId,
        name: &str,
        orientation: Orientation,
    ) -> Result<WidgetId, LayoutError> {
        self.push(
            Some(parent),
            name,
            WidgetKind::Guideline(GuidelineData::new(orientation)),
        )
    }

    pub fn add_barrier(
        &mut self,
        parent: WidgetId,
        name: &str,
        side: BarrierSide,
    ) -> Result<WidgetId, LayoutError> {
        self.push(Some(parent), name, WidgetKind::Barrier(BarrierData::new(side)))
    }

    pub fn add_flow(
        &mut self,
        parent: WidgetId,
        name: &str,
        orientation: Orientation,
    ) -> Result<WidgetId, LayoutError> {
        self.push(Some(parent), name, WidgetKind::Flow(FlowData::new(orientation)))
    }

    pub fn add_placeholder(&mut self, parent: WidgetId, name: &str) -> Result<WidgetId, LayoutError> {
        self.push(
            Some(parent),
            name,
            WidgetKind::Placeholder(PlaceholderData::default()),
        )
    }

    // ------------------------------------------------------------------
    // Anchor level connections
    // ------------------------------------------------------------------

    /// Guidelines expose a single anchor per axis
    pub(crate) fn canonical(&self, reference: AnchorRef) -> AnchorRef {
        let Some(data) = self.get(reference.widget).and_then(|w| w.guideline()) else {
            return reference;
        };
        let kind = match (data.orientation(), reference.kind) {
            (Orientation::Vertical, AnchorType::Right | AnchorType::CenterX) => AnchorType::Left,
            (Orientation::Horizontal, AnchorType::Bottom | AnchorType::CenterY) => AnchorType::Top,
            (_, kind) => kind,
        };
        AnchorRef::new(reference.widget, kind)
    }

    /// Connect one anchor to another. A `None` target resets the anchor.
    ///
    /// Returns false, leaving the tree untouched, when the anchor types are
    /// incompatible and `force` is not set.
    pub fn connect_anchor(
        &mut self,
        from: AnchorRef,
        to: Option<AnchorRef>,
        margin: i32,
        gone_margin: Option<i32>,
        force: bool,
    ) -> bool {
        let Some(to) = to else {
            self.clear_anchor(from);
            return true;
        };
        let (Some(source), Some(target)) = (self.get(from.widget), self.get(to.widget)) else {
            return false;
        };
        if from.kind.slot().is_none() || to.kind.slot().is_none() {
            return false;
        }
        if !force && !is_valid_connection(from.kind, source.traits(), to.kind, target.traits()) {
            return false;
        }
        let to = self.canonical(to);
        self.detach(from);
        if let Some(anchor) = self.anchor_mut(from) {
            anchor.target = Some(to);
            anchor.margin = margin;
            if let Some(gone) = gone_margin {
                anchor.gone_margin = gone;
            }
        }
        if let Some(target) = self.anchor_mut(to) {
            target.dependents.insert(from);
        }
        true
    }

    /// Remove `from` from its current target's dependents
    fn detach(&mut self, from: AnchorRef) {
        if let Some(previous) = self.target_of(from) {
            if let Some(target) = self.anchor_mut(previous) {
                target.dependents.remove(&from);
            }
        }
    }

    /// Clear target and margins of one anchor
    pub(crate) fn clear_anchor(&mut self, reference: AnchorRef) {
        self.detach(reference);
        if let Some(anchor) = self.anchor_mut(reference) {
            anchor.clear_target();
        }
    }

    pub fn set_gone_margin(&mut self, reference: AnchorRef, gone_margin: i32) {
        if let Some(anchor) = self.anchor_mut(reference) {
            anchor.gone_margin = gone_margin;
        }
    }

    pub fn set_margin(&mut self, reference: AnchorRef, margin: i32) {
        if let Some(anchor) = self.anchor_mut(reference) {
            anchor.margin = margin;
        }
    }

    /// Margin in effect for this pass, accounting for gone widgets
    pub fn effective_margin(&self, reference: AnchorRef) -> i32 {
        let Some(anchor) = self.anchor(reference) else {
            return 0;
        };
        if self.widget(reference.widget).is_gone() {
            return 0;
        }
        if let (Some(gone_margin), Some(target)) = (anchor.gone_margin(), anchor.target()) {
            if self.widget(target.widget).is_gone() {
                return gone_margin;
            }
        }
        anchor.raw_margin()
    }

    // ------------------------------------------------------------------
    // Widget level connections
    // ------------------------------------------------------------------

    /// Connect `widget.from` to `target.to` with the pairing rules of
    /// center anchors. Returns false if nothing could be connected.
    pub fn connect(
        &mut self,
        widget: WidgetId,
        from: AnchorType,
        target: WidgetId,
        to: AnchorType,
        margin: i32,
    ) -> bool {
        use AnchorType::{Baseline, Bottom, Center, CenterX, CenterY, Left, Right, Top};
        let me = |kind| AnchorRef::new(widget, kind);
        let them = |kind| AnchorRef::new(target, kind);
        match (from, to) {
            (Center, Center) => {
                let mut center_x = false;
                let mut center_y = false;
                if !self.is_connected(me(Left)) && !self.is_connected(me(Right)) {
                    self.connect(widget, Left, target, Left, 0);
                    self.connect(widget, Right, target, Right, 0);
                    center_x = true;
                }
                if !self.is_connected(me(Top)) && !self.is_connected(me(Bottom)) {
                    self.connect(widget, Top, target, Top, 0);
                    self.connect(widget, Bottom, target, Bottom, 0);
                    center_y = true;
                }
                match (center_x, center_y) {
                    (true, true) => self.connect_anchor(me(Center), Some(them(Center)), 0, None, false),
                    (true, false) => self.connect_anchor(me(CenterX), Some(them(CenterX)), 0, None, false),
                    (false, true) => self.connect_anchor(me(CenterY), Some(them(CenterY)), 0, None, false),
                    (false, false) => false,
                }
            }
            (Center, Left | Right) => {
                let a = self.connect(widget, Left, target, to, 0);
                let b = self.connect(widget, Right, target, to, 0);
                a && b
            }
            (Center, Top | Bottom) => {
                let a = self.connect(widget, Top, target, to, 0);
                let b = self.connect(widget, Bottom, target, to, 0);
                a && b
            }
            (CenterX, Left | Right) => {
                let a = self.connect_anchor(me(Left), Some(them(to)), 0, None, false);
                let b = self.connect_anchor(me(Right), Some(them(to)), 0, None, false);
                a && b
            }
            (CenterY, Top | Bottom) => {
                let a = self.connect_anchor(me(Top), Some(them(to)), 0, None, false);
                let b = self.connect_anchor(me(Bottom), Some(them(to)), 0, None, false);
                a && b
            }
            (CenterX, CenterX) => {
                let a = self.connect_anchor(me(Left), Some(them(Left)), 0, None, false);
                let b = self.connect_anchor(me(Right), Some(them(Right)), 0, None, false);
                self.connect_anchor(me(CenterX), Some(them(CenterX)), 0, None, false);
                a && b
            }
            (CenterY, CenterY) => {
                let a = self.connect_anchor(me(Top), Some(them(Top)), 0, None, false);
                let b = self.connect_anchor(me(Bottom), Some(them(Bottom)), 0, None, false);
                self.connect_anchor(me(CenterY), Some(them(CenterY)), 0, None, false);
                a && b
            }
            _ => {
                let (Some(source), Some(dest)) = (self.get(widget), self.get(target)) else {
                    return false;
                };
                if !is_valid_connection(from, source.traits(), to, dest.traits()) {
                    return false;
                }
                let to_ref = self.canonical(them(to));
                match from {
                    Baseline => {
                        self.clear_anchor(me(Top));
                        self.clear_anchor(me(Bottom));
                    }
                    Top | Bottom | Left | Right => {
                        let center_axis = if matches!(from, Top | Bottom) {
                            self.clear_anchor(me(Baseline));
                            CenterY
                        } else {
                            CenterX
                        };
                        if self.target_of(me(Center)) != Some(to_ref) {
                            self.clear_anchor(me(Center));
                        }
                        if self.is_connected(me(center_axis)) {
                            if let Some(opposite) = from.opposite() {
                                self.clear_anchor(me(opposite));
                            }
                            self.clear_anchor(me(center_axis));
                        }
                    }
                    _ => {}
                }
                self.connect_anchor(me(from), Some(them(to)), margin, None, false)
            }
        }
    }

    /// Checked variant of [`connect`](Self::connect) that also refuses
    /// cycles and targets outside the parent/sibling set.
    pub fn try_connect(
        &mut self,
        widget: WidgetId,
        from: AnchorType,
        target: WidgetId,
        to: AnchorType,
        margin: i32,
    ) -> Result<(), LayoutError> {
        let from_ref = AnchorRef::new(widget, from);
        let to_ref = AnchorRef::new(target, to);
        if self.get(widget).is_none() {
            return Err(LayoutError::UnknownWidget { widget });
        }
        if self.get(target).is_none() {
            return Err(LayoutError::UnknownWidget { widget: target });
        }
        self.is_connection_allowed(from_ref, target)?;
        if self.connect(widget, from, target, to, margin) {
            Ok(())
        } else {
            Err(LayoutError::invalid_connection(from_ref, to_ref))
        }
    }

    /// Reject targets that would loop back to the owner of `from`, or that
    /// are neither its parent nor a sibling.
    ///
    /// A target anchor that already points back at `from` does not count as
    /// a loop: that reciprocal pair is how a chain link is declared. Only
    /// longer paths that return to the owner of `from` are refused.
    pub fn is_connection_allowed(&self, from: AnchorRef, target: WidgetId) -> Result<(), LayoutError> {
        let to = AnchorRef::new(target, from.kind);
        let mut checked = HashSet::new();
        if self.leads_back_to(from, target, &mut checked) {
            return Err(LayoutError::circular(from, to));
        }
        let parent = self.widget(from.widget).parent();
        if parent == Some(target) || self.widget(target).parent() == parent {
            Ok(())
        } else {
            Err(LayoutError::foreign_target(from, to))
        }
    }

    fn leads_back_to(&self, from: AnchorRef, widget: WidgetId, checked: &mut HashSet<WidgetId>) -> bool {
        if !checked.insert(widget) {
            return false;
        }
        if widget == from.widget {
            return true;
        }
        self.widget(widget).anchors.iter().any(|anchor| {
            match anchor.target() {
                // a reciprocal link is how chains are built, not a cycle
                Some(target) if target == from => false,
                Some(target) if anchor.kind().is_similar_dimension(from.kind) => {
                    self.leads_back_to(from, target.widget, checked)
                }
                _ => false,
            }
        })
    }

    /// Position `widget`'s center on a circle around `target`'s center.
    /// An angle of 0 degrees is straight up, 90 degrees is to the right.
    pub fn connect_circular(&mut self, widget: WidgetId, target: WidgetId, angle: f32, radius: i32) -> bool {
        let connected = self.connect_anchor(
            AnchorRef::new(widget, AnchorType::Center),
            Some(AnchorRef::new(target, AnchorType::Center)),
            radius,
            None,
            true,
        );
        if connected {
            self.widget_mut(widget).circle_angle = angle;
        }
        connected
    }

    /// Reset one anchor, also undoing the pairings a center connection created
    pub fn reset_anchor(&mut self, widget: WidgetId, kind: AnchorType) {
        use AnchorType::{Bottom, Center, CenterX, CenterY, Left, Right, Top};
        let me = |kind| AnchorRef::new(widget, kind);
        let same_target = |tree: &Self, a, b| {
            let ta = tree.target_of(me(a));
            ta.is_some() && ta == tree.target_of(me(b))
        };
        let same_owner = |tree: &Self, a, b| {
            match (tree.target_of(me(a)), tree.target_of(me(b))) {
                (Some(ta), Some(tb)) => ta.widget == tb.widget,
                _ => false,
            }
        };
        match kind {
            Center => {
                if same_owner(self, Left, Right) {
                    self.clear_anchor(me(Left));
                    self.clear_anchor(me(Right));
                }
                if same_owner(self, Top, Bottom) {
                    self.clear_anchor(me(Top));
                    self.clear_anchor(me(Bottom));
                }
                let w = self.widget_mut(widget);
                w.bias = [0.5; 2];
            }
            CenterX => {
                if same_owner(self, Left, Right) {
                    self.clear_anchor(me(Left));
                    self.clear_anchor(me(Right));
                }
                self.widget_mut(widget).bias[0] = 0.5;
            }
            CenterY => {
                if same_owner(self, Top, Bottom) {
                    self.clear_anchor(me(Top));
                    self.clear_anchor(me(Bottom));
                }
                self.widget_mut(widget).bias[1] = 0.5;
            }
            Left | Right => {
                if same_target(self, Left, Right) {
                    self.clear_anchor(me(Center));
                }
            }
            Top | Bottom => {
                if same_target(self, Top, Bottom) {
                    self.clear_anchor(me(Center));
                }
            }
            _ => {}
        }
        self.clear_anchor(me(kind));
    }

    /// Drop every outgoing connection of a widget and restore its biases
    pub fn reset_all_constraints(&mut self, widget: WidgetId) {
        for kind in AnchorType::ALL {
            self.clear_anchor(AnchorRef::new(widget, kind));
        }
        self.widget_mut(widget).bias = [0.5; 2];
    }

    // ------------------------------------------------------------------
    // Graph queries
    // ------------------------------------------------------------------

    /// Whether any anchor of the widget is targeted by another one
    pub fn has_dependents(&self, widget: WidgetId) -> bool {
        self.widget(widget).anchors.iter().any(|a| a.has_dependents())
    }

    /// A dependent of this anchor is centered between two targets
    pub(crate) fn has_centered_dependents(&self, reference: AnchorRef) -> bool {
        let Some(anchor) = self.anchor(reference) else {
            return false;
        };
        anchor.dependents().any(|dependent| {
            dependent
                .kind
                .opposite()
                .is_some_and(|opposite| self.is_connected(AnchorRef::new(dependent.widget, opposite)))
        })
    }

    /// The begin side reaches out and the end side is linked both ways
    pub fn is_chain_head(&self, widget: WidgetId, orientation: Orientation) -> bool {
        let begin = AnchorRef::new(widget, orientation.begin());
        let end = AnchorRef::new(widget, orientation.end());
        let begin_ok = self
            .target_of(begin)
            .is_some_and(|t| self.target_of(t) != Some(begin));
        let end_ok = self
            .target_of(end)
            .is_some_and(|t| self.target_of(t) == Some(end));
        begin_ok && end_ok
    }

    pub fn is_in_chain(&self, widget: WidgetId, orientation: Orientation) -> bool {
        [orientation.begin(), orientation.end()].into_iter().any(|kind| {
            let anchor = AnchorRef::new(widget, kind);
            self.target_of(anchor)
                .is_some_and(|t| self.target_of(t) == Some(anchor))
        })
    }

    /// Next widget of a chain along `orientation`, if linked both ways
    pub(crate) fn chain_successor(&self, widget: WidgetId, orientation: Orientation) -> Option<WidgetId> {
        let end = AnchorRef::new(widget, orientation.end());
        let next = self.target_of(end)?.widget;
        let back = self.target_of(AnchorRef::new(next, orientation.begin()))?;
        (back.widget == widget).then_some(next)
    }

    /// Frame of a widget in root coordinates
    pub fn absolute_frame(&self, widget: WidgetId) -> Frame {
        let own = self.widget(widget).frame();
        let mut dx = 0;
        let mut dy = 0;
        let mut current = self.widget(widget).parent();
        while let Some(parent) = current {
            let p = self.widget(parent);
            let padding = p.container().map(|c| c.padding).unwrap_or_default();
            dx += p.x() + padding.left;
            dy += p.y() + padding.top;
            current = p.parent();
        }
        own.offset(dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_siblings() -> (WidgetTree, WidgetId, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        let a = tree.add_widget(root, "a").unwrap();
        let b = tree.add_widget(root, "b").unwrap();
        (tree, root, a, b)
    }

    #[test]
    fn test_connect_registers_dependent() {
        let (mut tree, _, a, b) = two_siblings();
        assert!(tree.connect(a, AnchorType::Left, b, AnchorType::Right, 8));
        let target = AnchorRef::new(b, AnchorType::Right);
        let source = AnchorRef::new(a, AnchorType::Left);
        let deps: Vec<_> = tree.anchor(target).unwrap().dependents().copied().collect();
        assert_eq!(deps, vec![source]);
        assert_eq!(tree.effective_margin(source), 8);
    }

    #[test]
    fn test_reset_restores_anchor() {
        let (mut tree, _, a, b) = two_siblings();
        let source = AnchorRef::new(a, AnchorType::Left);
        tree.connect_anchor(source, Some(AnchorRef::new(b, AnchorType::Left)), 5, Some(2), false);
        tree.reset_anchor(a, AnchorType::Left);
        let anchor = tree.anchor(source).unwrap();
        assert_eq!(anchor.target(), None);
        assert_eq!(anchor.raw_margin(), 0);
        assert_eq!(anchor.gone_margin(), None);
        assert!(!tree.anchor(AnchorRef::new(b, AnchorType::Left)).unwrap().has_dependents());
    }

    #[test]
    fn test_invalid_connection_leaves_state() {
        let (mut tree, _, a, b) = two_siblings();
        assert!(!tree.connect(a, AnchorType::Left, b, AnchorType::Top, 0));
        assert!(!tree.is_connected(AnchorRef::new(a, AnchorType::Left)));
        assert!(!tree.has_dependents(b));
    }

    #[test]
    fn test_reconnect_moves_dependent() {
        let (mut tree, root, a, b) = two_siblings();
        tree.connect(a, AnchorType::Left, b, AnchorType::Right, 0);
        tree.connect(a, AnchorType::Left, root, AnchorType::Left, 0);
        assert!(!tree.has_dependents(b));
        assert!(tree.has_dependents(root));
    }

    #[test]
    fn test_gone_margin_applies_when_target_gone() {
        let (mut tree, _, a, b) = two_siblings();
        let source = AnchorRef::new(a, AnchorType::Left);
        tree.connect_anchor(source, Some(AnchorRef::new(b, AnchorType::Right)), 10, Some(3), false);
        assert_eq!(tree.effective_margin(source), 10);
        tree.widget_mut(b).set_visibility(crate::layout::Visibility::Gone);
        assert_eq!(tree.effective_margin(source), 3);
        tree.widget_mut(a).set_visibility(crate::layout::Visibility::Gone);
        assert_eq!(tree.effective_margin(source), 0);
    }

    #[test]
    fn test_center_connects_both_sides() {
        let (mut tree, root, a, _) = two_siblings();
        assert!(tree.connect(a, AnchorType::Center, root, AnchorType::Center, 0));
        for kind in [AnchorType::Left, AnchorType::Right, AnchorType::Top, AnchorType::Bottom] {
            assert_eq!(
                tree.target_of(AnchorRef::new(a, kind)),
                Some(AnchorRef::new(root, kind))
            );
        }
        tree.reset_anchor(a, AnchorType::Center);
        assert!(!tree.is_connected(AnchorRef::new(a, AnchorType::Left)));
        assert!(!tree.is_connected(AnchorRef::new(a, AnchorType::Top)));
    }

    #[test]
    fn test_center_axis_pairs_without_gone_margin() {
        let (mut tree, _, a, b) = two_siblings();
        assert!(tree.connect(a, AnchorType::CenterX, b, AnchorType::CenterX, 0));
        for kind in [AnchorType::Left, AnchorType::Right] {
            let anchor = tree.anchor(AnchorRef::new(a, kind)).unwrap();
            assert_eq!(anchor.target(), Some(AnchorRef::new(b, kind)));
            assert_eq!(anchor.gone_margin(), None);
        }
        assert!(tree.connect(a, AnchorType::CenterY, b, AnchorType::Top, 0));
        assert_eq!(
            tree.target_of(AnchorRef::new(a, AnchorType::Bottom)),
            Some(AnchorRef::new(b, AnchorType::Top))
        );
        tree.reset_anchor(a, AnchorType::CenterX);
        assert!(!tree.is_connected(AnchorRef::new(a, AnchorType::Left)));
        assert!(tree.is_connected(AnchorRef::new(a, AnchorType::Top)));
    }

    #[test]
    fn test_baseline_replaces_vertical_sides() {
        let (mut tree, _, a, b) = two_siblings();
        tree.widget_mut(a).set_baseline_distance(12);
        tree.widget_mut(b).set_baseline_distance(12);
        tree.connect(a, AnchorType::Top, b, AnchorType::Top, 0);
        assert!(tree.connect(a, AnchorType::Baseline, b, AnchorType::Baseline, 0));
        assert!(!tree.is_connected(AnchorRef::new(a, AnchorType::Top)));
        tree.connect(a, AnchorType::Top, b, AnchorType::Bottom, 0);
        assert!(!tree.is_connected(AnchorRef::new(a, AnchorType::Baseline)));
    }

    #[test]
    fn test_chain_detection() {
        let (mut tree, root, a, b) = two_siblings();
        tree.connect(a, AnchorType::Left, root, AnchorType::Left, 0);
        tree.connect(a, AnchorType::Right, b, AnchorType::Left, 0);
        tree.connect(b, AnchorType::Left, a, AnchorType::Right, 0);
        tree.connect(b, AnchorType::Right, root, AnchorType::Right, 0);
        assert!(tree.is_chain_head(a, Orientation::Horizontal));
        assert!(!tree.is_chain_head(b, Orientation::Horizontal));
        assert!(tree.is_in_chain(b, Orientation::Horizontal));
        assert!(!tree.is_in_chain(a, Orientation::Vertical));
        assert_eq!(tree.chain_successor(a, Orientation::Horizontal), Some(b));
    }

    #[test]
    fn test_try_connect_rejects_cycles_and_strangers() {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        let a = tree.add_widget(root, "a").unwrap();
        let b = tree.add_widget(root, "b").unwrap();
        let inner = tree.add_container(root, "inner").unwrap();
        let c = tree.add_widget(inner, "c").unwrap();

        tree.try_connect(a, AnchorType::Left, b, AnchorType::Right, 0).unwrap();
        let err = tree
            .try_connect(b, AnchorType::Left, a, AnchorType::Right, 0)
            .unwrap_err();
        assert!(matches!(err, LayoutError::CircularConnection { .. }));

        let err = tree
            .try_connect(c, AnchorType::Left, a, AnchorType::Left, 0)
            .unwrap_err();
        assert!(matches!(err, LayoutError::ForeignTarget { .. }));

        // reciprocal links form chains and stay allowed
        tree.try_connect(b, AnchorType::Right, a, AnchorType::Left, 0).unwrap();
        assert!(tree.try_connect(c, AnchorType::Left, inner, AnchorType::Left, 0).is_ok());
    }

    #[test]
    fn test_adding_to_leaf_fails() {
        let (mut tree, _, a, _) = two_siblings();
        assert!(matches!(
            tree.add_widget(a, "child"),
            Err(LayoutError::NotAContainer { .. })
        ));
    }
}
