//! Guidelines: zero-size lines placed relative to the parent

use super::compile::{var, PassContext};
use super::solver::{LinearSystem, Strength};
use super::tree::WidgetTree;
use super::types::{AnchorRef, Orientation, WidgetId, UNSET};

/// Where a guideline sits; the three modes are mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GuidePosition {
    #[default]
    Unset,
    /// Offset from the parent's begin edge
    Begin(i32),
    /// Offset from the parent's end edge
    End(i32),
    /// Fraction of the parent's size
    Percent(f32),
}

#[derive(Debug, Clone)]
pub struct GuidelineData {
    orientation: Orientation,
    position: GuidePosition,
}

impl GuidelineData {
    /// A vertical guideline is a vertical line with an x position
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            position: GuidePosition::Unset,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The axis along which the guideline is positioned
    pub fn axis(&self) -> Orientation {
        self.orientation.other()
    }

    pub fn position(&self) -> GuidePosition {
        self.position
    }

    pub fn set_guide_begin(&mut self, offset: i32) {
        if offset > UNSET {
            self.position = GuidePosition::Begin(offset);
        }
    }

    pub fn set_guide_end(&mut self, offset: i32) {
        if offset > UNSET {
            self.position = GuidePosition::End(offset);
        }
    }

    pub fn set_guide_percent(&mut self, percent: f32) {
        if percent > -1.0 {
            self.position = GuidePosition::Percent(percent);
        }
    }

    pub fn relative_begin(&self) -> i32 {
        match self.position {
            GuidePosition::Begin(offset) => offset,
            _ => UNSET,
        }
    }

    pub fn relative_end(&self) -> i32 {
        match self.position {
            GuidePosition::End(offset) => offset,
            _ => UNSET,
        }
    }

    pub fn relative_percent(&self) -> f32 {
        match self.position {
            GuidePosition::Percent(percent) => percent,
            _ => UNSET as f32,
        }
    }

    /// Position inside a parent content box, if it can be computed.
    /// `content` is `None` while the parent wraps its content.
    pub(crate) fn resolve(&self, content: Option<i32>) -> Option<i32> {
        match self.position {
            GuidePosition::Begin(offset) => Some(offset),
            GuidePosition::End(offset) => content.map(|c| c - offset),
            GuidePosition::Percent(percent) => {
                content.map(|c| (c as f32 * percent + 0.5).floor() as i32)
            }
            GuidePosition::Unset => None,
        }
    }
}

pub(crate) fn add_to_solver(
    tree: &mut WidgetTree,
    system: &mut dyn LinearSystem,
    ctx: &PassContext<'_>,
    id: WidgetId,
) {
    let Some(data) = tree.widget(id).guideline().cloned() else {
        return;
    };
    let axis = data.axis();
    let guide_ref = AnchorRef::new(id, axis.begin());
    let guide = var(system, id, axis.begin());

    if tree.widget(id).pass.resolved[axis.index()] {
        if let Some(value) = tree.final_value(guide_ref) {
            system.set_final(guide, value);
        }
        tree.widget_mut(id).pass.resolved[axis.index()] = false;
        return;
    }

    let parent = ctx.container;
    let parent_begin = var(system, parent, axis.begin());
    let parent_end = var(system, parent, axis.end());
    let parent_wrap = ctx.wrap[axis.index()];

    match data.position() {
        GuidePosition::Begin(offset) => {
            system.add_equality(guide, parent_begin, offset, Strength::Fixed);
            if parent_wrap {
                system.add_greater_than(parent_end, guide, 0, Strength::Equality);
            }
        }
        GuidePosition::End(offset) => {
            system.add_equality(guide, parent_end, -offset, Strength::Fixed);
            if parent_wrap {
                system.add_greater_than(guide, parent_begin, 0, Strength::Equality);
                system.add_greater_than(parent_end, guide, 0, Strength::Equality);
            }
        }
        GuidePosition::Percent(percent) => {
            system.add_percent_of(guide, parent_end, percent, Strength::Fixed);
        }
        GuidePosition::Unset => {}
    }
}

/// Resolve the guideline without the solver. Returns true on success.
pub(crate) fn resolve_direct(tree: &mut WidgetTree, id: WidgetId, content: [Option<i32>; 2]) -> bool {
    let Some(data) = tree.widget(id).guideline().cloned() else {
        return false;
    };
    let axis = data.axis();
    let Some(position) = data.resolve(content[axis.index()]) else {
        return false;
    };
    tree.set_final_value(AnchorRef::new(id, axis.begin()), position);
    tree.set_final_value(AnchorRef::new(id, axis.end()), position);
    let widget = tree.widget_mut(id);
    widget.set_position(axis, position);
    widget.pass.resolved[axis.index()] = true;
    true
}

/// Read back a degenerate line spanning the parent's content box
pub(crate) fn update_from_solver(
    tree: &mut WidgetTree,
    system: &mut dyn LinearSystem,
    id: WidgetId,
    content: [i32; 2],
) {
    let Some(data) = tree.widget(id).guideline().cloned() else {
        return;
    };
    let axis = data.axis();
    let guide = var(system, id, axis.begin());
    let position = system.value(guide);
    let widget = tree.widget_mut(id);
    match axis {
        Orientation::Horizontal => {
            widget.x = position;
            widget.y = 0;
            widget.width = 0;
            widget.height = content[1];
        }
        Orientation::Vertical => {
            widget.x = 0;
            widget.y = position;
            widget.width = content[0];
            widget.height = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_are_exclusive() {
        let mut data = GuidelineData::new(Orientation::Vertical);
        data.set_guide_begin(20);
        data.set_guide_end(30);
        assert_eq!(data.relative_begin(), UNSET);
        assert_eq!(data.relative_end(), 30);
        data.set_guide_percent(0.25);
        assert_eq!(data.relative_end(), UNSET);
        assert_eq!(data.relative_percent(), 0.25);
    }

    #[test]
    fn test_negative_values_are_ignored() {
        let mut data = GuidelineData::new(Orientation::Horizontal);
        data.set_guide_begin(10);
        data.set_guide_end(-1);
        assert_eq!(data.position(), GuidePosition::Begin(10));
    }

    #[test]
    fn test_resolve_positions() {
        let mut data = GuidelineData::new(Orientation::Vertical);
        assert_eq!(data.axis(), Orientation::Horizontal);
        data.set_guide_percent(0.25);
        assert_eq!(data.resolve(Some(400)), Some(100));
        assert_eq!(data.resolve(None), None);
        data.set_guide_end(40);
        assert_eq!(data.resolve(Some(400)), Some(360));
        data.set_guide_begin(15);
        assert_eq!(data.resolve(None), Some(15));
    }
}
