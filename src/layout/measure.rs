//! Intrinsic measurement of leaf widgets
//!
//! The engine never knows what a widget draws. Before solving, leaf
//! widgets with a content-sized axis ask a [`Measurer`] for their size;
//! after solving, match-constraint widgets whose other axis wraps are
//! measured again at their solved size (text that reflows when narrowed).

use std::collections::HashMap;

use serde::Deserialize;

use super::types::{DimensionBehaviour, MatchConstraint, Orientation, WidgetId};
use super::widget::{Widget, WidgetKind};

/// What the engine knows about a widget when it asks for a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureRequest {
    pub behaviour: [DimensionBehaviour; 2],
    /// Current size; the exact size along `Fixed` axes
    pub size: [i32; 2],
}

impl MeasureRequest {
    pub fn for_widget(widget: &Widget) -> Self {
        Self {
            behaviour: [
                widget.behaviour(Orientation::Horizontal),
                widget.behaviour(Orientation::Vertical),
            ],
            size: [widget.width, widget.height],
        }
    }

    /// Same request with one axis pinned to a solved size
    pub fn pinned(mut self, orientation: Orientation, size: i32) -> Self {
        self.behaviour[orientation.index()] = DimensionBehaviour::Fixed;
        self.size[orientation.index()] = size;
        self
    }

    pub fn is_fixed(&self, orientation: Orientation) -> bool {
        self.behaviour[orientation.index()] == DimensionBehaviour::Fixed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    pub width: i32,
    pub height: i32,
    /// Distance from the top edge to the text baseline
    pub baseline: Option<i32>,
}

/// Supplies intrinsic sizes for content-sized widgets
pub trait Measurer {
    fn measure(&mut self, widget: &Widget, request: &MeasureRequest) -> Measurement;
}

/// Keeps every widget at its current size
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMeasurer;

impl Measurer for NoopMeasurer {
    fn measure(&mut self, widget: &Widget, request: &MeasureRequest) -> Measurement {
        Measurement {
            width: request.size[0],
            height: request.size[1],
            baseline: widget.has_baseline().then(|| widget.baseline_distance()),
        }
    }
}

/// Intrinsic content of a widget
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intrinsic {
    /// A box with a natural size
    Box {
        width: i32,
        height: i32,
        #[serde(default)]
        baseline: Option<i32>,
    },
    /// A single run of text that wraps into lines when narrowed
    Text {
        /// Width of the text on one line
        advance: i32,
        line_height: i32,
        #[serde(default)]
        baseline: Option<i32>,
    },
}

impl Intrinsic {
    fn measure(&self, request: &MeasureRequest) -> Measurement {
        let horizontal = request.is_fixed(Orientation::Horizontal);
        let vertical = request.is_fixed(Orientation::Vertical);
        match *self {
            Intrinsic::Box {
                width,
                height,
                baseline,
            } => Measurement {
                width: if horizontal { request.size[0] } else { width },
                height: if vertical { request.size[1] } else { height },
                baseline,
            },
            Intrinsic::Text {
                advance,
                line_height,
                baseline,
            } => {
                let width = if horizontal { request.size[0] } else { advance };
                let lines = if width > 0 && advance > width {
                    (advance + width - 1) / width
                } else {
                    1
                };
                Measurement {
                    width,
                    height: if vertical {
                        request.size[1]
                    } else {
                        lines * line_height
                    },
                    baseline: Some(baseline.unwrap_or(line_height)),
                }
            }
        }
    }
}

/// Measurer backed by a table of intrinsic sizes
#[derive(Debug, Clone, Default)]
pub struct IntrinsicMeasurer {
    sizes: HashMap<WidgetId, Intrinsic>,
}

impl IntrinsicMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, widget: WidgetId, intrinsic: Intrinsic) {
        self.sizes.insert(widget, intrinsic);
    }

    pub fn with(mut self, widget: WidgetId, intrinsic: Intrinsic) -> Self {
        self.insert(widget, intrinsic);
        self
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl Measurer for IntrinsicMeasurer {
    fn measure(&mut self, widget: &Widget, request: &MeasureRequest) -> Measurement {
        match self.sizes.get(&widget.id()) {
            Some(intrinsic) => intrinsic.measure(request),
            None => NoopMeasurer.measure(widget, request),
        }
    }
}

/// Whether the axis takes its size from the content
pub(crate) fn wraps(widget: &Widget, orientation: Orientation) -> bool {
    match widget.behaviour(orientation) {
        DimensionBehaviour::WrapContent => true,
        DimensionBehaviour::MatchConstraint => {
            widget.match_default(orientation) == MatchConstraint::Wrap
        }
        _ => false,
    }
}

/// Leaf widgets are the only ones handed to the measurer
pub(crate) fn is_measured_leaf(widget: &Widget) -> bool {
    matches!(widget.kind, WidgetKind::Plain)
        && !widget.is_gone()
        && Orientation::BOTH.iter().any(|o| wraps(widget, *o))
}

/// Store a measurement on the content-sized axes of a widget.
/// Returns true if a size changed.
pub(crate) fn apply(widget: &mut Widget, measurement: &Measurement, axes: [bool; 2]) -> bool {
    let before = (widget.width, widget.height);
    if axes[0] {
        widget.set_width(measurement.width);
    }
    if axes[1] {
        widget.set_height(measurement.height);
    }
    if let Some(baseline) = measurement.baseline {
        widget.set_baseline_distance(baseline);
    }
    before != (widget.width, widget.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(h: DimensionBehaviour, v: DimensionBehaviour, size: [i32; 2]) -> MeasureRequest {
        MeasureRequest {
            behaviour: [h, v],
            size,
        }
    }

    #[test]
    fn test_box_keeps_fixed_axes() {
        let intrinsic = Intrinsic::Box {
            width: 80,
            height: 20,
            baseline: None,
        };
        let m = intrinsic.measure(&request(
            DimensionBehaviour::Fixed,
            DimensionBehaviour::WrapContent,
            [50, 0],
        ));
        assert_eq!((m.width, m.height), (50, 20));
    }

    #[test]
    fn test_text_wraps_when_narrowed() {
        let intrinsic = Intrinsic::Text {
            advance: 250,
            line_height: 16,
            baseline: Some(12),
        };
        let wide = intrinsic.measure(&request(
            DimensionBehaviour::WrapContent,
            DimensionBehaviour::WrapContent,
            [0, 0],
        ));
        assert_eq!((wide.width, wide.height), (250, 16));

        let narrow = intrinsic.measure(&request(
            DimensionBehaviour::Fixed,
            DimensionBehaviour::WrapContent,
            [100, 0],
        ));
        assert_eq!((narrow.width, narrow.height), (100, 48));
        assert_eq!(narrow.baseline, Some(12));
    }

    #[test]
    fn test_pinned_request() {
        let r = request(
            DimensionBehaviour::MatchConstraint,
            DimensionBehaviour::WrapContent,
            [0, 0],
        )
        .pinned(Orientation::Horizontal, 120);
        assert!(r.is_fixed(Orientation::Horizontal));
        assert_eq!(r.size, [120, 0]);
    }
}
