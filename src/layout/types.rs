//! Core value types shared by the layout engine

use std::fmt;

use serde::Deserialize;

/// Sentinel used by guidelines and gone margins for "not set"
pub const UNSET: i32 = -1;

/// Sentinel for an anchor's gone margin that was never assigned
pub const UNSET_GONE_MARGIN: i32 = i32::MIN;

/// Stable handle of a widget inside a [`WidgetTree`](super::tree::WidgetTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) usize);

impl WidgetId {
    /// Position of the widget in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub const BOTH: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

    /// Index into per-axis arrays (0 = horizontal, 1 = vertical)
    pub fn index(self) -> usize {
        match self {
            Orientation::Horizontal => 0,
            Orientation::Vertical => 1,
        }
    }

    pub fn other(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Anchor that starts this axis (left or top)
    pub fn begin(self) -> AnchorType {
        match self {
            Orientation::Horizontal => AnchorType::Left,
            Orientation::Vertical => AnchorType::Top,
        }
    }

    /// Anchor that ends this axis (right or bottom)
    pub fn end(self) -> AnchorType {
        match self {
            Orientation::Horizontal => AnchorType::Right,
            Orientation::Vertical => AnchorType::Bottom,
        }
    }
}

/// The typed connection points of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    Left,
    Top,
    Right,
    Bottom,
    Baseline,
    Center,
    CenterX,
    CenterY,
    None,
}

impl AnchorType {
    /// The eight anchors every widget owns, in storage order
    pub const ALL: [AnchorType; 8] = [
        AnchorType::Left,
        AnchorType::Top,
        AnchorType::Right,
        AnchorType::Bottom,
        AnchorType::Baseline,
        AnchorType::Center,
        AnchorType::CenterX,
        AnchorType::CenterY,
    ];

    /// Storage slot of this anchor; `None` has no slot
    pub fn slot(self) -> Option<usize> {
        match self {
            AnchorType::Left => Some(0),
            AnchorType::Top => Some(1),
            AnchorType::Right => Some(2),
            AnchorType::Bottom => Some(3),
            AnchorType::Baseline => Some(4),
            AnchorType::Center => Some(5),
            AnchorType::CenterX => Some(6),
            AnchorType::CenterY => Some(7),
            AnchorType::None => None,
        }
    }

    /// The anchor on the other side of the same axis
    pub fn opposite(self) -> Option<AnchorType> {
        match self {
            AnchorType::Left => Some(AnchorType::Right),
            AnchorType::Right => Some(AnchorType::Left),
            AnchorType::Top => Some(AnchorType::Bottom),
            AnchorType::Bottom => Some(AnchorType::Top),
            _ => None,
        }
    }

    /// Axis this anchor positions, if it positions exactly one
    pub fn orientation(self) -> Option<Orientation> {
        match self {
            AnchorType::Left | AnchorType::Right | AnchorType::CenterX => {
                Some(Orientation::Horizontal)
            }
            AnchorType::Top | AnchorType::Bottom | AnchorType::CenterY | AnchorType::Baseline => {
                Some(Orientation::Vertical)
            }
            AnchorType::Center | AnchorType::None => None,
        }
    }

    /// Whether a connection to `other` constrains the same dimension as this anchor
    pub fn is_similar_dimension(self, other: AnchorType) -> bool {
        if self == other {
            return true;
        }
        match self {
            AnchorType::Center => other != AnchorType::Baseline,
            AnchorType::Left | AnchorType::Right | AnchorType::CenterX => matches!(
                other,
                AnchorType::Left | AnchorType::Right | AnchorType::CenterX
            ),
            AnchorType::Top | AnchorType::Bottom | AnchorType::CenterY | AnchorType::Baseline => {
                matches!(
                    other,
                    AnchorType::Top | AnchorType::Bottom | AnchorType::CenterY | AnchorType::Baseline
                )
            }
            AnchorType::None => false,
        }
    }
}

impl fmt::Display for AnchorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnchorType::Left => "left",
            AnchorType::Top => "top",
            AnchorType::Right => "right",
            AnchorType::Bottom => "bottom",
            AnchorType::Baseline => "baseline",
            AnchorType::Center => "center",
            AnchorType::CenterX => "center_x",
            AnchorType::CenterY => "center_y",
            AnchorType::None => "none",
        };
        f.write_str(name)
    }
}

/// Reference to one anchor of one widget: the non-owning form of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorRef {
    pub widget: WidgetId,
    pub kind: AnchorType,
}

impl AnchorRef {
    pub fn new(widget: WidgetId, kind: AnchorType) -> Self {
        Self { widget, kind }
    }
}

impl fmt::Display for AnchorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.widget, self.kind)
    }
}

/// How a widget's size along one axis is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionBehaviour {
    #[default]
    Fixed,
    WrapContent,
    MatchConstraint,
    MatchParent,
}

/// Sub-policy of a MATCH_CONSTRAINT dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConstraint {
    /// Take all the space between the two targets
    #[default]
    Spread,
    /// Wrap the content, but never grow beyond the targets
    Wrap,
    /// A fraction of the parent's size
    Percent,
    /// Derived from the other axis through the dimension ratio
    Ratio,
    /// Ratio already turned into a literal size for this pass
    RatioResolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    Invisible,
    Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainStyle {
    #[default]
    Spread,
    SpreadInside,
    Packed,
}

/// Final position and size of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Frame {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Frame {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Translate by an offset
    pub fn offset(&self, dx: i32, dy: i32) -> Frame {
        Frame::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={} y={} w={} h={}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Inner spacing of a container or virtual layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Padding {
    pub fn uniform(value: i32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    /// Total padding along an axis
    pub fn along(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.left + self.right,
            Orientation::Vertical => self.top + self.bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites() {
        assert_eq!(AnchorType::Left.opposite(), Some(AnchorType::Right));
        assert_eq!(AnchorType::Bottom.opposite(), Some(AnchorType::Top));
        assert_eq!(AnchorType::Baseline.opposite(), None);
        assert_eq!(AnchorType::CenterX.opposite(), None);
        assert_eq!(AnchorType::None.opposite(), None);
    }

    #[test]
    fn test_slots_are_unique() {
        let mut slots: Vec<usize> = AnchorType::ALL.iter().filter_map(|a| a.slot()).collect();
        slots.sort();
        slots.dedup();
        assert_eq!(slots.len(), 8);
    }

    #[test]
    fn test_similar_dimension() {
        assert!(AnchorType::Left.is_similar_dimension(AnchorType::CenterX));
        assert!(AnchorType::Baseline.is_similar_dimension(AnchorType::Top));
        assert!(!AnchorType::Left.is_similar_dimension(AnchorType::Top));
        assert!(!AnchorType::Center.is_similar_dimension(AnchorType::Baseline));
    }

    #[test]
    fn test_frame_edges() {
        let frame = Frame::new(10, 20, 30, 40);
        assert_eq!(frame.right(), 40);
        assert_eq!(frame.bottom(), 60);
        assert_eq!(frame.offset(5, 5), Frame::new(15, 25, 30, 40));
    }
}
