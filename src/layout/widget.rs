//! The widget: a rectangle with eight anchors and per-axis sizing rules

use super::anchor::{Anchor, OwnerTraits};
use super::barrier::BarrierData;
use super::container::ContainerData;
use super::flow::FlowData;
use super::guideline::GuidelineData;
use super::placeholder::PlaceholderData;
use super::types::{
    AnchorType, ChainStyle, DimensionBehaviour, Frame, MatchConstraint, Orientation, Visibility,
    WidgetId,
};

/// Variant-specific data of a widget
#[derive(Debug, Clone)]
pub enum WidgetKind {
    Plain,
    Container(ContainerData),
    Guideline(GuidelineData),
    Barrier(BarrierData),
    Flow(FlowData),
    Placeholder(PlaceholderData),
}

impl WidgetKind {
    pub fn label(&self) -> &'static str {
        match self {
            WidgetKind::Plain => "widget",
            WidgetKind::Container(_) => "container",
            WidgetKind::Guideline(_) => "guideline",
            WidgetKind::Barrier(_) => "barrier",
            WidgetKind::Flow(_) => "flow",
            WidgetKind::Placeholder(_) => "placeholder",
        }
    }
}

/// Scratch state recomputed on every layout pass
#[derive(Debug, Clone)]
pub(crate) struct PassState {
    /// Referenced by a barrier on this axis
    pub in_barrier: [bool; 2],
    /// Final values are known; pin instead of compiling heuristics
    pub resolved: [bool; 2],
    /// Resolved from the parent (match parent); skip axis constraints
    pub direct: [bool; 2],
    pub resolved_match_default: [MatchConstraint; 2],
    pub resolved_ratio: f32,
    pub resolved_ratio_side: Option<Orientation>,
    pub has_ratio: bool,
    pub chain_next: [Option<WidgetId>; 2],
    pub next_match: [Option<WidgetId>; 2],
    /// Size forced by the previous read-back
    pub size_override: [Option<i32>; 2],
}

impl Default for PassState {
    fn default() -> Self {
        Self {
            in_barrier: [false; 2],
            resolved: [false; 2],
            direct: [false; 2],
            resolved_match_default: [MatchConstraint::Spread; 2],
            resolved_ratio: 0.0,
            resolved_ratio_side: None,
            has_ratio: false,
            chain_next: [None; 2],
            next_match: [None; 2],
            size_override: [None; 2],
        }
    }
}

/// A rectangle taking part in a layout
#[derive(Debug, Clone)]
pub struct Widget {
    pub(crate) id: WidgetId,
    name: String,
    pub(crate) kind: WidgetKind,
    pub(crate) anchors: [Anchor; 8],
    pub(crate) parent: Option<WidgetId>,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) min_width: i32,
    pub(crate) min_height: i32,
    pub(crate) max_dimension: [i32; 2],
    pub(crate) behaviour: [DimensionBehaviour; 2],
    pub(crate) match_default: [MatchConstraint; 2],
    pub(crate) match_min: [i32; 2],
    pub(crate) match_max: [i32; 2],
    pub(crate) match_percent: [f32; 2],
    pub(crate) dimension_ratio: f32,
    pub(crate) ratio_side: Option<Orientation>,
    pub(crate) visibility: Visibility,
    pub(crate) bias: [f32; 2],
    pub(crate) chain_style: [ChainStyle; 2],
    pub(crate) weight: [f32; 2],
    pub(crate) baseline_distance: i32,
    pub(crate) has_baseline: bool,
    pub(crate) circle_angle: f32,
    pub(crate) animated: bool,
    pub(crate) pass: PassState,
}

impl Widget {
    pub(crate) fn new(id: WidgetId, name: impl Into<String>, kind: WidgetKind) -> Self {
        let anchors = AnchorType::ALL.map(|kind| Anchor::new(id, kind));
        Self {
            id,
            name: name.into(),
            kind,
            anchors,
            parent: None,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            min_width: 0,
            min_height: 0,
            max_dimension: [i32::MAX; 2],
            behaviour: [DimensionBehaviour::Fixed; 2],
            match_default: [MatchConstraint::Spread; 2],
            match_min: [0; 2],
            match_max: [0; 2],
            match_percent: [1.0; 2],
            dimension_ratio: 0.0,
            ratio_side: None,
            visibility: Visibility::Visible,
            bias: [0.5; 2],
            chain_style: [ChainStyle::Spread; 2],
            weight: [-1.0; 2],
            baseline_distance: 0,
            has_baseline: false,
            circle_angle: 0.0,
            animated: false,
            pass: PassState::default(),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn anchor(&self, kind: AnchorType) -> Option<&Anchor> {
        kind.slot().map(|slot| &self.anchors[slot])
    }

    pub(crate) fn anchor_mut(&mut self, kind: AnchorType) -> Option<&mut Anchor> {
        kind.slot().map(move |slot| &mut self.anchors[slot])
    }

    pub(crate) fn traits(&self) -> OwnerTraits {
        OwnerTraits {
            has_baseline: self.has_baseline,
            is_guideline: self.is_guideline(),
        }
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Width, forced to 0 while the widget is gone
    pub fn width(&self) -> i32 {
        if self.is_gone() {
            0
        } else {
            self.width
        }
    }

    /// Height, forced to 0 while the widget is gone
    pub fn height(&self) -> i32 {
        if self.is_gone() {
            0
        } else {
            self.height
        }
    }

    pub fn length(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.width(),
            Orientation::Vertical => self.height(),
        }
    }

    pub(crate) fn position(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }

    /// Frame relative to the parent's padding box
    pub fn frame(&self) -> Frame {
        Frame::new(self.x, self.y, self.width(), self.height())
    }

    pub fn set_origin(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn set_width(&mut self, width: i32) {
        self.width = width.max(self.min_width);
    }

    pub fn set_height(&mut self, height: i32) {
        self.height = height.max(self.min_height);
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.set_width(width);
        self.set_height(height);
    }

    pub(crate) fn set_length(&mut self, orientation: Orientation, length: i32) {
        match orientation {
            Orientation::Horizontal => self.set_width(length),
            Orientation::Vertical => self.set_height(length),
        }
    }

    pub(crate) fn set_position(&mut self, orientation: Orientation, position: i32) {
        match orientation {
            Orientation::Horizontal => self.x = position,
            Orientation::Vertical => self.y = position,
        }
    }

    pub fn min_width(&self) -> i32 {
        self.min_width
    }

    pub fn min_height(&self) -> i32 {
        self.min_height
    }

    pub(crate) fn min_length(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.min_width,
            Orientation::Vertical => self.min_height,
        }
    }

    pub fn set_min_width(&mut self, width: i32) {
        self.min_width = width.max(0);
    }

    pub fn set_min_height(&mut self, height: i32) {
        self.min_height = height.max(0);
    }

    pub fn set_max_dimension(&mut self, orientation: Orientation, max: i32) {
        self.max_dimension[orientation.index()] = max;
    }

    /// Distance from the top edge to the text baseline
    pub fn baseline_distance(&self) -> i32 {
        self.baseline_distance
    }

    pub fn set_baseline_distance(&mut self, distance: i32) {
        self.baseline_distance = distance;
        self.has_baseline = distance > 0;
    }

    pub fn has_baseline(&self) -> bool {
        self.has_baseline
    }

    // ------------------------------------------------------------------
    // Sizing policies
    // ------------------------------------------------------------------

    pub fn behaviour(&self, orientation: Orientation) -> DimensionBehaviour {
        self.behaviour[orientation.index()]
    }

    pub fn set_behaviour(&mut self, orientation: Orientation, behaviour: DimensionBehaviour) {
        self.behaviour[orientation.index()] = behaviour;
    }

    pub fn match_default(&self, orientation: Orientation) -> MatchConstraint {
        self.match_default[orientation.index()]
    }

    /// Configure a MATCH_CONSTRAINT axis: sub-policy, min, max and percent.
    ///
    /// A percent of 1.0 with the percent policy means "as wide as the parent".
    pub fn set_match_constraint(
        &mut self,
        orientation: Orientation,
        policy: MatchConstraint,
        min: i32,
        max: i32,
        percent: f32,
    ) {
        let i = orientation.index();
        self.match_default[i] = policy;
        self.match_min[i] = min.max(0);
        self.match_max[i] = max.max(0);
        self.match_percent[i] = percent;
        if percent > 0.0 && percent < 1.0 && policy == MatchConstraint::Spread {
            self.match_default[i] = MatchConstraint::Percent;
        }
    }

    pub fn dimension_ratio(&self) -> f32 {
        self.dimension_ratio
    }

    pub fn ratio_side(&self) -> Option<Orientation> {
        self.ratio_side
    }

    /// Set the ratio width / height; `side` names the axis derived from it
    pub fn set_dimension_ratio(&mut self, ratio: f32, side: Option<Orientation>) {
        self.dimension_ratio = ratio;
        self.ratio_side = side;
    }

    /// Set the ratio from its textual form, `"16:9"`, `"W,16:9"`, `"H,2:1"` or `"1.5"`.
    ///
    /// Returns false and leaves the widget unchanged when the text does not
    /// describe a positive ratio.
    pub fn set_dimension_ratio_str(&mut self, text: &str) -> bool {
        match parse_dimension_ratio(text) {
            Some((ratio, side)) => {
                self.set_dimension_ratio(ratio, side);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Visibility, chains, bias
    // ------------------------------------------------------------------

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn is_gone(&self) -> bool {
        self.visibility == Visibility::Gone
    }

    pub fn bias(&self, orientation: Orientation) -> f32 {
        self.bias[orientation.index()]
    }

    pub fn set_bias(&mut self, orientation: Orientation, bias: f32) {
        self.bias[orientation.index()] = bias;
    }

    pub fn chain_style(&self, orientation: Orientation) -> ChainStyle {
        self.chain_style[orientation.index()]
    }

    /// Only meaningful on a chain's head
    pub fn set_chain_style(&mut self, orientation: Orientation, style: ChainStyle) {
        self.chain_style[orientation.index()] = style;
    }

    pub fn weight(&self, orientation: Orientation) -> f32 {
        self.weight[orientation.index()]
    }

    pub fn set_weight(&mut self, orientation: Orientation, weight: f32) {
        self.weight[orientation.index()] = weight;
    }

    pub fn set_animated(&mut self, animated: bool) {
        self.animated = animated;
    }

    pub fn circle_angle(&self) -> f32 {
        self.circle_angle
    }

    // ------------------------------------------------------------------
    // Variant queries
    // ------------------------------------------------------------------

    pub fn is_guideline(&self) -> bool {
        matches!(self.kind, WidgetKind::Guideline(_))
    }

    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, WidgetKind::Barrier(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, WidgetKind::Container(_))
    }

    pub fn is_virtual_layout(&self) -> bool {
        matches!(self.kind, WidgetKind::Flow(_) | WidgetKind::Placeholder(_))
    }

    /// Whether a barrier may aggregate this widget's edge
    pub fn allowed_in_barrier(&self) -> bool {
        match self.kind {
            WidgetKind::Guideline(_) => true,
            _ => !self.is_gone(),
        }
    }

    /// Helpers compiled before regular widgets
    pub(crate) fn add_first(&self) -> bool {
        self.is_guideline() || self.is_virtual_layout()
    }

    pub fn guideline(&self) -> Option<&GuidelineData> {
        match &self.kind {
            WidgetKind::Guideline(data) => Some(data),
            _ => None,
        }
    }

    pub fn guideline_mut(&mut self) -> Option<&mut GuidelineData> {
        match &mut self.kind {
            WidgetKind::Guideline(data) => Some(data),
            _ => None,
        }
    }

    pub fn barrier(&self) -> Option<&BarrierData> {
        match &self.kind {
            WidgetKind::Barrier(data) => Some(data),
            _ => None,
        }
    }

    pub fn barrier_mut(&mut self) -> Option<&mut BarrierData> {
        match &mut self.kind {
            WidgetKind::Barrier(data) => Some(data),
            _ => None,
        }
    }

    pub fn container(&self) -> Option<&ContainerData> {
        match &self.kind {
            WidgetKind::Container(data) => Some(data),
            _ => None,
        }
    }

    pub fn container_mut(&mut self) -> Option<&mut ContainerData> {
        match &mut self.kind {
            WidgetKind::Container(data) => Some(data),
            _ => None,
        }
    }

    pub fn flow(&self) -> Option<&FlowData> {
        match &self.kind {
            WidgetKind::Flow(data) => Some(data),
            _ => None,
        }
    }

    pub fn flow_mut(&mut self) -> Option<&mut FlowData> {
        match &mut self.kind {
            WidgetKind::Flow(data) => Some(data),
            _ => None,
        }
    }

    pub fn placeholder(&self) -> Option<&PlaceholderData> {
        match &self.kind {
            WidgetKind::Placeholder(data) => Some(data),
            _ => None,
        }
    }

    pub fn placeholder_mut(&mut self) -> Option<&mut PlaceholderData> {
        match &mut self.kind {
            WidgetKind::Placeholder(data) => Some(data),
            _ => None,
        }
    }

    /// Both edges of the axis carry a final value
    pub(crate) fn is_resolved(&self, orientation: Orientation) -> bool {
        let begin = self.anchors[orientation.begin().slot().unwrap_or(0)].has_final_value();
        let end = self.anchors[orientation.end().slot().unwrap_or(2)].has_final_value();
        begin && end
    }

    /// Restore default sizing rules, keeping identity, anchors and kind
    pub fn reset(&mut self) {
        let fresh = Widget::new(self.id, std::mem::take(&mut self.name), WidgetKind::Plain);
        let kind = std::mem::replace(&mut self.kind, WidgetKind::Plain);
        let anchors = self.anchors.clone();
        let parent = self.parent;
        *self = Widget {
            kind,
            anchors,
            parent,
            ..fresh
        };
    }
}

/// Parse a dimension ratio. Returns the ratio (width / height) and the
/// derived side when the text names one.
pub fn parse_dimension_ratio(text: &str) -> Option<(f32, Option<Orientation>)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (side, rest) = match text.split_once(',') {
        Some((prefix, rest)) if !prefix.is_empty() && !rest.is_empty() => {
            let side = if prefix.eq_ignore_ascii_case("w") {
                Some(Orientation::Horizontal)
            } else if prefix.eq_ignore_ascii_case("h") {
                Some(Orientation::Vertical)
            } else {
                None
            };
            (side, rest)
        }
        _ => (None, text),
    };
    let ratio = match rest.split_once(':') {
        Some((nominator, denominator)) if !denominator.is_empty() => {
            let n: f32 = nominator.trim().parse().ok()?;
            let d: f32 = denominator.trim().parse().ok()?;
            if n <= 0.0 || d <= 0.0 {
                return None;
            }
            if side == Some(Orientation::Vertical) {
                (d / n).abs()
            } else {
                (n / d).abs()
            }
        }
        _ => rest.trim().parse().ok()?,
    };
    (ratio > 0.0).then_some((ratio, side))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Widget {
        Widget::new(WidgetId(0), "w", WidgetKind::Plain)
    }

    #[test]
    fn test_gone_widget_has_no_size() {
        let mut w = plain();
        w.set_size(40, 20);
        w.set_visibility(Visibility::Gone);
        assert_eq!(w.width(), 0);
        assert_eq!(w.height(), 0);
        w.set_visibility(Visibility::Invisible);
        assert_eq!(w.width(), 40);
    }

    #[test]
    fn test_min_size_floors_writes() {
        let mut w = plain();
        w.set_min_width(30);
        w.set_width(10);
        assert_eq!(w.width(), 30);
        w.set_min_height(-5);
        assert_eq!(w.min_height(), 0);
    }

    #[test]
    fn test_parse_ratio_forms() {
        assert_eq!(parse_dimension_ratio("16:8"), Some((2.0, None)));
        assert_eq!(
            parse_dimension_ratio("W,16:8"),
            Some((2.0, Some(Orientation::Horizontal)))
        );
        assert_eq!(
            parse_dimension_ratio("H,16:8"),
            Some((0.5, Some(Orientation::Vertical)))
        );
        assert_eq!(parse_dimension_ratio("1.5"), Some((1.5, None)));
        assert_eq!(parse_dimension_ratio(""), None);
        assert_eq!(parse_dimension_ratio("0:3"), None);
        assert_eq!(parse_dimension_ratio("abc"), None);
    }

    #[test]
    fn test_percent_implies_percent_policy() {
        let mut w = plain();
        w.set_match_constraint(Orientation::Horizontal, MatchConstraint::Spread, 0, 0, 0.5);
        assert_eq!(w.match_default(Orientation::Horizontal), MatchConstraint::Percent);
    }

    #[test]
    fn test_reset_keeps_identity() {
        let mut w = plain();
        w.set_behaviour(Orientation::Vertical, DimensionBehaviour::WrapContent);
        w.set_bias(Orientation::Horizontal, 0.2);
        w.reset();
        assert_eq!(w.name(), "w");
        assert_eq!(w.behaviour(Orientation::Vertical), DimensionBehaviour::Fixed);
        assert_eq!(w.bias(Orientation::Horizontal), 0.5);
    }
}
