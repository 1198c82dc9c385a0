//! Flow: lays out its referenced widgets in lines, wrapping when a line is full
//!
//! A flow never positions widgets itself. Measuring splits the references
//! into lines (or a grid) and sizes the flow; wiring then replaces every
//! reference's connections with chains and alignments against the flow.

use serde::Deserialize;

use super::measure;
use super::tree::WidgetTree;
use super::types::{
    AnchorRef, AnchorType, ChainStyle, DimensionBehaviour, MatchConstraint, Orientation, Padding,
    WidgetId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// A single line, whatever its length
    #[default]
    None,
    /// Start a new line when the next widget does not fit
    Chain,
    /// Like `Chain`, but gone widgets keep their place in the lines
    ChainNew,
    /// A grid: every line holds the same number of widgets
    Aligned,
}

/// Placement of a widget across the lines of a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAlign {
    Start,
    #[default]
    Center,
    End,
    /// Align text baselines; horizontal flows only
    Baseline,
}

/// Chain style and bias applied to one line
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LineStyle {
    #[serde(default)]
    pub style: ChainStyle,
    #[serde(default = "default_bias")]
    pub bias: f32,
}

fn default_bias() -> f32 {
    0.5
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            style: ChainStyle::Spread,
            bias: default_bias(),
        }
    }
}

/// Line styles along one axis: the first and last lines may differ
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FlowStyles {
    pub general: LineStyle,
    pub first: Option<LineStyle>,
    pub last: Option<LineStyle>,
}

impl FlowStyles {
    fn for_line(&self, index: usize, count: usize) -> LineStyle {
        if index == 0 {
            self.first.unwrap_or(self.general)
        } else if index + 1 == count {
            self.last.unwrap_or(self.general)
        } else {
            self.general
        }
    }
}

/// Lines computed by the last measurement
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FlowLines {
    pub lines: Vec<Vec<WidgetId>>,
    /// Aligned mode: widest widget of each slot along the main axis
    pub biggest_in_slot: Vec<WidgetId>,
}

#[derive(Debug, Clone)]
pub struct FlowData {
    orientation: Orientation,
    pub(crate) references: Vec<WidgetId>,
    wrap_mode: WrapMode,
    gaps: [i32; 2],
    max_elements: usize,
    padding: Padding,
    styles: [FlowStyles; 2],
    align: [FlowAlign; 2],
    pub(crate) measured: FlowLines,
}

impl FlowData {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            references: Vec::new(),
            wrap_mode: WrapMode::None,
            gaps: [0; 2],
            max_elements: 0,
            padding: Padding::default(),
            styles: [FlowStyles::default(); 2],
            align: [FlowAlign::Center; 2],
            measured: FlowLines::default(),
        }
    }

    /// Direction in which a line grows
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn references(&self) -> &[WidgetId] {
        &self.references
    }

    pub fn add_reference(&mut self, widget: WidgetId) {
        if !self.references.contains(&widget) {
            self.references.push(widget);
        }
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        self.wrap_mode = mode;
    }

    /// Space between widgets along an axis
    pub fn gap(&self, orientation: Orientation) -> i32 {
        self.gaps[orientation.index()]
    }

    pub fn set_gap(&mut self, orientation: Orientation, gap: i32) {
        self.gaps[orientation.index()] = gap.max(0);
    }

    /// Cap on widgets per line; 0 means no cap
    pub fn set_max_elements(&mut self, max: usize) {
        self.max_elements = max;
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
    }

    pub fn styles(&self, orientation: Orientation) -> FlowStyles {
        self.styles[orientation.index()]
    }

    pub fn set_styles(&mut self, orientation: Orientation, styles: FlowStyles) {
        self.styles[orientation.index()] = styles;
    }

    pub fn set_align(&mut self, orientation: Orientation, align: FlowAlign) {
        self.align[orientation.index()] = align;
    }

    /// Lines found by the last measurement
    pub fn lines(&self) -> &[Vec<WidgetId>] {
        &self.measured.lines
    }
}

fn padding_begin(padding: &Padding, orientation: Orientation) -> i32 {
    match orientation {
        Orientation::Horizontal => padding.left,
        Orientation::Vertical => padding.top,
    }
}

fn padding_end(padding: &Padding, orientation: Orientation) -> i32 {
    match orientation {
        Orientation::Horizontal => padding.right,
        Orientation::Vertical => padding.bottom,
    }
}

/// Size a referenced widget will take along an axis
fn widget_size(tree: &WidgetTree, id: WidgetId, orientation: Orientation, max: Option<i32>) -> i32 {
    let widget = tree.widget(id);
    if widget.is_gone() {
        return 0;
    }
    if widget.behaviour(orientation) != DimensionBehaviour::MatchConstraint {
        return widget.length(orientation);
    }
    let ratio = widget.dimension_ratio();
    let i = orientation.index();
    match widget.match_default(orientation) {
        MatchConstraint::Spread | MatchConstraint::Ratio | MatchConstraint::RatioResolved
            if ratio > 0.0 =>
        {
            let other = widget.length(orientation.other()) as f32;
            match orientation {
                Orientation::Horizontal => (other * ratio) as i32,
                Orientation::Vertical => (other / ratio) as i32,
            }
        }
        MatchConstraint::Percent => max.map_or(0, |m| (widget.match_percent[i] * m as f32) as i32),
        MatchConstraint::Wrap => widget.length(orientation),
        _ => 0,
    }
}

fn line_length(tree: &WidgetTree, line: &[WidgetId], orientation: Orientation, gap: i32, max: Option<i32>) -> i32 {
    let visible: Vec<WidgetId> = line.iter().copied().filter(|w| !tree.widget(*w).is_gone()).collect();
    let sizes: i32 = visible.iter().map(|w| widget_size(tree, *w, orientation, max)).sum();
    sizes + gap * (visible.len() as i32 - 1).max(0)
}

fn line_thickness(tree: &WidgetTree, line: &[WidgetId], cross: Orientation, max: Option<i32>) -> i32 {
    line.iter()
        .map(|w| widget_size(tree, *w, cross, max))
        .max()
        .unwrap_or(0)
}

/// Widget with the largest size along `orientation`, first one on ties
fn biggest(tree: &WidgetTree, widgets: &[WidgetId], orientation: Orientation, max: Option<i32>) -> Option<WidgetId> {
    let mut best: Option<(WidgetId, i32)> = None;
    for &w in widgets {
        if tree.widget(w).is_gone() {
            continue;
        }
        let size = widget_size(tree, w, orientation, max);
        if best.map_or(true, |(_, s)| size > s) {
            best = Some((w, size));
        }
    }
    best.map(|(w, _)| w)
}

fn split_lines(tree: &WidgetTree, data: &FlowData, max_main: Option<i32>) -> Vec<Vec<WidgetId>> {
    let o = data.orientation;
    let gap = data.gap(o);
    let keep_gone = data.wrap_mode == WrapMode::ChainNew;
    let displayed: Vec<WidgetId> = data
        .references
        .iter()
        .copied()
        .filter(|w| tree.get(*w).is_some())
        .filter(|w| keep_gone || !tree.widget(*w).is_gone())
        .collect();
    if data.wrap_mode == WrapMode::None {
        return if displayed.is_empty() { Vec::new() } else { vec![displayed] };
    }

    let mut lines = Vec::new();
    let mut current: Vec<WidgetId> = Vec::new();
    let mut used = 0;
    let mut visible_in_line = 0;
    for w in displayed {
        let gone = tree.widget(w).is_gone();
        let size = widget_size(tree, w, o, max_main);
        let extra = if visible_in_line > 0 { gap + size } else { size };
        let over_length = max_main.is_some_and(|m| used + extra > m);
        let over_count = data.max_elements > 0 && visible_in_line >= data.max_elements;
        if !gone && visible_in_line > 0 && (over_length || over_count) {
            lines.push(std::mem::take(&mut current));
            used = 0;
            visible_in_line = 0;
        }
        if !gone {
            used += if visible_in_line > 0 { gap + size } else { size };
            visible_in_line += 1;
        }
        current.push(w);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Aligned mode: shrink the number of widgets per line until the widest
/// slots fit. Returns the lines and the biggest widget of each slot.
fn split_grid(tree: &WidgetTree, data: &FlowData, max_main: Option<i32>) -> FlowLines {
    let o = data.orientation;
    let gap = data.gap(o);
    let displayed: Vec<WidgetId> = data
        .references
        .iter()
        .copied()
        .filter(|w| tree.get(*w).is_some() && !tree.widget(*w).is_gone())
        .collect();
    if displayed.is_empty() {
        return FlowLines::default();
    }
    let count = displayed.len();
    let mut per_line = if data.max_elements > 0 {
        data.max_elements.min(count)
    } else {
        count
    };
    loop {
        let slots: Vec<i32> = (0..per_line)
            .map(|s| {
                displayed
                    .iter()
                    .skip(s)
                    .step_by(per_line)
                    .map(|w| widget_size(tree, *w, o, max_main))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let total: i32 = slots.iter().sum::<i32>() + gap * (per_line as i32 - 1);
        if per_line == 1 || max_main.map_or(true, |m| total <= m) {
            break;
        }
        per_line -= 1;
    }
    let lines: Vec<Vec<WidgetId>> = displayed.chunks(per_line).map(|c| c.to_vec()).collect();
    let biggest_in_slot = (0..per_line)
        .filter_map(|s| {
            let column: Vec<WidgetId> = displayed.iter().skip(s).step_by(per_line).copied().collect();
            biggest(tree, &column, o, max_main)
        })
        .collect();
    FlowLines {
        lines,
        biggest_in_slot,
    }
}

/// Split the references into lines and size the flow along its wrapping axes.
/// `available` is the space the flow may take, `None` when unbounded.
pub(crate) fn measure(tree: &mut WidgetTree, id: WidgetId, available: [Option<i32>; 2]) {
    let Some(data) = tree.widget(id).flow().cloned() else {
        return;
    };
    let o = data.orientation;
    let c = o.other();
    let max_main = available[o.index()].map(|a| (a - data.padding.along(o)).max(0));
    let max_cross = available[c.index()].map(|a| (a - data.padding.along(c)).max(0));

    let measured = if data.wrap_mode == WrapMode::Aligned {
        split_grid(tree, &data, max_main)
    } else {
        FlowLines {
            lines: split_lines(tree, &data, max_main),
            biggest_in_slot: Vec::new(),
        }
    };

    let main_gap = data.gap(o);
    let cross_gap = data.gap(c);
    let main = if data.wrap_mode == WrapMode::Aligned {
        let slots: i32 = measured
            .biggest_in_slot
            .iter()
            .map(|w| widget_size(tree, *w, o, max_main))
            .sum();
        slots + main_gap * (measured.biggest_in_slot.len() as i32 - 1).max(0)
    } else {
        measured
            .lines
            .iter()
            .map(|line| line_length(tree, line, o, main_gap, max_main))
            .max()
            .unwrap_or(0)
    };
    let cross: i32 = measured
        .lines
        .iter()
        .map(|line| line_thickness(tree, line, c, max_cross))
        .sum::<i32>()
        + cross_gap * (measured.lines.len() as i32 - 1).max(0);

    log::debug!(
        "flow {} measured {} lines, content {}x{}",
        id,
        measured.lines.len(),
        main,
        cross
    );

    let flow = tree.widget_mut(id);
    for (axis, content) in [(o, main), (c, cross)] {
        if measure::wraps(flow, axis) {
            flow.set_length(axis, content + data.padding.along(axis));
        }
    }
    if let Some(data) = flow.flow_mut() {
        data.measured = measured;
    }
}

fn link(tree: &mut WidgetTree, from: AnchorRef, to: AnchorRef, margin: i32) {
    tree.connect_anchor(from, Some(to), margin, None, true);
}

/// Replace the connections of every reference with lines against the flow
pub(crate) fn wire(tree: &mut WidgetTree, id: WidgetId) {
    let Some(data) = tree.widget(id).flow().cloned() else {
        return;
    };
    for reference in &data.references {
        if tree.get(*reference).is_some() {
            tree.reset_all_constraints(*reference);
        }
    }
    if data.wrap_mode == WrapMode::Aligned {
        wire_grid(tree, id, &data);
    } else {
        wire_lines(tree, id, &data);
    }
}

/// Chain `widgets` along `orientation` between the flow's edges
fn chain_between(
    tree: &mut WidgetTree,
    flow: WidgetId,
    widgets: &[WidgetId],
    orientation: Orientation,
    gap: i32,
    padding: &Padding,
    style: LineStyle,
) {
    let begin = |w| AnchorRef::new(w, orientation.begin());
    let end = |w| AnchorRef::new(w, orientation.end());
    for (k, &w) in widgets.iter().enumerate() {
        if k == 0 {
            link(tree, begin(w), begin(flow), padding_begin(padding, orientation));
            let widget = tree.widget_mut(w);
            widget.set_chain_style(orientation, style.style);
            widget.set_bias(orientation, style.bias);
        } else {
            let previous = widgets[k - 1];
            link(tree, begin(w), end(previous), gap);
            link(tree, end(previous), begin(w), 0);
        }
        if k + 1 == widgets.len() {
            link(tree, end(w), end(flow), padding_end(padding, orientation));
        }
    }
}

fn wire_lines(tree: &mut WidgetTree, id: WidgetId, data: &FlowData) {
    let o = data.orientation;
    let c = o.other();
    let lines: Vec<&Vec<WidgetId>> = data
        .measured
        .lines
        .iter()
        .filter(|line| line.iter().any(|w| !tree.widget(*w).is_gone()))
        .collect();
    let count = lines.len();

    let biggests: Vec<WidgetId> = lines
        .iter()
        .filter_map(|line| biggest(tree, line, c, None))
        .collect();
    chain_between(
        tree,
        id,
        &biggests,
        c,
        data.gap(c),
        &data.padding,
        data.styles[c.index()].general,
    );

    for (index, line) in lines.iter().enumerate() {
        let style = data.styles[o.index()].for_line(index, count);
        chain_between(tree, id, line, o, data.gap(o), &data.padding, style);
        let Some(&line_biggest) = biggests.get(index) else {
            continue;
        };
        for &w in line.iter() {
            if w != line_biggest && !tree.widget(w).is_gone() {
                align(tree, id, w, line_biggest, c, data.align[c.index()], count == 1, &data.padding);
            }
        }
    }
}

fn wire_grid(tree: &mut WidgetTree, id: WidgetId, data: &FlowData) {
    let o = data.orientation;
    let c = o.other();
    let lines = &data.measured.lines;
    let slots = &data.measured.biggest_in_slot;
    let line_biggests: Vec<WidgetId> = lines
        .iter()
        .filter_map(|line| biggest(tree, line, c, None))
        .collect();

    chain_between(tree, id, slots, o, data.gap(o), &data.padding, data.styles[o.index()].general);
    chain_between(
        tree,
        id,
        &line_biggests,
        c,
        data.gap(c),
        &data.padding,
        data.styles[c.index()].general,
    );

    for (l, line) in lines.iter().enumerate() {
        for (s, &w) in line.iter().enumerate() {
            if let Some(&slot_biggest) = slots.get(s) {
                if w != slot_biggest {
                    link(tree, AnchorRef::new(w, o.begin()), AnchorRef::new(slot_biggest, o.begin()), 0);
                    link(tree, AnchorRef::new(w, o.end()), AnchorRef::new(slot_biggest, o.end()), 0);
                }
            }
            if let Some(&line_biggest) = line_biggests.get(l) {
                if w != line_biggest {
                    link(tree, AnchorRef::new(w, c.begin()), AnchorRef::new(line_biggest, c.begin()), 0);
                    link(tree, AnchorRef::new(w, c.end()), AnchorRef::new(line_biggest, c.end()), 0);
                }
            }
        }
    }
}

/// Position `widget` across its line, relative to the line's biggest widget
#[allow(clippy::too_many_arguments)]
fn align(
    tree: &mut WidgetTree,
    flow: WidgetId,
    widget: WidgetId,
    line_biggest: WidgetId,
    cross: Orientation,
    alignment: FlowAlign,
    single_line: bool,
    padding: &Padding,
) {
    let begin = |w| AnchorRef::new(w, cross.begin());
    let end = |w| AnchorRef::new(w, cross.end());
    let baselines = tree.widget(widget).has_baseline() && tree.widget(line_biggest).has_baseline();
    match alignment {
        FlowAlign::Baseline if cross == Orientation::Vertical && baselines => {
            link(
                tree,
                AnchorRef::new(widget, AnchorType::Baseline),
                AnchorRef::new(line_biggest, AnchorType::Baseline),
                0,
            );
        }
        FlowAlign::Start => link(tree, begin(widget), begin(line_biggest), 0),
        FlowAlign::End => link(tree, end(widget), end(line_biggest), 0),
        _ if single_line => {
            link(tree, begin(widget), begin(flow), padding_begin(padding, cross));
            link(tree, end(widget), end(flow), padding_end(padding, cross));
        }
        _ => {
            link(tree, begin(widget), begin(line_biggest), 0);
            link(tree, end(widget), end(line_biggest), 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn flow_with(sizes: &[(i32, i32)], mode: WrapMode) -> (WidgetTree, WidgetId, Vec<WidgetId>) {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        let flow = tree.add_flow(root, "flow", Orientation::Horizontal).unwrap();
        let mut widgets = Vec::new();
        for (i, (w, h)) in sizes.iter().enumerate() {
            let id = tree.add_widget(root, &format!("w{}", i)).unwrap();
            tree.widget_mut(id).set_size(*w, *h);
            widgets.push(id);
        }
        let data = tree.widget_mut(flow).flow_mut().unwrap();
        for w in &widgets {
            data.add_reference(*w);
        }
        data.set_wrap_mode(mode);
        data.set_gap(Orientation::Horizontal, 10);
        data.set_gap(Orientation::Vertical, 5);
        let flow_widget = tree.widget_mut(flow);
        flow_widget.set_behaviour(Orientation::Horizontal, DimensionBehaviour::WrapContent);
        flow_widget.set_behaviour(Orientation::Vertical, DimensionBehaviour::WrapContent);
        (tree, flow, widgets)
    }

    #[test]
    fn test_single_line_without_wrap() {
        let (mut tree, flow, widgets) = flow_with(&[(50, 20), (60, 30), (70, 10)], WrapMode::None);
        measure(&mut tree, flow, [Some(100), None]);
        assert_eq!(tree.widget(flow).flow().unwrap().lines(), &[widgets.clone()]);
        assert_eq!(tree.widget(flow).width(), 50 + 60 + 70 + 20);
        assert_eq!(tree.widget(flow).height(), 30);
    }

    #[test]
    fn test_chain_mode_breaks_lines() {
        let (mut tree, flow, widgets) = flow_with(&[(50, 20), (60, 30), (70, 10)], WrapMode::Chain);
        measure(&mut tree, flow, [Some(130), None]);
        let lines = tree.widget(flow).flow().unwrap().lines().to_vec();
        assert_eq!(lines, vec![vec![widgets[0], widgets[1]], vec![widgets[2]]]);
        assert_eq!(tree.widget(flow).width(), 120);
        assert_eq!(tree.widget(flow).height(), 30 + 5 + 10);
    }

    #[test]
    fn test_max_elements_caps_lines() {
        let (mut tree, flow, widgets) = flow_with(&[(10, 10); 5], WrapMode::Chain);
        tree.widget_mut(flow).flow_mut().unwrap().set_max_elements(2);
        measure(&mut tree, flow, [None, None]);
        let lines = tree.widget(flow).flow().unwrap().lines().to_vec();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], vec![widgets[4]]);
    }

    #[test]
    fn test_aligned_mode_shrinks_columns() {
        let (mut tree, flow, widgets) = flow_with(&[(40, 10), (20, 10), (30, 10), (40, 10)], WrapMode::Aligned);
        measure(&mut tree, flow, [Some(100), None]);
        let data = tree.widget(flow).flow().unwrap();
        // four columns need 160, three need 110, two need 90
        assert_eq!(data.lines().len(), 2);
        assert_eq!(data.measured.biggest_in_slot, vec![widgets[0], widgets[3]]);
        assert_eq!(tree.widget(flow).width(), 40 + 40 + 10);
    }

    #[test]
    fn test_wire_chains_each_line() {
        let (mut tree, flow, widgets) = flow_with(&[(50, 20), (60, 30), (70, 10)], WrapMode::Chain);
        measure(&mut tree, flow, [Some(130), None]);
        wire(&mut tree, flow);
        assert!(tree.is_chain_head(widgets[0], Orientation::Horizontal));
        assert_eq!(
            tree.target_of(AnchorRef::new(widgets[2], AnchorType::Left)),
            Some(AnchorRef::new(flow, AnchorType::Left))
        );
        // the tallest widget of each line forms the vertical chain
        assert!(tree.is_chain_head(widgets[1], Orientation::Vertical));
        assert_eq!(
            tree.target_of(AnchorRef::new(widgets[0], AnchorType::Top)),
            Some(AnchorRef::new(widgets[1], AnchorType::Top))
        );
    }
}
