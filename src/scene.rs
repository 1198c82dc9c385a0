//! Scene files: a TOML description of a widget tree
//!
//! ```toml
//! [root]
//! width = 400
//! height = 300
//!
//! [[widgets]]
//! name = "title"
//! width = 120
//! height = 20
//! left = { to = "parent.left", margin = 8 }
//! top = { to = "parent.top", margin = 8 }
//! ```
//!
//! Widgets are created in file order; a widget's `parent` must be declared
//! before it. Connections may target widgets declared later.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::{
    layout, AnchorRef, AnchorType, BarrierSide, ChainStyle, DimensionBehaviour, FlowAlign,
    FlowStyles, Frame, Intrinsic, IntrinsicMeasurer, LayoutConfig, LayoutError, LayoutStats,
    MatchConstraint, Orientation, Padding, Visibility, WidgetId, WidgetTree, WrapMode,
};

/// Errors that can occur when loading a scene
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scene TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("widget name '{0}' is used twice")]
    DuplicateName(String),

    #[error("'{by}' refers to unknown widget '{name}'")]
    UnknownWidget { name: String, by: String },

    #[error("'{by}' has an invalid anchor '{text}', expected <widget>.<anchor>")]
    InvalidAnchor { text: String, by: String },

    #[error("'{by}' is missing '{field}'")]
    MissingField { field: &'static str, by: String },

    #[error("'{by}' has an invalid dimension ratio '{text}'")]
    InvalidRatio { text: String, by: String },

    #[error("connection refused: {0}")]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlScene {
    #[serde(default)]
    config: LayoutConfig,
    #[serde(default)]
    root: TomlRoot,
    #[serde(default)]
    widgets: Vec<TomlWidget>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TomlRoot {
    name: String,
    width: i32,
    height: i32,
    horizontal: DimensionBehaviour,
    vertical: DimensionBehaviour,
    min_width: i32,
    min_height: i32,
    max_width: Option<i32>,
    max_height: Option<i32>,
    padding: Padding,
}

impl Default for TomlRoot {
    fn default() -> Self {
        Self {
            name: "root".to_string(),
            width: 0,
            height: 0,
            horizontal: DimensionBehaviour::Fixed,
            vertical: DimensionBehaviour::Fixed,
            min_width: 0,
            min_height: 0,
            max_width: None,
            max_height: None,
            padding: Padding::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TomlKind {
    #[default]
    Widget,
    Container,
    Guideline,
    Barrier,
    Flow,
    Placeholder,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConnection {
    to: String,
    #[serde(default)]
    margin: i32,
    gone_margin: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlCircle {
    to: String,
    angle: f32,
    radius: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TomlMatch {
    policy: MatchConstraint,
    min: i32,
    max: i32,
    percent: f32,
}

impl Default for TomlMatch {
    fn default() -> Self {
        Self {
            policy: MatchConstraint::Spread,
            min: 0,
            max: 0,
            percent: 1.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TomlWidget {
    name: String,
    kind: TomlKind,
    parent: Option<String>,

    width: i32,
    height: i32,
    horizontal: DimensionBehaviour,
    vertical: DimensionBehaviour,
    min_width: i32,
    min_height: i32,
    max_width: Option<i32>,
    max_height: Option<i32>,
    match_width: Option<TomlMatch>,
    match_height: Option<TomlMatch>,
    ratio: Option<String>,
    visibility: Visibility,
    baseline_distance: Option<i32>,
    intrinsic: Option<Intrinsic>,

    horizontal_bias: Option<f32>,
    vertical_bias: Option<f32>,
    horizontal_chain: Option<ChainStyle>,
    vertical_chain: Option<ChainStyle>,
    horizontal_weight: Option<f32>,
    vertical_weight: Option<f32>,

    left: Option<TomlConnection>,
    top: Option<TomlConnection>,
    right: Option<TomlConnection>,
    bottom: Option<TomlConnection>,
    baseline: Option<TomlConnection>,
    center: Option<TomlConnection>,
    center_x: Option<TomlConnection>,
    center_y: Option<TomlConnection>,
    circle: Option<TomlCircle>,

    // containers, flows and placeholders
    padding: Padding,

    // guidelines and flows
    orientation: Option<Orientation>,
    begin: Option<i32>,
    end: Option<i32>,
    percent: Option<f32>,

    // barriers and flows
    side: Option<BarrierSide>,
    references: Vec<String>,
    margin: i32,
    allows_gone: bool,

    wrap: WrapMode,
    horizontal_gap: i32,
    vertical_gap: i32,
    max_elements: usize,
    horizontal_align: Option<FlowAlign>,
    vertical_align: Option<FlowAlign>,
    horizontal_style: Option<FlowStyles>,
    vertical_style: Option<FlowStyles>,

    content: Option<String>,
}

impl TomlWidget {
    fn connections(&self) -> [(AnchorType, Option<&TomlConnection>); 8] {
        [
            (AnchorType::Left, self.left.as_ref()),
            (AnchorType::Top, self.top.as_ref()),
            (AnchorType::Right, self.right.as_ref()),
            (AnchorType::Bottom, self.bottom.as_ref()),
            (AnchorType::Baseline, self.baseline.as_ref()),
            (AnchorType::Center, self.center.as_ref()),
            (AnchorType::CenterX, self.center_x.as_ref()),
            (AnchorType::CenterY, self.center_y.as_ref()),
        ]
    }
}

fn anchor_from_name(name: &str) -> Option<AnchorType> {
    let kind = match name {
        "left" | "start" => AnchorType::Left,
        "top" => AnchorType::Top,
        "right" | "end" => AnchorType::Right,
        "bottom" => AnchorType::Bottom,
        "baseline" => AnchorType::Baseline,
        "center" => AnchorType::Center,
        "center_x" => AnchorType::CenterX,
        "center_y" => AnchorType::CenterY,
        _ => return None,
    };
    Some(kind)
}

/// A loaded widget tree, ready to be laid out
#[derive(Debug, Clone)]
pub struct Scene {
    pub tree: WidgetTree,
    pub root: WidgetId,
    pub config: LayoutConfig,
    pub measurer: IntrinsicMeasurer,
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a scene from TOML text
    pub fn parse(content: &str) -> Result<Self, SceneError> {
        let parsed: TomlScene = toml::from_str(content)?;
        Builder::default().build(parsed)
    }

    pub fn layout(&mut self) -> Result<LayoutStats, LayoutError> {
        layout(&mut self.tree, self.root, &self.config, &mut self.measurer)
    }

    /// Frames of every widget in root coordinates, in declaration order
    pub fn frames(&self) -> Vec<(String, Frame)> {
        self.tree
            .ids()
            .map(|id| (self.tree.widget(id).name().to_string(), self.tree.absolute_frame(id)))
            .collect()
    }

    /// One line per widget: name, kind and absolute frame
    pub fn report(&self) -> String {
        let width = self
            .tree
            .ids()
            .map(|id| self.tree.widget(id).name().len())
            .max()
            .unwrap_or(0);
        let mut out = String::new();
        for id in self.tree.ids() {
            let widget = self.tree.widget(id);
            let _ = writeln!(
                out,
                "{:<width$}  {:<11}  {}",
                widget.name(),
                widget.kind().label(),
                self.tree.absolute_frame(id),
                width = width
            );
        }
        out
    }
}

#[derive(Default)]
struct Builder {
    tree: WidgetTree,
    names: HashMap<String, WidgetId>,
}

impl Builder {
    fn build(mut self, scene: TomlScene) -> Result<Scene, SceneError> {
        let root = self.tree.add_root(&scene.root.name);
        self.names.insert(scene.root.name.clone(), root);
        apply_root(&mut self.tree, root, &scene.root);

        let mut ids = Vec::with_capacity(scene.widgets.len());
        for spec in &scene.widgets {
            ids.push(self.create(root, spec)?);
        }

        let mut measurer = IntrinsicMeasurer::new();
        for (spec, &id) in scene.widgets.iter().zip(&ids) {
            self.configure(id, spec)?;
            if let Some(intrinsic) = spec.intrinsic {
                measurer.insert(id, intrinsic);
            }
        }
        for (spec, &id) in scene.widgets.iter().zip(&ids) {
            self.connect(id, spec)?;
        }
        log::debug!("scene loaded: {} widgets", self.tree.len());

        Ok(Scene {
            tree: self.tree,
            root,
            config: scene.config,
            measurer,
        })
    }

    fn lookup(&self, name: &str, by: &str) -> Result<WidgetId, SceneError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::UnknownWidget {
                name: name.to_string(),
                by: by.to_string(),
            })
    }

    fn create(&mut self, root: WidgetId, spec: &TomlWidget) -> Result<WidgetId, SceneError> {
        if self.names.contains_key(&spec.name) {
            return Err(SceneError::DuplicateName(spec.name.clone()));
        }
        let parent = match &spec.parent {
            Some(name) => self.lookup(name, &spec.name)?,
            None => root,
        };
        let missing = |field| SceneError::MissingField {
            field,
            by: spec.name.clone(),
        };
        let tree = &mut self.tree;
        let id = match spec.kind {
            TomlKind::Widget => tree.add_widget(parent, &spec.name)?,
            TomlKind::Container => tree.add_container(parent, &spec.name)?,
            TomlKind::Guideline => {
                let orientation = spec.orientation.ok_or_else(|| missing("orientation"))?;
                tree.add_guideline(parent, &spec.name, orientation)?
            }
            TomlKind::Barrier => {
                let side = spec.side.ok_or_else(|| missing("side"))?;
                tree.add_barrier(parent, &spec.name, side)?
            }
            TomlKind::Flow => {
                let orientation = spec.orientation.unwrap_or(Orientation::Horizontal);
                tree.add_flow(parent, &spec.name, orientation)?
            }
            TomlKind::Placeholder => tree.add_placeholder(parent, &spec.name)?,
        };
        self.names.insert(spec.name.clone(), id);
        Ok(id)
    }

    fn configure(&mut self, id: WidgetId, spec: &TomlWidget) -> Result<(), SceneError> {
        let references = spec
            .references
            .iter()
            .map(|name| self.lookup(name, &spec.name))
            .collect::<Result<Vec<_>, _>>()?;
        let content = spec
            .content
            .as_deref()
            .map(|name| self.lookup(name, &spec.name))
            .transpose()?;

        let widget = self.tree.widget_mut(id);
        widget.set_behaviour(Orientation::Horizontal, spec.horizontal);
        widget.set_behaviour(Orientation::Vertical, spec.vertical);
        widget.set_min_width(spec.min_width);
        widget.set_min_height(spec.min_height);
        widget.set_size(spec.width, spec.height);
        if let Some(max) = spec.max_width {
            widget.set_max_dimension(Orientation::Horizontal, max);
        }
        if let Some(max) = spec.max_height {
            widget.set_max_dimension(Orientation::Vertical, max);
        }
        for (orientation, policy) in [
            (Orientation::Horizontal, spec.match_width),
            (Orientation::Vertical, spec.match_height),
        ] {
            if let Some(m) = policy {
                widget.set_match_constraint(orientation, m.policy, m.min, m.max, m.percent);
            }
        }
        if let Some(text) = &spec.ratio {
            if !widget.set_dimension_ratio_str(text) {
                return Err(SceneError::InvalidRatio {
                    text: text.clone(),
                    by: spec.name.clone(),
                });
            }
        }
        widget.set_visibility(spec.visibility);
        if let Some(distance) = spec.baseline_distance {
            widget.set_baseline_distance(distance);
        }
        for (orientation, bias, chain, weight) in [
            (
                Orientation::Horizontal,
                spec.horizontal_bias,
                spec.horizontal_chain,
                spec.horizontal_weight,
            ),
            (
                Orientation::Vertical,
                spec.vertical_bias,
                spec.vertical_chain,
                spec.vertical_weight,
            ),
        ] {
            if let Some(bias) = bias {
                widget.set_bias(orientation, bias);
            }
            if let Some(style) = chain {
                widget.set_chain_style(orientation, style);
            }
            if let Some(weight) = weight {
                widget.set_weight(orientation, weight);
            }
        }

        if let Some(data) = widget.container_mut() {
            data.set_padding(spec.padding);
        }
        if let Some(data) = widget.guideline_mut() {
            if let Some(begin) = spec.begin {
                data.set_guide_begin(begin);
            }
            if let Some(end) = spec.end {
                data.set_guide_end(end);
            }
            if let Some(percent) = spec.percent {
                data.set_guide_percent(percent);
            }
        }
        if let Some(data) = widget.barrier_mut() {
            for reference in &references {
                data.add_reference(*reference);
            }
            data.set_margin(spec.margin);
            data.set_allows_gone_widget(spec.allows_gone);
        }
        if let Some(data) = widget.flow_mut() {
            for reference in &references {
                data.add_reference(*reference);
            }
            data.set_wrap_mode(spec.wrap);
            data.set_gap(Orientation::Horizontal, spec.horizontal_gap);
            data.set_gap(Orientation::Vertical, spec.vertical_gap);
            data.set_max_elements(spec.max_elements);
            data.set_padding(spec.padding);
            for (orientation, align, styles) in [
                (Orientation::Horizontal, spec.horizontal_align, spec.horizontal_style),
                (Orientation::Vertical, spec.vertical_align, spec.vertical_style),
            ] {
                if let Some(align) = align {
                    data.set_align(orientation, align);
                }
                if let Some(styles) = styles {
                    data.set_styles(orientation, styles);
                }
            }
        }
        if let Some(data) = widget.placeholder_mut() {
            data.set_content(content);
            data.set_padding(spec.padding);
        }
        Ok(())
    }

    /// Resolve `<widget>.<anchor>`, where `parent` names the widget's parent
    fn target(&self, id: WidgetId, text: &str, by: &str) -> Result<AnchorRef, SceneError> {
        let invalid = || SceneError::InvalidAnchor {
            text: text.to_string(),
            by: by.to_string(),
        };
        let (name, anchor) = text.rsplit_once('.').ok_or_else(invalid)?;
        let kind = anchor_from_name(anchor).ok_or_else(invalid)?;
        let widget = if name == "parent" {
            self.tree.widget(id).parent().ok_or_else(invalid)?
        } else {
            self.lookup(name, by)?
        };
        Ok(AnchorRef::new(widget, kind))
    }

    fn connect(&mut self, id: WidgetId, spec: &TomlWidget) -> Result<(), SceneError> {
        for (from, connection) in spec.connections() {
            let Some(connection) = connection else {
                continue;
            };
            let target = self.target(id, &connection.to, &spec.name)?;
            self.tree
                .try_connect(id, from, target.widget, target.kind, connection.margin)?;
            if let Some(gone) = connection.gone_margin {
                self.tree.set_gone_margin(AnchorRef::new(id, from), gone);
            }
        }
        if let Some(circle) = &spec.circle {
            let target = if circle.to == "parent" {
                self.tree.widget(id).parent().ok_or_else(|| SceneError::UnknownWidget {
                    name: circle.to.clone(),
                    by: spec.name.clone(),
                })?
            } else {
                self.lookup(&circle.to, &spec.name)?
            };
            self.tree
                .connect_circular(id, target, circle.angle, circle.radius);
        }
        Ok(())
    }
}

fn apply_root(tree: &mut WidgetTree, root: WidgetId, spec: &TomlRoot) {
    let widget = tree.widget_mut(root);
    widget.set_behaviour(Orientation::Horizontal, spec.horizontal);
    widget.set_behaviour(Orientation::Vertical, spec.vertical);
    widget.set_min_width(spec.min_width);
    widget.set_min_height(spec.min_height);
    widget.set_size(spec.width, spec.height);
    if let Some(max) = spec.max_width {
        widget.set_max_dimension(Orientation::Horizontal, max);
    }
    if let Some(max) = spec.max_height {
        widget.set_max_dimension(Orientation::Vertical, max);
    }
    if let Some(data) = widget.container_mut() {
        data.set_padding(spec.padding);
    }
}
