//! Integration tests for the layout engine: widget trees built through the
//! public API and laid out end to end.

use anchor_layout::layout::{
    layout, AnchorRef, AnchorType, BarrierSide, ChainStyle, DimensionBehaviour, Frame,
    LayoutConfig, NoopMeasurer, Orientation, Padding, Visibility, WidgetId, WidgetTree, WrapMode,
};
use pretty_assertions::assert_eq;

fn fixed_root(width: i32, height: i32) -> (WidgetTree, WidgetId) {
    let mut tree = WidgetTree::new();
    let root = tree.add_root("root");
    tree.widget_mut(root).set_size(width, height);
    (tree, root)
}

fn sized(tree: &mut WidgetTree, parent: WidgetId, name: &str, width: i32, height: i32) -> WidgetId {
    let id = tree.add_widget(parent, name).unwrap();
    tree.widget_mut(id).set_size(width, height);
    id
}

fn run(tree: &mut WidgetTree, root: WidgetId) {
    layout(tree, root, &LayoutConfig::default(), &mut NoopMeasurer).unwrap();
}

fn chain(tree: &mut WidgetTree, root: WidgetId, widgets: &[WidgetId]) {
    tree.connect(widgets[0], AnchorType::Left, root, AnchorType::Left, 0);
    for pair in widgets.windows(2) {
        tree.connect(pair[0], AnchorType::Right, pair[1], AnchorType::Left, 0);
        tree.connect(pair[1], AnchorType::Left, pair[0], AnchorType::Right, 0);
    }
    let last = widgets[widgets.len() - 1];
    tree.connect(last, AnchorType::Right, root, AnchorType::Right, 0);
}

#[test]
fn test_fixed_widget_sits_inside_padding() {
    let (mut tree, root) = fixed_root(400, 300);
    tree.widget_mut(root)
        .container_mut()
        .unwrap()
        .set_padding(Padding {
            left: 20,
            top: 10,
            right: 0,
            bottom: 0,
        });
    let card = sized(&mut tree, root, "card", 100, 50);
    tree.connect(card, AnchorType::Left, root, AnchorType::Left, 5);
    tree.connect(card, AnchorType::Top, root, AnchorType::Top, 5);

    run(&mut tree, root);
    assert_eq!(tree.widget(card).frame(), Frame::new(5, 5, 100, 50));
    assert_eq!(tree.absolute_frame(card), Frame::new(25, 15, 100, 50));
}

#[test]
fn test_centered_widget() {
    let (mut tree, root) = fixed_root(400, 300);
    let button = sized(&mut tree, root, "button", 100, 40);
    assert!(tree.connect(button, AnchorType::Center, root, AnchorType::Center, 0));

    run(&mut tree, root);
    assert_eq!(tree.widget(button).frame(), Frame::new(150, 130, 100, 40));
}

#[test]
fn test_chain_weights_split_space() {
    let (mut tree, root) = fixed_root(400, 100);
    let widgets: Vec<WidgetId> = [1.0, 1.0, 2.0]
        .iter()
        .enumerate()
        .map(|(i, weight)| {
            let id = sized(&mut tree, root, &format!("w{}", i), 0, 20);
            let widget = tree.widget_mut(id);
            widget.set_behaviour(Orientation::Horizontal, DimensionBehaviour::MatchConstraint);
            widget.set_weight(Orientation::Horizontal, *weight);
            id
        })
        .collect();
    chain(&mut tree, root, &widgets);

    run(&mut tree, root);
    let frames: Vec<(i32, i32)> = widgets
        .iter()
        .map(|w| (tree.widget(*w).x(), tree.widget(*w).width()))
        .collect();
    assert_eq!(frames, vec![(0, 100), (100, 100), (200, 200)]);
}

fn xs(tree: &WidgetTree, widgets: &[WidgetId]) -> Vec<i32> {
    widgets.iter().map(|w| tree.widget(*w).x()).collect()
}

fn three_in_a_row(tree: &mut WidgetTree, root: WidgetId) -> Vec<WidgetId> {
    let widgets: Vec<WidgetId> = (0..3)
        .map(|i| sized(tree, root, &format!("w{}", i), 40, 20))
        .collect();
    chain(tree, root, &widgets);
    widgets
}

#[test]
fn test_packed_chain_follows_bias() {
    let (mut tree, root) = fixed_root(400, 100);
    let widgets = three_in_a_row(&mut tree, root);
    {
        let head = tree.widget_mut(widgets[0]);
        head.set_chain_style(Orientation::Horizontal, ChainStyle::Packed);
        head.set_bias(Orientation::Horizontal, 0.0);
    }

    run(&mut tree, root);
    assert_eq!(xs(&tree, &widgets), vec![0, 40, 80]);
}

#[test]
fn test_spread_inside_chain_touches_both_edges() {
    let (mut tree, root) = fixed_root(400, 100);
    let widgets = three_in_a_row(&mut tree, root);
    tree.widget_mut(widgets[0])
        .set_chain_style(Orientation::Horizontal, ChainStyle::SpreadInside);

    run(&mut tree, root);
    assert_eq!(xs(&tree, &widgets), vec![0, 180, 360]);
}

#[test]
fn test_rtl_chain_reads_style_from_last_widget() {
    let (mut tree, root) = fixed_root(400, 100);
    let widgets = three_in_a_row(&mut tree, root);
    tree.widget_mut(widgets[2])
        .set_chain_style(Orientation::Horizontal, ChainStyle::Packed);

    let config = LayoutConfig::default().with_rtl(true);
    layout(&mut tree, root, &config, &mut NoopMeasurer).unwrap();
    assert_eq!(xs(&tree, &widgets), vec![140, 180, 220]);
}

#[test]
fn test_ratio_on_both_axes_keeps_square() {
    let (mut tree, root) = fixed_root(400, 300);
    let square = tree.add_widget(root, "square").unwrap();
    {
        let widget = tree.widget_mut(square);
        for o in Orientation::BOTH {
            widget.set_behaviour(o, DimensionBehaviour::MatchConstraint);
        }
        assert!(widget.set_dimension_ratio_str("1:1"));
    }
    for kind in [AnchorType::Left, AnchorType::Top, AnchorType::Right, AnchorType::Bottom] {
        tree.connect(square, kind, root, kind, 0);
    }

    run(&mut tree, root);
    assert_eq!(tree.widget(square).frame(), Frame::new(50, 0, 300, 300));
}

#[test]
fn test_gone_widget_leaves_the_chain() {
    let (mut tree, root) = fixed_root(400, 100);
    let widgets: Vec<WidgetId> = (0..3)
        .map(|i| sized(&mut tree, root, &format!("w{}", i), 40, 20))
        .collect();
    chain(&mut tree, root, &widgets);
    tree.widget_mut(widgets[1]).set_visibility(Visibility::Gone);

    run(&mut tree, root);
    let first = tree.widget(widgets[0]).x();
    let last = tree.widget(widgets[2]).x();
    // two visible widgets spread over 400: three gaps of 320 / 3
    assert!((first - 107).abs() <= 1, "first at {}", first);
    assert!((last - 253).abs() <= 1, "last at {}", last);
    assert_eq!(tree.widget(widgets[2]).width(), 40);
}

#[test]
fn test_barrier_follows_widest_reference() {
    let (mut tree, root) = fixed_root(400, 300);
    let mut references = Vec::new();
    for (i, margin) in [10, 30, 5].iter().enumerate() {
        let w = sized(&mut tree, root, &format!("label{}", i), 20, 20);
        tree.connect(w, AnchorType::Left, root, AnchorType::Left, *margin);
        references.push(w);
    }
    let barrier = tree.add_barrier(root, "barrier", BarrierSide::Right).unwrap();
    {
        let data = tree.widget_mut(barrier).barrier_mut().unwrap();
        for r in &references {
            data.add_reference(*r);
        }
        data.set_margin(4);
    }
    let field = sized(&mut tree, root, "field", 100, 20);
    assert!(tree.connect(field, AnchorType::Left, barrier, AnchorType::Right, 0));

    run(&mut tree, root);
    assert_eq!(tree.widget(barrier).x(), 54);
    assert_eq!(tree.widget(field).x(), 54);
}

#[test]
fn test_percent_guideline_positions_dependents() {
    let (mut tree, root) = fixed_root(400, 300);
    let guide = tree
        .add_guideline(root, "guide", Orientation::Vertical)
        .unwrap();
    tree.widget_mut(guide)
        .guideline_mut()
        .unwrap()
        .set_guide_percent(0.25);
    let panel = sized(&mut tree, root, "panel", 50, 50);
    assert!(tree.connect(panel, AnchorType::Left, guide, AnchorType::Left, 0));

    run(&mut tree, root);
    assert_eq!(tree.widget(guide).x(), 100);
    assert_eq!(tree.widget(panel).x(), 100);
}

#[test]
fn test_wrap_container_fits_connected_children() {
    let mut tree = WidgetTree::new();
    let root = tree.add_root("root");
    for o in Orientation::BOTH {
        tree.widget_mut(root)
            .set_behaviour(o, DimensionBehaviour::WrapContent);
    }
    let a = sized(&mut tree, root, "a", 100, 50);
    tree.connect(a, AnchorType::Left, root, AnchorType::Left, 10);
    tree.connect(a, AnchorType::Top, root, AnchorType::Top, 10);
    let b = sized(&mut tree, root, "b", 200, 80);
    tree.connect(b, AnchorType::Left, a, AnchorType::Right, 20);
    tree.connect(b, AnchorType::Top, root, AnchorType::Top, 10);
    tree.connect(b, AnchorType::Right, root, AnchorType::Right, 10);
    tree.connect(b, AnchorType::Bottom, root, AnchorType::Bottom, 10);

    let stats = layout(&mut tree, root, &LayoutConfig::default(), &mut NoopMeasurer).unwrap();
    assert_eq!((tree.widget(root).width(), tree.widget(root).height()), (340, 100));
    assert_eq!(tree.widget(b).frame(), Frame::new(130, 10, 200, 80));
    assert!(stats.passes <= LayoutConfig::default().max_iterations);
}

#[test]
fn test_reset_anchor_undoes_center_pairing() {
    let (mut tree, root) = fixed_root(400, 300);
    let button = sized(&mut tree, root, "button", 100, 40);
    tree.connect(button, AnchorType::Center, root, AnchorType::Center, 0);
    run(&mut tree, root);
    assert_eq!(tree.widget(button).x(), 150);

    tree.reset_anchor(button, AnchorType::Center);
    for kind in [AnchorType::Left, AnchorType::Right, AnchorType::Top, AnchorType::Bottom] {
        let anchor = tree.anchor(AnchorRef::new(button, kind)).unwrap();
        assert_eq!(anchor.target(), None, "{} still connected", kind);
    }

    tree.connect(button, AnchorType::Left, root, AnchorType::Left, 12);
    run(&mut tree, root);
    assert_eq!(tree.widget(button).x(), 12);
    // the vertical axis lost its connections and keeps the last solved position
    assert_eq!(tree.widget(button).y(), 130);
}

#[test]
fn test_flow_lays_out_a_single_line() {
    let (mut tree, root) = fixed_root(400, 300);
    let flow = tree.add_flow(root, "flow", Orientation::Horizontal).unwrap();
    let items: Vec<WidgetId> = (0..3)
        .map(|i| sized(&mut tree, root, &format!("item{}", i), 50, 20))
        .collect();
    {
        let widget = tree.widget_mut(flow);
        for o in Orientation::BOTH {
            widget.set_behaviour(o, DimensionBehaviour::WrapContent);
        }
        let data = widget.flow_mut().unwrap();
        for item in &items {
            data.add_reference(*item);
        }
        data.set_wrap_mode(WrapMode::None);
        data.set_gap(Orientation::Horizontal, 10);
    }
    tree.connect(flow, AnchorType::Left, root, AnchorType::Left, 10);
    tree.connect(flow, AnchorType::Top, root, AnchorType::Top, 10);

    run(&mut tree, root);
    assert_eq!(tree.widget(flow).frame(), Frame::new(10, 10, 170, 20));
    let xs: Vec<i32> = items.iter().map(|w| tree.widget(*w).x()).collect();
    assert_eq!(xs, vec![10, 70, 130]);
    assert!(items.iter().all(|w| tree.widget(*w).y() == 10));
}

#[test]
fn test_aligned_flow_builds_a_grid() {
    let (mut tree, root) = fixed_root(100, 300);
    let flow = tree.add_flow(root, "flow", Orientation::Horizontal).unwrap();
    let items: Vec<WidgetId> = (0..4)
        .map(|i| sized(&mut tree, root, &format!("cell{}", i), 40, 40))
        .collect();
    {
        let widget = tree.widget_mut(flow);
        for o in Orientation::BOTH {
            widget.set_behaviour(o, DimensionBehaviour::WrapContent);
        }
        let data = widget.flow_mut().unwrap();
        for item in &items {
            data.add_reference(*item);
        }
        data.set_wrap_mode(WrapMode::Aligned);
        data.set_gap(Orientation::Horizontal, 20);
        data.set_gap(Orientation::Vertical, 10);
    }
    tree.connect(flow, AnchorType::Left, root, AnchorType::Left, 0);
    tree.connect(flow, AnchorType::Top, root, AnchorType::Top, 0);

    run(&mut tree, root);
    // four columns need 220 and three need 160, two fit in 100
    assert_eq!(tree.widget(flow).frame(), Frame::new(0, 0, 100, 90));
    let cells: Vec<(i32, i32)> = items
        .iter()
        .map(|w| (tree.widget(*w).x(), tree.widget(*w).y()))
        .collect();
    assert_eq!(cells, vec![(0, 0), (60, 0), (0, 50), (60, 50)]);
}

#[test]
fn test_placeholder_hosts_its_content() {
    let (mut tree, root) = fixed_root(400, 300);
    let slot = tree.add_placeholder(root, "slot").unwrap();
    tree.widget_mut(slot).set_size(120, 80);
    tree.connect(slot, AnchorType::Left, root, AnchorType::Left, 20);
    tree.connect(slot, AnchorType::Top, root, AnchorType::Top, 30);

    let card = tree.add_widget(root, "card").unwrap();
    for o in Orientation::BOTH {
        tree.widget_mut(card)
            .set_behaviour(o, DimensionBehaviour::MatchConstraint);
    }
    // replaced by the placeholder's wiring
    tree.connect(card, AnchorType::Right, root, AnchorType::Right, 0);
    {
        let data = tree.widget_mut(slot).placeholder_mut().unwrap();
        data.set_content(Some(card));
        data.set_padding(Padding::uniform(5));
    }

    run(&mut tree, root);
    assert_eq!(tree.widget(card).frame(), Frame::new(25, 35, 110, 70));
}

#[test]
fn test_layout_is_repeatable() {
    let (mut tree, root) = fixed_root(300, 200);
    let a = sized(&mut tree, root, "a", 60, 30);
    tree.connect(a, AnchorType::Right, root, AnchorType::Right, 10);
    tree.connect(a, AnchorType::Bottom, root, AnchorType::Bottom, 10);
    let b = sized(&mut tree, root, "b", 40, 30);
    tree.connect(b, AnchorType::Right, a, AnchorType::Left, 8);
    tree.connect(b, AnchorType::Top, a, AnchorType::Top, 0);

    run(&mut tree, root);
    let first = (tree.widget(a).frame(), tree.widget(b).frame());
    run(&mut tree, root);
    assert_eq!((tree.widget(a).frame(), tree.widget(b).frame()), first);
    assert_eq!(first.1, Frame::new(182, 160, 40, 30));
}
