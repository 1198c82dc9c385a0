//! Placeholder: a slot that takes over the position of another widget

use super::measure;
use super::tree::WidgetTree;
use super::types::{AnchorRef, AnchorType, Orientation, Padding, WidgetId};

#[derive(Debug, Clone, Default)]
pub struct PlaceholderData {
    content: Option<WidgetId>,
    padding: Padding,
}

impl PlaceholderData {
    /// Widget shown in the slot
    pub fn content(&self) -> Option<WidgetId> {
        self.content
    }

    pub fn set_content(&mut self, content: Option<WidgetId>) {
        self.content = content;
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
    }
}

fn content_of(tree: &WidgetTree, id: WidgetId) -> Option<(WidgetId, Padding)> {
    let data = tree.widget(id).placeholder()?;
    let content = data.content()?;
    tree.get(content).is_some().then_some((content, data.padding()))
}

/// Size the placeholder around its content on content-sized axes
pub(crate) fn measure(tree: &mut WidgetTree, id: WidgetId) {
    let padding = tree
        .widget(id)
        .placeholder()
        .map(|d| d.padding())
        .unwrap_or_default();
    let content = content_of(tree, id).filter(|(c, _)| !tree.widget(*c).is_gone());
    let sizes = Orientation::BOTH.map(|o| content.map_or(0, |(c, _)| tree.widget(c).length(o)));
    let placeholder = tree.widget_mut(id);
    for o in Orientation::BOTH {
        if measure::wraps(placeholder, o) {
            placeholder.set_length(o, sizes[o.index()] + padding.along(o));
        }
    }
}

/// Move the content into the placeholder, replacing its own connections
pub(crate) fn wire(tree: &mut WidgetTree, id: WidgetId) {
    let Some((content, padding)) = content_of(tree, id) else {
        return;
    };
    tree.reset_all_constraints(content);
    for (kind, margin) in [
        (AnchorType::Left, padding.left),
        (AnchorType::Top, padding.top),
        (AnchorType::Right, padding.right),
        (AnchorType::Bottom, padding.bottom),
    ] {
        tree.connect_anchor(
            AnchorRef::new(content, kind),
            Some(AnchorRef::new(id, kind)),
            margin,
            None,
            true,
        );
    }
    log::trace!("placeholder {} hosts {}", id, content);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DimensionBehaviour;

    #[test]
    fn test_wraps_content_with_padding() {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        let slot = tree.add_placeholder(root, "slot").unwrap();
        let card = tree.add_widget(root, "card").unwrap();
        tree.widget_mut(card).set_size(80, 40);
        let data = tree.widget_mut(slot).placeholder_mut().unwrap();
        data.set_content(Some(card));
        data.set_padding(Padding::uniform(5));
        for o in Orientation::BOTH {
            tree.widget_mut(slot).set_behaviour(o, DimensionBehaviour::WrapContent);
        }

        measure(&mut tree, slot);
        assert_eq!((tree.widget(slot).width(), tree.widget(slot).height()), (90, 50));

        wire(&mut tree, slot);
        assert_eq!(
            tree.target_of(AnchorRef::new(card, AnchorType::Bottom)),
            Some(AnchorRef::new(slot, AnchorType::Bottom))
        );
    }

    #[test]
    fn test_empty_placeholder_keeps_fixed_size() {
        let mut tree = WidgetTree::new();
        let root = tree.add_root("root");
        let slot = tree.add_placeholder(root, "slot").unwrap();
        tree.widget_mut(slot).set_size(30, 30);
        measure(&mut tree, slot);
        wire(&mut tree, slot);
        assert_eq!(tree.widget(slot).width(), 30);
    }
}
