//! Anchors: the typed connection points of a widget
//!
//! An anchor never owns its target. A connection is stored as an
//! [`AnchorRef`] on the source anchor, and the target anchor keeps the
//! reverse edge in its `dependents` set. [`WidgetTree`](super::tree::WidgetTree)
//! is the only place that mutates both sides, which keeps them symmetric.

use std::collections::HashSet;

use super::types::{AnchorRef, AnchorType, WidgetId, UNSET_GONE_MARGIN};

/// Properties of an anchor's owner that matter for connection validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OwnerTraits {
    pub has_baseline: bool,
    pub is_guideline: bool,
}

/// One of the eight connection points of a widget
#[derive(Debug, Clone)]
pub struct Anchor {
    kind: AnchorType,
    owner: WidgetId,
    pub(crate) target: Option<AnchorRef>,
    pub(crate) margin: i32,
    pub(crate) gone_margin: i32,
    pub(crate) final_value: Option<i32>,
    pub(crate) dependents: HashSet<AnchorRef>,
}

impl Anchor {
    pub fn new(owner: WidgetId, kind: AnchorType) -> Self {
        Self {
            kind,
            owner,
            target: None,
            margin: 0,
            gone_margin: UNSET_GONE_MARGIN,
            final_value: None,
            dependents: HashSet::new(),
        }
    }

    pub fn kind(&self) -> AnchorType {
        self.kind
    }

    pub fn owner(&self) -> WidgetId {
        self.owner
    }

    /// This anchor as a reference
    pub fn reference(&self) -> AnchorRef {
        AnchorRef::new(self.owner, self.kind)
    }

    pub fn target(&self) -> Option<AnchorRef> {
        self.target
    }

    pub fn is_connected(&self) -> bool {
        self.target.is_some()
    }

    /// Margin as configured, ignoring visibility
    pub fn raw_margin(&self) -> i32 {
        self.margin
    }

    /// Margin used when the target is gone, if one was set
    pub fn gone_margin(&self) -> Option<i32> {
        (self.gone_margin != UNSET_GONE_MARGIN).then_some(self.gone_margin)
    }

    /// Anchors currently connected to this one
    pub fn dependents(&self) -> impl Iterator<Item = &AnchorRef> {
        self.dependents.iter()
    }

    pub fn has_dependents(&self) -> bool {
        !self.dependents.is_empty()
    }

    pub fn final_value(&self) -> Option<i32> {
        self.final_value
    }

    pub fn has_final_value(&self) -> bool {
        self.final_value.is_some()
    }

    pub(crate) fn set_final_value(&mut self, value: i32) {
        self.final_value = Some(value);
    }

    pub(crate) fn reset_final_value(&mut self) {
        self.final_value = None;
    }

    /// Clear target and margins, returning the previous target.
    ///
    /// The caller is responsible for removing this anchor from the old
    /// target's dependents.
    pub(crate) fn clear_target(&mut self) -> Option<AnchorRef> {
        let previous = self.target.take();
        self.margin = 0;
        self.gone_margin = UNSET_GONE_MARGIN;
        self.final_value = None;
        previous
    }
}

/// Type compatibility between a source anchor and a target anchor
pub fn is_valid_connection(
    from: AnchorType,
    from_owner: OwnerTraits,
    to: AnchorType,
    to_owner: OwnerTraits,
) -> bool {
    if from == to {
        if from == AnchorType::Baseline && (!from_owner.has_baseline || !to_owner.has_baseline) {
            return false;
        }
        return true;
    }
    match from {
        AnchorType::Center => !matches!(
            to,
            AnchorType::Baseline | AnchorType::CenterX | AnchorType::CenterY
        ),
        AnchorType::Left | AnchorType::Right => {
            let compatible = matches!(to, AnchorType::Left | AnchorType::Right);
            compatible || (to_owner.is_guideline && to == AnchorType::CenterX)
        }
        AnchorType::Top | AnchorType::Bottom => {
            let compatible = matches!(to, AnchorType::Top | AnchorType::Bottom);
            compatible || (to_owner.is_guideline && to == AnchorType::CenterY)
        }
        AnchorType::Baseline => !matches!(to, AnchorType::Left | AnchorType::Right),
        AnchorType::CenterX | AnchorType::CenterY | AnchorType::None => false,
    }
}
