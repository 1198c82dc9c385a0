//! Strength tables for the rows emitted by the compiler
//!
//! Each decision is a pure function over the flags that drive it, so the
//! ladder of conditions can be tested without building a widget tree.
//! Later conditions deliberately override earlier ones; keep the order.

use super::solver::Strength;
use super::types::{ChainStyle, MatchConstraint};

/// Strength used by the growth rows of wrap-content parents
pub(crate) const WRAP: Strength = Strength::Equality;

/// Strength of the single equality of a widget connected on its begin side only
pub(crate) fn begin_only(parent_wrap: bool, target_is_barrier: bool) -> Strength {
    if parent_wrap && target_is_barrier {
        Strength::Equality
    } else {
        Strength::Fixed
    }
}

/// Flags describing a widget connected on both sides of one axis
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CenteredInputs {
    pub variable_size: bool,
    pub match_default: MatchConstraint,
    /// A match min or max is set
    pub has_limits: bool,
    pub use_ratio: bool,
    pub targets_final: bool,
    /// Either target belongs to the parent
    pub target_is_parent: bool,
    pub target_is_barrier: bool,
    pub target_is_guideline: bool,
    /// Both targets belong to the same widget
    pub same_target_widget: bool,
    /// Begin and end target the same anchor
    pub same_target_anchor: bool,
    /// Begin targets the parent's begin and end the parent's end
    pub targets_parent_edges: bool,
    pub begin_targets_parent_begin: bool,
    pub end_targets_parent_end: bool,
    /// The end target belongs to the parent
    pub end_target_is_parent: bool,
    pub parent_wrap: bool,
    pub in_chain: bool,
    pub in_barrier: bool,
    pub opposite_variable: bool,
    pub opposite_in_chain: bool,
    pub gone: bool,
    pub end_has_dependents: bool,
    /// Neither a min size nor a match min is set
    pub no_min_size: bool,
}

/// Rows to emit for a centered axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CenteredPlan {
    /// Both edges equal to their targets, nothing else
    PinEdges,
    /// One required centering row, plus the parent growth row when asked
    PinCentered { wrap_end: bool },
    Rows(CenteredRows),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct CenteredRows {
    pub centering: Option<Strength>,
    /// Stop after the centering row
    pub stop: bool,
    /// `begin >= target` and `end <= target` rows
    pub range: Option<Strength>,
    /// `begin == target` and `end == target` rows
    pub bounds: Option<Strength>,
    /// `begin >= parent begin`
    pub wrap_begin: bool,
    /// `end >= begin`
    pub wrap_size: Option<Strength>,
    /// Parent wrap after simplification, drives the terminal row
    pub parent_wrap: bool,
}

/// Decide the rows of a widget centered between two targets
pub(crate) fn centered(input: &CenteredInputs) -> CenteredPlan {
    let mut apply_bounds = true;
    let mut apply_centering = false;
    let mut apply_strong = false;
    let mut apply_range = false;
    let mut range = Strength::Equality;
    let mut bounds = Strength::Highest;
    let mut centering = Strength::Barrier;
    let mut parent_wrap = input.parent_wrap;

    if input.variable_size {
        match input.match_default {
            MatchConstraint::Spread => {
                if !input.has_limits {
                    apply_strong = true;
                    range = Strength::Fixed;
                    bounds = Strength::Fixed;
                    if input.targets_final {
                        return CenteredPlan::PinEdges;
                    }
                } else {
                    apply_centering = true;
                    range = Strength::Equality;
                    bounds = Strength::Equality;
                    apply_strong = true;
                    apply_range = true;
                }
                if input.target_is_barrier {
                    bounds = Strength::Highest;
                }
            }
            MatchConstraint::Percent | MatchConstraint::Wrap => {
                apply_centering = true;
                apply_strong = true;
                apply_range = true;
                range = Strength::Equality;
                bounds = Strength::Equality;
                if input.target_is_barrier {
                    bounds = Strength::Highest;
                }
            }
            MatchConstraint::Ratio => {
                apply_centering = true;
                apply_range = true;
                apply_strong = true;
                range = Strength::Fixed;
                // stays below the required ratio row
                bounds = Strength::Highest;
                if input.opposite_in_chain {
                    range = Strength::Equality;
                    bounds = Strength::Highest;
                }
            }
            MatchConstraint::RatioResolved => {}
        }
    } else {
        apply_centering = true;
        if input.targets_final {
            return CenteredPlan::PinCentered {
                wrap_end: input.parent_wrap && !input.end_targets_parent_end,
            };
        }
    }

    if apply_range && input.same_target_widget && !input.target_is_parent {
        apply_range = false;
        apply_bounds = false;
    }

    let mut rows = CenteredRows::default();
    if apply_centering {
        if !input.variable_size
            && !input.opposite_variable
            && !input.opposite_in_chain
            && input.targets_parent_edges
        {
            centering = Strength::Fixed;
            range = Strength::Fixed;
            apply_bounds = false;
            parent_wrap = false;
        }
        rows.centering = Some(centering);
    }

    if input.gone && !input.end_has_dependents {
        rows.stop = true;
        rows.parent_wrap = parent_wrap;
        return CenteredPlan::Rows(rows);
    }

    if apply_range {
        let mut strength = range;
        if parent_wrap && !input.same_target_anchor && !input.variable_size && input.target_is_barrier {
            strength = Strength::Barrier;
        }
        rows.range = Some(strength);
    }

    if parent_wrap && input.in_barrier && !input.target_is_barrier && !input.end_target_is_parent {
        bounds = Strength::Barrier;
        range = Strength::Barrier;
        apply_bounds = true;
    }

    if apply_bounds {
        if apply_strong && (!input.in_chain || input.opposite_in_chain) {
            let mut strength = bounds;
            if input.target_is_parent {
                strength = Strength::Barrier;
            }
            if input.target_is_guideline || input.target_is_barrier || input.in_chain {
                strength = Strength::Fixed;
            }
            bounds = strength.max(bounds);
        }
        if parent_wrap {
            bounds = range.min(bounds);
            if input.use_ratio && !input.opposite_in_chain && input.target_is_parent {
                bounds = Strength::Highest;
            }
        }
        rows.bounds = Some(bounds);
    }

    rows.wrap_begin = parent_wrap && !input.begin_targets_parent_begin;
    if parent_wrap && input.variable_size && input.no_min_size {
        rows.wrap_size = Some(if input.match_default == MatchConstraint::Ratio {
            Strength::Fixed
        } else {
            WRAP
        });
    }
    rows.parent_wrap = parent_wrap;
    CenteredPlan::Rows(rows)
}

/// Strength of the equality linking a chain element to its begin target
pub(crate) fn chain_link(
    style: ChainStyle,
    is_first: bool,
    is_first_visible: bool,
    spread_only: bool,
    in_barrier: bool,
) -> Strength {
    let packed = style == ChainStyle::Packed;
    let mut strength = if packed { Strength::Low } else { Strength::Highest };
    if packed && !is_first && !is_first_visible {
        strength = Strength::Fixed;
    }
    if spread_only && !packed {
        strength = Strength::Equality;
    }
    if is_first_visible && packed && in_barrier {
        strength = Strength::Equality;
    }
    strength
}

/// Strength of the `begin >= target` row that precedes each chain link
pub(crate) fn chain_order(is_first_visible: bool) -> Strength {
    if is_first_visible {
        Strength::Barrier
    } else {
        Strength::Fixed
    }
}

/// Strength of the equality closing a chain on its container, if any
pub(crate) fn chain_tail(style: ChainStyle, spread_only: bool, targets_container: bool) -> Option<Strength> {
    let packed = style == ChainStyle::Packed;
    if !targets_container {
        None
    } else if spread_only && !packed {
        Some(Strength::Equality)
    } else if packed {
        Some(Strength::Highest)
    } else {
        None
    }
}

/// Strength of the rows keeping gaps equal between spread chain elements
pub(crate) fn chain_spacing(style: ChainStyle, all_match: bool) -> Strength {
    match (style, all_match) {
        (_, true) => Strength::Fixed,
        (ChainStyle::SpreadInside, false) => Strength::Highest,
        _ => Strength::Equality,
    }
}

/// Strength of the equality tying a barrier to each reference
pub(crate) fn barrier_reference(has_match: bool, centered_dependents: bool) -> Strength {
    if !has_match && centered_dependents {
        Strength::Equality
    } else {
        Strength::Highest
    }
}
