use crate::config::{RefillPolicy, StockFloor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Refill added per tick when none is given explicitly.
pub const DEFAULT_REFILL_RATE: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Water,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Water => write!(f, "water"),
        }
    }
}

/// Point source holding a replenishing stock.
///
/// `amount` is changed only by [`ResourceNode::step`] and [`ResourceNode::empty`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceNode {
    kind: ResourceKind,
    position: [f64; 2],
    amount: f64,
    max_amount: f64,
    refill_rate: f64,
    // `None` until set on the node or inherited from the world's config.
    refill_policy: Option<RefillPolicy>,
    stock_floor: Option<StockFloor>,
}

impl ResourceNode {
    /// New node whose refill ceiling is its starting amount.
    pub fn new(kind: ResourceKind, position: [f64; 2], amount: f64) -> Self {
        Self {
            kind,
            position,
            amount,
            max_amount: amount,
            refill_rate: DEFAULT_REFILL_RATE,
            refill_policy: None,
            stock_floor: None,
        }
    }

    pub fn water(x: f64, y: f64, amount: f64) -> Self {
        Self::new(ResourceKind::Water, [x, y], amount)
    }

    pub fn with_refill_rate(mut self, refill_rate: f64) -> Self {
        self.refill_rate = refill_rate;
        self
    }

    pub fn with_max_amount(mut self, max_amount: f64) -> Self {
        self.max_amount = max_amount;
        self
    }

    /// Pin this node's refill policy; the world's config will not override it.
    pub fn with_refill_policy(mut self, policy: RefillPolicy) -> Self {
        self.refill_policy = Some(policy);
        self
    }

    /// Pin this node's stock floor; the world's config will not override it.
    pub fn with_stock_floor(mut self, floor: StockFloor) -> Self {
        self.stock_floor = Some(floor);
        self
    }

    /// Fill in whichever policies the node did not set itself.
    pub(crate) fn inherit_policies(&mut self, refill: RefillPolicy, floor: StockFloor) {
        self.refill_policy.get_or_insert(refill);
        self.stock_floor.get_or_insert(floor);
    }

    pub fn step(&mut self) {
        let refilled = self.amount + self.refill_rate;
        self.amount = match self.refill_policy() {
            RefillPolicy::Clamped => refilled.min(self.max_amount),
            RefillPolicy::Unclamped => refilled,
        };
    }

    pub fn empty(&mut self, delta: f64) {
        let remaining = self.amount - delta;
        self.amount = match self.stock_floor() {
            StockFloor::Unbounded => remaining,
            StockFloor::Zero => remaining.max(0.0),
        };
    }

    /// Fraction of the stock reachable from `distance` away: `exp(-distance)`.
    pub fn uptake_factor(&self, distance: f64) -> f64 {
        (-distance).exp()
    }

    pub fn current_amount(&self) -> f64 {
        self.amount
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn position(&self) -> [f64; 2] {
        self.position
    }

    pub fn max_amount(&self) -> f64 {
        self.max_amount
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    pub fn refill_policy(&self) -> RefillPolicy {
        self.refill_policy.unwrap_or_default()
    }

    pub fn stock_floor(&self) -> StockFloor {
        self.stock_floor.unwrap_or_default()
    }

    pub(crate) fn invalid_reason(&self) -> Option<&'static str> {
        if !(self.position[0].is_finite() && self.position[1].is_finite()) {
            return Some("position must be finite");
        }
        if !self.amount.is_finite() {
            return Some("amount must be finite");
        }
        if !self.max_amount.is_finite() {
            return Some("max_amount must be finite");
        }
        if !(self.refill_rate.is_finite() && self.refill_rate >= 0.0) {
            return Some("refill_rate must be non-negative and finite");
        }
        None
    }
}

impl fmt::Display for ResourceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Source ({},{},{})",
            self.position[0], self.position[1], self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_refill_caps_at_max_amount() {
        let mut node = ResourceNode::water(0.0, 0.0, 20.0).with_refill_rate(5.0);
        node.empty(3.0);
        node.step();
        assert!((node.current_amount() - 20.0).abs() < 1e-12);
        node.empty(10.0);
        node.step();
        assert!((node.current_amount() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn explicit_ceiling_bounds_clamped_refill() {
        let mut node = ResourceNode::water(0.0, 0.0, 10.0)
            .with_refill_rate(50.0)
            .with_max_amount(35.0);
        node.step();
        assert_eq!(node.current_amount(), 35.0);
    }

    #[test]
    fn unclamped_refill_adds_full_rate() {
        let mut node = ResourceNode::water(0.0, 0.0, 20.0)
            .with_refill_rate(5.0)
            .with_refill_policy(RefillPolicy::Unclamped);
        node.step();
        assert!((node.current_amount() - 25.0).abs() < 1e-12);
        node.step();
        assert!((node.current_amount() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn empty_allows_negative_stock_by_default() {
        let mut node = ResourceNode::water(0.0, 0.0, 2.0);
        node.empty(5.0);
        assert!((node.current_amount() + 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_floor_stops_at_empty() {
        let mut node = ResourceNode::water(0.0, 0.0, 2.0).with_stock_floor(StockFloor::Zero);
        node.empty(5.0);
        assert_eq!(node.current_amount(), 0.0);
    }

    #[test]
    fn uptake_factor_is_one_at_source_and_strictly_decreasing() {
        let node = ResourceNode::water(0.0, 0.0, 1.0);
        assert_eq!(node.uptake_factor(0.0), 1.0);
        let mut previous = node.uptake_factor(0.0);
        for i in 1..50 {
            let f = node.uptake_factor(i as f64 * 0.25);
            assert!(f < previous, "factor must decrease at d={}", i as f64 * 0.25);
            assert!(f > 0.0);
            previous = f;
        }
    }

    #[test]
    fn new_node_uses_initial_amount_as_ceiling() {
        let node = ResourceNode::water(4.0, 4.0, 500.0);
        assert_eq!(node.max_amount(), 500.0);
        assert_eq!(node.refill_rate(), DEFAULT_REFILL_RATE);
        assert_eq!(node.kind().to_string(), "water");
    }

    #[test]
    fn inherited_policies_do_not_replace_pinned_ones() {
        let mut pinned = ResourceNode::water(0.0, 0.0, 1.0).with_stock_floor(StockFloor::Zero);
        pinned.inherit_policies(RefillPolicy::Unclamped, StockFloor::Unbounded);
        assert_eq!(pinned.refill_policy(), RefillPolicy::Unclamped);
        assert_eq!(pinned.stock_floor(), StockFloor::Zero);
    }

    #[test]
    fn display_lists_position_and_amount() {
        let node = ResourceNode::water(2.0, 2.0, 20.0);
        assert_eq!(node.to_string(), "Source (2,2,20)");
    }
}
