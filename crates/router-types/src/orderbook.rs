//! Tick liquidity model for orderbook pools.
//!
//! Tick state is written by ingestion once per block and only read here, so
//! every accessor is a pure function over an immutable snapshot.

use crate::errors::RouterError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the book a swap consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
	/// Selling the base denom; fills against resting asks.
	Ask,
	/// Buying the base denom; fills against resting bids.
	Bid,
}

impl Direction {
	pub fn opposite(self) -> Self {
		match self {
			Self::Ask => Self::Bid,
			Self::Bid => Self::Ask,
		}
	}
}

impl TryFrom<i64> for Direction {
	type Error = RouterError;

	/// Contract encoding: -1 is ask, 1 is bid.
	fn try_from(value: i64) -> Result<Self, Self::Error> {
		match value {
			-1 => Ok(Self::Ask),
			1 => Ok(Self::Bid),
			other => Err(RouterError::InvalidDirection(other)),
		}
	}
}

impl From<Direction> for i64 {
	fn from(direction: Direction) -> Self {
		match direction {
			Direction::Ask => -1,
			Direction::Bid => 1,
		}
	}
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Ask => write!(f, "ask"),
			Self::Bid => write!(f, "bid"),
		}
	}
}

/// Per-direction accounting of a single tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickValues {
	/// Resting liquidity available for fills (TAL). Incremented by order
	/// placement, decremented by fills and cancellations, never negative.
	pub total_amount_of_liquidity: Decimal,
	/// Sum of all limits ever placed at the tick.
	pub cumulative_total_value: Decimal,
	/// Effective total amount swapped at the tick (ETAS).
	pub effective_total_amount_swapped: Decimal,
	/// Cancellations checkpointed so far.
	pub cumulative_realized_cancels: Decimal,
	/// ETAS at the most recent tick sync.
	pub last_sync_etas: Decimal,
}

impl TickValues {
	/// How much of `requested` this tick can absorb.
	pub fn fillable_amount(&self, requested: Decimal) -> Decimal {
		requested.min(self.total_amount_of_liquidity)
	}

	pub fn has_liquidity(&self) -> bool {
		self.total_amount_of_liquidity > Decimal::ZERO
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnrealizedCancels {
	pub ask: u128,
	pub bid: u128,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderbookTick {
	pub tick_id: i64,
	pub ask_values: TickValues,
	pub bid_values: TickValues,
	#[serde(default)]
	pub unrealized_cancels: UnrealizedCancels,
}

impl OrderbookTick {
	pub fn tick_values(&self, direction: Direction) -> &TickValues {
		match direction {
			Direction::Ask => &self.ask_values,
			Direction::Bid => &self.bid_values,
		}
	}

	/// Variant for callers still holding the raw ±1 contract encoding.
	pub fn tick_values_raw(&self, direction: i64) -> Result<&TickValues, RouterError> {
		Direction::try_from(direction).map(|d| self.tick_values(d))
	}

	pub fn fillable_amount(&self, direction: Direction, requested: Decimal) -> Decimal {
		self.tick_values(direction).fillable_amount(requested)
	}
}

/// Orderbook contract state embedded in a CosmWasm pool model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookData {
	pub base_denom: String,
	pub quote_denom: String,
	pub next_bid_tick: i64,
	pub next_ask_tick: i64,
	#[serde(default)]
	pub ticks: Vec<OrderbookTick>,
}

impl OrderbookData {
	/// Direction of a swap through this book, or a mismatch error if the
	/// pair is not this book's base/quote.
	pub fn direction(
		&self,
		pool_id: u64,
		token_in_denom: &str,
		token_out_denom: &str,
	) -> Result<Direction, RouterError> {
		if token_in_denom == self.base_denom && token_out_denom == self.quote_denom {
			Ok(Direction::Ask)
		} else if token_in_denom == self.quote_denom && token_out_denom == self.base_denom {
			Ok(Direction::Bid)
		} else {
			Err(RouterError::OrderbookPoolMismatch {
				pool_id,
				token_in_denom: token_in_denom.to_string(),
				token_out_denom: token_out_denom.to_string(),
			})
		}
	}

	pub fn tick_index_by_id(&self, tick_id: i64) -> Option<usize> {
		self.ticks.iter().position(|tick| tick.tick_id == tick_id)
	}

	/// Index of the first tick a swap in `direction` would fill against.
	pub fn start_tick_index(&self, direction: Direction) -> Option<usize> {
		match direction {
			Direction::Ask => self.tick_index_by_id(self.next_ask_tick),
			Direction::Bid => self.tick_index_by_id(self.next_bid_tick),
		}
	}

	/// Total resting liquidity on one side of the book.
	pub fn total_liquidity(&self, direction: Direction) -> Decimal {
		self.ticks
			.iter()
			.map(|tick| tick.tick_values(direction).total_amount_of_liquidity)
			.sum()
	}
}
