//! Pool model as read from the pool registry.
//!
//! Pools are owned by the ingestion side and never mutated by the route
//! engine. Heterogeneous pool models are a closed tagged enum; callers query
//! them through [`PoolInfo`] instead of downcasting.

use crate::orderbook::OrderbookData;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A token amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
	pub denom: String,
	pub amount: u128,
}

impl Coin {
	pub fn new(denom: impl Into<String>, amount: u128) -> Self {
		Self {
			denom: denom.into(),
			amount,
		}
	}
}

impl fmt::Display for Coin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.amount, self.denom)
	}
}

/// Pool type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
	ConstantProduct,
	Stable,
	Concentrated,
	CosmWasm,
}

impl fmt::Display for PoolType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ConstantProduct => write!(f, "constant_product"),
			Self::Stable => write!(f, "stable"),
			Self::Concentrated => write!(f, "concentrated"),
			Self::CosmWasm => write!(f, "cosmwasm"),
		}
	}
}

/// Type-specific pool state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoolModel {
	ConstantProduct,
	Stable {
		#[serde(default)]
		scaling_factors: Vec<u64>,
	},
	Concentrated {
		current_tick: i64,
	},
	CosmWasm(CosmWasmPoolModel),
}

impl PoolModel {
	pub fn pool_type(&self) -> PoolType {
		match self {
			Self::ConstantProduct => PoolType::ConstantProduct,
			Self::Stable { .. } => PoolType::Stable,
			Self::Concentrated { .. } => PoolType::Concentrated,
			Self::CosmWasm(_) => PoolType::CosmWasm,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmWasmPoolModel {
	pub code_id: u64,
	pub contract: CosmWasmContract,
}

/// Known contract families behind CosmWasm pools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CosmWasmContract {
	Transmuter,
	/// The alloyed LP share is minted by the contract and does not show up
	/// in pool balances.
	AlloyedTransmuter { alloyed_denom: String },
	Orderbook(OrderbookData),
	Generalized,
}

/// One pool of the registry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
	pub id: u64,
	pub model: PoolModel,
	pub denoms: Vec<String>,
	#[serde(default)]
	pub balances: Vec<Coin>,
	/// Liquidity capitalization in the pricing quote denom. May be zero.
	pub liquidity_cap: Decimal,
	#[serde(default)]
	pub spread_factor: Decimal,
}

impl Pool {
	pub fn new(id: u64, model: PoolModel, denoms: Vec<String>, liquidity_cap: Decimal) -> Self {
		Self {
			id,
			model,
			denoms,
			balances: Vec::new(),
			liquidity_cap,
			spread_factor: Decimal::ZERO,
		}
	}

	pub fn with_balances(mut self, balances: Vec<Coin>) -> Self {
		self.balances = balances;
		self
	}

	pub fn cosmwasm_model(&self) -> Option<&CosmWasmPoolModel> {
		match &self.model {
			PoolModel::CosmWasm(model) => Some(model),
			_ => None,
		}
	}

	pub fn orderbook_data(&self) -> Option<&OrderbookData> {
		match self.cosmwasm_model().map(|m| &m.contract) {
			Some(CosmWasmContract::Orderbook(data)) => Some(data),
			_ => None,
		}
	}
}

/// Capabilities the route engine needs from a pool.
pub trait PoolInfo {
	fn id(&self) -> u64;
	fn pool_type(&self) -> PoolType;
	fn pool_denoms(&self) -> &[String];
	fn liquidity_cap(&self) -> Decimal;
	fn balance_of(&self, denom: &str) -> u128;
	fn is_orderbook(&self) -> bool;

	/// True for pools whose balances do not reflect what they can absorb.
	fn is_alloyed(&self) -> bool;

	fn has_denom(&self, denom: &str) -> bool {
		self.pool_denoms().iter().any(|d| d == denom)
	}
}

impl PoolInfo for Pool {
	fn id(&self) -> u64 {
		self.id
	}

	fn pool_type(&self) -> PoolType {
		self.model.pool_type()
	}

	fn pool_denoms(&self) -> &[String] {
		&self.denoms
	}

	fn liquidity_cap(&self) -> Decimal {
		self.liquidity_cap
	}

	fn balance_of(&self, denom: &str) -> u128 {
		self.balances
			.iter()
			.filter(|coin| coin.denom == denom)
			.map(|coin| coin.amount)
			.fold(0, u128::saturating_add)
	}

	fn is_orderbook(&self) -> bool {
		self.orderbook_data().is_some()
	}

	fn is_alloyed(&self) -> bool {
		matches!(
			self.cosmwasm_model().map(|m| &m.contract),
			Some(CosmWasmContract::AlloyedTransmuter { .. })
		)
	}
}
