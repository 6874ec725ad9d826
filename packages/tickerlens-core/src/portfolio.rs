//! Portfolio holdings and valuation against chart quotes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A stock position held by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    /// Ticker symbol, uppercased
    pub symbol: String,
    /// Number of shares held
    pub shares: f64,
    /// Average cost per share
    pub cost_basis: f64,
}

impl Holding {
    pub fn new(symbol: &str, shares: f64, cost_basis: f64) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            shares,
            cost_basis,
        }
    }

    /// Total amount paid for the position.
    pub fn cost(&self) -> f64 {
        self.shares * self.cost_basis
    }
}

/// The list of holdings, as stored on the device.
///
/// Serializes as a plain JSON array of holdings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Holdings {
    holdings: Vec<Holding>,
}

fn validate_amounts(shares: f64, cost_basis: f64) -> Result<()> {
    if !shares.is_finite() || shares <= 0.0 {
        return Err(Error::InvalidOperation(format!(
            "shares must be positive, got {}",
            shares
        )));
    }
    if !cost_basis.is_finite() || cost_basis < 0.0 {
        return Err(Error::InvalidOperation(format!(
            "cost basis must be non-negative, got {}",
            cost_basis
        )));
    }
    Ok(())
}

impl Holdings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the stored JSON array.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn all(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Find a holding by symbol (case-insensitive).
    pub fn find(&self, symbol: &str) -> Option<&Holding> {
        let symbol = symbol.trim().to_uppercase();
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    fn index_of(&self, symbol: &str) -> Option<usize> {
        self.holdings.iter().position(|h| h.symbol == symbol)
    }

    /// Add shares of a symbol.
    ///
    /// An existing holding is cost-averaged:
    /// - New total shares = old shares + new shares
    /// - New avg cost = (old_shares * old_cost + new_shares * new_cost) / total_shares
    ///
    /// Returns the resulting holding and whether an existing one was updated.
    pub fn add(&mut self, symbol: &str, shares: f64, cost_basis: f64) -> Result<(Holding, bool)> {
        validate_amounts(shares, cost_basis)?;
        let holding = Holding::new(symbol, shares, cost_basis);

        match self.index_of(&holding.symbol) {
            Some(idx) => {
                let existing = &self.holdings[idx];
                let total_shares = existing.shares + shares;
                let avg_cost = (existing.cost() + holding.cost()) / total_shares;

                let updated = Holding::new(&holding.symbol, total_shares, avg_cost);
                self.holdings[idx] = updated.clone();
                Ok((updated, true))
            }
            None => {
                self.holdings.push(holding.clone());
                Ok((holding, false))
            }
        }
    }

    /// Remove a holding, returning it.
    pub fn remove(&mut self, symbol: &str) -> Result<Holding> {
        let symbol = symbol.trim().to_uppercase();
        match self.index_of(&symbol) {
            Some(idx) => Ok(self.holdings.remove(idx)),
            None => Err(Error::HoldingNotFound(symbol)),
        }
    }

    /// Set the share count of a holding.
    ///
    /// A count of zero or less removes the holding; `Ok(None)` is returned then.
    pub fn update_shares(&mut self, symbol: &str, shares: f64) -> Result<Option<Holding>> {
        if !shares.is_finite() {
            return Err(Error::InvalidOperation(format!(
                "shares must be finite, got {}",
                shares
            )));
        }

        if shares <= 0.0 {
            self.remove(symbol)?;
            return Ok(None);
        }

        let symbol = symbol.trim().to_uppercase();
        match self.index_of(&symbol) {
            Some(idx) => {
                self.holdings[idx].shares = shares;
                Ok(Some(self.holdings[idx].clone()))
            }
            None => Err(Error::HoldingNotFound(symbol)),
        }
    }

    /// Total cost basis of all holdings.
    pub fn total_cost(&self) -> f64 {
        self.holdings.iter().map(Holding::cost).sum()
    }
}

/// Valuation of one holding at a quote.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HoldingValuation {
    pub symbol: String,
    pub shares: f64,
    pub cost_basis: f64,
    /// Latest quote; `None` when no quote was available
    pub price: Option<f64>,
    pub cost: f64,
    /// Shares at the quote, or the cost when unpriced
    pub market_value: f64,
    pub gain_loss: f64,
    pub gain_loss_percent: f64,
}

/// Portfolio totals plus per-holding figures.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortfolioValuation {
    pub holdings: Vec<HoldingValuation>,
    pub total_cost: f64,
    pub total_value: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    /// Symbols with no usable quote
    pub unpriced: Vec<String>,
}

fn percent_of(gain: f64, cost: f64) -> f64 {
    if cost != 0.0 {
        (gain / cost) * 100.0
    } else {
        0.0
    }
}

/// Value holdings at `quotes` (symbol to last close, e.g. from
/// [`Series::last_close`](crate::chart::Series::last_close)).
///
/// Quote keys are matched case-insensitively. Holdings without a finite quote
/// are carried at cost and listed in `unpriced`.
pub fn valuate(holdings: &Holdings, quotes: &HashMap<String, f64>) -> PortfolioValuation {
    let quotes: HashMap<String, f64> = quotes
        .iter()
        .filter(|(_, price)| price.is_finite())
        .map(|(symbol, price)| (symbol.trim().to_uppercase(), *price))
        .collect();

    let mut unpriced = Vec::new();
    let rows: Vec<HoldingValuation> = holdings
        .all()
        .iter()
        .map(|holding| {
            let price = quotes.get(&holding.symbol).copied();
            let cost = holding.cost();
            let market_value = match price {
                Some(price) => holding.shares * price,
                None => {
                    unpriced.push(holding.symbol.clone());
                    cost
                }
            };
            let gain_loss = market_value - cost;

            HoldingValuation {
                symbol: holding.symbol.clone(),
                shares: holding.shares,
                cost_basis: holding.cost_basis,
                price,
                cost,
                market_value,
                gain_loss,
                gain_loss_percent: percent_of(gain_loss, cost),
            }
        })
        .collect();

    let total_cost: f64 = rows.iter().map(|r| r.cost).sum();
    let total_value: f64 = rows.iter().map(|r| r.market_value).sum();
    let total_gain_loss = total_value - total_cost;

    PortfolioValuation {
        holdings: rows,
        total_cost,
        total_value,
        total_gain_loss,
        total_gain_loss_percent: percent_of(total_gain_loss, total_cost),
        unpriced,
    }
}
