use super::balances::BalanceRecord;
use std::collections::{HashMap, HashSet};

/// Outcome of one remote lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Pending,
    Succeeded(T),
    Failed(String),
}

impl<T> Default for Lookup<T> {
    fn default() -> Self {
        Lookup::Pending
    }
}

impl<T> Lookup<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Lookup::Succeeded(value) => Some(value),
            Lookup::Pending | Lookup::Failed(_) => None,
        }
    }

    /// Records a resolution. A failure never discards an earlier success.
    fn resolve(&mut self, result: Result<T, String>) {
        match result {
            Ok(value) => *self = Lookup::Succeeded(value),
            Err(reason) => {
                if !matches!(self, Lookup::Succeeded(_)) {
                    *self = Lookup::Failed(reason);
                }
            }
        }
    }
}

/// What one table row shows for an address.
#[derive(Debug, Clone, PartialEq)]
pub enum RowView<'a> {
    Resolved {
        address: &'a str,
        wei: u128,
        price: f64,
        usd: f64,
    },
    Loading {
        address: &'a str,
    },
    Failed {
        address: &'a str,
        reason: &'a str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub balance: f64,
    /// Absent until a non-zero balance and a price are both known.
    pub usd: Option<f64>,
}

/// Cached balance and price lookups for the mounted addresses view.
#[derive(Debug, Default)]
pub struct Portfolio {
    balances: HashMap<String, Lookup<BalanceRecord>>,
    price: Lookup<f64>,
    balances_in_flight: HashSet<String>,
    price_in_flight: bool,
}

impl Portfolio {
    /// Marks a balance fetch for `address` as issued. `false` if one is already running.
    pub fn begin_balance_fetch(&mut self, address: &str) -> bool {
        self.balances_in_flight.insert(address.to_string())
    }

    pub fn begin_price_fetch(&mut self) -> bool {
        !std::mem::replace(&mut self.price_in_flight, true)
    }

    pub fn on_balance_response(&mut self, address: &str, result: Result<BalanceRecord, String>) {
        self.balances_in_flight.remove(address);
        self.balances
            .entry(address.to_string())
            .or_default()
            .resolve(result);
    }

    /// `Ok(None)` means the ticker had no usable price: the price stays as it was.
    pub fn on_price_response(&mut self, result: Result<Option<f64>, String>) {
        self.price_in_flight = false;
        match result {
            Ok(Some(price)) => self.price.resolve(Ok(price)),
            Ok(None) => {}
            Err(reason) => self.price.resolve(Err(reason)),
        }
    }

    pub fn balance(&self, address: &str) -> Option<&BalanceRecord> {
        self.balances.get(address).and_then(Lookup::value)
    }

    pub fn price(&self) -> Option<f64> {
        self.price.value().copied()
    }

    pub fn price_lookup(&self) -> &Lookup<f64> {
        &self.price
    }

    pub fn in_flight(&self) -> usize {
        self.balances_in_flight.len() + usize::from(self.price_in_flight)
    }

    pub fn is_fetching(&self, address: &str) -> bool {
        self.balances_in_flight.contains(address)
    }

    /// Distinct addresses with no resolved record and no fetch running, in list order.
    /// Failed lookups count as missing.
    pub fn missing<'a>(&self, addresses: &'a [String]) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        addresses
            .iter()
            .map(String::as_str)
            .filter(|address| seen.insert(*address))
            .filter(|address| {
                self.balance(address).is_none() && !self.balances_in_flight.contains(*address)
            })
            .collect()
    }

    pub fn row<'a>(&'a self, address: &'a str) -> RowView<'a> {
        let balance = self.balances.get(address);
        if let Some(Lookup::Failed(reason)) = balance {
            return RowView::Failed {
                address,
                reason: reason.as_str(),
            };
        }
        match (balance.and_then(Lookup::value), &self.price) {
            (Some(record), Lookup::Succeeded(price)) => {
                RowView::Resolved {
                    address,
                    wei: record.final_balance,
                    price: *price,
                    usd: record.ether() * price,
                }
            }
            (_, Lookup::Failed(reason)) => RowView::Failed {
                address,
                reason: reason.as_str(),
            },
            _ => RowView::Loading { address },
        }
    }

    /// Sums over `addresses` in list order, so duplicates count once per entry.
    pub fn totals(&self, addresses: &[String]) -> Totals {
        let balance: f64 = addresses
            .iter()
            .filter_map(|address| self.balance(address))
            .map(BalanceRecord::ether)
            .sum();
        let usd = match self.price() {
            Some(price) if balance != 0.0 && price != 0.0 => Some(balance * price),
            _ => None,
        };
        Totals { balance, usd }
    }
}
