//! Shops and the fixed beverage lines

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the eight physical outlets. Every catalog, price and ledger record
/// is partitioned by shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shop {
    Katuwawala,
    Koswatta,
    Arawwala,
    Depanama,
    #[serde(rename = "Maharagama A")]
    MaharagamaA,
    #[serde(rename = "Maharagama B")]
    MaharagamaB,
    #[serde(rename = "Maharagama C")]
    MaharagamaC,
    #[serde(rename = "Bakery Outlet")]
    BakeryOutlet,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shop: {0}")]
pub struct UnknownShop(pub String);

impl Shop {
    pub const ALL: [Shop; 8] = [
        Shop::Katuwawala,
        Shop::Koswatta,
        Shop::Arawwala,
        Shop::Depanama,
        Shop::MaharagamaA,
        Shop::MaharagamaB,
        Shop::MaharagamaC,
        Shop::BakeryOutlet,
    ];

    /// Display name, also the value stored in the `shop` field of every document
    pub fn name(&self) -> &'static str {
        match self {
            Shop::Katuwawala => "Katuwawala",
            Shop::Koswatta => "Koswatta",
            Shop::Arawwala => "Arawwala",
            Shop::Depanama => "Depanama",
            Shop::MaharagamaA => "Maharagama A",
            Shop::MaharagamaB => "Maharagama B",
            Shop::MaharagamaC => "Maharagama C",
            Shop::BakeryOutlet => "Bakery Outlet",
        }
    }

    /// Position in [`Shop::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_name(name: &str) -> Option<Shop> {
        Shop::ALL.iter().copied().find(|shop| shop.name() == name)
    }
}

impl Default for Shop {
    fn default() -> Self {
        Shop::ALL[0]
    }
}

impl std::fmt::Display for Shop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Shop {
    type Err = UnknownShop;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shop::from_name(s.trim()).ok_or_else(|| UnknownShop(s.to_string()))
    }
}

/// Beverages sold from counter machines. They are tracked by a cumulative
/// counter per shop rather than by stock movements, and never appear in a
/// shop's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Beverage {
    Nescafe,
    Nestea,
}

impl Beverage {
    pub const ALL: [Beverage; 2] = [Beverage::Nescafe, Beverage::Nestea];

    pub fn name(&self) -> &'static str {
        match self {
            Beverage::Nescafe => "Nescafe",
            Beverage::Nestea => "Nestea",
        }
    }

    pub fn from_name(name: &str) -> Option<Beverage> {
        Beverage::ALL.iter().copied().find(|b| b.name() == name)
    }
}

impl std::fmt::Display for Beverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// True if `name` is one of the fixed beverage lines
pub fn is_beverage_name(name: &str) -> bool {
    Beverage::from_name(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_names_round_trip() {
        for shop in Shop::ALL {
            assert_eq!(shop.name().parse::<Shop>().unwrap(), shop);
        }
        assert_eq!(Shop::ALL.len(), 8);
    }

    #[test]
    fn test_shop_index_matches_position() {
        for (i, shop) in Shop::ALL.iter().enumerate() {
            assert_eq!(shop.index(), i);
        }
    }

    #[test]
    fn test_shop_serializes_as_display_name() {
        let json = serde_json::to_string(&Shop::MaharagamaB).unwrap();
        assert_eq!(json, "\"Maharagama B\"");
    }

    #[test]
    fn test_unknown_shop() {
        assert!("Colombo".parse::<Shop>().is_err());
    }

    #[test]
    fn test_beverage_names() {
        assert!(is_beverage_name("Nescafe"));
        assert!(is_beverage_name("Nestea"));
        assert!(!is_beverage_name("nescafe"));
        assert!(!is_beverage_name("Bun"));
    }
}
