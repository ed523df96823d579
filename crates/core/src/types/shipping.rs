//! Flat-rate shipping table.
//!
//! Shipping fees are a static per-region price list, not something the
//! backend serves: couriers quote Policrómica a flat rate per
//! administrative region and the table changes a few times a year at
//! most.
//!
//! A quote of zero means "no region resolved yet" - checkout must stay
//! disabled in that state. It never means free shipping.

use serde::{Deserialize, Serialize};

use super::money::Money;

/// Broad courier pricing band a region falls into. Informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Norte,
    Centro,
    Sur,
    Austral,
}

impl Zone {
    /// Display label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Norte => "Norte",
            Self::Centro => "Centro",
            Self::Sur => "Sur",
            Self::Austral => "Austral",
        }
    }
}

/// One row of the shipping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingRegion {
    /// Unique display label; also the selection key in the checkout form.
    pub name: &'static str,
    /// Courier pricing band.
    pub zone: Zone,
    /// Flat fee in whole pesos.
    pub price: Money,
}

/// Per-region flat rates, north to south.
const REGIONS: &[ShippingRegion] = &[
    ShippingRegion { name: "Arica y Parinacota", zone: Zone::Norte, price: Money::new(6900) },
    ShippingRegion { name: "Tarapacá", zone: Zone::Norte, price: Money::new(6500) },
    ShippingRegion { name: "Antofagasta", zone: Zone::Norte, price: Money::new(5900) },
    ShippingRegion { name: "Atacama", zone: Zone::Norte, price: Money::new(5500) },
    ShippingRegion { name: "Coquimbo", zone: Zone::Norte, price: Money::new(4900) },
    ShippingRegion { name: "Valparaíso", zone: Zone::Centro, price: Money::new(4300) },
    ShippingRegion { name: "Región Metropolitana", zone: Zone::Centro, price: Money::new(4300) },
    ShippingRegion { name: "O'Higgins", zone: Zone::Centro, price: Money::new(4500) },
    ShippingRegion { name: "Maule", zone: Zone::Centro, price: Money::new(4900) },
    ShippingRegion { name: "Ñuble", zone: Zone::Sur, price: Money::new(5200) },
    ShippingRegion { name: "Biobío", zone: Zone::Sur, price: Money::new(5200) },
    ShippingRegion { name: "La Araucanía", zone: Zone::Sur, price: Money::new(5500) },
    ShippingRegion { name: "Los Ríos", zone: Zone::Sur, price: Money::new(5900) },
    ShippingRegion { name: "Los Lagos", zone: Zone::Sur, price: Money::new(5900) },
    ShippingRegion { name: "Aysén", zone: Zone::Austral, price: Money::new(7900) },
    ShippingRegion { name: "Magallanes", zone: Zone::Austral, price: Money::new(8900) },
];

/// The shipping table in declaration order (north to south), for
/// rendering the region selector.
#[must_use]
pub const fn regions() -> &'static [ShippingRegion] {
    REGIONS
}

/// Quote the flat shipping fee for a region selection.
///
/// Exact-name lookup. An empty or unknown name quotes
/// [`Money::zero()`], which callers must treat as "shipping not yet
/// determined" and keep checkout submission disabled.
#[must_use]
pub fn quote(region_name: &str) -> Money {
    REGIONS
        .iter()
        .find(|r| r.name == region_name)
        .map_or_else(Money::zero, |r| r.price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_metropolitana() {
        assert_eq!(quote("Región Metropolitana"), Money::new(4300));
    }

    #[test]
    fn test_quote_unknown_or_empty_is_zero() {
        assert_eq!(quote(""), Money::zero());
        assert_eq!(quote("Región Inexistente"), Money::zero());
        // Lookup is exact, not case-insensitive.
        assert_eq!(quote("región metropolitana"), Money::zero());
    }

    #[test]
    fn test_every_region_quotes_positive() {
        for region in regions() {
            assert!(
                quote(region.name).amount() > 0,
                "region {} must have a positive fee",
                region.name
            );
        }
    }

    #[test]
    fn test_region_names_are_unique() {
        for (i, a) in regions().iter().enumerate() {
            for b in regions().iter().skip(i + 1) {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_sixteen_regions() {
        assert_eq!(regions().len(), 16);
    }
}
