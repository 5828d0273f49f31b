//! What each tier's offer view shows.

use serde::Serialize;

use super::tier::Tier;

/// Display data for one tier's offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferView {
    pub tier: Tier,
    pub sku: &'static str,
    pub headline: &'static str,
    /// Price in cents. Zero for the free tier.
    pub price_cents: u32,
    /// Days of product supplied; zero for non-physical offers.
    pub supply_days: u16,
    pub requires_checkout: bool,
}

impl OfferView {
    pub fn is_free(&self) -> bool {
        self.price_cents == 0
    }

    /// Price formatted as dollars, e.g. `"$49.00"`.
    pub fn price_label(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

/// One offer view per tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferCatalog {
    views: [OfferView; 4],
}

impl OfferCatalog {
    /// Build a catalog. Views are matched to tiers by their `tier` field; a
    /// tier without a view falls back to the default catalog's entry.
    pub fn new(views: impl IntoIterator<Item = OfferView>) -> Self {
        let mut catalog = Self::default();
        for view in views {
            let slot = Self::slot(view.tier);
            catalog.views[slot] = view;
        }
        catalog
    }

    fn slot(tier: Tier) -> usize {
        match tier {
            Tier::Premium => 0,
            Tier::Regular => 1,
            Tier::Digital => 2,
            Tier::Free => 3,
        }
    }

    pub fn view(&self, tier: Tier) -> &OfferView {
        &self.views[Self::slot(tier)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &OfferView> {
        self.views.iter()
    }
}

impl Default for OfferCatalog {
    fn default() -> Self {
        Self {
            views: [
                OfferView {
                    tier: Tier::Premium,
                    sku: "VITAL-6MO-BUNDLE",
                    headline: "Six-month protocol with coaching check-ins",
                    price_cents: 24_900,
                    supply_days: 180,
                    requires_checkout: true,
                },
                OfferView {
                    tier: Tier::Regular,
                    sku: "VITAL-3MO",
                    headline: "Three-month supply of your personalised blend",
                    price_cents: 13_900,
                    supply_days: 90,
                    requires_checkout: true,
                },
                OfferView {
                    tier: Tier::Digital,
                    sku: "VITAL-GUIDE",
                    headline: "Digital nutrition guide and 30-day plan",
                    price_cents: 1_900,
                    supply_days: 0,
                    requires_checkout: true,
                },
                OfferView {
                    tier: Tier::Free,
                    sku: "VITAL-REPORT",
                    headline: "Your free wellness report by email",
                    price_cents: 0,
                    supply_days: 0,
                    requires_checkout: false,
                },
            ],
        }
    }
}
