//! Plain-text offer rendering for the terminal.

use std::io::Write;

use funnel_core::{OfferPresenter, OfferView};
use tracing::warn;

/// Writes each offer as a short block of text.
pub struct ConsolePresenter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

/// Text block for one offer.
pub fn render(view: &OfferView) -> String {
    let mut text = format!("[{}] {}\n", view.tier.as_str().to_uppercase(), view.headline);
    if view.is_free() {
        text.push_str(&format!("  {} - free, no checkout\n", view.sku));
    } else {
        text.push_str(&format!("  {} - {}", view.sku, view.price_label()));
        if view.supply_days > 0 {
            text.push_str(&format!(" ({}-day supply)", view.supply_days));
        }
        text.push('\n');
    }
    text
}

impl<W: Write + Send> OfferPresenter for ConsolePresenter<W> {
    fn show(&mut self, view: &OfferView) {
        if let Err(e) = self.out.write_all(render(view).as_bytes()) {
            warn!(tier = %view.tier, error = %e, "Failed to render offer");
        }
    }
}
