use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::media::{sort_for_display, PersistedMedia};

/// Product record as returned by the product list and editor endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub new_price: Option<Decimal>,
    #[serde(default)]
    pub currency_unit: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Embedded media gallery
    #[serde(default)]
    pub images: Vec<PersistedMedia>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Media sorted by `order`, primary first on ties.
    pub fn media_in_display_order(&self) -> Vec<PersistedMedia> {
        let mut media = self.images.clone();
        sort_for_display(&mut media);
        media
    }

    /// The primary media if one is flagged, otherwise the first in display order.
    pub fn primary_or_first(&self) -> Option<PersistedMedia> {
        let media = self.media_in_display_order();
        media
            .iter()
            .find(|m| m.is_primary)
            .or_else(|| media.first())
            .cloned()
    }
}
