//! Package and price aggregation over the items shipped from one pickup
//! location.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::order::FulfillmentItem;

/// Smallest dimension (cm) the aggregator accepts for any package side.
pub const MIN_DIMENSION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub length: f64,
    pub breadth: f64,
    pub height: f64,
    pub weight: f64,
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self {
            length: MIN_DIMENSION,
            breadth: MIN_DIMENSION,
            height: MIN_DIMENSION,
            weight: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub sub_total: f64,
    pub discount: f64,
    pub total_discount: f64,
    pub shipping_charges: f64,
    pub giftwrap_charges: f64,
    pub transaction_charges: f64,
}

/// Combine items into a single package.
///
/// Weight is the sum of variant weight times shipped quantity. Each side is
/// the largest item side, never below [`MIN_DIMENSION`]. Breadth is taken
/// from the variant width.
pub fn aggregate_package(items: &[FulfillmentItem]) -> PackageInfo {
    items.iter().fold(PackageInfo::default(), |mut acc, fi| {
        let v = &fi.item.variant;
        acc.weight += v.weight.unwrap_or(0.0) * f64::from(fi.quantity);
        acc.length = acc.length.max(v.length.unwrap_or(0.0));
        acc.breadth = acc.breadth.max(v.width.unwrap_or(0.0));
        acc.height = acc.height.max(v.height.unwrap_or(0.0));
        acc
    })
}

/// Sum item prices in `currency_code` and per-line discounts.
///
/// Fails when any variant has no price in the currency.
pub fn aggregate_price(
    items: &[FulfillmentItem],
    currency_code: &str,
    shipping_charges: f64,
) -> Result<PriceInfo, CoreError> {
    let mut sub_total = 0.0;
    let mut discount = 0.0;

    for fi in items {
        let price = fi.item.variant.price_in(currency_code).ok_or_else(|| {
            CoreError::Validation(format!(
                "No {} price for variant {}",
                currency_code.to_uppercase(),
                fi.item.variant.id
            ))
        })?;
        sub_total += price.amount * f64::from(fi.quantity);
        discount += fi.item.discount_total.unwrap_or(0.0);
    }

    Ok(PriceInfo {
        sub_total,
        discount,
        total_discount: discount,
        shipping_charges,
        giftwrap_charges: 0.0,
        transaction_charges: 0.0,
    })
}
