//! Shipping options offered by the aggregator and the mode / payment
//! settings each one implies.

use serde::{Deserialize, Serialize};

/// Identifier the host uses to route fulfillments to this provider.
pub const PROVIDER_ID: &str = "shiprocket";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShippingMode {
    Surface,
    Air,
}

impl ShippingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Surface => "Surface",
            Self::Air => "Air",
        }
    }
}

impl std::fmt::Display for ShippingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method on an outbound order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Prepaid,
    Postpaid,
    #[serde(rename = "COD")]
    Cod,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prepaid => "Prepaid",
            Self::Postpaid => "Postpaid",
            Self::Cod => "COD",
        }
    }

    /// Payment method implied by a shipping option id.
    pub fn for_option_id(option_id: &str) -> Self {
        if option_id.contains("cod") {
            Self::Cod
        } else {
            Self::Prepaid
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShippingOptionKind {
    DomesticSurface,
    DomesticAir,
    DomesticSurfaceCod,
    DomesticAirCod,
    International,
}

impl ShippingOptionKind {
    pub const ALL: [Self; 5] = [
        Self::DomesticSurface,
        Self::DomesticAir,
        Self::DomesticSurfaceCod,
        Self::DomesticAirCod,
        Self::International,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::DomesticSurface => "shiprocket-india-only-domestic-surface",
            Self::DomesticAir => "shiprocket-india-only-domestic-air",
            Self::DomesticSurfaceCod => "shiprocket-india-only-domestic-surface-cod",
            Self::DomesticAirCod => "shiprocket-india-only-domestic-air-cod",
            Self::International => "shiprocket-international",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    pub fn is_domestic(&self) -> bool {
        !matches!(self, Self::International)
    }

    /// Surface for the surface variants, Air for everything else.
    pub fn mode(&self) -> ShippingMode {
        match self {
            Self::DomesticSurface | Self::DomesticSurfaceCod => ShippingMode::Surface,
            Self::DomesticAir | Self::DomesticAirCod | Self::International => ShippingMode::Air,
        }
    }

    pub fn is_cod(&self) -> bool {
        matches!(self, Self::DomesticSurfaceCod | Self::DomesticAirCod)
    }
}

/// Ids of every option this provider can fulfil.
pub fn fulfillment_option_ids() -> Vec<&'static str> {
    ShippingOptionKind::ALL.iter().map(|k| k.id()).collect()
}
