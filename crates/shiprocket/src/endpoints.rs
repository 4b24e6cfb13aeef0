//! Paths of the aggregator endpoints, relative to the configured base URL.

pub const LOGIN: &str = "auth/login";
pub const CHANNELS: &str = "channels";
pub const PICKUP_ADDRESSES: &str = "settings/company/pickup";
pub const ADD_PICKUP_ADDRESS: &str = "settings/company/addpickup";
pub const CREATE_ADHOC_ORDER: &str = "orders/create/adhoc";
pub const CREATE_RETURN_ORDER: &str = "orders/create/return";
pub const CANCEL_ORDERS: &str = "orders/cancel";
pub const CANCEL_SHIPMENTS: &str = "orders/cancel/shipment/awbs";
pub const PRINT_INVOICE: &str = "orders/print/invoice";
pub const ASSIGN_AWB: &str = "courier/assign/awb";
pub const GENERATE_LABEL: &str = "courier/generate/label";
pub const GENERATE_PICKUP: &str = "courier/generate/pickup";
pub const SERVICEABILITY: &str = "courier/serviceability";
pub const INTERNATIONAL_SERVICEABILITY: &str = "courier/international/serviceability";
pub const GENERATE_MANIFEST: &str = "manifests/generate";
pub const PRINT_MANIFEST: &str = "manifests/print";
pub const QUICK_FORWARD_SHIPMENT: &str = "shipments/create/forward-shipment";
