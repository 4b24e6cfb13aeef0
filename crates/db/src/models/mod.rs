pub mod fulfillment;
pub mod order;
pub mod stock_location;
