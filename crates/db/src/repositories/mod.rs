pub mod fulfillment_repo;
pub mod order_repo;
pub mod stock_location_repo;

pub use fulfillment_repo::FulfillmentRepo;
pub use order_repo::OrderRepo;
pub use stock_location_repo::StockLocationRepo;
