pub mod errors;
pub mod db;
pub mod move_task_order;
pub mod address;
pub mod mto_shipment;
pub mod mto_service_item;
pub mod service_item_dimension;
pub mod service_item_customer_contact;

#[cfg(test)]
mod tests;
