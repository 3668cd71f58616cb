pub mod invoice;
pub mod invoice_line;
pub mod payment;
pub mod promotion;
pub mod rental_order;
pub mod rental_status_history;
pub mod sequence;
pub mod vehicle;
pub mod vehicle_history;
