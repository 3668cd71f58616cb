pub mod history;
pub mod invoicing;
pub mod payments;
pub mod pricing;
pub mod promotions;
pub mod rental_orders;
pub mod sequences;
pub mod vehicles;
