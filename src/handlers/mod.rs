pub mod actor;
pub mod invoices;
pub mod payments;
pub mod promotions;
pub mod rental_orders;
pub mod vehicles;

use std::sync::Arc;

use crate::{
    db::DbPool,
    events::EventSender,
    services::{
        history::HistoryService, invoicing::InvoiceService, payments::PaymentService,
        pricing::PricingService, promotions::PromotionService, rental_orders::RentalOrderService,
        vehicles::VehicleService,
    },
};

/// Service container wired once at startup and cloned into the app state.
#[derive(Clone)]
pub struct AppServices {
    pub rental_orders: Arc<RentalOrderService>,
    pub pricing: Arc<PricingService>,
    pub promotions: Arc<PromotionService>,
    pub invoices: Arc<InvoiceService>,
    pub payments: Arc<PaymentService>,
    pub vehicles: Arc<VehicleService>,
    pub history: Arc<HistoryService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let promotions = Arc::new(PromotionService::new(db.clone()));
        let pricing = Arc::new(PricingService::new(db.clone(), promotions.clone()));
        let rental_orders = Arc::new(RentalOrderService::new(
            db.clone(),
            pricing.clone(),
            promotions.clone(),
            event_sender.clone(),
        ));
        let invoices = Arc::new(InvoiceService::new(db.clone(), event_sender.clone()));
        let payments = Arc::new(PaymentService::new(db.clone(), event_sender.clone()));
        let vehicles = Arc::new(VehicleService::new(db.clone(), event_sender));
        let history = Arc::new(HistoryService::new(db));

        Self {
            rental_orders,
            pricing,
            promotions,
            invoices,
            payments,
            vehicles,
            history,
        }
    }
}
