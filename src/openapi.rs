use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{handlers, services};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rental API",
        description = "Vehicle-rental order lifecycle, invoicing and payment reconciliation"
    ),
    paths(
        handlers::rental_orders::create_order,
        handlers::rental_orders::list_orders,
        handlers::rental_orders::get_order,
        handlers::rental_orders::update_order,
        handlers::rental_orders::delete_order,
        handlers::rental_orders::confirm_order,
        handlers::rental_orders::start_rental,
        handlers::rental_orders::complete_rental,
        handlers::rental_orders::cancel_order,
        handlers::rental_orders::order_history,
        handlers::rental_orders::calculate_price,
        handlers::invoices::create_from_rental,
        handlers::invoices::list_invoices,
        handlers::invoices::get_invoice,
        handlers::invoices::update_invoice,
        handlers::payments::create_payment,
        handlers::payments::get_payment,
        handlers::payments::update_payment,
        handlers::payments::delete_payment,
        handlers::payments::list_invoice_payments,
        handlers::promotions::create_promotion,
        handlers::promotions::list_promotions,
        handlers::promotions::get_promotion,
        handlers::promotions::validate_promotion,
        handlers::vehicles::create_vehicle,
        handlers::vehicles::list_vehicles,
        handlers::vehicles::get_vehicle,
        handlers::vehicles::change_vehicle_status,
        handlers::vehicles::vehicle_history,
    ),
    components(schemas(
        handlers::rental_orders::CalculatePriceRequest,
        handlers::promotions::ValidatePromotionRequest,
        services::rental_orders::CreateRentalOrderRequest,
        services::rental_orders::UpdateRentalOrderRequest,
        services::rental_orders::CompleteRentalRequest,
        services::rental_orders::CancelRentalRequest,
        services::invoicing::CreateInvoiceRequest,
        services::invoicing::UpdateInvoiceRequest,
        services::payments::CreatePaymentRequest,
        services::payments::UpdatePaymentRequest,
        services::promotions::CreatePromotionRequest,
        services::promotions::PromotionValidation,
        services::vehicles::CreateVehicleRequest,
        services::vehicles::ChangeVehicleStatusRequest,
        services::pricing::PriceQuote,
        crate::entities::rental_order::RentalOrderStatus,
        crate::entities::vehicle::VehicleStatus,
        crate::entities::invoice::InvoiceStatus,
        crate::entities::payment::PaymentMethod,
        crate::entities::promotion::PromotionStatus,
        crate::entities::promotion::PromotionType,
        crate::errors::ErrorResponse,
    )),
    tags(
        (name = "rental-orders", description = "Rental order lifecycle and pricing"),
        (name = "invoices", description = "Invoice derivation and updates"),
        (name = "payments", description = "Payment ledger"),
        (name = "promotions", description = "Promotion codes"),
        (name = "vehicles", description = "Fleet surface used by the workflow"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/docs`, spec at `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
