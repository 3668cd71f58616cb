use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        invoice::{self, Entity as InvoiceEntity, InvoiceStatus, Model as InvoiceModel},
        invoice_line,
        rental_order::{self, Entity as RentalOrderEntity, RentalOrderStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        history,
        sequences::{self, INVOICE_PREFIX},
    },
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInvoiceRequest {
    /// Percentage, e.g. `10` for 10% VAT.
    pub tax_rate: Decimal,
    pub due_date: NaiveDate,
    /// Additional invoice-level discount on top of the order total.
    #[serde(default)]
    pub discount_amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateInvoiceRequest {
    pub tax_rate: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub discount_amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct InvoiceService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl InvoiceService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Derive an invoice from a Completed rental order. The order moves to
    /// Invoiced in the same transaction, which makes it terminal.
    #[instrument(skip(self, request), fields(rental_order_id = %rental_order_id))]
    pub async fn create_from_rental(
        &self,
        rental_order_id: Uuid,
        request: CreateInvoiceRequest,
        actor_id: Option<Uuid>,
    ) -> Result<InvoiceModel, ServiceError> {
        request.validate().map_err(ServiceError::from)?;
        if request.tax_rate < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Tax rate must not be negative".to_string(),
            ));
        }
        if request.discount_amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Discount must not be negative".to_string(),
            ));
        }

        let order = RentalOrderEntity::find_by_id(rental_order_id)
            .filter(rental_order::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Rental order {} not found", rental_order_id))
            })?;
        if order.status != RentalOrderStatus::Completed {
            return Err(ServiceError::InvalidState(format!(
                "Only Completed orders can be invoiced, this order is {}",
                order.status
            )));
        }

        let existing = InvoiceEntity::find()
            .filter(invoice::Column::RentalOrderId.eq(rental_order_id))
            .filter(invoice::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::BusinessRule(format!(
                "Order {} already has an invoice",
                order.order_number
            )));
        }

        let sub_total = order.total_amount - request.discount_amount;
        let tax_amount = sub_total * request.tax_rate / Decimal::from(100);
        let total_amount = sub_total + tax_amount;

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let now = Utc::now();
        let invoice_number =
            sequences::next_document_number(&txn, INVOICE_PREFIX, now.date_naive()).await?;

        let model = invoice::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_number: Set(invoice_number),
            rental_order_id: Set(order.id),
            customer_id: Set(order.customer_id),
            invoice_date: Set(now.date_naive()),
            due_date: Set(request.due_date),
            sub_total: Set(sub_total),
            tax_rate: Set(request.tax_rate),
            tax_amount: Set(tax_amount),
            discount_amount: Set(request.discount_amount),
            total_amount: Set(total_amount),
            paid_amount: Set(Decimal::ZERO),
            remaining_amount: Set(total_amount),
            status: Set(compute_status(
                Decimal::ZERO,
                total_amount,
                request.due_date,
                now.date_naive(),
            )),
            notes: Set(request.notes),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = model.insert(&txn).await?;

        let line = invoice_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(created.id),
            description: Set(format!(
                "Vehicle rental {} ({} to {})",
                order.order_number, order.start_date, order.end_date
            )),
            quantity: Set(order.total_days),
            unit_price: Set(order.daily_rate),
            amount: Set(order.total_amount),
            created_at: Set(now),
        };
        line.insert(&txn).await?;

        let old_status = order.status.clone();
        let order_id = order.id;
        let mut order_active: rental_order::ActiveModel = order.into();
        order_active.status = Set(RentalOrderStatus::Invoiced);
        order_active.updated_at = Set(Some(now));
        order_active.update(&txn).await?;

        history::record_order_transition(
            &txn,
            order_id,
            Some(old_status),
            RentalOrderStatus::Invoiced,
            actor_id,
            Some(format!("Invoice {} issued", created.invoice_number)),
        )
        .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(invoice_id = %created.id, invoice_number = %created.invoice_number, "invoice created");
        self.event_sender
            .emit(Event::InvoiceCreated {
                invoice_id: created.id,
                rental_order_id: order_id,
                total_amount,
            })
            .await;

        Ok(created)
    }

    /// Re-derive amounts from the linked order with new discount/tax inputs.
    /// Blocked once the invoice is Paid or Cancelled.
    #[instrument(skip(self, request), fields(invoice_id = %id))]
    pub async fn update_invoice(
        &self,
        id: Uuid,
        request: UpdateInvoiceRequest,
    ) -> Result<InvoiceModel, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        let inv = self.get_invoice(id).await?;
        if matches!(inv.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) {
            return Err(ServiceError::InvalidState(format!(
                "A {} invoice cannot be updated",
                inv.status
            )));
        }

        let order = RentalOrderEntity::find_by_id(inv.rental_order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Rental order {} not found", inv.rental_order_id))
            })?;

        let tax_rate = request.tax_rate.unwrap_or(inv.tax_rate);
        let due_date = request.due_date.unwrap_or(inv.due_date);
        let discount_amount = request.discount_amount.unwrap_or(inv.discount_amount);
        if tax_rate < Decimal::ZERO || discount_amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Tax rate and discount must not be negative".to_string(),
            ));
        }

        let sub_total = order.total_amount - discount_amount;
        let tax_amount = sub_total * tax_rate / Decimal::from(100);
        let total_amount = sub_total + tax_amount;
        let remaining = (total_amount - inv.paid_amount).max(Decimal::ZERO);
        let status = compute_status(inv.paid_amount, total_amount, due_date, Utc::now().date_naive());

        let paid_amount = inv.paid_amount;
        let mut active: invoice::ActiveModel = inv.into();
        active.tax_rate = Set(tax_rate);
        active.due_date = Set(due_date);
        active.discount_amount = Set(discount_amount);
        active.sub_total = Set(sub_total);
        active.tax_amount = Set(tax_amount);
        active.total_amount = Set(total_amount);
        active.paid_amount = Set(paid_amount);
        active.remaining_amount = Set(remaining);
        active.status = Set(status);
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    pub async fn get_invoice(&self, id: Uuid) -> Result<InvoiceModel, ServiceError> {
        InvoiceEntity::find_by_id(id)
            .filter(invoice::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {} not found", id)))
    }

    pub async fn list_invoices(
        &self,
        page: u64,
        per_page: u64,
        status: Option<InvoiceStatus>,
    ) -> Result<(Vec<InvoiceModel>, u64), ServiceError> {
        let mut query = InvoiceEntity::find().filter(invoice::Column::IsDeleted.eq(false));
        if let Some(status) = status {
            query = query.filter(invoice::Column::Status.eq(status));
        }
        let paginator = query
            .order_by_desc(invoice::Column::CreatedAt)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }
}

/// Settlement status as a pure function of the ledger. Overdue overrides
/// Unpaid and Partial once the due date has passed; a fully paid invoice is
/// never Overdue.
pub fn compute_status(
    paid: Decimal,
    total: Decimal,
    due_date: NaiveDate,
    today: NaiveDate,
) -> InvoiceStatus {
    let base = if paid >= total {
        InvoiceStatus::Paid
    } else if paid > Decimal::ZERO {
        InvoiceStatus::Partial
    } else {
        InvoiceStatus::Unpaid
    };
    if base != InvoiceStatus::Paid && due_date < today {
        InvoiceStatus::Overdue
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn unpaid_past_due_is_overdue() {
        let status = compute_status(dec!(0), dec!(1000), d(2025, 1, 1), d(2025, 1, 2));
        assert_eq!(status, InvoiceStatus::Overdue);
    }

    #[test]
    fn partial_past_due_is_overdue() {
        let status = compute_status(dec!(500), dec!(1000), d(2025, 1, 1), d(2025, 1, 2));
        assert_eq!(status, InvoiceStatus::Overdue);
    }

    #[test]
    fn partial_before_due_stays_partial() {
        let status = compute_status(dec!(500), dec!(1000), d(2025, 1, 31), d(2025, 1, 2));
        assert_eq!(status, InvoiceStatus::Partial);
    }

    #[test]
    fn fully_paid_is_never_overdue() {
        let status = compute_status(dec!(1000), dec!(1000), d(2025, 1, 1), d(2025, 1, 2));
        assert_eq!(status, InvoiceStatus::Paid);
    }

    #[test]
    fn unpaid_before_due_stays_unpaid() {
        let status = compute_status(dec!(0), dec!(1000), d(2025, 1, 31), d(2025, 1, 2));
        assert_eq!(status, InvoiceStatus::Unpaid);
    }
}
