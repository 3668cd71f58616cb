use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
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
        payment::{self, Entity as PaymentEntity, Model as PaymentModel, PaymentMethod},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        invoicing::compute_status,
        sequences::{self, PAYMENT_PREFIX},
    },
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentRequest {
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub bank_account: Option<String>,
    pub transaction_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentRequest {
    pub amount: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub method: Option<PaymentMethod>,
    pub bank_account: Option<String>,
    pub transaction_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PaymentService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Record a payment against an open invoice. The invoice ledger and
    /// status are re-derived in the same transaction, keeping
    /// `paid + remaining == total`.
    #[instrument(skip(self, request), fields(invoice_id = %request.invoice_id))]
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentModel, ServiceError> {
        request.validate().map_err(ServiceError::from)?;
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Payment amount must be positive".to_string(),
            ));
        }

        let inv = self.load_invoice(request.invoice_id).await?;
        if matches!(inv.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) {
            return Err(ServiceError::InvalidState(format!(
                "A {} invoice cannot accept payments",
                inv.status
            )));
        }
        if request.amount > inv.remaining_amount {
            return Err(ServiceError::BusinessRule(format!(
                "Payment amount {} exceeds remaining balance {}",
                request.amount, inv.remaining_amount
            )));
        }

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let now = Utc::now();
        let payment_number =
            sequences::next_document_number(&txn, PAYMENT_PREFIX, now.date_naive()).await?;

        let model = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            payment_number: Set(payment_number),
            invoice_id: Set(request.invoice_id),
            amount: Set(request.amount),
            payment_date: Set(request.payment_date),
            method: Set(request.method),
            bank_account: Set(request.bank_account),
            transaction_code: Set(request.transaction_code),
            notes: Set(request.notes),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = model.insert(&txn).await?;

        apply_ledger_delta(&txn, inv, created.amount).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(payment_id = %created.id, payment_number = %created.payment_number, "payment recorded");
        self.event_sender
            .emit(Event::PaymentRecorded {
                payment_id: created.id,
                invoice_id: created.invoice_id,
                amount: created.amount,
                recorded_at: now,
            })
            .await;

        Ok(created)
    }

    /// Change a recorded payment. An amount change is validated as a delta
    /// against the invoice's current remaining balance.
    #[instrument(skip(self, request), fields(payment_id = %id))]
    pub async fn update_payment(
        &self,
        id: Uuid,
        request: UpdatePaymentRequest,
    ) -> Result<PaymentModel, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        let pay = self.get_payment(id).await?;
        let inv = self.load_invoice(pay.invoice_id).await?;
        if inv.status == InvoiceStatus::Cancelled {
            return Err(ServiceError::InvalidState(
                "Payments on a Cancelled invoice cannot be changed".to_string(),
            ));
        }

        let new_amount = request.amount.unwrap_or(pay.amount);
        if new_amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Payment amount must be positive".to_string(),
            ));
        }
        let delta = new_amount - pay.amount;
        if delta > Decimal::ZERO && delta > inv.remaining_amount {
            return Err(ServiceError::BusinessRule(format!(
                "Payment increase {} exceeds remaining balance {}",
                delta, inv.remaining_amount
            )));
        }

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let mut active: payment::ActiveModel = pay.into();
        active.amount = Set(new_amount);
        if let Some(date) = request.payment_date {
            active.payment_date = Set(date);
        }
        if let Some(method) = request.method {
            active.method = Set(method);
        }
        if let Some(account) = request.bank_account {
            active.bank_account = Set(Some(account));
        }
        if let Some(code) = request.transaction_code {
            active.transaction_code = Set(Some(code));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        apply_ledger_delta(&txn, inv, delta).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        Ok(updated)
    }

    /// Reverse a payment: soft-delete the row and put the amount back on the
    /// invoice's remaining balance.
    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn delete_payment(&self, id: Uuid) -> Result<(), ServiceError> {
        let pay = self.get_payment(id).await?;
        let inv = self.load_invoice(pay.invoice_id).await?;
        if inv.status == InvoiceStatus::Cancelled {
            return Err(ServiceError::InvalidState(
                "Payments on a Cancelled invoice cannot be changed".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let amount = pay.amount;
        let mut active: payment::ActiveModel = pay.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&txn).await?;

        apply_ledger_delta(&txn, inv, -amount).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        Ok(())
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<PaymentModel, ServiceError> {
        PaymentEntity::find_by_id(id)
            .filter(payment::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", id)))
    }

    pub async fn list_for_invoice(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<PaymentModel>, ServiceError> {
        let rows = PaymentEntity::find()
            .filter(payment::Column::InvoiceId.eq(invoice_id))
            .filter(payment::Column::IsDeleted.eq(false))
            .order_by_asc(payment::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(rows)
    }

    async fn load_invoice(&self, id: Uuid) -> Result<InvoiceModel, ServiceError> {
        InvoiceEntity::find_by_id(id)
            .filter(invoice::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {} not found", id)))
    }
}

/// Apply a signed amount to the invoice ledger and re-derive its status.
/// Both sides clamp at zero so rounding can never drive the ledger negative.
async fn apply_ledger_delta<C: ConnectionTrait>(
    conn: &C,
    inv: InvoiceModel,
    delta: Decimal,
) -> Result<(), ServiceError> {
    let paid = (inv.paid_amount + delta).max(Decimal::ZERO);
    let remaining = (inv.total_amount - paid).max(Decimal::ZERO);
    let status = compute_status(paid, inv.total_amount, inv.due_date, Utc::now().date_naive());

    let mut active: invoice::ActiveModel = inv.into();
    active.paid_amount = Set(paid);
    active.remaining_amount = Set(remaining);
    active.status = Set(status);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await?;
    Ok(())
}
