use chrono::{DateTime, NaiveDate, Utc};
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
        rental_order::{
            self, Entity as RentalOrderEntity, Model as RentalOrderModel, RentalOrderStatus,
        },
        vehicle::{self, Entity as VehicleEntity, Model as VehicleModel, VehicleStatus},
        vehicle_history::{HistoryRef, VehicleAction},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        history,
        pricing::PricingService,
        promotions::PromotionService,
        sequences::{self, ORDER_PREFIX},
        vehicles::guarded_status_update,
    },
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRentalOrderRequest {
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1, max = 200, message = "Pickup location is required"))]
    pub pickup_location: String,
    #[validate(length(min = 1, max = 200, message = "Return location is required"))]
    pub return_location: String,
    pub promotion_code: Option<String>,
    #[serde(default)]
    pub deposit_amount: Decimal,
    pub notes: Option<String>,
    /// Orders may be created as Draft (default) or directly as Confirmed.
    pub status: Option<RentalOrderStatus>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRentalOrderRequest {
    pub vehicle_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pickup_location: Option<String>,
    pub return_location: Option<String>,
    /// `Some("")` clears the promotion code.
    pub promotion_code: Option<String>,
    pub deposit_amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompleteRentalRequest {
    /// Defaults to now when omitted.
    pub actual_end_date: Option<DateTime<Utc>>,
    /// Overrides the return location planned at creation.
    pub return_location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelRentalRequest {
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct RentalOrderService {
    db: Arc<DbPool>,
    pricing: Arc<PricingService>,
    promotions: Arc<PromotionService>,
    event_sender: Arc<EventSender>,
}

impl RentalOrderService {
    pub fn new(
        db: Arc<DbPool>,
        pricing: Arc<PricingService>,
        promotions: Arc<PromotionService>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            pricing,
            promotions,
            event_sender,
        }
    }

    /// Create an order as Draft, or directly as Confirmed which also claims
    /// the vehicle. Pricing runs up front; a rejected promotion code is
    /// dropped rather than failing the create.
    #[instrument(skip(self, request), fields(vehicle_id = %request.vehicle_id))]
    pub async fn create_order(
        &self,
        request: CreateRentalOrderRequest,
        actor_id: Option<Uuid>,
    ) -> Result<RentalOrderModel, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        let initial_status = match request.status.clone().unwrap_or(RentalOrderStatus::Draft) {
            s @ (RentalOrderStatus::Draft | RentalOrderStatus::Confirmed) => s,
            other => {
                return Err(ServiceError::ValidationError(format!(
                    "New orders may only start as Draft or Confirmed, not {}",
                    other
                )))
            }
        };

        let vehicle = self.load_vehicle(request.vehicle_id).await?;
        if initial_status == RentalOrderStatus::Confirmed
            && vehicle.status != VehicleStatus::Available
        {
            return Err(ServiceError::InvalidState(format!(
                "Vehicle {} is {}, not available for rental",
                vehicle.plate_number, vehicle.status
            )));
        }

        let quote = self
            .pricing
            .calculate_price(
                request.vehicle_id,
                request.start_date,
                request.end_date,
                request.promotion_code.as_deref(),
            )
            .await?;
        // Keep the code on the order only when it actually applied.
        let promotion_code = match (&request.promotion_code, &quote.promotion_message) {
            (Some(code), None) if !code.trim().is_empty() => Some(code.clone()),
            _ => None,
        };

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let now = Utc::now();
        let order_number =
            sequences::next_document_number(&txn, ORDER_PREFIX, now.date_naive()).await?;

        let order = rental_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(order_number),
            customer_id: Set(request.customer_id),
            vehicle_id: Set(request.vehicle_id),
            employee_id: Set(request.employee_id),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            actual_start_date: Set(None),
            actual_end_date: Set(None),
            pickup_location: Set(request.pickup_location),
            return_location: Set(request.return_location),
            daily_rate: Set(quote.daily_rate),
            total_days: Set(quote.total_days),
            subtotal: Set(quote.subtotal),
            discount_amount: Set(quote.discount_amount),
            promotion_code: Set(promotion_code.clone()),
            total_amount: Set(quote.total_amount),
            deposit_amount: Set(request.deposit_amount),
            status: Set(initial_status.clone()),
            notes: Set(request.notes),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = order.insert(&txn).await?;

        history::record_order_transition(
            &txn,
            created.id,
            None,
            initial_status.clone(),
            actor_id,
            Some(format!("Order {} created", created.order_number)),
        )
        .await?;

        if initial_status == RentalOrderStatus::Confirmed {
            guarded_status_update(
                &txn,
                &vehicle,
                VehicleStatus::Rented,
                vehicle.current_location.clone(),
            )
            .await?;
            history::record_vehicle_action(
                &txn,
                vehicle.id,
                VehicleAction::Rented,
                Some(vehicle.status.clone()),
                Some(VehicleStatus::Rented),
                Some(HistoryRef::RentalOrder(created.id)),
                Some(format!("Reserved by order {}", created.order_number)),
                actor_id,
            )
            .await?;
            if let Some(code) = &promotion_code {
                self.promotions.reserve_usage(&txn, code).await?;
            }
        }

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %created.id, order_number = %created.order_number, "rental order created");
        self.event_sender
            .emit(Event::RentalOrderCreated(created.id))
            .await;

        Ok(created)
    }

    /// Update a Draft order in place, repricing against the (possibly new)
    /// vehicle and dates. Draft-only; no history row is written.
    #[instrument(skip(self, request), fields(order_id = %id))]
    pub async fn update_order(
        &self,
        id: Uuid,
        request: UpdateRentalOrderRequest,
        _actor_id: Option<Uuid>,
    ) -> Result<RentalOrderModel, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        let order = self.get_order(id).await?;
        if order.status != RentalOrderStatus::Draft {
            return Err(ServiceError::InvalidState(format!(
                "Only Draft orders can be updated, this order is {}",
                order.status
            )));
        }

        let vehicle_id = request.vehicle_id.unwrap_or(order.vehicle_id);
        self.load_vehicle(vehicle_id).await?;

        let start_date = request.start_date.unwrap_or(order.start_date);
        let end_date = request.end_date.unwrap_or(order.end_date);
        let promotion_code = match request.promotion_code {
            Some(code) if code.trim().is_empty() => None,
            Some(code) => Some(code),
            None => order.promotion_code.clone(),
        };

        let quote = self
            .pricing
            .calculate_price(vehicle_id, start_date, end_date, promotion_code.as_deref())
            .await?;
        let promotion_code = match (&promotion_code, &quote.promotion_message) {
            (Some(code), None) => Some(code.clone()),
            _ => None,
        };

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let mut active: rental_order::ActiveModel = order.into();
        active.vehicle_id = Set(vehicle_id);
        active.start_date = Set(start_date);
        active.end_date = Set(end_date);
        if let Some(pickup) = request.pickup_location {
            active.pickup_location = Set(pickup);
        }
        if let Some(ret) = request.return_location {
            active.return_location = Set(ret);
        }
        if let Some(deposit) = request.deposit_amount {
            active.deposit_amount = Set(deposit);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.daily_rate = Set(quote.daily_rate);
        active.total_days = Set(quote.total_days);
        active.subtotal = Set(quote.subtotal);
        active.discount_amount = Set(quote.discount_amount);
        active.promotion_code = Set(promotion_code);
        active.total_amount = Set(quote.total_amount);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        Ok(updated)
    }

    /// Draft → Confirmed. Requires the vehicle to still be Available and
    /// consumes one promotion usage slot when a code is attached.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn confirm_order(
        &self,
        id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Result<RentalOrderModel, ServiceError> {
        let order = self.get_order(id).await?;
        if order.status != RentalOrderStatus::Draft {
            return Err(ServiceError::InvalidState(format!(
                "Only Draft orders can be confirmed, this order is {}",
                order.status
            )));
        }

        let vehicle = self.load_vehicle(order.vehicle_id).await?;
        if vehicle.status != VehicleStatus::Available {
            return Err(ServiceError::InvalidState(format!(
                "Vehicle {} is {}, not available for rental",
                vehicle.plate_number, vehicle.status
            )));
        }

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let old_status = order.status.clone();
        let order_id = order.id;
        let promotion_code = order.promotion_code.clone();

        let mut active: rental_order::ActiveModel = order.into();
        active.status = Set(RentalOrderStatus::Confirmed);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        history::record_order_transition(
            &txn,
            order_id,
            Some(old_status.clone()),
            RentalOrderStatus::Confirmed,
            actor_id,
            Some("Order confirmed".to_string()),
        )
        .await?;

        // Usage reservation rides the same transaction as the status change.
        if let Some(code) = &promotion_code {
            self.promotions.reserve_usage(&txn, code).await?;
        }

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        self.notify_transition(order_id, old_status, RentalOrderStatus::Confirmed)
            .await;

        Ok(updated)
    }

    /// Confirmed → InProgress. Stamps the actual start and claims the vehicle.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn start_rental(
        &self,
        id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Result<RentalOrderModel, ServiceError> {
        let order = self.get_order(id).await?;
        if order.status != RentalOrderStatus::Confirmed {
            return Err(ServiceError::InvalidState(format!(
                "Only Confirmed orders can be started, this order is {}",
                order.status
            )));
        }
        let vehicle = self.load_vehicle(order.vehicle_id).await?;

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let old_status = order.status.clone();
        let order_id = order.id;
        let order_number = order.order_number.clone();
        let pickup_location = order.pickup_location.clone();

        let mut active: rental_order::ActiveModel = order.into();
        active.status = Set(RentalOrderStatus::InProgress);
        active.actual_start_date = Set(Some(Utc::now()));
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        history::record_order_transition(
            &txn,
            order_id,
            Some(old_status.clone()),
            RentalOrderStatus::InProgress,
            actor_id,
            Some("Rental started, vehicle handed over".to_string()),
        )
        .await?;

        guarded_status_update(&txn, &vehicle, VehicleStatus::Rented, Some(pickup_location))
            .await?;
        history::record_vehicle_action(
            &txn,
            vehicle.id,
            VehicleAction::Rented,
            Some(vehicle.status.clone()),
            Some(VehicleStatus::Rented),
            Some(HistoryRef::RentalOrder(order_id)),
            Some(format!("Handed over for order {}", order_number)),
            actor_id,
        )
        .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        self.notify_transition(order_id, old_status, RentalOrderStatus::InProgress)
            .await;
        self.event_sender
            .emit(Event::VehicleStatusChanged {
                vehicle_id: vehicle.id,
                old_status: vehicle.status,
                new_status: VehicleStatus::Rented,
            })
            .await;

        Ok(updated)
    }

    /// InProgress → Completed. Releases the vehicle back to Available at the
    /// return location.
    #[instrument(skip(self, request), fields(order_id = %id))]
    pub async fn complete_rental(
        &self,
        id: Uuid,
        request: CompleteRentalRequest,
        actor_id: Option<Uuid>,
    ) -> Result<RentalOrderModel, ServiceError> {
        let order = self.get_order(id).await?;
        if order.status != RentalOrderStatus::InProgress {
            return Err(ServiceError::InvalidState(format!(
                "Only InProgress orders can be completed, this order is {}",
                order.status
            )));
        }
        let vehicle = self.load_vehicle(order.vehicle_id).await?;

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let old_status = order.status.clone();
        let order_id = order.id;
        let order_number = order.order_number.clone();
        let return_location = request
            .return_location
            .clone()
            .unwrap_or_else(|| order.return_location.clone());

        let mut active: rental_order::ActiveModel = order.into();
        active.status = Set(RentalOrderStatus::Completed);
        active.actual_end_date = Set(Some(request.actual_end_date.unwrap_or_else(Utc::now)));
        active.return_location = Set(return_location.clone());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        history::record_order_transition(
            &txn,
            order_id,
            Some(old_status.clone()),
            RentalOrderStatus::Completed,
            actor_id,
            Some("Rental completed, vehicle returned".to_string()),
        )
        .await?;

        guarded_status_update(
            &txn,
            &vehicle,
            VehicleStatus::Available,
            Some(return_location),
        )
        .await?;
        history::record_vehicle_action(
            &txn,
            vehicle.id,
            VehicleAction::Returned,
            Some(vehicle.status.clone()),
            Some(VehicleStatus::Available),
            Some(HistoryRef::RentalOrder(order_id)),
            Some(format!("Returned from order {}", order_number)),
            actor_id,
        )
        .await?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        self.notify_transition(order_id, old_status, RentalOrderStatus::Completed)
            .await;
        self.event_sender
            .emit(Event::VehicleStatusChanged {
                vehicle_id: vehicle.id,
                old_status: vehicle.status,
                new_status: VehicleStatus::Available,
            })
            .await;

        Ok(updated)
    }

    /// Cancel from any non-terminal state. Frees the vehicle when this order
    /// holds it (Confirmed or InProgress).
    #[instrument(skip(self, request), fields(order_id = %id))]
    pub async fn cancel_order(
        &self,
        id: Uuid,
        request: CancelRentalRequest,
        actor_id: Option<Uuid>,
    ) -> Result<RentalOrderModel, ServiceError> {
        let order = self.get_order(id).await?;
        if matches!(
            order.status,
            RentalOrderStatus::Cancelled | RentalOrderStatus::Invoiced
        ) {
            return Err(ServiceError::InvalidState(format!(
                "A {} order cannot be cancelled",
                order.status
            )));
        }

        let holds_vehicle = matches!(
            order.status,
            RentalOrderStatus::Confirmed | RentalOrderStatus::InProgress
        );
        let vehicle = self.load_vehicle(order.vehicle_id).await?;

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let old_status = order.status.clone();
        let order_id = order.id;
        let order_number = order.order_number.clone();

        let mut active: rental_order::ActiveModel = order.into();
        active.status = Set(RentalOrderStatus::Cancelled);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        let note = match &request.reason {
            Some(reason) => format!("Order cancelled: {}", reason),
            None => "Order cancelled".to_string(),
        };
        history::record_order_transition(
            &txn,
            order_id,
            Some(old_status.clone()),
            RentalOrderStatus::Cancelled,
            actor_id,
            Some(note),
        )
        .await?;

        if holds_vehicle && vehicle.status == VehicleStatus::Rented {
            guarded_status_update(
                &txn,
                &vehicle,
                VehicleStatus::Available,
                vehicle.current_location.clone(),
            )
            .await?;
            history::record_vehicle_action(
                &txn,
                vehicle.id,
                VehicleAction::RentalCancelled,
                Some(VehicleStatus::Rented),
                Some(VehicleStatus::Available),
                Some(HistoryRef::RentalOrder(order_id)),
                Some(format!("Order {} cancelled", order_number)),
                actor_id,
            )
            .await?;
        }

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender
            .emit(Event::RentalOrderCancelled {
                order_id,
                reason: request.reason,
            })
            .await;
        self.notify_transition(order_id, old_status, RentalOrderStatus::Cancelled)
            .await;

        Ok(updated)
    }

    /// Soft-delete. Only Draft and Cancelled orders can be deleted.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: Uuid, _actor_id: Option<Uuid>) -> Result<(), ServiceError> {
        let order = self.get_order(id).await?;
        if !matches!(
            order.status,
            RentalOrderStatus::Draft | RentalOrderStatus::Cancelled
        ) {
            return Err(ServiceError::InvalidState(format!(
                "Only Draft or Cancelled orders can be deleted, this order is {}",
                order.status
            )));
        }

        let mut active: rental_order::ActiveModel = order.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(&*self.db).await?;
        Ok(())
    }

    pub async fn get_order(&self, id: Uuid) -> Result<RentalOrderModel, ServiceError> {
        RentalOrderEntity::find_by_id(id)
            .filter(rental_order::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Rental order {} not found", id)))
    }

    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
        status: Option<RentalOrderStatus>,
    ) -> Result<(Vec<RentalOrderModel>, u64), ServiceError> {
        let mut query = RentalOrderEntity::find().filter(rental_order::Column::IsDeleted.eq(false));
        if let Some(status) = status {
            query = query.filter(rental_order::Column::Status.eq(status));
        }
        let paginator = query
            .order_by_desc(rental_order::Column::CreatedAt)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    async fn load_vehicle(&self, id: Uuid) -> Result<VehicleModel, ServiceError> {
        VehicleEntity::find_by_id(id)
            .filter(vehicle::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vehicle {} not found", id)))
    }

    async fn notify_transition(
        &self,
        order_id: Uuid,
        old_status: RentalOrderStatus,
        new_status: RentalOrderStatus,
    ) {
        self.event_sender
            .emit(Event::RentalOrderStatusChanged {
                order_id,
                old_status,
                new_status,
            })
            .await;
    }
}
