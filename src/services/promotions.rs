use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::promotion::{
        self, Entity as PromotionEntity, Model as PromotionModel, PromotionStatus, PromotionType,
    },
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePromotionRequest {
    #[validate(length(min = 1, max = 50, message = "Promotion code is required"))]
    pub code: String,
    pub description: Option<String>,
    pub promotion_type: PromotionType,
    pub value: Decimal,
    #[serde(default)]
    pub min_amount: Decimal,
    pub max_discount: Option<Decimal>,
    pub start_date: chrono::DateTime<Utc>,
    pub end_date: chrono::DateTime<Utc>,
    pub usage_limit: Option<i32>,
}

/// Outcome of checking a code against a candidate order. Applicability
/// failures are reported here, not as errors: an invalid code never blocks
/// the calling price calculation.
#[derive(Debug, Serialize, ToSchema)]
pub struct PromotionValidation {
    pub is_valid: bool,
    pub message: String,
    pub discount_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(ignore)]
    pub promotion: Option<PromotionModel>,
}

impl PromotionValidation {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            discount_amount: Decimal::ZERO,
            promotion: None,
        }
    }
}

#[derive(Clone)]
pub struct PromotionService {
    db: Arc<DbPool>,
}

impl PromotionService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Validate a promotion code against an order subtotal and rental window.
    /// Side-effect free: usage is reserved separately at order confirmation.
    #[instrument(skip(self), fields(code = %code, subtotal = %subtotal))]
    pub async fn validate(
        &self,
        code: &str,
        subtotal: Decimal,
        rental_start: Option<NaiveDate>,
        rental_end: Option<NaiveDate>,
    ) -> Result<PromotionValidation, ServiceError> {
        let promo = PromotionEntity::find()
            .filter(promotion::Column::Code.eq(code))
            .filter(promotion::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?;

        let Some(promo) = promo else {
            debug!("promotion code not found");
            return Ok(PromotionValidation::rejected(format!(
                "Promotion code '{}' not found",
                code
            )));
        };

        if promo.status != PromotionStatus::Active {
            return Ok(PromotionValidation::rejected(format!(
                "Promotion '{}' is not active",
                code
            )));
        }

        let promo_start = promo.start_date.date_naive();
        let promo_end = promo.end_date.date_naive();
        match (rental_start, rental_end) {
            (Some(start), Some(end)) => {
                // Overlap test: windows touch unless one ends before the other starts.
                if start > promo_end || end < promo_start {
                    return Ok(PromotionValidation::rejected(format!(
                        "Promotion '{}' does not cover the rental period",
                        code
                    )));
                }
            }
            _ => {
                let today = Utc::now().date_naive();
                if today < promo_start || today > promo_end {
                    return Ok(PromotionValidation::rejected(format!(
                        "Promotion '{}' is outside its validity window",
                        code
                    )));
                }
            }
        }

        if subtotal < promo.min_amount {
            return Ok(PromotionValidation::rejected(format!(
                "Order subtotal {} is below the promotion minimum {}",
                subtotal, promo.min_amount
            )));
        }

        if let Some(limit) = promo.usage_limit {
            if promo.used_count >= limit {
                warn!(code = %code, "promotion has reached its usage limit");
                return Ok(PromotionValidation::rejected(format!(
                    "Promotion '{}' has reached its usage limit",
                    code
                )));
            }
        }

        let discount = compute_discount(&promo, subtotal);
        Ok(PromotionValidation {
            is_valid: true,
            message: "Promotion applied".to_string(),
            discount_amount: discount,
            promotion: Some(promo),
        })
    }

    /// Consume one usage slot for `code`. Called inside the transaction that
    /// confirms the carrying order; the limit is re-checked under that
    /// transaction so the counter can never exceed it.
    pub async fn reserve_usage<C: ConnectionTrait>(
        &self,
        conn: &C,
        code: &str,
    ) -> Result<(), ServiceError> {
        let promo = PromotionEntity::find()
            .filter(promotion::Column::Code.eq(code))
            .filter(promotion::Column::IsDeleted.eq(false))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Promotion '{}' not found", code)))?;

        if let Some(limit) = promo.usage_limit {
            if promo.used_count >= limit {
                return Err(ServiceError::BusinessRule(format!(
                    "Promotion '{}' has reached its usage limit",
                    code
                )));
            }
        }

        let used = promo.used_count;
        let mut active: promotion::ActiveModel = promo.into();
        active.used_count = Set(used + 1);
        active.updated_at = Set(Some(Utc::now()));
        active.update(conn).await?;
        Ok(())
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create_promotion(
        &self,
        request: CreatePromotionRequest,
    ) -> Result<PromotionModel, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        if request.end_date < request.start_date {
            return Err(ServiceError::ValidationError(
                "Promotion end date must not precede start date".to_string(),
            ));
        }
        if request.value <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Promotion value must be positive".to_string(),
            ));
        }

        let existing = PromotionEntity::find()
            .filter(promotion::Column::Code.eq(request.code.clone()))
            .filter(promotion::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::BusinessRule(format!(
                "Promotion code '{}' already exists",
                request.code
            )));
        }

        let now = Utc::now();
        let model = promotion::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(request.code),
            description: Set(request.description),
            promotion_type: Set(request.promotion_type),
            value: Set(request.value),
            min_amount: Set(request.min_amount),
            max_discount: Set(request.max_discount),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            usage_limit: Set(request.usage_limit),
            used_count: Set(0),
            status: Set(PromotionStatus::Active),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let created = model.insert(&*self.db).await.map_err(|e| {
            error!(error = %e, "failed to create promotion");
            ServiceError::DatabaseError(e)
        })?;
        Ok(created)
    }

    pub async fn get_promotion(&self, id: Uuid) -> Result<PromotionModel, ServiceError> {
        PromotionEntity::find_by_id(id)
            .filter(promotion::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Promotion {} not found", id)))
    }

    pub async fn list_promotions(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<PromotionModel>, u64), ServiceError> {
        let paginator = PromotionEntity::find()
            .filter(promotion::Column::IsDeleted.eq(false))
            .order_by_desc(promotion::Column::CreatedAt)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }
}

/// Discount for an applicable promotion. Percentage discounts are capped by
/// `max_discount` when set; fixed discounts never exceed the subtotal, so the
/// resulting total cannot go negative.
pub fn compute_discount(promo: &PromotionModel, subtotal: Decimal) -> Decimal {
    match promo.promotion_type {
        PromotionType::Percentage => {
            let discount = subtotal * promo.value / Decimal::from(100);
            match promo.max_discount {
                Some(cap) => discount.min(cap),
                None => discount,
            }
        }
        PromotionType::FixedAmount => promo.value.min(subtotal),
    }
    .max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn promo(kind: PromotionType, value: Decimal, max_discount: Option<Decimal>) -> PromotionModel {
        let now = Utc::now();
        PromotionModel {
            id: Uuid::new_v4(),
            code: "TEST".to_string(),
            description: None,
            promotion_type: kind,
            value,
            min_amount: Decimal::ZERO,
            max_discount,
            start_date: now,
            end_date: now + Duration::days(30),
            usage_limit: None,
            used_count: 0,
            status: PromotionStatus::Active,
            is_deleted: false,
            created_at: now,
            updated_at: None,
        }
    }

    #[test]
    fn percentage_discount_is_capped_by_max_discount() {
        let promo = promo(PromotionType::Percentage, dec!(10), Some(dec!(50000)));
        // 10% of 1,000,000 would be 100,000 but the cap wins.
        assert_eq!(compute_discount(&promo, dec!(1000000)), dec!(50000));
    }

    #[test]
    fn percentage_discount_without_cap() {
        let promo = promo(PromotionType::Percentage, dec!(10), None);
        assert_eq!(compute_discount(&promo, dec!(1000000)), dec!(100000));
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() {
        let promo = promo(PromotionType::FixedAmount, dec!(200000), None);
        assert_eq!(compute_discount(&promo, dec!(150000)), dec!(150000));
        assert_eq!(compute_discount(&promo, dec!(500000)), dec!(200000));
    }
}
