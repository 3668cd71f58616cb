use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::vehicle::{self, Entity as VehicleEntity},
    errors::ServiceError,
    services::promotions::PromotionService,
};

/// Price breakdown for a prospective or updated rental order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceQuote {
    pub daily_rate: Decimal,
    pub total_days: i32,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    /// Set when a supplied promotion code was rejected; the quote itself
    /// still succeeds with no discount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_message: Option<String>,
}

#[derive(Clone)]
pub struct PricingService {
    db: Arc<DbPool>,
    promotions: Arc<PromotionService>,
}

impl PricingService {
    pub fn new(db: Arc<DbPool>, promotions: Arc<PromotionService>) -> Self {
        Self { db, promotions }
    }

    /// Compute daily rate × inclusive days for the window, applying the
    /// promotion when given and applicable. A rejected promotion is not an
    /// error: the discount resets to zero and the rejection message is
    /// surfaced on the quote.
    #[instrument(skip(self), fields(vehicle_id = %vehicle_id))]
    pub async fn calculate_price(
        &self,
        vehicle_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        promotion_code: Option<&str>,
    ) -> Result<PriceQuote, ServiceError> {
        if end_date < start_date {
            return Err(ServiceError::ValidationError(
                "Rental end date must not precede start date".to_string(),
            ));
        }

        let vehicle = VehicleEntity::find_by_id(vehicle_id)
            .filter(vehicle::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vehicle {} not found", vehicle_id)))?;

        let total_days = inclusive_days(start_date, end_date);
        let subtotal = vehicle.daily_rate * Decimal::from(total_days);

        let (discount_amount, promotion_message) = match promotion_code {
            Some(code) if !code.trim().is_empty() => {
                let validation = self
                    .promotions
                    .validate(code, subtotal, Some(start_date), Some(end_date))
                    .await?;
                if validation.is_valid {
                    (validation.discount_amount, None)
                } else {
                    (Decimal::ZERO, Some(validation.message))
                }
            }
            _ => (Decimal::ZERO, None),
        };

        Ok(PriceQuote {
            daily_rate: vehicle.daily_rate,
            total_days,
            subtotal,
            discount_amount,
            total_amount: subtotal - discount_amount,
            promotion_message,
        })
    }
}

/// Inclusive day count: both endpoints rent, a same-day rental is 1 day.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i32 {
    ((end - start).num_days() + 1) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn same_day_rental_counts_one_day() {
        assert_eq!(inclusive_days(d(2025, 3, 10), d(2025, 3, 10)), 1);
    }

    #[test]
    fn day_count_is_inclusive_of_both_endpoints() {
        assert_eq!(inclusive_days(d(2025, 3, 10), d(2025, 3, 12)), 3);
        assert_eq!(inclusive_days(d(2025, 2, 27), d(2025, 3, 2)), 4);
    }

    #[test]
    fn day_count_spans_month_boundaries() {
        assert_eq!(inclusive_days(d(2025, 1, 31), d(2025, 2, 1)), 2);
    }
}
