use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};

use crate::{entities::sequence, errors::ServiceError};

/// Document number prefixes. `HD`/`PT` follow the numbering scheme of the
/// upstream billing documents (hóa đơn / phiếu thu).
pub const ORDER_PREFIX: &str = "RO";
pub const INVOICE_PREFIX: &str = "HD";
pub const PAYMENT_PREFIX: &str = "PT";

/// Allocate the next document number for `prefix` on `day`, e.g.
/// `RO20250115003`. Must be called on the transaction that inserts the
/// numbered document: the counter row update serializes concurrent creators,
/// so numbers are unique per (prefix, day) without a max() scan.
pub async fn next_document_number<C: ConnectionTrait>(
    conn: &C,
    prefix: &str,
    day: NaiveDate,
) -> Result<String, ServiceError> {
    let existing = sequence::Entity::find_by_id((prefix.to_string(), day))
        .one(conn)
        .await?;

    let next = match existing {
        Some(row) => {
            let next = row.value + 1;
            let mut active: sequence::ActiveModel = row.into();
            active.value = Set(next);
            active.update(conn).await?;
            next
        }
        None => {
            let active = sequence::ActiveModel {
                prefix: Set(prefix.to_string()),
                day: Set(day),
                value: Set(1),
            };
            active.insert(conn).await?;
            1
        }
    };

    Ok(format_document_number(prefix, day, next))
}

pub fn format_document_number(prefix: &str, day: NaiveDate, seq: i32) -> String {
    format!("{}{}{:03}", prefix, day.format("%Y%m%d"), seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_prefix_date_and_three_digit_sequence() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(format_document_number(ORDER_PREFIX, day, 3), "RO20250115003");
        assert_eq!(
            format_document_number(INVOICE_PREFIX, day, 12),
            "HD20250115012"
        );
        assert_eq!(
            format_document_number(PAYMENT_PREFIX, day, 110),
            "PT20250115110"
        );
    }
}
