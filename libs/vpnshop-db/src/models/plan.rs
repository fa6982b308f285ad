use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const BYTES_PER_GB: i64 = 1 << 30;

/// Exact `gb * 2^30`. `None` when the byte count does not fit the BIGINT column.
pub fn gigabytes_to_bytes(gb: u64) -> Option<i64> {
    i64::try_from(gb).ok()?.checked_mul(BYTES_PER_GB)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Tomans.
    pub price: i64,
    pub duration_days: i32,
    /// Bytes.
    pub data_limit: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    /// Data limit in gigabytes, with a two digit fraction when the limit is not a
    /// whole number of gigabytes.
    pub fn data_limit_label(&self) -> String {
        if self.data_limit % BYTES_PER_GB == 0 {
            (self.data_limit / BYTES_PER_GB).to_string()
        } else {
            format!("{:.2}", self.data_limit as f64 / BYTES_PER_GB as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gigabytes_convert_exactly() {
        assert_eq!(gigabytes_to_bytes(50), Some(53_687_091_200));
        assert_eq!(gigabytes_to_bytes(1_000_000), Some(1_073_741_824_000_000));
        for gb in [1u64, 3, 999_999, 1_000_000, 8_589_934_591] {
            assert_eq!(gigabytes_to_bytes(gb), Some(gb as i64 * 1024 * 1024 * 1024));
        }
    }

    #[test]
    fn gigabytes_overflow_is_rejected() {
        assert_eq!(gigabytes_to_bytes(8_589_934_592), None);
        assert_eq!(gigabytes_to_bytes(u64::MAX), None);
    }

    #[test]
    fn data_limit_label() {
        let mut plan = Plan {
            id: 1,
            title: "Gold".into(),
            description: String::new(),
            price: 100_000,
            duration_days: 30,
            data_limit: 50 * BYTES_PER_GB,
            is_active: true,
            created_at: Utc::now(),
        };
        assert_eq!(plan.data_limit_label(), "50");
        plan.data_limit = BYTES_PER_GB + BYTES_PER_GB / 2;
        assert_eq!(plan.data_limit_label(), "1.50");
    }
}
