//! Amount and date types shared by the request builders.

use std::fmt::Display;

use error_stack::report;
use serde::{Deserialize, Serialize};
use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};

use crate::errors::{CustomResult, GatewayError};

/// The fixed wire date-time layout, `YYYY-MM-DDTHH:MM:SS`. The value's own
/// clock fields are rendered as-is; no time zone conversion is performed.
const WIRE_DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Formats a date-time for the wire without converting its offset.
pub fn format_wire_datetime(value: OffsetDateTime) -> CustomResult<String, GatewayError> {
    value
        .format(WIRE_DATETIME_FORMAT)
        .map_err(|err| report!(GatewayError::DateFormattingFailed).attach_printable(err))
}

/// An amount expressed in minor currency units (e.g. cents).
///
/// All monetary options are carried in this unit so arithmetic stays
/// integer-safe; conversion to the wire representation happens once, at
/// request-build time.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct MinorUnit(i64);

impl MinorUnit {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get_amount_as_i64(&self) -> i64 {
        self.0
    }

    /// Renders the amount as a fixed-point decimal string with exactly two
    /// fractional digits, using minor-unit integer math only. `12345`
    /// becomes `"123.45"`. Negative amounts fail with `InvalidAmount`.
    pub fn to_major_unit_as_string(&self) -> CustomResult<StringMajorUnit, GatewayError> {
        if self.0 < 0 {
            return Err(report!(GatewayError::InvalidAmount)
                .attach_printable(format!("received amount {}", self.0)));
        }
        Ok(StringMajorUnit::new(format!(
            "{}.{:02}",
            self.0 / 100,
            self.0 % 100
        )))
    }
}

impl Display for MinorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A major-denomination amount already rendered as a decimal string, the
/// only form in which money appears on the wire.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StringMajorUnit(String);

impl StringMajorUnit {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Environment selector. Chosen once at gateway construction; it picks the
/// API endpoint base and the browser-redirect bases.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Test,
    Live,
}

impl Mode {
    pub fn is_test(&self) -> bool {
        matches!(self, Self::Test)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn amount_renders_two_fractional_digits() {
        assert_eq!(
            MinorUnit::new(12345)
                .to_major_unit_as_string()
                .unwrap()
                .as_str(),
            "123.45"
        );
        assert_eq!(
            MinorUnit::new(0).to_major_unit_as_string().unwrap().as_str(),
            "0.00"
        );
        assert_eq!(
            MinorUnit::new(5).to_major_unit_as_string().unwrap().as_str(),
            "0.05"
        );
        assert_eq!(
            MinorUnit::new(10000)
                .to_major_unit_as_string()
                .unwrap()
                .as_str(),
            "100.00"
        );
    }

    #[test]
    fn amount_round_trips_through_decimal_representation() {
        for n in [0_i64, 1, 99, 100, 101, 123456789] {
            let rendered = MinorUnit::new(n).to_major_unit_as_string().unwrap();
            let (whole, frac) = rendered.as_str().split_once('.').unwrap();
            assert_eq!(frac.len(), 2);
            let back = whole.parse::<i64>().unwrap() * 100 + frac.parse::<i64>().unwrap();
            assert_eq!(back, n);
        }
    }

    #[test]
    fn negative_amount_is_rejected() {
        let err = MinorUnit::new(-1).to_major_unit_as_string().unwrap_err();
        assert!(matches!(
            err.current_context(),
            GatewayError::InvalidAmount
        ));
    }

    #[test]
    fn wire_datetime_keeps_the_given_clock_fields() {
        let value = datetime!(2024-03-09 17:05:01 UTC);
        assert_eq!(format_wire_datetime(value).unwrap(), "2024-03-09T17:05:01");

        // A non-UTC offset must not be converted away.
        let offset = datetime!(2024-03-09 17:05:01 -5);
        assert_eq!(format_wire_datetime(offset).unwrap(), "2024-03-09T17:05:01");
    }
}
