//! Booking resource model
//!
//! Value objects mirroring the remote booking resource. Wire names follow
//! the service's JSON shape (`firstname`, `bookingdates.checkin`, ...).

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contract::FieldPath;
use crate::error::{DomainError, DomainResult};

/// Identifier assigned by the server when a booking is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub u64);

impl BookingId {
    /// Returns the raw numeric identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BookingId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Check-in / check-out range of a stay.
///
/// Ranges built through [`BookingDates::new`] always check out strictly
/// after they check in. Ranges decoded from a server response are kept
/// exactly as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingDates {
    #[serde(rename = "checkin")]
    check_in: NaiveDate,
    #[serde(rename = "checkout")]
    check_out: NaiveDate,
}

impl BookingDates {
    /// Creates a validated date range.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidDateRange`] unless `check_in < check_out`.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> DomainResult<Self> {
        if check_in >= check_out {
            return Err(DomainError::InvalidDateRange {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Creates a validated date range from `YYYY-MM-DD` strings.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidDate`] if either date does not parse,
    /// or [`DomainError::InvalidDateRange`] if the range is empty or reversed.
    pub fn parse(check_in: &str, check_out: &str) -> DomainResult<Self> {
        Self::new(parse_date(check_in)?, parse_date(check_out)?)
    }

    /// Returns the check-in date.
    #[must_use]
    pub const fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// Returns the check-out date.
    #[must_use]
    pub const fn check_out(&self) -> NaiveDate {
        self.check_out
    }
}

/// Full state of a booking as submitted or as expected to be observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Guest first name.
    #[serde(rename = "firstname")]
    pub first_name: String,
    /// Guest last name.
    #[serde(rename = "lastname")]
    pub last_name: String,
    /// Total price in whole currency units.
    #[serde(rename = "totalprice")]
    pub total_price: u32,
    /// Whether the deposit has been paid.
    #[serde(rename = "depositpaid")]
    pub deposit_paid: bool,
    /// Stay dates.
    #[serde(rename = "bookingdates")]
    pub dates: BookingDates,
    /// Free-form additional needs.
    #[serde(
        rename = "additionalneeds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_needs: Option<String>,
}

impl Booking {
    /// Creates a booking without additional needs.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        total_price: u32,
        deposit_paid: bool,
        dates: BookingDates,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            total_price,
            deposit_paid,
            dates,
            additional_needs: None,
        }
    }

    /// Sets the additional needs (builder pattern).
    #[must_use]
    pub fn with_additional_needs(mut self, needs: impl Into<String>) -> Self {
        self.additional_needs = Some(needs.into());
        self
    }

    /// Every leaf field in wire order. A missing `additionalneeds` is `null`.
    #[must_use]
    pub fn leaf_values(&self) -> Vec<(FieldPath, Value)> {
        vec![
            (FieldPath::known("firstname"), Value::from(self.first_name.as_str())),
            (FieldPath::known("lastname"), Value::from(self.last_name.as_str())),
            (FieldPath::known("totalprice"), Value::from(self.total_price)),
            (FieldPath::known("depositpaid"), Value::from(self.deposit_paid)),
            (
                FieldPath::known("bookingdates.checkin"),
                Value::from(self.dates.check_in.to_string()),
            ),
            (
                FieldPath::known("bookingdates.checkout"),
                Value::from(self.dates.check_out.to_string()),
            ),
            (
                FieldPath::known("additionalneeds"),
                self.additional_needs
                    .as_deref()
                    .map_or(Value::Null, Value::from),
            ),
        ]
    }
}

fn parse_date(raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| DomainError::InvalidDate(raw.to_string()))
}

/// A booking as returned by the creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Server-assigned identifier.
    #[serde(rename = "bookingid")]
    pub id: BookingId,
    /// The booking state echoed back by the server.
    pub booking: Booking,
}

/// One entry of the booking listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRef {
    /// Identifier of a listed booking.
    #[serde(rename = "bookingid")]
    pub id: BookingId,
}
