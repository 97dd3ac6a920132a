//! Scenario entry points.
//!
//! Each scenario is one lifecycle run over the orchestrator. Later steps take
//! the previous step's handle as input, so ordering needs no runner support.

use std::fmt;
use std::str::FromStr;

use bookcheck_domain::BookingId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ContractResult;
use crate::lifecycle::LifecycleOrchestrator;
use crate::ports::HttpClient;

/// A named, independently runnable check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Create a booking and verify the echo.
    CreateBooking,
    /// List booking identifiers.
    ListBookingIds,
    /// Patch the first name and verify the rest survives.
    PartialUpdate,
    /// Replace the whole booking.
    FullUpdate,
    /// Delete a booking and verify it is gone.
    DeleteBooking,
    /// Verify that a patch without credentials is refused.
    UnauthenticatedMutation,
}

impl Scenario {
    /// Every scenario, in default run order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CreateBooking,
            Self::ListBookingIds,
            Self::PartialUpdate,
            Self::FullUpdate,
            Self::DeleteBooking,
            Self::UnauthenticatedMutation,
        ]
    }

    /// Returns the `snake_case` name used in configuration and on the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateBooking => "create_booking",
            Self::ListBookingIds => "list_booking_ids",
            Self::PartialUpdate => "partial_update",
            Self::FullUpdate => "full_update",
            Self::DeleteBooking => "delete_booking",
            Self::UnauthenticatedMutation => "unauthenticated_mutation",
        }
    }

    /// One-line description for reports.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CreateBooking => "created booking is echoed unchanged",
            Self::ListBookingIds => "listing returns booking identifiers",
            Self::PartialUpdate => "partial update keeps unpatched fields",
            Self::FullUpdate => "full update replaces every field",
            Self::DeleteBooking => "deleted booking reads as Not Found",
            Self::UnauthenticatedMutation => "patch without credentials is refused",
        }
    }

    /// Runs the scenario, returning the booking it worked on, if any.
    ///
    /// # Errors
    ///
    /// Returns the first contract violation of the run.
    pub async fn run<C: HttpClient>(
        self,
        orchestrator: &LifecycleOrchestrator<C>,
    ) -> ContractResult<Option<BookingId>> {
        match self {
            Self::CreateBooking => create_booking(orchestrator).await.map(Some),
            Self::ListBookingIds => list_booking_ids(orchestrator).await.map(|()| None),
            Self::PartialUpdate => partial_update(orchestrator).await.map(Some),
            Self::FullUpdate => full_update(orchestrator).await.map(Some),
            Self::DeleteBooking => delete_booking(orchestrator).await.map(Some),
            Self::UnauthenticatedMutation => unauthenticated_mutation(orchestrator).await.map(Some),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|scenario| scenario.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::all().iter().map(|s| s.as_str()).collect();
                format!("unknown scenario '{s}', expected one of: {}", known.join(", "))
            })
    }
}

async fn create_booking<C: HttpClient>(orchestrator: &LifecycleOrchestrator<C>) -> ContractResult<BookingId> {
    let tracked = orchestrator.create(&fixtures::nick()?).await?;
    Ok(tracked.id())
}

async fn list_booking_ids<C: HttpClient>(orchestrator: &LifecycleOrchestrator<C>) -> ContractResult<()> {
    let ids = orchestrator.list_ids().await?;
    info!(count = ids.len(), "listing verified");
    Ok(())
}

async fn partial_update<C: HttpClient>(orchestrator: &LifecycleOrchestrator<C>) -> ContractResult<BookingId> {
    let mut tracked = orchestrator.create(&fixtures::nick()?).await?;
    orchestrator
        .partial_update(&mut tracked, &fixtures::andrew_patch())
        .await?;
    Ok(tracked.id())
}

async fn full_update<C: HttpClient>(orchestrator: &LifecycleOrchestrator<C>) -> ContractResult<BookingId> {
    let mut tracked = orchestrator.create(&fixtures::nick()?).await?;
    orchestrator.full_update(&mut tracked, &fixtures::mila()?).await?;
    Ok(tracked.id())
}

async fn delete_booking<C: HttpClient>(orchestrator: &LifecycleOrchestrator<C>) -> ContractResult<BookingId> {
    let tracked = orchestrator.create(&fixtures::nick()?).await?;
    let mut deleted = orchestrator.delete(tracked).await?;
    orchestrator.verify_gone(&mut deleted).await?;
    Ok(deleted.id())
}

async fn unauthenticated_mutation<C: HttpClient>(
    orchestrator: &LifecycleOrchestrator<C>,
) -> ContractResult<BookingId> {
    let tracked = orchestrator.create(&fixtures::nick()?).await?;
    let id = tracked.id();
    let verdict = orchestrator
        .attempt_unauthenticated_patch(&tracked, &fixtures::andrew_patch())
        .await;
    // Clean up even when the anonymous patch went through.
    let cleanup = orchestrator.delete(tracked).await;
    verdict?;
    cleanup?;
    Ok(id)
}

/// Bookings used by the scenarios.
pub mod fixtures {
    use bookcheck_domain::{Booking, BookingDates, BookingPatch, DomainResult};

    fn stay() -> DomainResult<BookingDates> {
        BookingDates::parse("2020-03-25", "2020-03-27")
    }

    /// The booking every scenario starts from.
    ///
    /// # Errors
    ///
    /// Only fails if the fixed dates stop forming a valid range.
    pub fn nick() -> DomainResult<Booking> {
        Ok(Booking::new("Nick", "Pruchkovskiy", 150, false, stay()?).with_additional_needs("Baby crib"))
    }

    /// The replacement used by the full update.
    ///
    /// # Errors
    ///
    /// Only fails if the fixed dates stop forming a valid range.
    pub fn mila() -> DomainResult<Booking> {
        Ok(Booking::new("Mila", "Pruchkovska", 125, true, stay()?).with_additional_needs("Baby crib"))
    }

    /// The patch used by the partial update.
    #[must_use]
    pub fn andrew_patch() -> BookingPatch {
        BookingPatch::new().first_name("Andrew")
    }
}
