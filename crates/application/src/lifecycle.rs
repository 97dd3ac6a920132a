//! Lifecycle orchestration.
//!
//! Drives one booking through create, update, delete and verify-gone,
//! threading the server-assigned identifier from step to step. Every step
//! checks its own status precondition and stops the run on failure.

use std::fmt;
use std::sync::Arc;

use bookcheck_domain::{
    AuthConfig, Booking, BookingId, BookingPatch, BookingRef, ExpectedState, HttpMethod,
    RequestSpec, ResponseSpec,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{Span, debug, field, info};
use uuid::Uuid;

use crate::booking_api::BookingApi;
use crate::config::{ConfigError, SuiteConfig};
use crate::error::{ContractError, ContractResult};
use crate::ports::HttpClient;
use crate::verifier::ContractVerifier;

/// Where a booking is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Not created yet.
    None,
    /// Created and not modified since.
    Created,
    /// Last modified by a partial update.
    UpdatedPartial,
    /// Last modified by a full update.
    UpdatedFull,
    /// Deleted, absence not yet observed.
    Deleted,
    /// Deleted and observed to be gone.
    Absent,
}

impl LifecycleState {
    /// Whether the booking exists on the server.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Created | Self::UpdatedPartial | Self::UpdatedFull)
    }

    /// Returns the state reached by applying `op`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidTransition`] if `op` is not allowed
    /// from this state.
    pub fn apply(self, op: LifecycleOp) -> ContractResult<Self> {
        let next = match (self, op) {
            (Self::None, LifecycleOp::Create) => Self::Created,
            (state, LifecycleOp::Read) if state.is_live() => state,
            (state, LifecycleOp::PartialUpdate) if state.is_live() => Self::UpdatedPartial,
            (state, LifecycleOp::FullUpdate) if state.is_live() => Self::UpdatedFull,
            (state, LifecycleOp::Delete) if state.is_live() => Self::Deleted,
            (Self::Deleted | Self::Absent, LifecycleOp::VerifyGone) => Self::Absent,
            (state, op) => return Err(ContractError::InvalidTransition { op, state }),
        };
        Ok(next)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Created => "CREATED",
            Self::UpdatedPartial => "UPDATED_PARTIAL",
            Self::UpdatedFull => "UPDATED_FULL",
            Self::Deleted => "DELETED",
            Self::Absent => "ABSENT",
        };
        f.write_str(name)
    }
}

/// A lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleOp {
    /// Create the booking.
    Create,
    /// Read a live booking.
    Read,
    /// Patch some fields.
    PartialUpdate,
    /// Replace every field.
    FullUpdate,
    /// Delete the booking.
    Delete,
    /// Read a deleted booking.
    VerifyGone,
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::PartialUpdate => "partially update",
            Self::FullUpdate => "fully update",
            Self::Delete => "delete",
            Self::VerifyGone => "verify the absence of",
        };
        f.write_str(name)
    }
}

/// Handle on a live booking created by this run.
#[derive(Debug, Clone)]
pub struct TrackedBooking {
    run_id: Uuid,
    id: BookingId,
    state: LifecycleState,
    snapshot: Booking,
}

impl TrackedBooking {
    /// Identifier of the lifecycle run that owns this booking.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Server-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> BookingId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Last state the server was verified to hold.
    #[must_use]
    pub const fn snapshot(&self) -> &Booking {
        &self.snapshot
    }
}

/// Handle on a booking this run has deleted.
#[derive(Debug, Clone)]
pub struct DeletedBooking {
    run_id: Uuid,
    id: BookingId,
    state: LifecycleState,
}

impl DeletedBooking {
    /// Identifier of the lifecycle run that owned the booking.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Identifier the booking had.
    #[must_use]
    pub const fn id(&self) -> BookingId {
        self.id
    }

    /// `Deleted` until absence has been observed, then `Absent`.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }
}

/// Runs lifecycle steps against a booking service.
pub struct LifecycleOrchestrator<C: HttpClient> {
    client: Arc<C>,
    api: BookingApi,
    verifier: ContractVerifier,
}

impl<C: HttpClient> LifecycleOrchestrator<C> {
    /// Creates an orchestrator for the configured service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration does not validate.
    pub fn new(client: Arc<C>, config: &SuiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            api: BookingApi::new(config)?,
            verifier: ContractVerifier::new(),
        })
    }

    /// The request builder in use.
    #[must_use]
    pub const fn api(&self) -> &BookingApi {
        &self.api
    }

    /// Creates `booking` and requires the server to echo it unchanged.
    ///
    /// # Errors
    ///
    /// Fails on a non-200 status, a body without a booking id, the first
    /// field the echo gets wrong, or a transport error.
    pub async fn create(&self, booking: &Booking) -> ContractResult<TrackedBooking> {
        let state = LifecycleState::None.apply(LifecycleOp::Create)?;
        let response = self.send(self.api.create(booking)?).await?;
        self.verifier.verify_status(&response, 200)?;
        let body = self.verifier.json_body(&response)?;
        let record = self.verifier.verify_created(&body, booking)?;

        let run_id = Uuid::now_v7();
        Span::current().record("run_id", field::display(run_id));
        info!(%run_id, booking_id = %record.id, "booking created");
        Ok(TrackedBooking {
            run_id,
            id: record.id,
            state,
            snapshot: record.booking,
        })
    }

    /// Lists every booking identifier and requires the list to be non-empty.
    ///
    /// # Errors
    ///
    /// Fails on a non-200 status, an undecodable body, an empty list or a
    /// transport error.
    pub async fn list_ids(&self) -> ContractResult<Vec<BookingId>> {
        let response = self.send(self.api.list()).await?;
        self.verifier.verify_status(&response, 200)?;
        let refs: Vec<BookingRef> = self.verifier.decode(&response)?;
        if refs.is_empty() {
            return Err(ContractError::EmptyListing);
        }
        info!(count = refs.len(), "bookings listed");
        Ok(refs.into_iter().map(|r| r.id).collect())
    }

    /// Reads a live booking and requires it to match the last verified state.
    ///
    /// # Errors
    ///
    /// Fails if the booking is not live, on a non-200 status, on any drifted
    /// field or a transport error.
    pub async fn read(&self, tracked: &TrackedBooking) -> ContractResult<Booking> {
        tracked.state.apply(LifecycleOp::Read)?;
        let response = self.send(self.api.read(tracked.id)).await?;
        self.verifier.verify_status(&response, 200)?;
        let body = self.verifier.json_body(&response)?;
        self.verifier
            .require_fields(&body, &ExpectedState::from_booking(&tracked.snapshot))?;
        Ok(tracked.snapshot.clone())
    }

    /// Patches some fields and requires every other field to survive.
    ///
    /// # Errors
    ///
    /// Fails if the booking is not live or the patch does not fit a booking
    /// (both before sending), on a non-200 status, with every drifted
    /// field, or on a transport error.
    pub async fn partial_update(
        &self,
        tracked: &mut TrackedBooking,
        patch: &BookingPatch,
    ) -> ContractResult<Value> {
        let next = tracked.state.apply(LifecycleOp::PartialUpdate)?;
        let expected = ExpectedState::merged(&tracked.snapshot, patch);
        let patched = expected.to_booking()?;
        let response = self.send(self.api.partial_update(tracked.id, patch)).await?;
        let body = self.updated_body(&response, &expected)?;
        tracked.snapshot = patched;
        tracked.state = next;
        info!(run_id = %tracked.run_id, booking_id = %tracked.id, "booking patched");
        Ok(body)
    }

    /// Replaces every field and requires the server to hold exactly `booking`.
    ///
    /// # Errors
    ///
    /// Fails if the booking is not live, on a non-200 status, with every
    /// drifted field, or on a transport error.
    pub async fn full_update(
        &self,
        tracked: &mut TrackedBooking,
        booking: &Booking,
    ) -> ContractResult<Value> {
        let next = tracked.state.apply(LifecycleOp::FullUpdate)?;
        let expected = ExpectedState::from_booking(booking);
        let response = self.send(self.api.full_update(tracked.id, booking)?).await?;
        let body = self.updated_body(&response, &expected)?;
        tracked.snapshot = booking.clone();
        tracked.state = next;
        info!(run_id = %tracked.run_id, booking_id = %tracked.id, "booking replaced");
        Ok(body)
    }

    /// Deletes the booking, consuming its handle.
    ///
    /// # Errors
    ///
    /// Fails unless the server answers `201 Created`, or on a transport error.
    pub async fn delete(&self, tracked: TrackedBooking) -> ContractResult<DeletedBooking> {
        let state = tracked.state.apply(LifecycleOp::Delete)?;
        let response = self.send(self.api.delete(tracked.id)).await?;
        self.verifier.verify_deleted(&response)?;
        info!(run_id = %tracked.run_id, booking_id = %tracked.id, "booking deleted");
        Ok(DeletedBooking {
            run_id: tracked.run_id,
            id: tracked.id,
            state,
        })
    }

    /// Requires a deleted booking to read as `404 Not Found`. Repeatable.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::StaleRecord`] if the booking can still be
    /// read, [`ContractError::UnexpectedPresence`] for any other deviation.
    pub async fn verify_gone(&self, deleted: &mut DeletedBooking) -> ContractResult<()> {
        let next = deleted.state.apply(LifecycleOp::VerifyGone)?;
        let response = self.send(self.api.read(deleted.id)).await?;
        if response.status == 200 {
            return Err(ContractError::StaleRecord { id: deleted.id });
        }
        self.verifier.verify_absence(&response)?;
        deleted.state = next;
        info!(run_id = %deleted.run_id, booking_id = %deleted.id, "booking gone");
        Ok(())
    }

    /// Sends `patch` without credentials and requires the server to refuse it.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::UnauthenticatedMutationAccepted`] if the
    /// server accepts it.
    pub async fn attempt_unauthenticated_patch(
        &self,
        tracked: &TrackedBooking,
        patch: &BookingPatch,
    ) -> ContractResult<()> {
        tracked.state.apply(LifecycleOp::PartialUpdate)?;
        let mut request = self.api.partial_update(tracked.id, patch);
        request.auth = AuthConfig::None;
        let response = self.send(request).await?;
        self.verifier.verify_rejected(HttpMethod::Patch, &response)?;
        info!(run_id = %tracked.run_id, status = response.status, "anonymous patch refused");
        Ok(())
    }

    fn updated_body(&self, response: &ResponseSpec, expected: &ExpectedState) -> ContractResult<Value> {
        self.verifier.verify_status(response, 200)?;
        let body = self.verifier.json_body(response)?;
        self.verifier.require_fields(&body, expected)?;
        Ok(body)
    }

    async fn send(&self, request: RequestSpec) -> ContractResult<ResponseSpec> {
        let response = self.client.execute(&request).await?;
        info!(
            method = %request.method,
            path = %request.path(),
            authenticated = request.auth.is_configured(),
            status = response.status,
            duration_ms = response.duration_ms(),
            "exchange"
        );
        debug!(body = %pretty(&response), "response body");
        Ok(response)
    }
}

fn pretty(response: &ResponseSpec) -> String {
    response
        .body_as_json()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| response.body.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ports::HttpClientError;
    use crate::scenarios::fixtures;
    use crate::test_support::{MockHttpClient, json_response, text_response};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn orchestrator(client: MockHttpClient) -> (Arc<MockHttpClient>, LifecycleOrchestrator<MockHttpClient>) {
        let client = Arc::new(client);
        let config = SuiteConfig::for_base_url("http://booking.test");
        (client.clone(), LifecycleOrchestrator::new(client, &config).unwrap())
    }

    fn created(id: u64, booking: &Booking) -> ResponseSpec {
        json_response(200, &json!({"bookingid": id, "booking": booking}))
    }

    fn nick() -> Booking {
        fixtures::nick().unwrap()
    }

    fn mila() -> Booking {
        fixtures::mila().unwrap()
    }

    #[test]
    fn test_transitions() {
        use LifecycleOp as Op;
        use LifecycleState as S;
        assert_eq!(S::None.apply(Op::Create).unwrap(), S::Created);
        assert_eq!(S::Created.apply(Op::Read).unwrap(), S::Created);
        assert_eq!(S::Created.apply(Op::PartialUpdate).unwrap(), S::UpdatedPartial);
        assert_eq!(S::UpdatedPartial.apply(Op::FullUpdate).unwrap(), S::UpdatedFull);
        assert_eq!(S::UpdatedFull.apply(Op::PartialUpdate).unwrap(), S::UpdatedPartial);
        assert_eq!(S::UpdatedFull.apply(Op::Delete).unwrap(), S::Deleted);
        assert_eq!(S::Deleted.apply(Op::VerifyGone).unwrap(), S::Absent);
        assert_eq!(S::Absent.apply(Op::VerifyGone).unwrap(), S::Absent);

        for (state, op) in [
            (S::None, Op::Read),
            (S::None, Op::Delete),
            (S::Created, Op::Create),
            (S::Created, Op::VerifyGone),
            (S::Deleted, Op::PartialUpdate),
            (S::Deleted, Op::Delete),
            (S::Absent, Op::Read),
        ] {
            assert!(
                matches!(state.apply(op), Err(ContractError::InvalidTransition { .. })),
                "{state} accepted {op}"
            );
        }
    }

    #[tokio::test]
    async fn test_create_tracks_echoed_booking() {
        let (client, orchestrator) = orchestrator(MockHttpClient::new().respond(created(42, &nick())));

        let tracked = orchestrator.create(&nick()).await.unwrap();

        assert_eq!(tracked.id(), BookingId(42));
        assert_eq!(tracked.state(), LifecycleState::Created);
        assert_eq!(tracked.snapshot(), &nick());
        let sent = client.requests();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].url, "http://booking.test/booking");
        assert_eq!(sent[0].auth, AuthConfig::None);
    }

    #[tokio::test]
    async fn test_create_fails_fast_on_status() {
        let (_, orchestrator) = orchestrator(MockHttpClient::new().respond(text_response(500, "Internal Server Error")));
        let error = orchestrator.create(&nick()).await.unwrap_err();
        assert!(matches!(error, ContractError::StatusMismatch { expected: 200, actual: 500, .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_altered_echo() {
        let mut echoed = nick();
        echoed.dates = mila().dates;
        echoed.deposit_paid = true;
        let (_, orchestrator) = orchestrator(MockHttpClient::new().respond(created(1, &echoed)));
        let error = orchestrator.create(&nick()).await.unwrap_err();
        assert_eq!(error.mismatches()[0].field.as_str(), "depositpaid");
    }

    #[tokio::test]
    async fn test_create_reports_missing_echo_field() {
        let mut echoed = serde_json::to_value(nick()).unwrap();
        echoed.as_object_mut().unwrap().remove("lastname");
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new().respond(json_response(200, &json!({"bookingid": 3, "booking": echoed}))),
        );

        let error = orchestrator.create(&nick()).await.unwrap_err();

        assert_eq!(error.kind(), "field_mismatch");
        assert_eq!(error.mismatches()[0].field.as_str(), "lastname");
        assert_eq!(error.mismatches()[0].actual, None);
    }

    #[tokio::test]
    async fn test_create_reports_wrongly_typed_echo_field() {
        let mut echoed = serde_json::to_value(nick()).unwrap();
        echoed["totalprice"] = json!("150");
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new().respond(json_response(200, &json!({"bookingid": 3, "booking": echoed}))),
        );

        let error = orchestrator.create(&nick()).await.unwrap_err();

        assert_eq!(error.kind(), "field_mismatch");
        assert_eq!(error.mismatches()[0].field.as_str(), "totalprice");
        assert_eq!(error.mismatches()[0].actual, Some(json!("150")));
    }

    #[tokio::test]
    async fn test_repeated_creates_are_independent() {
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(1, &nick()))
                .respond(created(2, &nick())),
        );
        let first = orchestrator.create(&nick()).await.unwrap();
        let second = orchestrator.create(&nick()).await.unwrap();
        assert_ne!(first.id(), second.id());
        assert_ne!(first.run_id(), second.run_id());
    }

    #[tokio::test]
    async fn test_list_requires_entries() {
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(json_response(200, &json!([{"bookingid": 3}, {"bookingid": 5}])))
                .respond(json_response(200, &json!([]))),
        );
        assert_eq!(orchestrator.list_ids().await.unwrap(), vec![BookingId(3), BookingId(5)]);
        assert!(matches!(orchestrator.list_ids().await, Err(ContractError::EmptyListing)));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_unpatched_fields() {
        let mut andrew = nick();
        andrew.first_name = "Andrew".to_string();
        let (client, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(7, &nick()))
                .respond(json_response(200, &serde_json::to_value(&andrew).unwrap())),
        );

        let mut tracked = orchestrator.create(&nick()).await.unwrap();
        orchestrator
            .partial_update(&mut tracked, &fixtures::andrew_patch())
            .await
            .unwrap();

        assert_eq!(tracked.state(), LifecycleState::UpdatedPartial);
        assert_eq!(tracked.snapshot(), &andrew);
        let patch = &client.requests()[1];
        assert_eq!(patch.method, HttpMethod::Patch);
        assert_eq!(patch.url, "http://booking.test/booking/7");
        assert_eq!(patch.auth, AuthConfig::basic("admin", "password123"));
        assert_eq!(patch.body.as_json().unwrap(), json!({"firstname": "Andrew"}));
    }

    #[tokio::test]
    async fn test_partial_update_aggregates_every_drift() {
        // A service that replaces instead of merging loses every unpatched field.
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(7, &nick()))
                .respond(json_response(200, &json!({"firstname": "Andrew"}))),
        );
        let mut tracked = orchestrator.create(&nick()).await.unwrap();

        let error = orchestrator
            .partial_update(&mut tracked, &fixtures::andrew_patch())
            .await
            .unwrap_err();

        assert_eq!(error.mismatches().len(), 6);
        assert_eq!(tracked.state(), LifecycleState::Created);
        assert_eq!(tracked.snapshot(), &nick());
    }

    #[tokio::test]
    async fn test_full_update_replaces_every_field() {
        let (client, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(7, &nick()))
                .respond(json_response(200, &serde_json::to_value(mila()).unwrap())),
        );
        let mut tracked = orchestrator.create(&nick()).await.unwrap();

        let body = orchestrator.full_update(&mut tracked, &mila()).await.unwrap();

        assert_eq!(body["firstname"], json!("Mila"));
        assert_eq!(tracked.state(), LifecycleState::UpdatedFull);
        assert_eq!(tracked.snapshot(), &mila());
        let put = &client.requests()[1];
        assert_eq!(put.method, HttpMethod::Put);
        assert_eq!(put.auth, AuthConfig::basic("admin", "password123"));
        assert_eq!(put.body.as_json().unwrap(), serde_json::to_value(mila()).unwrap());
    }

    #[tokio::test]
    async fn test_full_update_does_not_merge() {
        let mut stale = mila();
        stale.last_name = "Pruchkovskiy".to_string();
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(7, &nick()))
                .respond(json_response(200, &serde_json::to_value(stale).unwrap())),
        );
        let mut tracked = orchestrator.create(&nick()).await.unwrap();
        let error = orchestrator.full_update(&mut tracked, &mila()).await.unwrap_err();
        assert_eq!(error.mismatches().len(), 1);
        assert_eq!(error.mismatches()[0].field.as_str(), "lastname");
    }

    #[tokio::test]
    async fn test_partial_update_accepts_equal_number_forms() {
        let mut body = serde_json::to_value(nick()).unwrap();
        body["firstname"] = json!("Andrew");
        body["totalprice"] = json!(150.0);
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(7, &nick()))
                .respond(json_response(200, &body)),
        );
        let mut tracked = orchestrator.create(&nick()).await.unwrap();

        orchestrator
            .partial_update(&mut tracked, &fixtures::andrew_patch())
            .await
            .unwrap();

        let mut andrew = nick();
        andrew.first_name = "Andrew".to_string();
        assert_eq!(tracked.snapshot(), &andrew);
        assert_eq!(tracked.state(), LifecycleState::UpdatedPartial);
    }

    #[tokio::test]
    async fn test_partial_update_rejects_ill_typed_patch_before_sending() {
        let (client, orchestrator) = orchestrator(MockHttpClient::new().respond(created(7, &nick())));
        let mut tracked = orchestrator.create(&nick()).await.unwrap();
        let patch = BookingPatch::new().with("totalprice", json!("lots")).unwrap();

        let error = orchestrator.partial_update(&mut tracked, &patch).await.unwrap_err();

        assert_eq!(error.kind(), "domain");
        assert_eq!(client.requests().len(), 1);
        assert_eq!(tracked.state(), LifecycleState::Created);
    }

    #[tokio::test]
    async fn test_full_update_requires_dropped_needs_to_disappear() {
        let mut replacement = mila();
        replacement.additional_needs = None;
        // A merging service keeps the needs from the booking it replaced.
        let merged = serde_json::to_value(mila()).unwrap();
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(7, &nick()))
                .respond(json_response(200, &merged)),
        );
        let mut tracked = orchestrator.create(&nick()).await.unwrap();

        let error = orchestrator.full_update(&mut tracked, &replacement).await.unwrap_err();

        assert_eq!(
            error.mismatches(),
            [bookcheck_domain::FieldMismatch::new(
                bookcheck_domain::FieldPath::parse("additionalneeds").unwrap(),
                Value::Null,
                Some(json!("Baby crib")),
            )]
        );
        assert_eq!(tracked.snapshot(), &nick());
        assert_eq!(tracked.state(), LifecycleState::Created);
    }

    #[tokio::test]
    async fn test_full_update_tracks_submitted_booking() {
        let mut replacement = mila();
        replacement.additional_needs = None;
        let mut body = serde_json::to_value(&replacement).unwrap();
        body["additionalneeds"] = Value::Null;
        body["totalprice"] = json!(125.0);
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(7, &nick()))
                .respond(json_response(200, &body)),
        );
        let mut tracked = orchestrator.create(&nick()).await.unwrap();

        orchestrator.full_update(&mut tracked, &replacement).await.unwrap();

        assert_eq!(tracked.snapshot(), &replacement);
        assert_eq!(tracked.state(), LifecycleState::UpdatedFull);
    }

    #[tokio::test]
    async fn test_delete_then_gone_is_repeatable() {
        let (client, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(9, &nick()))
                .respond(text_response(201, "Created"))
                .respond(text_response(404, "Not Found"))
                .respond(text_response(404, "Not Found")),
        );
        let tracked = orchestrator.create(&nick()).await.unwrap();

        let mut deleted = orchestrator.delete(tracked).await.unwrap();
        assert_eq!(deleted.state(), LifecycleState::Deleted);
        orchestrator.verify_gone(&mut deleted).await.unwrap();
        orchestrator.verify_gone(&mut deleted).await.unwrap();

        assert_eq!(deleted.state(), LifecycleState::Absent);
        let sent = client.requests();
        assert_eq!(sent[1].method, HttpMethod::Delete);
        assert_eq!(sent[1].auth, AuthConfig::basic("admin", "password123"));
        assert_eq!(sent[2].method, HttpMethod::Get);
        assert_eq!(sent[2].auth, AuthConfig::None);
    }

    #[tokio::test]
    async fn test_delete_requires_created_marker() {
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(9, &nick()))
                .respond(text_response(204, "")),
        );
        let tracked = orchestrator.create(&nick()).await.unwrap();
        let error = orchestrator.delete(tracked).await.unwrap_err();
        assert!(matches!(error, ContractError::DeletionFailure { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_surviving_record_is_stale() {
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(9, &nick()))
                .respond(text_response(201, "Created"))
                .respond(created(9, &nick())),
        );
        let tracked = orchestrator.create(&nick()).await.unwrap();
        let mut deleted = orchestrator.delete(tracked).await.unwrap();
        let error = orchestrator.verify_gone(&mut deleted).await.unwrap_err();
        assert!(matches!(error, ContractError::StaleRecord { id: BookingId(9) }));
        assert_eq!(deleted.state(), LifecycleState::Deleted);
    }

    #[tokio::test]
    async fn test_read_compares_against_snapshot() {
        let mut drifted = nick();
        drifted.total_price = 99;
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(4, &nick()))
                .respond(json_response(200, &serde_json::to_value(nick()).unwrap()))
                .respond(json_response(200, &serde_json::to_value(drifted).unwrap())),
        );
        let tracked = orchestrator.create(&nick()).await.unwrap();
        assert_eq!(orchestrator.read(&tracked).await.unwrap(), nick());
        let error = orchestrator.read(&tracked).await.unwrap_err();
        assert_eq!(error.mismatches()[0].field.as_str(), "totalprice");
    }

    #[tokio::test]
    async fn test_unauthenticated_patch_must_be_refused() {
        let (client, orchestrator) = orchestrator(
            MockHttpClient::new()
                .respond(created(5, &nick()))
                .respond(text_response(403, "Forbidden"))
                .respond(json_response(200, &json!({"firstname": "Andrew"}))),
        );
        let tracked = orchestrator.create(&nick()).await.unwrap();
        let patch = fixtures::andrew_patch();

        orchestrator.attempt_unauthenticated_patch(&tracked, &patch).await.unwrap();
        let error = orchestrator
            .attempt_unauthenticated_patch(&tracked, &patch)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            ContractError::UnauthenticatedMutationAccepted { status: 200, .. }
        ));
        assert!(client.requests()[1..].iter().all(|r| r.auth == AuthConfig::None));
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let (_, orchestrator) = orchestrator(
            MockHttpClient::new().fail(HttpClientError::Timeout { timeout_ms: 30_000 }),
        );
        let error = orchestrator.list_ids().await.unwrap_err();
        assert!(matches!(
            error,
            ContractError::Transport(HttpClientError::Timeout { timeout_ms: 30_000 })
        ));
    }
}
