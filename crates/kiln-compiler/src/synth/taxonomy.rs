//! Error taxonomy mapping.
//!
//! Translates low-level data-layer error signals into the four API error
//! kinds. The mapping is total: every signal maps to exactly one kind, and
//! anything unrecognized coerces to `InternalError`. Callers of generated
//! handlers only ever observe the taxonomy - the original store error never
//! crosses the boundary.
//!
//! This table is invoked by the *emitted* handler code at request time, not
//! by the generator; the runtime module is generated from `MAPPING` so the
//! two can never drift apart.

use serde::Serialize;

/// A low-level error signal raised by the data-access layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorSignal {
    /// A uniqueness constraint was violated.
    UniqueViolation,
    /// A reference (foreign key) constraint was violated.
    ForeignKeyViolation,
    /// The addressed record does not exist.
    RecordNotFound,
    /// A referenced relation target does not exist.
    RelatedRecordNotFound,
    /// A value was malformed for its column type.
    InvalidValue,
    /// The call shape violated the store's schema.
    SchemaViolation,
    /// Anything the store raised that we don't recognize.
    Unrecognized,
}

impl StoreErrorSignal {
    /// Wire code the data layer attaches to the error.
    pub fn code(self) -> &'static str {
        match self {
            Self::UniqueViolation => "unique_violation",
            Self::ForeignKeyViolation => "fk_violation",
            Self::RecordNotFound => "record_not_found",
            Self::RelatedRecordNotFound => "relation_not_found",
            Self::InvalidValue => "invalid_value",
            Self::SchemaViolation => "schema_violation",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Total: unknown codes land on `Unrecognized`.
    pub fn from_code(code: &str) -> Self {
        MAPPING
            .iter()
            .find(|(signal, _)| signal.code() == code)
            .map_or(Self::Unrecognized, |(signal, _)| *signal)
    }
}

/// One of the four error shapes allowed to leave generated handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    Conflict,
    NotFound,
    BadRequest,
    InternalError,
}

impl ApiErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::InternalError => "internal_error",
        }
    }

    /// Status classification for per-request reporting.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Conflict => 409,
            Self::NotFound => 404,
            Self::BadRequest => 400,
            Self::InternalError => 500,
        }
    }
}

/// The static signal → kind table. The runtime module emitter iterates this
/// to produce the TypeScript mirror.
pub const MAPPING: [(StoreErrorSignal, ApiErrorKind); 7] = [
    (StoreErrorSignal::UniqueViolation, ApiErrorKind::Conflict),
    (StoreErrorSignal::ForeignKeyViolation, ApiErrorKind::Conflict),
    (StoreErrorSignal::RecordNotFound, ApiErrorKind::NotFound),
    (StoreErrorSignal::RelatedRecordNotFound, ApiErrorKind::NotFound),
    (StoreErrorSignal::InvalidValue, ApiErrorKind::BadRequest),
    (StoreErrorSignal::SchemaViolation, ApiErrorKind::BadRequest),
    (StoreErrorSignal::Unrecognized, ApiErrorKind::InternalError),
];

/// Maps a store error signal to its API error kind.
pub fn map_store_error(signal: StoreErrorSignal) -> ApiErrorKind {
    MAPPING
        .iter()
        .find(|(s, _)| *s == signal)
        .map_or(ApiErrorKind::InternalError, |(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_total_over_all_signals() {
        let signals = [
            StoreErrorSignal::UniqueViolation,
            StoreErrorSignal::ForeignKeyViolation,
            StoreErrorSignal::RecordNotFound,
            StoreErrorSignal::RelatedRecordNotFound,
            StoreErrorSignal::InvalidValue,
            StoreErrorSignal::SchemaViolation,
            StoreErrorSignal::Unrecognized,
        ];
        for signal in signals {
            // Every signal resolves to exactly one kind; reaching here
            // without a panic is the property.
            let _ = map_store_error(signal);
        }
        assert_eq!(MAPPING.len(), signals.len());
    }

    #[test]
    fn constraint_violations_are_conflicts() {
        assert_eq!(map_store_error(StoreErrorSignal::UniqueViolation), ApiErrorKind::Conflict);
        assert_eq!(map_store_error(StoreErrorSignal::ForeignKeyViolation), ApiErrorKind::Conflict);
    }

    #[test]
    fn missing_records_are_not_found() {
        assert_eq!(map_store_error(StoreErrorSignal::RecordNotFound), ApiErrorKind::NotFound);
        assert_eq!(
            map_store_error(StoreErrorSignal::RelatedRecordNotFound),
            ApiErrorKind::NotFound
        );
    }

    #[test]
    fn malformed_values_are_bad_requests() {
        assert_eq!(map_store_error(StoreErrorSignal::InvalidValue), ApiErrorKind::BadRequest);
        assert_eq!(map_store_error(StoreErrorSignal::SchemaViolation), ApiErrorKind::BadRequest);
    }

    #[test]
    fn unknown_codes_coerce_to_internal_error() {
        assert_eq!(StoreErrorSignal::from_code("disk_on_fire"), StoreErrorSignal::Unrecognized);
        assert_eq!(
            map_store_error(StoreErrorSignal::from_code("disk_on_fire")),
            ApiErrorKind::InternalError
        );
    }

    #[test]
    fn codes_round_trip() {
        for (signal, _) in MAPPING {
            assert_eq!(StoreErrorSignal::from_code(signal.code()), signal);
        }
    }

    #[test]
    fn status_classification() {
        assert_eq!(ApiErrorKind::Conflict.http_status(), 409);
        assert_eq!(ApiErrorKind::NotFound.http_status(), 404);
        assert_eq!(ApiErrorKind::BadRequest.http_status(), 400);
        assert_eq!(ApiErrorKind::InternalError.http_status(), 500);
    }
}
