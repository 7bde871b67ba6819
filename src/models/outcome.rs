use crate::error::RequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    Success,
    Failure,
}

/// Result of one request. Built once by the worker and never mutated;
/// fields are private so `item_count` is set only on success and `error`
/// only on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    request_id: u64,
    duration: Option<f64>,
    status: OutcomeStatus,
    item_count: Option<usize>,
    error: Option<RequestError>,
}

impl RequestOutcome {
    pub fn success(request_id: u64, duration: f64, item_count: usize) -> Self {
        Self {
            request_id,
            duration: Some(duration.max(0.0)),
            status: OutcomeStatus::Success,
            item_count: Some(item_count),
            error: None,
        }
    }

    /// Failed requests carry no duration: partial timings would skew the
    /// success average.
    pub fn failure(request_id: u64, error: RequestError) -> Self {
        Self {
            request_id,
            duration: None,
            status: OutcomeStatus::Failure,
            item_count: None,
            error: Some(error),
        }
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    pub fn item_count(&self) -> Option<usize> {
        self.item_count
    }

    pub fn error(&self) -> Option<&RequestError> {
        self.error.as_ref()
    }
}
