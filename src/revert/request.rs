//! Revert requests

use serde::Serialize;

use super::errors::{RevertError, RevertResult};
use crate::address::FileId;
use crate::filter::{FilterLimits, FilterSpec, ParamValue, RawFilterParams};
use crate::status::RecordStatus;

/// Roll back the records of one file selected by `filter` to `to_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevertRequest {
    pub file_id: FileId,
    /// Selects the current population; must carry a status filter
    pub filter: FilterSpec,
    pub to_status: RecordStatus,
}

impl RevertRequest {
    pub fn new(file_id: FileId, filter: FilterSpec, to_status: RecordStatus) -> Self {
        Self {
            file_id,
            filter,
            to_status,
        }
    }

    /// Builds a request from raw caller parameters.
    ///
    /// The filter goes through `FilterSpec::from_params`; `to_status` must be
    /// a known record status code.
    pub fn from_params(
        file_id: FileId,
        raw: &RawFilterParams,
        limits: &FilterLimits,
        to_status: impl Into<ParamValue>,
    ) -> RevertResult<Self> {
        let filter = FilterSpec::from_params(raw, limits)?;

        let target = to_status.into().as_text();
        let to_status =
            RecordStatus::parse_code(&target).map_err(|e| RevertError::InvalidTarget {
                target: target.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self::new(file_id, filter, to_status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_params() {
        let raw = RawFilterParams::default().with_status("69");
        let request =
            RevertRequest::from_params(FileId::from(42), &raw, &FilterLimits::default(), "20")
                .unwrap();
        assert_eq!(request.to_status, RecordStatus::Loaded);
        assert_eq!(request.filter.status(), Some(RecordStatus::ValidationError));
    }

    #[test]
    fn test_unknown_target_code() {
        let raw = RawFilterParams::default().with_status("69");
        let err = RevertRequest::from_params(FileId::from(42), &raw, &FilterLimits::default(), 21)
            .unwrap_err();
        assert!(matches!(err, RevertError::InvalidTarget { ref target, .. } if target == "21"));
    }

    #[test]
    fn test_bad_filter_is_filter_error() {
        let raw = RawFilterParams::default().with_status("abc");
        let err = RevertRequest::from_params(FileId::from(42), &raw, &FilterLimits::default(), 20)
            .unwrap_err();
        assert!(matches!(err, RevertError::Filter(_)));
    }
}
