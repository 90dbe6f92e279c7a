//! Validated filter and paging description
//!
//! `FilterSpec::from_params` is the only constructor. Everything downstream
//! (planner, revert engine) can assume the spec is well formed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::errors::{FilterError, FilterResult};
use super::params::{ParamValue, RawFilterParams};
use crate::status::RecordStatus;

/// Page length used when the caller does not send one
pub const DEFAULT_PAGE_LENGTH: u64 = 10;

/// Largest page a caller may request
pub const MAX_PAGE_LENGTH: u64 = 1000;

/// Paging bounds applied while validating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterLimits {
    pub default_page_length: u64,
    pub max_page_length: u64,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self {
            default_page_length: DEFAULT_PAGE_LENGTH,
            max_page_length: MAX_PAGE_LENGTH,
        }
    }
}

/// Offset and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paging {
    start: u64,
    length: u64,
}

impl Paging {
    /// Rows to skip before the page starts
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Page size, always at least 1
    pub fn length(&self) -> u64 {
        self.length
    }
}

/// Case-insensitive literal substring filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextFilter {
    raw: String,
    pattern: String,
}

impl TextFilter {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            pattern: regex::escape(raw),
        }
    }

    /// The text exactly as the caller typed it
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Regex-escaped form; matches the raw text literally
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Normalized filter over one file's records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    status: Option<RecordStatus>,
    text: Option<TextFilter>,
    recent_error_function_ids: Option<BTreeSet<String>>,
    paging: Paging,
}

impl FilterSpec {
    /// Validates raw parameters with the default limits
    pub fn parse(raw: &RawFilterParams) -> FilterResult<Self> {
        Self::from_params(raw, &FilterLimits::default())
    }

    /// Validates raw parameters.
    ///
    /// - `status`: blank or `"0"` means no filter; anything else must be a
    ///   known record status code
    /// - `search`: matched as typed, surrounding spaces included; blank
    ///   means no filter
    /// - `recentErrors`: each id must be a 24 character hex object id
    /// - `start`: non-negative integer, default 0
    /// - `length`: integer in `1..=max_page_length`, default
    ///   `default_page_length`
    pub fn from_params(raw: &RawFilterParams, limits: &FilterLimits) -> FilterResult<Self> {
        let status = parse_status(raw.status.as_ref())?;

        let text = raw
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(TextFilter::new);

        let recent_error_function_ids = if raw.recent_errors.is_empty() {
            None
        } else {
            let mut ids = BTreeSet::new();
            for id in &raw.recent_errors {
                let id = id.trim();
                if !is_object_id(id) {
                    return Err(FilterError::invalid_function_id(id));
                }
                ids.insert(id.to_ascii_lowercase());
            }
            Some(ids)
        };

        let start = match &raw.start {
            None => 0,
            Some(value) => parse_integer("start", value)?,
        };
        if start < 0 {
            return Err(FilterError::invalid_paging("start", "must not be negative"));
        }

        let length = match &raw.length {
            None => limits.default_page_length as i64,
            Some(value) => parse_integer("length", value)?,
        };
        if length < 1 {
            return Err(FilterError::invalid_paging("length", "must be at least 1"));
        }
        if length as u64 > limits.max_page_length {
            return Err(FilterError::invalid_paging(
                "length",
                format!("must not exceed {}", limits.max_page_length),
            ));
        }

        Ok(Self {
            status,
            text,
            recent_error_function_ids,
            paging: Paging {
                start: start as u64,
                length: length as u64,
            },
        })
    }

    /// True when any content filter is active. Drives the paging strategy:
    /// unfiltered pages are addressed arithmetically, filtered pages need a
    /// store-side skip.
    pub fn is_filtered(&self) -> bool {
        self.status.is_some() || self.text.is_some() || self.recent_error_function_ids.is_some()
    }

    pub fn status(&self) -> Option<RecordStatus> {
        self.status
    }

    pub fn text(&self) -> Option<&TextFilter> {
        self.text.as_ref()
    }

    pub fn recent_error_function_ids(&self) -> Option<&BTreeSet<String>> {
        self.recent_error_function_ids.as_ref()
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }
}

fn parse_status(raw: Option<&ParamValue>) -> FilterResult<Option<RecordStatus>> {
    let text = match raw {
        None => return Ok(None),
        Some(value) => value.as_text(),
    };
    if text.is_empty() || text == "0" {
        return Ok(None);
    }
    RecordStatus::parse_code(&text)
        .map(Some)
        .map_err(|e| FilterError::invalid_status(&text, e))
}

fn parse_integer(param: &'static str, value: &ParamValue) -> FilterResult<i64> {
    match value {
        ParamValue::Int(n) => Ok(*n),
        ParamValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| FilterError::invalid_paging(param, format!("'{}' is not an integer", s))),
    }
}

fn is_object_id(id: &str) -> bool {
    id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterErrorCode;

    const FUNCTION_ID: &str = "b921aea76104d6682dc2c636";

    #[test]
    fn test_defaults() {
        let spec = FilterSpec::parse(&RawFilterParams::default()).unwrap();
        assert!(!spec.is_filtered());
        assert_eq!(spec.paging().start(), 0);
        assert_eq!(spec.paging().length(), DEFAULT_PAGE_LENGTH);
    }

    #[test]
    fn test_status_filter() {
        let spec = FilterSpec::parse(&RawFilterParams::default().with_status("69")).unwrap();
        assert_eq!(spec.status(), Some(RecordStatus::ValidationError));
        assert!(spec.is_filtered());

        let spec = FilterSpec::parse(&RawFilterParams::default().with_status(89)).unwrap();
        assert_eq!(spec.status(), Some(RecordStatus::UploadError));
    }

    #[test]
    fn test_blank_and_zero_status_mean_unfiltered() {
        for raw in ["", "0", "  "] {
            let spec = FilterSpec::parse(&RawFilterParams::default().with_status(raw)).unwrap();
            assert_eq!(spec.status(), None);
            assert!(!spec.is_filtered());
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = FilterSpec::parse(&RawFilterParams::default().with_status("41")).unwrap_err();
        assert_eq!(err.code(), FilterErrorCode::RecordsFilterInvalidStatus);
        assert!(err.message().contains("41"));

        let err = FilterSpec::parse(&RawFilterParams::default().with_status("parsed")).unwrap_err();
        assert_eq!(err.code(), FilterErrorCode::RecordsFilterInvalidStatus);
    }

    #[test]
    fn test_text_is_escaped() {
        let spec = FilterSpec::parse(&RawFilterParams::default().with_search("a.b*(c)")).unwrap();
        let text = spec.text().unwrap();
        assert_eq!(text.raw(), "a.b*(c)");
        assert_eq!(text.pattern(), r"a\.b\*\(c\)");
        assert!(spec.is_filtered());
    }

    #[test]
    fn test_text_keeps_surrounding_spaces() {
        let spec = FilterSpec::parse(&RawFilterParams::default().with_search(" 02")).unwrap();
        let text = spec.text().unwrap();
        assert_eq!(text.raw(), " 02");
        assert_eq!(text.pattern(), " 02");
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let spec = FilterSpec::parse(&RawFilterParams::default().with_search("   ")).unwrap();
        assert!(spec.text().is_none());
        assert!(!spec.is_filtered());
    }

    #[test]
    fn test_recent_error_ids() {
        let spec = FilterSpec::parse(
            &RawFilterParams::default()
                .with_recent_error(FUNCTION_ID)
                .with_recent_error(FUNCTION_ID.to_uppercase()),
        )
        .unwrap();
        let ids = spec.recent_error_function_ids().unwrap();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains(FUNCTION_ID));
        assert!(spec.is_filtered());
    }

    #[test]
    fn test_bad_function_id_rejected() {
        let err =
            FilterSpec::parse(&RawFilterParams::default().with_recent_error("not-an-id")).unwrap_err();
        assert_eq!(err.code(), FilterErrorCode::RecordsFilterInvalidFunctionId);
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = FilterSpec::parse(&RawFilterParams::default().with_paging(0, 0)).unwrap_err();
        assert_eq!(err.code(), FilterErrorCode::RecordsFilterInvalidPaging);
        assert_eq!(err.param(), "length");
    }

    #[test]
    fn test_negative_start_rejected() {
        let err = FilterSpec::parse(&RawFilterParams::default().with_paging(-1, 10)).unwrap_err();
        assert_eq!(err.param(), "start");
    }

    #[test]
    fn test_non_numeric_paging_rejected() {
        let err = FilterSpec::parse(&RawFilterParams::default().with_paging("ten", 10)).unwrap_err();
        assert_eq!(err.code(), FilterErrorCode::RecordsFilterInvalidPaging);
    }

    #[test]
    fn test_length_limit() {
        let limits = FilterLimits {
            default_page_length: 25,
            max_page_length: 100,
        };
        let spec = FilterSpec::from_params(&RawFilterParams::default(), &limits).unwrap();
        assert_eq!(spec.paging().length(), 25);

        let raw = RawFilterParams::default().with_paging(0, 101);
        assert!(FilterSpec::from_params(&raw, &limits).is_err());
    }
}
