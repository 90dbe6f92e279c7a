//! Per-file aggregate statuses

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{StatusError, StatusResult};

/// Coarse pipeline position of a file, used to compare file statuses that
/// describe the same stage (e.g. VALIDATED and WAITING_APPROVAL_TO_UPLOAD).
///
/// A parse, validate or upload error sits at the stage of the step that
/// failed, so it ranks after the status its records revert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileStage {
    Intake,
    Loaded,
    Parsed,
    Validated,
    Uploaded,
    Finished,
}

/// Aggregate status of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum FileStatus {
    New = 10,
    Copied = 12,
    FileExists = 14,
    NoMatch = 16,
    Loading = 20,
    Loaded = 25,
    LoadError = 29,
    Parsing = 40,
    Parsed = 45,
    ParseError = 49,
    Validating = 60,
    Validated = 65,
    ValidateError = 69,
    WaitingApprovalToUpload = 70,
    ApprovedToUpload = 75,
    Uploading = 80,
    UploadingRetryPause = 82,
    Uploaded = 85,
    UploadError = 89,
    Reporting = 90,
    ReportError = 95,
    Completed = 100,
}

impl FileStatus {
    /// Every file status in code order
    pub const ALL: [FileStatus; 22] = [
        FileStatus::New,
        FileStatus::Copied,
        FileStatus::FileExists,
        FileStatus::NoMatch,
        FileStatus::Loading,
        FileStatus::Loaded,
        FileStatus::LoadError,
        FileStatus::Parsing,
        FileStatus::Parsed,
        FileStatus::ParseError,
        FileStatus::Validating,
        FileStatus::Validated,
        FileStatus::ValidateError,
        FileStatus::WaitingApprovalToUpload,
        FileStatus::ApprovedToUpload,
        FileStatus::Uploading,
        FileStatus::UploadingRetryPause,
        FileStatus::Uploaded,
        FileStatus::UploadError,
        FileStatus::Reporting,
        FileStatus::ReportError,
        FileStatus::Completed,
    ];

    /// Integer wire code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Looks up a status by its wire code
    pub fn from_code(code: i32) -> StatusResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.code() == code)
            .ok_or(StatusError::UnknownFileStatus(code))
    }

    /// Returns the status name
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::New => "NEW",
            FileStatus::Copied => "COPIED",
            FileStatus::FileExists => "FILE_EXISTS",
            FileStatus::NoMatch => "NO_MATCH",
            FileStatus::Loading => "LOADING",
            FileStatus::Loaded => "LOADED",
            FileStatus::LoadError => "LOAD_ERROR",
            FileStatus::Parsing => "PARSING",
            FileStatus::Parsed => "PARSED",
            FileStatus::ParseError => "PARSE_ERROR",
            FileStatus::Validating => "VALIDATING",
            FileStatus::Validated => "VALIDATED",
            FileStatus::ValidateError => "VALIDATE_ERROR",
            FileStatus::WaitingApprovalToUpload => "WAITING_APPROVAL_TO_UPLOAD",
            FileStatus::ApprovedToUpload => "APPROVED_TO_UPLOAD",
            FileStatus::Uploading => "UPLOADING",
            FileStatus::UploadingRetryPause => "UPLOADING_RETRY_PAUSE",
            FileStatus::Uploaded => "UPLOADED",
            FileStatus::UploadError => "UPLOAD_ERROR",
            FileStatus::Reporting => "REPORTING",
            FileStatus::ReportError => "REPORT_ERROR",
            FileStatus::Completed => "COMPLETED",
        }
    }

    /// A processing step currently owns the file
    pub fn is_working(&self) -> bool {
        matches!(
            self,
            FileStatus::Loading
                | FileStatus::Parsing
                | FileStatus::Validating
                | FileStatus::Uploading
                | FileStatus::UploadingRetryPause
                | FileStatus::Reporting
        )
    }

    /// Pipeline stage this status belongs to
    pub fn stage(&self) -> FileStage {
        match self {
            FileStatus::New
            | FileStatus::Copied
            | FileStatus::FileExists
            | FileStatus::NoMatch
            | FileStatus::Loading
            | FileStatus::LoadError => FileStage::Intake,
            FileStatus::Loaded | FileStatus::Parsing => FileStage::Loaded,
            FileStatus::Parsed | FileStatus::Validating | FileStatus::ParseError => {
                FileStage::Parsed
            }
            FileStatus::Validated
            | FileStatus::WaitingApprovalToUpload
            | FileStatus::ApprovedToUpload
            | FileStatus::Uploading
            | FileStatus::UploadingRetryPause
            | FileStatus::ValidateError => FileStage::Validated,
            FileStatus::Uploaded
            | FileStatus::Reporting
            | FileStatus::ReportError
            | FileStatus::UploadError => FileStage::Uploaded,
            FileStatus::Completed => FileStage::Finished,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i32> for FileStatus {
    type Error = StatusError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<FileStatus> for i32 {
    fn from(status: FileStatus) -> Self {
        status.code()
    }
}
