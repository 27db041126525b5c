//! Terminal results of inbound pingback validation.

use crate::protocol::xmlrpc::MethodResponse;

/// Success string returned to the caller of `pingback.ping`.
pub const SUCCESS_MESSAGE: &str = "Pingback successful.";

/// Fault string for failures whose details must not reach the caller.
pub const GENERIC_FAULT_MESSAGE: &str = "An error occurred while processing the pingback.";

const TARGET_NOT_FOUND_MESSAGE: &str = "The specified target URI does not exist.";

/// Outcome of one `pingback.ping` call.
///
/// Every inbound call produces exactly one value. Spam is reported to the
/// caller exactly like an unknown target so that the presence of content
/// moderation is not revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PingbackOutcome {
    Success,
    GenericError,
    InvalidPingRequest,
    Error32TargetUriNotExist,
    Error48PingbackAlreadyRegistered,
    Error17SourceNotContainTargetUri,
    SpamDetectedFakeNotFound,
}

impl PingbackOutcome {
    /// XML-RPC fault code, `None` for [`PingbackOutcome::Success`].
    pub fn fault_code(self) -> Option<i32> {
        match self {
            Self::Success => None,
            Self::GenericError | Self::InvalidPingRequest => Some(0),
            Self::Error17SourceNotContainTargetUri => Some(17),
            Self::Error32TargetUriNotExist | Self::SpamDetectedFakeNotFound => Some(32),
            Self::Error48PingbackAlreadyRegistered => Some(48),
        }
    }

    /// Text sent back to the caller.
    pub fn message(self) -> &'static str {
        match self {
            Self::Success => SUCCESS_MESSAGE,
            Self::GenericError => GENERIC_FAULT_MESSAGE,
            Self::InvalidPingRequest => "The pingback request is invalid.",
            Self::Error17SourceNotContainTargetUri => {
                "The source URI does not contain a link to the target URI."
            }
            Self::Error32TargetUriNotExist | Self::SpamDetectedFakeNotFound => {
                TARGET_NOT_FOUND_MESSAGE
            }
            Self::Error48PingbackAlreadyRegistered => "The pingback has already been registered.",
        }
    }

    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::GenericError => "generic_error",
            Self::InvalidPingRequest => "invalid_request",
            Self::Error32TargetUriNotExist => "target_not_found",
            Self::Error48PingbackAlreadyRegistered => "already_registered",
            Self::Error17SourceNotContainTargetUri => "source_without_link",
            Self::SpamDetectedFakeNotFound => "spam",
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// The XML-RPC response for this outcome.
    pub fn to_response(self) -> MethodResponse {
        match self.fault_code() {
            None => MethodResponse::Success(SUCCESS_MESSAGE.to_string()),
            Some(code) => MethodResponse::Fault {
                code,
                message: self.message().to_string(),
            },
        }
    }
}
