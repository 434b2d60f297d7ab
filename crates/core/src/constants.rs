//! Constants used throughout the Arogith core crate.
//!
//! Defaults and literals shared by the draft, reconciler and workflow so that form state and
//! backend records agree on the same fallback values.

/// Default backend base URL when no explicit URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8084/api";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Gender a fresh draft starts with, and the fallback for records without one.
pub const DEFAULT_GENDER: &str = "Male";

/// Visit status a fresh draft starts with, and the fallback for records without one.
pub const DEFAULT_STATUS: &str = "Active";

/// Reason attached to a name/surname conflict against an existing Aadhaar record.
pub const NAME_MISMATCH_REASON: &str =
    "Name/Surname does not match with the existing Aadhar record";

/// Visit statuses that count as a completed consultation on the dashboard.
pub const CONSULTED_STATUSES: [&str; 2] = ["Completed", "Consulted"];

/// Placeholder shown for missing values on the visit summary.
pub const NOT_AVAILABLE: &str = "N/A";

/// Nurse status written on login.
pub const NURSE_STATUS_ACTIVE: &str = "Active";

/// Nurse status written on logout. The backend stores this spelling.
pub const NURSE_STATUS_INACTIVE: &str = "INActive";
