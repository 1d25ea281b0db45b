use crate::errors::{CouchmapError, ErrorKind};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Scan consistency of a view query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewScanConsistency {
    /// Wait until the index caught up with all mutations.
    RequestPlus,
    /// Answer from the current index, then trigger an update.
    UpdateAfter,
    /// Answer from the current index.
    NotBounded,
}

impl ViewScanConsistency {
    /// Value of the `stale` view request parameter.
    pub fn stale_param(&self) -> &'static str {
        match self {
            ViewScanConsistency::RequestPlus => "false",
            ViewScanConsistency::UpdateAfter => "update_after",
            ViewScanConsistency::NotBounded => "ok",
        }
    }
}

/// Scan consistency of a N1QL query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScanConsistency {
    RequestPlus,
    NotBounded,
}

impl QueryScanConsistency {
    /// Value of the `scan_consistency` request field.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryScanConsistency::RequestPlus => "request_plus",
            QueryScanConsistency::NotBounded => "not_bounded",
        }
    }
}

impl Display for QueryScanConsistency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Consistency levels a repository can be configured with.
///
/// Each level fixes the scan consistency used for views and for N1QL.
///
/// | level                  | view          | N1QL          |
/// |------------------------|---------------|---------------|
/// | `ReadYourOwnWrites`    | request plus  | request plus  |
/// | `StronglyConsistent`   | request plus  | request plus  |
/// | `UpdateAfter`          | update after  | not bounded   |
/// | `EventuallyConsistent` | update after  | not bounded   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consistency {
    ReadYourOwnWrites,
    StronglyConsistent,
    UpdateAfter,
    EventuallyConsistent,
}

impl Consistency {
    /// Level used when nothing else is configured.
    pub const DEFAULT: Consistency = Consistency::ReadYourOwnWrites;

    pub const ALL: [Consistency; 4] = [
        Consistency::ReadYourOwnWrites,
        Consistency::StronglyConsistent,
        Consistency::UpdateAfter,
        Consistency::EventuallyConsistent,
    ];

    pub fn view_consistency(&self) -> ViewScanConsistency {
        match self {
            Consistency::ReadYourOwnWrites | Consistency::StronglyConsistent => {
                ViewScanConsistency::RequestPlus
            }
            Consistency::UpdateAfter | Consistency::EventuallyConsistent => {
                ViewScanConsistency::UpdateAfter
            }
        }
    }

    pub fn query_consistency(&self) -> QueryScanConsistency {
        match self {
            Consistency::ReadYourOwnWrites | Consistency::StronglyConsistent => {
                QueryScanConsistency::RequestPlus
            }
            Consistency::UpdateAfter | Consistency::EventuallyConsistent => {
                QueryScanConsistency::NotBounded
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Consistency::ReadYourOwnWrites => "read_your_own_writes",
            Consistency::StronglyConsistent => "strongly_consistent",
            Consistency::UpdateAfter => "update_after",
            Consistency::EventuallyConsistent => "eventually_consistent",
        }
    }
}

impl Default for Consistency {
    fn default() -> Self {
        Consistency::DEFAULT
    }
}

impl Display for Consistency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Consistency {
    type Err = CouchmapError;

    /// Parses a level name, ignoring case, so `READ_YOUR_OWN_WRITES` and
    /// `read_your_own_writes` are both accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Consistency::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                log::error!("Unknown consistency level {}", s);
                CouchmapError::new(
                    &format!("Unknown consistency level '{}'", s),
                    ErrorKind::ConfigurationError,
                )
            })
    }
}
