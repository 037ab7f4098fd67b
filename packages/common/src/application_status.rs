#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an internship application.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")
)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted by the student, awaiting a decision.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    /// Accepted by the company.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "accepted"))]
    Accepted,
    /// Rejected by the company.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "rejected"))]
    Rejected,
    /// Withdrawn by the student.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "cancelled"))]
    Cancelled,
}

/// Which side of the platform is asking for a status change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusActor {
    Student,
    Company,
}

/// Reason a requested status change was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The actor may never set this status.
    NotAllowed {
        actor: StatusActor,
        target: ApplicationStatus,
    },
    /// The application has already left the state the transition starts from.
    NotPending { current: ApplicationStatus },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllowed {
                actor: StatusActor::Student,
                ..
            } => f.write_str("Students can only cancel their applications"),
            Self::NotAllowed {
                actor: StatusActor::Company,
                ..
            } => f.write_str("Status must be one of: accepted, rejected"),
            Self::NotPending { current } => {
                write!(f, "Application is already {current} and can no longer be reviewed")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

impl ApplicationStatus {
    /// All possible status values.
    pub const ALL: &'static [ApplicationStatus] = &[
        Self::Pending,
        Self::Accepted,
        Self::Rejected,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true once no company decision can be taken anymore.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Validate a status change requested by `actor`.
    ///
    /// Students may move an application from any state to `cancelled`.
    /// Companies may only decide (`accepted` / `rejected`) on pending applications.
    pub fn transition(
        self,
        actor: StatusActor,
        target: ApplicationStatus,
    ) -> Result<ApplicationStatus, TransitionError> {
        match actor {
            StatusActor::Student => {
                if target != Self::Cancelled {
                    return Err(TransitionError::NotAllowed { actor, target });
                }
                Ok(target)
            }
            StatusActor::Company => {
                if !matches!(target, Self::Accepted | Self::Rejected) {
                    return Err(TransitionError::NotAllowed { actor, target });
                }
                if self.is_terminal() {
                    return Err(TransitionError::NotPending { current: self });
                }
                Ok(target)
            }
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            ApplicationStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for ApplicationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
