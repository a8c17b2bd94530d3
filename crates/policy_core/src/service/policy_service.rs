//! Policy use-case service.
//!
//! # Responsibility
//! - Validate creation input and persist new policies.
//! - Serve read-views (policy + notes) for list, lookup and date-range export.
//!
//! # Invariants
//! - Creation checks run in a fixed order, first failure wins:
//!   duplicate number, blank number, non-positive premium, start date
//!   outside `today ± 10 years`.
//! - The duplicate check runs before the field checks, so a blank or
//!   otherwise invalid number that matches a stored one reports "already
//!   exists".
//! - "today" comes from the injected [`Clock`].
//! - Lookups report absence as `Ok(None)`, never as an error.

use crate::clock::Clock;
use crate::model::policy::{NewPolicy, PolicyId, PolicyRecord, PolicyValidationError};
use crate::repo::policy_repo::PolicyRepository;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for policy use-cases.
#[derive(Debug)]
pub enum PolicyServiceError {
    /// Creation input broke one of the ordered rules.
    Validation(PolicyValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl PolicyServiceError {
    /// Validation failure carried by this error, if any.
    pub fn validation(&self) -> Option<&PolicyValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(_) => None,
        }
    }
}

impl Display for PolicyServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PolicyServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<PolicyValidationError> for PolicyServiceError {
    fn from(value: PolicyValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for PolicyServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            // Lost the race between the duplicate pre-check and the insert.
            RepoError::DuplicatePolicyNumber(_) => {
                Self::Validation(PolicyValidationError::DuplicatePolicyNumber)
            }
            other => Self::Repo(other),
        }
    }
}

/// Policy service facade over a repository and a date source.
pub struct PolicyService<R: PolicyRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: PolicyRepository, C: Clock> PolicyService<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Validates and persists a new policy.
    ///
    /// Returns the read-view of the stored policy with an empty notes list.
    pub fn create_policy(&self, input: &NewPolicy) -> Result<PolicyRecord, PolicyServiceError> {
        if let Err(err) = self.check_creation_rules(input) {
            if let PolicyServiceError::Validation(rule) = &err {
                warn!(
                    "event=policy_create module=service status=rejected error_code={}",
                    rule.code()
                );
            }
            return Err(err);
        }

        let policy = self.repo.insert_policy(input)?;
        info!(
            "event=policy_create module=service status=ok policy_id={}",
            policy.id
        );
        Ok(PolicyRecord::from_policy(policy, Vec::new()))
    }

    /// Returns every policy with its notes in insertion order.
    pub fn read_policies(&self) -> Result<Vec<PolicyRecord>, PolicyServiceError> {
        let records = self.repo.list_policies()?;
        debug!(
            "event=policy_list module=service status=ok count={}",
            records.len()
        );
        Ok(records)
    }

    /// Returns one policy with its notes, or `None` when the id is unknown.
    pub fn read_policy(&self, id: PolicyId) -> Result<Option<PolicyRecord>, PolicyServiceError> {
        Ok(self.repo.get_policy(id)?)
    }

    /// Returns policies whose start date lies in `[start, end]` (inclusive).
    ///
    /// An inverted range matches nothing.
    pub fn read_policies_by_start_date(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PolicyRecord>, PolicyServiceError> {
        if start > end {
            return Ok(Vec::new());
        }
        let records = self.repo.list_policies_by_start_date(start, end)?;
        debug!(
            "event=policy_export module=service status=ok start={start} end={end} count={}",
            records.len()
        );
        Ok(records)
    }

    fn check_creation_rules(&self, input: &NewPolicy) -> Result<(), PolicyServiceError> {
        if self
            .repo
            .exists_by_policy_number(input.policy_number.as_str())?
        {
            return Err(PolicyValidationError::DuplicatePolicyNumber.into());
        }
        input.validate(self.clock.today())?;
        Ok(())
    }
}
