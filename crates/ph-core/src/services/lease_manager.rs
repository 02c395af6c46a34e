//! Lease status machine.
//!
//! ```text
//! running ──stop──▶ stopped ──deploy──▶ running
//! running|stopped ──expire (sweep, expires_at < now)──▶ expired
//! expired ──deploy──▶ running
//! ```
//!
//! Release is not a transition: it deletes the record and is allowed from
//! any state. Expired leases keep their port until released.

use chrono::{DateTime, Duration, Utc};

use crate::error::{RegistryError, Result};
use crate::models::lease::expiry_after;
use crate::models::{Lease, LeaseStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Successful allocation or redeploy.
    Deploy,
    /// Explicit stop by the teardown workflow.
    Stop,
    /// TTL sweep.
    Expire,
}

impl Transition {
    pub fn target(self) -> LeaseStatus {
        match self {
            Transition::Deploy => LeaseStatus::Running,
            Transition::Stop => LeaseStatus::Stopped,
            Transition::Expire => LeaseStatus::Expired,
        }
    }
}

/// The status reached by applying `transition` in `from`, or `None` if illegal.
pub fn next_status(from: LeaseStatus, transition: Transition) -> Option<LeaseStatus> {
    match (from, transition) {
        (_, Transition::Deploy) => Some(LeaseStatus::Running),
        (LeaseStatus::Running | LeaseStatus::Stopped, Transition::Stop) => {
            Some(LeaseStatus::Stopped)
        }
        (LeaseStatus::Running | LeaseStatus::Stopped, Transition::Expire) => {
            Some(LeaseStatus::Expired)
        }
        (LeaseStatus::Expired, Transition::Stop | Transition::Expire) => None,
    }
}

pub fn apply(lease: &mut Lease, transition: Transition) -> Result<()> {
    match next_status(lease.status, transition) {
        Some(status) => {
            lease.status = status;
            Ok(())
        }
        None => Err(RegistryError::InvalidTransition {
            project: lease.project_name.clone(),
            from: lease.status,
            to: transition.target(),
        }),
    }
}

/// Redeploy: back to running with a sliding expiry of `now + ttl`.
/// Leaves the lease untouched when the expiry is out of range.
pub fn renew(lease: &mut Lease, now: DateTime<Utc>, ttl: Duration) -> Result<()> {
    let expires_at = expiry_after(now, ttl)?;
    lease.status = LeaseStatus::Running;
    // A clock that moved backwards must not break expires_at >= created_at.
    lease.expires_at = expires_at.max(lease.created_at);
    Ok(())
}

/// Sweep rule. Flips the lease to expired and returns true when it is due.
pub fn expire_if_due(lease: &mut Lease, now: DateTime<Utc>) -> bool {
    if lease.status == LeaseStatus::Expired || !lease.is_past_expiry(now) {
        return false;
    }
    lease.status = LeaseStatus::Expired;
    true
}

/// Map an explicit `set_status` request onto the machine.
///
/// Returns `Ok(None)` when the lease is already in `target`. Only `stopped`
/// can be requested directly: running comes from a deploy, expired from the sweep.
pub fn requested_transition(lease: &Lease, target: LeaseStatus) -> Result<Option<Transition>> {
    if lease.status == target {
        return Ok(None);
    }
    match target {
        LeaseStatus::Stopped if next_status(lease.status, Transition::Stop).is_some() => {
            Ok(Some(Transition::Stop))
        }
        _ => Err(RegistryError::InvalidTransition {
            project: lease.project_name.clone(),
            from: lease.status,
            to: target,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn lease_with(status: LeaseStatus) -> Lease {
        let mut lease = Lease::new(
            "app-main".into(),
            3000,
            "main".into(),
            None,
            ts("2025-03-01T00:00:00Z"),
            Duration::days(7),
        )
        .unwrap();
        lease.status = status;
        lease
    }

    #[test]
    fn deploy_is_legal_from_every_state() {
        for from in [
            LeaseStatus::Running,
            LeaseStatus::Stopped,
            LeaseStatus::Expired,
        ] {
            assert_eq!(
                next_status(from, Transition::Deploy),
                Some(LeaseStatus::Running)
            );
        }
    }

    #[test]
    fn expired_cannot_be_stopped_or_re_expired() {
        assert_eq!(next_status(LeaseStatus::Expired, Transition::Stop), None);
        assert_eq!(next_status(LeaseStatus::Expired, Transition::Expire), None);
    }

    #[test]
    fn apply_rejects_illegal_transition() {
        let mut lease = lease_with(LeaseStatus::Expired);
        let err = apply(&mut lease, Transition::Stop).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidTransition {
                from: LeaseStatus::Expired,
                to: LeaseStatus::Stopped,
                ..
            }
        ));
        assert_eq!(lease.status, LeaseStatus::Expired);
    }

    #[test]
    fn renew_slides_expiry_from_now() {
        let mut lease = lease_with(LeaseStatus::Expired);
        let later = ts("2025-03-02T00:00:00Z");
        renew(&mut lease, later, Duration::days(7)).unwrap();
        assert_eq!(lease.status, LeaseStatus::Running);
        assert_eq!(lease.expires_at, ts("2025-03-09T00:00:00Z"));
    }

    #[test]
    fn renew_never_moves_expiry_before_creation() {
        let mut lease = lease_with(LeaseStatus::Running);
        renew(&mut lease, ts("2025-02-01T00:00:00Z"), Duration::days(0)).unwrap();
        assert_eq!(lease.expires_at, lease.created_at);
    }

    #[test]
    fn renew_with_out_of_range_ttl_leaves_lease_untouched() {
        let mut lease = lease_with(LeaseStatus::Stopped);
        let before = lease.clone();
        let err = renew(
            &mut lease,
            ts("2025-03-02T00:00:00Z"),
            Duration::days(i64::from(u32::MAX)),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidConfig(_)));
        assert_eq!(lease, before);
    }

    #[test]
    fn expire_if_due_respects_boundary_and_status() {
        let mut lease = lease_with(LeaseStatus::Stopped);
        let expiry = lease.expires_at;
        assert!(!expire_if_due(&mut lease, expiry));
        assert!(expire_if_due(&mut lease, expiry + Duration::seconds(1)));
        assert_eq!(lease.status, LeaseStatus::Expired);
        assert!(!expire_if_due(&mut lease, expiry + Duration::days(1)));
    }

    #[test]
    fn set_status_requests() {
        let running = lease_with(LeaseStatus::Running);
        assert_eq!(
            requested_transition(&running, LeaseStatus::Stopped).unwrap(),
            Some(Transition::Stop)
        );
        assert_eq!(
            requested_transition(&running, LeaseStatus::Running).unwrap(),
            None
        );
        assert!(requested_transition(&running, LeaseStatus::Expired).is_err());

        let stopped = lease_with(LeaseStatus::Stopped);
        assert!(requested_transition(&stopped, LeaseStatus::Running).is_err());
    }
}
