//! Pending-update overlay.
//!
//! A local status change is registered here with an expiry. Until it
//! expires, the registered status replaces whatever the remote roster
//! reports for that student, hiding the remote store's write propagation
//! delay. Expiry is evaluated only when a fresh roster is applied; there is
//! no background sweep.

use std::collections::HashMap;
use std::time::Duration;

use crate::clock::Timestamp;
use crate::models::{Student, StudentId, StudentStatus};
use crate::util::to_time_delta;

/// Optimistic status that wins over remote reads until `expiry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOverride {
    pub status: StudentStatus,
    pub expiry: Timestamp,
}

impl PendingOverride {
    #[must_use]
    pub fn is_live_at(&self, now: Timestamp) -> bool {
        now < self.expiry
    }
}

/// Overrides keyed by canonical student id.
#[derive(Debug, Clone, Default)]
pub struct PendingOverlay {
    entries: HashMap<String, PendingOverride>,
}

impl PendingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the override for `id`, expiring `ttl` after `now`.
    pub fn register(&mut self, id: &StudentId, status: StudentStatus, ttl: Duration, now: Timestamp) {
        self.entries.insert(
            id.canonical(),
            PendingOverride {
                status,
                expiry: now + to_time_delta(ttl),
            },
        );
    }

    /// Stored override for `id`, expired or not.
    pub fn get(&self, id: &StudentId) -> Option<&PendingOverride> {
        self.entries.get(&id.canonical())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge a freshly fetched roster with the live overrides.
    ///
    /// Expired overrides are dropped first. A live override replaces only the
    /// `status` of its student; every other field comes from `fresh`.
    pub fn apply(&mut self, fresh: Vec<Student>, now: Timestamp) -> Vec<Student> {
        let before = self.entries.len();
        self.entries.retain(|_, pending| pending.is_live_at(now));
        let purged = before - self.entries.len();
        if purged > 0 {
            tracing::debug!(purged, "Dropped expired status overrides");
        }

        if self.entries.is_empty() {
            return fresh;
        }

        fresh
            .into_iter()
            .map(|mut student| {
                if let Some(pending) = self.entries.get(&student.id.canonical()) {
                    student.status = pending.status;
                }
                student
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    const TTL: Duration = Duration::from_secs(10);

    fn t0() -> Timestamp {
        DateTime::parse_from_rfc3339("2026-03-02T09:00:00+03:00").unwrap()
    }

    fn student(id: &str, status: StudentStatus) -> Student {
        Student {
            id: StudentId::from(id),
            name_en: format!("Student {id}"),
            name_ar: String::new(),
            section: Section::Elementary,
            grade: "4".to_string(),
            class_name: "4B".to_string(),
            status,
            time: "2026-03-02T08:00:00+03:00".to_string(),
        }
    }

    #[test]
    fn live_override_wins_over_fetched_status() {
        let mut overlay = PendingOverlay::new();
        overlay.register(&StudentId::from("7"), StudentStatus::Called, TTL, t0());

        let merged = overlay.apply(
            vec![student("7", StudentStatus::InClass), student("8", StudentStatus::InClass)],
            t0() + to_time_delta(Duration::from_secs(3)),
        );

        assert_eq!(merged[0].status, StudentStatus::Called);
        assert_eq!(merged[1].status, StudentStatus::InClass);
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn override_only_touches_status() {
        let mut overlay = PendingOverlay::new();
        overlay.register(&StudentId::from("7"), StudentStatus::Called, TTL, t0());

        let mut renamed = student("7", StudentStatus::InClass);
        renamed.name_en = "Renamed elsewhere".to_string();
        let merged = overlay.apply(vec![renamed.clone()], t0());

        assert_eq!(
            merged[0],
            Student {
                status: StudentStatus::Called,
                ..renamed
            }
        );
    }

    #[test]
    fn expired_override_passes_fetched_status_and_is_removed() {
        let mut overlay = PendingOverlay::new();
        overlay.register(&StudentId::from("7"), StudentStatus::Called, TTL, t0());

        let merged = overlay.apply(
            vec![student("7", StudentStatus::InClass)],
            t0() + to_time_delta(TTL),
        );

        assert_eq!(merged[0].status, StudentStatus::InClass);
        assert!(overlay.get(&StudentId::from("7")).is_none());
        assert!(overlay.is_empty());
    }

    #[test]
    fn override_then_expiry() {
        let mut overlay = PendingOverlay::new();
        overlay.register(&StudentId::from("7"), StudentStatus::Called, TTL, t0());
        let remote = vec![student("7", StudentStatus::InClass)];

        let merged = overlay.apply(remote.clone(), t0());
        assert_eq!(merged[0].status, StudentStatus::Called);

        let later = t0() + to_time_delta(Duration::from_millis(10_001));
        let merged = overlay.apply(remote, later);
        assert_eq!(merged[0].status, StudentStatus::InClass);
        assert!(overlay.get(&StudentId::from("7")).is_none());
    }

    #[test]
    fn override_matches_canonical_ids() {
        let mut overlay = PendingOverlay::new();
        overlay.register(&StudentId::from("0007"), StudentStatus::OnTheWay, TTL, t0());

        let merged = overlay.apply(vec![student("7.0", StudentStatus::Called)], t0());

        assert_eq!(merged[0].status, StudentStatus::OnTheWay);
        assert_eq!(merged[0].id.as_str(), "7.0");
    }

    #[test]
    fn register_replaces_previous_override() {
        let mut overlay = PendingOverlay::new();
        let id = StudentId::from("7");
        overlay.register(&id, StudentStatus::Called, TTL, t0());
        let later = t0() + to_time_delta(Duration::from_secs(5));
        overlay.register(&id, StudentStatus::OnTheWay, TTL, later);

        let pending = overlay.get(&id).unwrap();
        assert_eq!(pending.status, StudentStatus::OnTheWay);
        assert_eq!(pending.expiry, later + to_time_delta(TTL));
    }
}
