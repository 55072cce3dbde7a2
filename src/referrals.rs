//! Referral coordination: inter-campus routing policy and the referral
//! status state machine.
//!
//! Lifecycle: `Pending` → `Accepted` → `Completed`, with `Pending` →
//! `Rejected` as the failure branch. `Rejected` and `Completed` are
//! terminal. Transitions are applied as single conditional UPDATEs
//! (`... WHERE id = ? AND status = ?`), so a referral can never move
//! backwards and two racing callers cannot both win the same transition.

use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::config::RoutingTopology;
use crate::db::repository::clinic::{find_general_clinic, get_clinic};
use crate::db::repository::referral::{
    accept_referral, get_referral, get_referral_view, insert_referral, list_referral_views,
    transition_status,
};
use crate::db::DatabaseError;
use crate::models::{Clinic, Referral, ReferralStatus, ReferralView};

#[derive(Error, Debug)]
pub enum ReferralError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("clinic {0} does not exist")]
    ClinicNotFound(i64),

    #[error("referral {0} does not exist")]
    NotFound(Uuid),

    #[error("Main Campus does not have a receiving clinic")]
    NoReceivingClinic,

    #[error("referral {id} is not {}, cannot mark it {}", expected_from.as_str(), attempted.as_str())]
    InvalidTransition {
        id: Uuid,
        expected_from: ReferralStatus,
        attempted: ReferralStatus,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Creation request as supplied by the referring doctor. The requested
/// destination may be overridden by routing before anything is stored.
#[derive(Debug, Clone)]
pub struct NewReferral {
    pub patient_id: Uuid,
    pub from_clinic_id: i64,
    pub to_clinic_id: i64,
    pub reason: String,
    pub referring_doctor_id: Uuid,
    pub receiving_doctor_id: Option<Uuid>,
}

fn resolve_clinic(conn: &Connection, id: i64) -> Result<Clinic, ReferralError> {
    get_clinic(conn, id)?.ok_or(ReferralError::ClinicNotFound(id))
}

/// Hub-and-spoke routing: a referral leaving a secondary campus for any
/// other campus lands at the hub campus's General clinic instead of the
/// requested destination. Every other combination — same campus, origin
/// outside the secondary set, origin on the hub itself — keeps the
/// caller's destination. The asymmetry is deliberate: satellites funnel
/// into the hub, the hub refers outward freely.
fn route_destination(
    conn: &Connection,
    topology: &RoutingTopology,
    from: &Clinic,
    to: &Clinic,
) -> Result<i64, ReferralError> {
    if from.campus_id == to.campus_id || !topology.is_secondary(from.campus_id) {
        return Ok(to.id);
    }

    let hub = find_general_clinic(conn, topology.hub_campus_id)?
        .ok_or(ReferralError::NoReceivingClinic)?;
    tracing::info!(
        from_clinic = from.id,
        requested = to.id,
        routed = hub.id,
        "inter-campus referral rerouted to hub clinic"
    );
    Ok(hub.id)
}

/// Create a referral in `Pending` state with the post-routing destination.
/// A routing failure leaves no record behind; creation is a single insert.
pub fn create_referral(
    conn: &Connection,
    topology: &RoutingTopology,
    new: NewReferral,
) -> Result<Referral, ReferralError> {
    if new.reason.trim().is_empty() {
        return Err(ReferralError::Validation("reason must not be empty"));
    }

    let from = resolve_clinic(conn, new.from_clinic_id)?;
    let to = resolve_clinic(conn, new.to_clinic_id)?;
    let destination = route_destination(conn, topology, &from, &to)?;

    let referral = Referral {
        id: Uuid::new_v4(),
        patient_id: new.patient_id,
        from_clinic_id: from.id,
        to_clinic_id: destination,
        reason: new.reason,
        referring_doctor_id: new.referring_doctor_id,
        receiving_doctor_id: new.receiving_doctor_id,
        status: ReferralStatus::Pending,
        created_at: Utc::now(),
        accepted_at: None,
    };
    insert_referral(conn, &referral)?;
    Ok(referral)
}

/// Zero rows from a guarded update means either the referral is missing
/// or it already left `expected_from`. One extra read tells them apart.
fn explain_failed_transition(
    conn: &Connection,
    id: &Uuid,
    expected_from: ReferralStatus,
    attempted: ReferralStatus,
) -> ReferralError {
    match get_referral(conn, id) {
        Ok(Some(_)) => ReferralError::InvalidTransition {
            id: *id,
            expected_from,
            attempted,
        },
        Ok(None) => ReferralError::NotFound(*id),
        Err(e) => e.into(),
    }
}

fn refreshed_view(conn: &Connection, id: &Uuid) -> Result<ReferralView, ReferralError> {
    get_referral_view(conn, id)?.ok_or(ReferralError::NotFound(*id))
}

/// `Pending` → `Accepted`. Stamps `accepted_at` and, when supplied, the
/// receiving doctor in the same guarded statement.
pub fn accept(
    conn: &Connection,
    id: &Uuid,
    receiving_doctor_id: Option<&Uuid>,
) -> Result<ReferralView, ReferralError> {
    let rows = accept_referral(conn, id, receiving_doctor_id, Utc::now())?;
    if rows == 0 {
        return Err(explain_failed_transition(
            conn,
            id,
            ReferralStatus::Pending,
            ReferralStatus::Accepted,
        ));
    }
    refreshed_view(conn, id)
}

/// `Pending` → `Rejected`. Terminal.
pub fn reject(conn: &Connection, id: &Uuid) -> Result<ReferralView, ReferralError> {
    let rows = transition_status(conn, id, ReferralStatus::Pending, ReferralStatus::Rejected)?;
    if rows == 0 {
        return Err(explain_failed_transition(
            conn,
            id,
            ReferralStatus::Pending,
            ReferralStatus::Rejected,
        ));
    }
    refreshed_view(conn, id)
}

/// `Accepted` → `Completed`. Terminal.
pub fn complete(conn: &Connection, id: &Uuid) -> Result<ReferralView, ReferralError> {
    let rows = transition_status(conn, id, ReferralStatus::Accepted, ReferralStatus::Completed)?;
    if rows == 0 {
        return Err(explain_failed_transition(
            conn,
            id,
            ReferralStatus::Accepted,
            ReferralStatus::Completed,
        ));
    }
    refreshed_view(conn, id)
}

pub fn get(conn: &Connection, id: &Uuid) -> Result<ReferralView, ReferralError> {
    refreshed_view(conn, id)
}

pub fn list(conn: &Connection) -> Result<Vec<ReferralView>, ReferralError> {
    Ok(list_referral_views(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::campus::insert_campus;
    use crate::db::repository::clinic::insert_clinic;
    use crate::db::repository::patient::insert_patient;
    use crate::db::repository::staff::insert_staff;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;

    const HUB_GENERAL: i64 = 10;
    const TECHNO_DENTAL: i64 = 20;
    const TECHNO_LAB: i64 = 21;
    const VET_GENERAL: i64 = 30;

    struct Fixture {
        conn: Connection,
        topology: RoutingTopology,
        patient_id: Uuid,
        doctor_id: Uuid,
    }

    /// Campus 1 "Main" is the hub; 2 "Techno" and 3 "Veterinary" are
    /// secondary. `with_hub_clinic=false` reproduces the misconfigured
    /// hub for the NoReceivingClinic scenario.
    fn fixture(with_hub_clinic: bool) -> Fixture {
        let conn = open_memory_database().unwrap();

        for (id, name) in [(1, "Main"), (2, "Techno"), (3, "Veterinary")] {
            insert_campus(
                &conn,
                &Campus {
                    id,
                    name: name.into(),
                    status: ActiveStatus::Active,
                },
            )
            .unwrap();
        }

        let mut clinics = vec![
            (TECHNO_DENTAL, 2, "Techno Dental", ClinicType::Dental),
            (TECHNO_LAB, 2, "Techno Lab", ClinicType::Lab),
            (VET_GENERAL, 3, "Vet General", ClinicType::General),
        ];
        if with_hub_clinic {
            clinics.push((HUB_GENERAL, 1, "Main General", ClinicType::General));
        }
        for (id, campus_id, name, clinic_type) in clinics {
            insert_clinic(
                &conn,
                &Clinic {
                    id,
                    campus_id,
                    name: name.into(),
                    clinic_type,
                    status: ActiveStatus::Active,
                },
            )
            .unwrap();
        }

        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: "Liza".into(),
            last_name: "Torres".into(),
        };
        insert_patient(&conn, &patient).unwrap();

        let doctor = Staff {
            id: Uuid::new_v4(),
            first_name: "Ramon".into(),
            middle_name: None,
            last_name: "Diaz".into(),
            role: Role::Doctor,
            email: "ramon.diaz@uicms.edu".into(),
            password_hash: "$argon2id$stub".into(),
            campus_id: 2,
            clinic_id: Some(TECHNO_DENTAL),
            status: ActiveStatus::Active,
        };
        insert_staff(&conn, &doctor).unwrap();

        Fixture {
            conn,
            topology: RoutingTopology::default(),
            patient_id: patient.id,
            doctor_id: doctor.id,
        }
    }

    fn new_referral(fx: &Fixture, from: i64, to: i64) -> NewReferral {
        NewReferral {
            patient_id: fx.patient_id,
            from_clinic_id: from,
            to_clinic_id: to,
            reason: "continuing care".into(),
            referring_doctor_id: fx.doctor_id,
            receiving_doctor_id: None,
        }
    }

    fn referral_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM referrals", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn secondary_to_other_campus_is_rerouted_to_hub() {
        let fx = fixture(true);
        // Techno (secondary) → Veterinary (different campus)
        let referral = create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, TECHNO_DENTAL, VET_GENERAL),
        )
        .unwrap();

        assert_eq!(referral.to_clinic_id, HUB_GENERAL);
        assert_eq!(referral.status, ReferralStatus::Pending);

        // The stored row carries the post-routing destination
        let stored = get(&fx.conn, &referral.id).unwrap();
        assert_eq!(stored.referral.to_clinic_id, HUB_GENERAL);
        assert_eq!(stored.to_clinic_name, "Main General");
    }

    #[test]
    fn same_campus_referral_keeps_requested_destination() {
        let fx = fixture(true);
        let referral = create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, TECHNO_DENTAL, TECHNO_LAB),
        )
        .unwrap();
        assert_eq!(referral.to_clinic_id, TECHNO_LAB);
    }

    #[test]
    fn hub_origin_referral_is_not_rerouted() {
        let fx = fixture(true);
        // Main (hub, not secondary) → Veterinary: policy is asymmetric
        let referral = create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, HUB_GENERAL, VET_GENERAL),
        )
        .unwrap();
        assert_eq!(referral.to_clinic_id, VET_GENERAL);
    }

    #[test]
    fn missing_hub_clinic_fails_and_stores_nothing() {
        let fx = fixture(false);
        let err = create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, TECHNO_DENTAL, VET_GENERAL),
        )
        .unwrap_err();

        assert!(matches!(err, ReferralError::NoReceivingClinic));
        assert_eq!(referral_count(&fx.conn), 0);
    }

    #[test]
    fn unknown_clinic_is_reported_not_a_crash() {
        let fx = fixture(true);
        let err = create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, 999, VET_GENERAL),
        )
        .unwrap_err();
        assert!(matches!(err, ReferralError::ClinicNotFound(999)));
        assert_eq!(referral_count(&fx.conn), 0);
    }

    #[test]
    fn blank_reason_is_rejected() {
        let fx = fixture(true);
        let mut new = new_referral(&fx, TECHNO_DENTAL, TECHNO_LAB);
        new.reason = "   ".into();
        let err = create_referral(&fx.conn, &fx.topology, new).unwrap_err();
        assert!(matches!(err, ReferralError::Validation(_)));
    }

    #[test]
    fn accept_stamps_timestamp_and_receiving_doctor() {
        let fx = fixture(true);
        let referral = create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, TECHNO_DENTAL, TECHNO_LAB),
        )
        .unwrap();
        assert!(referral.accepted_at.is_none());

        let accepted = accept(&fx.conn, &referral.id, Some(&fx.doctor_id)).unwrap();
        assert_eq!(accepted.referral.status, ReferralStatus::Accepted);
        assert!(accepted.referral.accepted_at.is_some());
        assert_eq!(accepted.referral.receiving_doctor_id, Some(fx.doctor_id));
        assert_eq!(accepted.receiving_doctor_name.as_deref(), Some("Ramon Diaz"));
    }

    #[test]
    fn accept_without_doctor_keeps_creation_supplied_doctor() {
        let fx = fixture(true);
        let mut new = new_referral(&fx, TECHNO_DENTAL, TECHNO_LAB);
        new.receiving_doctor_id = Some(fx.doctor_id);
        let referral = create_referral(&fx.conn, &fx.topology, new).unwrap();

        let accepted = accept(&fx.conn, &referral.id, None).unwrap();
        assert_eq!(accepted.referral.status, ReferralStatus::Accepted);
        assert_eq!(accepted.referral.receiving_doctor_id, Some(fx.doctor_id));
        assert_eq!(accepted.receiving_doctor_name.as_deref(), Some("Ramon Diaz"));
    }

    #[test]
    fn full_lifecycle_pending_accepted_completed() {
        let fx = fixture(true);
        let referral = create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, TECHNO_DENTAL, TECHNO_LAB),
        )
        .unwrap();

        accept(&fx.conn, &referral.id, None).unwrap();
        let done = complete(&fx.conn, &referral.id).unwrap();
        assert_eq!(done.referral.status, ReferralStatus::Completed);

        // Terminal: no transition leaves Completed
        assert!(matches!(
            accept(&fx.conn, &referral.id, None),
            Err(ReferralError::InvalidTransition { .. })
        ));
        assert!(matches!(
            reject(&fx.conn, &referral.id),
            Err(ReferralError::InvalidTransition { .. })
        ));
        assert!(matches!(
            complete(&fx.conn, &referral.id),
            Err(ReferralError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn rejected_is_terminal() {
        let fx = fixture(true);
        let referral = create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, TECHNO_DENTAL, TECHNO_LAB),
        )
        .unwrap();

        let rejected = reject(&fx.conn, &referral.id).unwrap();
        assert_eq!(rejected.referral.status, ReferralStatus::Rejected);

        let err = accept(&fx.conn, &referral.id, None).unwrap_err();
        assert!(matches!(err, ReferralError::InvalidTransition { .. }));
        // Failed transition leaves the row untouched
        let after = get(&fx.conn, &referral.id).unwrap();
        assert_eq!(after.referral.status, ReferralStatus::Rejected);
        assert!(after.referral.accepted_at.is_none());
    }

    #[test]
    fn complete_requires_prior_accept() {
        let fx = fixture(true);
        let referral = create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, TECHNO_DENTAL, TECHNO_LAB),
        )
        .unwrap();
        assert!(matches!(
            complete(&fx.conn, &referral.id),
            Err(ReferralError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn transitions_on_unknown_referral_are_not_found() {
        let fx = fixture(true);
        let missing = Uuid::new_v4();
        assert!(matches!(
            accept(&fx.conn, &missing, None),
            Err(ReferralError::NotFound(_))
        ));
        assert!(matches!(
            get(&fx.conn, &missing),
            Err(ReferralError::NotFound(_))
        ));
    }

    #[test]
    fn get_is_stable_between_transitions() {
        let fx = fixture(true);
        let referral = create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, TECHNO_DENTAL, TECHNO_LAB),
        )
        .unwrap();

        let first = get(&fx.conn, &referral.id).unwrap();
        let second = get(&fx.conn, &referral.id).unwrap();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn list_returns_joined_views() {
        let fx = fixture(true);
        create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, TECHNO_DENTAL, TECHNO_LAB),
        )
        .unwrap();
        create_referral(
            &fx.conn,
            &fx.topology,
            new_referral(&fx, TECHNO_DENTAL, VET_GENERAL),
        )
        .unwrap();

        let views = list(&fx.conn).unwrap();
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.patient_name == "Liza Torres"));
        assert!(views.iter().all(|v| v.referring_doctor_name == "Ramon Diaz"));
    }
}
