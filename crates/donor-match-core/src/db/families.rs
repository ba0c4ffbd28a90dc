//! Donor family (assignment) database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use super::donors::donor_row;
use super::{Database, DbResult};
use crate::models::{Assignment, Donor};

impl Database {
    /// Upsert an active assignment keyed on (patient_id, donor_id).
    ///
    /// Re-assigning an existing pair refreshes `assigned_at` and reactivates
    /// it in place; the row id is kept.
    pub fn upsert_assignment(
        &self,
        patient_id: &str,
        donor_id: &str,
        assigned_at: DateTime<Utc>,
    ) -> DbResult<Assignment> {
        let assigned_at = assigned_at.to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO donor_families (id, patient_id, donor_id, assigned_at, is_active)
            VALUES (?1, ?2, ?3, ?4, 1)
            ON CONFLICT(patient_id, donor_id) DO UPDATE SET
                assigned_at = excluded.assigned_at,
                is_active = 1
            "#,
            params![
                uuid::Uuid::new_v4().to_string(),
                patient_id,
                donor_id,
                assigned_at,
            ],
        )?;

        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, donor_id, assigned_at, is_active
                FROM donor_families
                WHERE patient_id = ?1 AND donor_id = ?2
                "#,
                params![patient_id, donor_id],
                assignment_from_row,
            )
            .map_err(Into::into)
    }

    /// Active assignments for a patient, oldest first.
    pub fn list_active_family(&self, patient_id: &str) -> DbResult<Vec<Assignment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, donor_id, assigned_at, is_active
            FROM donor_families
            WHERE patient_id = ? AND is_active = 1
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([patient_id], assignment_from_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Donors in a patient's active family.
    pub fn list_family_donors(&self, patient_id: &str) -> DbResult<Vec<Donor>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT d.id, d.name, d.blood_group, d.location, d.last_donation,
                   d.available_for_donation, d.total_donations
            FROM donor_families f
            JOIN donors d ON d.id = f.donor_id
            WHERE f.patient_id = ? AND f.is_active = 1
            ORDER BY f.rowid
            "#,
        )?;

        let rows = stmt.query_map([patient_id], donor_row)?;

        let mut donors = Vec::new();
        for row in rows {
            donors.push(Donor::from(row?));
        }
        Ok(donors)
    }

    /// Active assignments a donor belongs to.
    pub fn list_active_assignments_for_donor(&self, donor_id: &str) -> DbResult<Vec<Assignment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, donor_id, assigned_at, is_active
            FROM donor_families
            WHERE donor_id = ? AND is_active = 1
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([donor_id], assignment_from_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Soft-delete a single (patient, donor) assignment.
    pub fn deactivate_assignment(&self, patient_id: &str, donor_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE donor_families SET is_active = 0
            WHERE patient_id = ?1 AND donor_id = ?2 AND is_active = 1
            "#,
            params![patient_id, donor_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Soft-delete a patient's whole donor family ahead of reassignment.
    ///
    /// Returns the number of assignments deactivated.
    pub fn deactivate_family(&self, patient_id: &str) -> DbResult<usize> {
        let rows_affected = self.conn.execute(
            "UPDATE donor_families SET is_active = 0 WHERE patient_id = ? AND is_active = 1",
            [patient_id],
        )?;
        Ok(rows_affected)
    }

    /// Total active assignments across all patients.
    pub fn count_active_assignments(&self) -> DbResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM donor_families WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        donor_id: row.get(2)?,
        assigned_at: row.get(3)?,
        is_active: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;
    use crate::models::Patient;
    use chrono::{Duration, TimeZone};

    fn setup_db() -> (Database, Patient, Donor) {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Asha".into(), "B+".into(), "Bangalore".into());
        let donor = Donor::new("Kiran".into(), "O-".into(), "Bangalore".into());
        db.upsert_patient(&patient).unwrap();
        db.upsert_donor(&donor).unwrap();
        (db, patient, donor)
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let (db, patient, donor) = setup_db();
        let first_at = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
        let second_at = first_at + Duration::days(7);

        let first = db.upsert_assignment(&patient.id, &donor.id, first_at).unwrap();
        let second = db.upsert_assignment(&patient.id, &donor.id, second_at).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.assigned_at, second_at.to_rfc3339());
        assert!(second.is_active);
        assert_eq!(db.count_active_assignments().unwrap(), 1);
    }

    #[test]
    fn test_upsert_reactivates() {
        let (db, patient, donor) = setup_db();

        db.upsert_assignment(&patient.id, &donor.id, Utc::now()).unwrap();
        assert!(db.deactivate_assignment(&patient.id, &donor.id).unwrap());
        assert!(db.list_active_family(&patient.id).unwrap().is_empty());

        let again = db.upsert_assignment(&patient.id, &donor.id, Utc::now()).unwrap();
        assert!(again.is_active);
        assert_eq!(db.list_active_family(&patient.id).unwrap().len(), 1);
    }

    #[test]
    fn test_family_donors_and_reverse_lookup() {
        let (db, patient, donor) = setup_db();
        db.upsert_assignment(&patient.id, &donor.id, Utc::now()).unwrap();

        let donors = db.list_family_donors(&patient.id).unwrap();
        assert_eq!(donors.len(), 1);
        assert_eq!(donors[0].id, donor.id);

        let for_donor = db.list_active_assignments_for_donor(&donor.id).unwrap();
        assert_eq!(for_donor.len(), 1);
        assert_eq!(for_donor[0].patient_id, patient.id);
    }

    #[test]
    fn test_deactivate_family() {
        let (db, patient, donor) = setup_db();
        let other = Donor::new("Meera".into(), "B+".into(), "Bangalore".into());
        db.upsert_donor(&other).unwrap();

        db.upsert_assignment(&patient.id, &donor.id, Utc::now()).unwrap();
        db.upsert_assignment(&patient.id, &other.id, Utc::now()).unwrap();

        assert_eq!(db.deactivate_family(&patient.id).unwrap(), 2);
        assert_eq!(db.deactivate_family(&patient.id).unwrap(), 0);
        assert_eq!(db.count_active_assignments().unwrap(), 0);
    }

    #[test]
    fn test_unknown_patient_rejected() {
        let (db, _patient, donor) = setup_db();
        let result = db.upsert_assignment("missing", &donor.id, Utc::now());
        assert!(matches!(result, Err(DbError::Sqlite(_))));
    }
}
