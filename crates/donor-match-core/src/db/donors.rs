//! Donor database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_timestamp, Database, DbError, DbResult};
use crate::models::Donor;

impl Database {
    /// Insert a donor, or update every field if the id already exists.
    pub fn upsert_donor(&self, donor: &Donor) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO donors (
                id, name, blood_group, location, last_donation,
                available_for_donation, total_donations
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                blood_group = excluded.blood_group,
                location = excluded.location,
                last_donation = excluded.last_donation,
                available_for_donation = excluded.available_for_donation,
                total_donations = excluded.total_donations,
                updated_at = datetime('now')
            "#,
            params![
                donor.id,
                donor.name,
                donor.blood_group,
                donor.location,
                donor.last_donation.map(|ts| ts.to_rfc3339()),
                donor.available_for_donation,
                donor.total_donations,
            ],
        )?;
        Ok(())
    }

    /// Get a donor by ID.
    pub fn get_donor(&self, id: &str) -> DbResult<Option<Donor>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, name, blood_group, location, last_donation,
                       available_for_donation, total_donations
                FROM donors
                WHERE id = ?
                "#,
                [id],
                donor_row,
            )
            .optional()?
            .map(Donor::from))
    }

    /// List donors flagged available for donation, in registration order.
    pub fn list_available_donors(&self) -> DbResult<Vec<Donor>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, blood_group, location, last_donation,
                   available_for_donation, total_donations
            FROM donors
            WHERE available_for_donation = 1
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], donor_row)?;

        let mut donors = Vec::new();
        for row in rows {
            donors.push(Donor::from(row?));
        }
        Ok(donors)
    }

    /// Toggle whether a donor may be assigned.
    pub fn set_donor_availability(&self, id: &str, available: bool) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE donors SET available_for_donation = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![available, id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Record a completed donation: sets the last donation date and bumps the count.
    pub fn record_donation(&self, id: &str, donated_at: DateTime<Utc>) -> DbResult<()> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE donors SET
                last_donation = ?1,
                total_donations = total_donations + 1,
                updated_at = datetime('now')
            WHERE id = ?2
            "#,
            params![donated_at.to_rfc3339(), id],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("donor {}", id)));
        }
        Ok(())
    }
}

/// Intermediate row struct for database mapping.
pub(super) struct DonorRow {
    id: String,
    name: String,
    blood_group: String,
    location: String,
    last_donation: Option<String>,
    available_for_donation: bool,
    total_donations: u32,
}

pub(super) fn donor_row(row: &Row<'_>) -> rusqlite::Result<DonorRow> {
    Ok(DonorRow {
        id: row.get(0)?,
        name: row.get(1)?,
        blood_group: row.get(2)?,
        location: row.get(3)?,
        last_donation: row.get(4)?,
        available_for_donation: row.get(5)?,
        total_donations: row.get(6)?,
    })
}

/// An unparseable `last_donation` is logged and read as never donated, so one
/// bad row cannot block every other donor.
impl From<DonorRow> for Donor {
    fn from(row: DonorRow) -> Self {
        let last_donation = row
            .last_donation
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(|raw| match parse_timestamp(raw) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    tracing::warn!(
                        donor_id = %row.id,
                        error = %e,
                        "Ignoring unparseable last donation date"
                    );
                    None
                }
            });

        Donor {
            id: row.id,
            name: row.name,
            blood_group: row.blood_group,
            location: row.location,
            last_donation,
            available_for_donation: row.available_for_donation,
            total_donations: row.total_donations,
        }
    }
}
