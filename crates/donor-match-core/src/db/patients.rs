//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{ClinicalProfile, Patient};

const PATIENT_COLUMNS: &str = r#"
    id, name, blood_group, location,
    thalassemia_type, recent_pre_transfusion_hb, symptoms_between_transfusions,
    transfusion_frequency_past_6_months, usual_transfusion_hb_level,
    organ_issues_history, manual_transfusion_frequency,
    poor_growth_history, bone_deformities, recurrent_infections,
    created_at
"#;

impl Database {
    /// Insert a patient, or update every field if the id already exists.
    pub fn upsert_patient(&self, patient: &Patient) -> DbResult<()> {
        let c = &patient.clinical;
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, name, blood_group, location,
                thalassemia_type, recent_pre_transfusion_hb, symptoms_between_transfusions,
                transfusion_frequency_past_6_months, usual_transfusion_hb_level,
                organ_issues_history, manual_transfusion_frequency,
                poor_growth_history, bone_deformities, recurrent_infections,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                blood_group = excluded.blood_group,
                location = excluded.location,
                thalassemia_type = excluded.thalassemia_type,
                recent_pre_transfusion_hb = excluded.recent_pre_transfusion_hb,
                symptoms_between_transfusions = excluded.symptoms_between_transfusions,
                transfusion_frequency_past_6_months = excluded.transfusion_frequency_past_6_months,
                usual_transfusion_hb_level = excluded.usual_transfusion_hb_level,
                organ_issues_history = excluded.organ_issues_history,
                manual_transfusion_frequency = excluded.manual_transfusion_frequency,
                poor_growth_history = excluded.poor_growth_history,
                bone_deformities = excluded.bone_deformities,
                recurrent_infections = excluded.recurrent_infections,
                updated_at = datetime('now')
            "#,
            params![
                patient.id,
                patient.name,
                patient.blood_group,
                patient.location,
                c.thalassemia_type,
                c.recent_pre_transfusion_hb,
                c.symptoms_between_transfusions,
                c.transfusion_frequency_past_6_months,
                c.usual_transfusion_hb_level,
                c.organ_issues_history,
                c.manual_transfusion_frequency,
                c.poor_growth_history,
                c.bone_deformities,
                c.recurrent_infections,
                patient.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all patients in registration order.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM patients ORDER BY rowid", PATIENT_COLUMNS))?;

        let rows = stmt.query_map([], patient_from_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a patient (and, by cascade, its donor family).
    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        blood_group: row.get(2)?,
        location: row.get(3)?,
        clinical: ClinicalProfile {
            thalassemia_type: row.get(4)?,
            recent_pre_transfusion_hb: row.get(5)?,
            symptoms_between_transfusions: row.get(6)?,
            transfusion_frequency_past_6_months: row.get(7)?,
            usual_transfusion_hb_level: row.get(8)?,
            organ_issues_history: row.get(9)?,
            manual_transfusion_frequency: row.get(10)?,
            poor_growth_history: row.get(11)?,
            bone_deformities: row.get(12)?,
            recurrent_infections: row.get(13)?,
        },
        created_at: row.get(14)?,
    })
}
