//! Medical record endpoints, all behind the doctor guard.
//!
//! The clinical store keys patients by its own row ids; clients only
//! ever speak directory user ids. Every entry point here goes through
//! the identity bridge (or an exact lookup, for reads) first.
//!
//! - `POST /api/medical-records/patient-profile`
//! - `GET  /api/medical-records/patient-profile/:patientId`
//! - `GET  /api/medical-records/patient/:patientId/records`
//! - `POST /api/medical-records/records`
//! - `GET/PUT /api/medical-records/records/:recordId`
//! - `POST /api/medical-records/records/:recordId/prescriptions`
//! - `POST /api/medical-records/records/:recordId/vital-signs`
//! - `POST /api/medical-records/records/:recordId/lab-results`
//! - `POST /api/medical-records/sync-patients`

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DoctorContext};
use crate::db::{self, StoreError};
use crate::models::{
    parse_visit_date, LabResult, LabStatus, MedicalRecord, MedicalRecordUpdate, NewLabResult,
    NewMedicalRecord, NewPrescription, NewVitalSigns, Patient, PatientMetadata, Prescription,
    VitalSigns,
};

/// A record with everything hanging off it. Children are unpaginated;
/// a single visit only ever has a handful.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWithChildren {
    #[serde(flatten)]
    pub record: MedicalRecord,
    pub prescriptions: Vec<Prescription>,
    pub vital_signs: Vec<VitalSigns>,
    pub lab_results: Vec<LabResult>,
}

fn with_children(conn: &Connection, record: MedicalRecord) -> Result<RecordWithChildren, StoreError> {
    let prescriptions = db::prescriptions_for_record(conn, record.id)?;
    let vital_signs = db::vital_signs_for_record(conn, record.id)?;
    let lab_results = db::lab_results_for_record(conn, record.id)?;
    Ok(RecordWithChildren {
        record,
        prescriptions,
        vital_signs,
        lab_results,
    })
}

fn record_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("Medical record not found".into()))
}

fn fetch_record(conn: &Connection, id: i64) -> Result<MedicalRecord, ApiError> {
    db::get_medical_record(conn, id)?
        .ok_or_else(|| ApiError::NotFound("Medical record not found".into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfileRequest {
    #[serde(default)]
    pub user_id: String,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub emergency_contact: Option<serde_json::Value>,
    pub medical_history: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_number: Option<String>,
}

#[derive(Serialize)]
pub struct UpsertPatientResponse {
    pub success: bool,
    pub message: String,
    pub patient: Patient,
}

/// `POST /api/medical-records/patient-profile` — create or update the
/// chart metadata for a directory user.
pub async fn upsert_patient_profile(
    State(ctx): State<ApiContext>,
    Extension(_doctor): Extension<DoctorContext>,
    Json(req): Json<PatientProfileRequest>,
) -> Result<Json<UpsertPatientResponse>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::Validation("Missing details".into()));
    }
    let blood_type = match req.blood_type.as_deref() {
        Some(raw) => Some(raw.parse().map_err(ApiError::from)?),
        None => None,
    };
    let emergency_contact = match req.emergency_contact {
        Some(value) => {
            Some(serde_json::to_string(&value).map_err(|e| ApiError::Internal(e.to_string()))?)
        }
        None => None,
    };
    let meta = PatientMetadata {
        blood_type,
        allergies: req.allergies,
        emergency_contact,
        medical_history: req.medical_history,
        insurance_provider: req.insurance_provider,
        insurance_number: req.insurance_number,
    };

    let clinical = ctx.state.clinical()?;
    let created = db::find_patient_by_external_id(&clinical, &req.user_id)?.is_none();
    let patient = db::find_or_create_patient(&clinical, &req.user_id)?;
    db::update_patient_metadata(&clinical, patient.id, &meta)?;
    let patient = db::get_patient(&clinical, patient.id)?
        .ok_or_else(|| ApiError::Internal("patient row vanished after update".into()))?;

    let message = if created {
        "Patient profile created successfully"
    } else {
        "Patient profile updated successfully"
    };
    Ok(Json(UpsertPatientResponse {
        success: true,
        message: message.into(),
        patient,
    }))
}

/// A chart plus its most recent visits, as the profile page shows it.
#[derive(Serialize)]
pub struct PatientWithHistory {
    #[serde(flatten)]
    pub patient: Patient,
    #[serde(rename = "medicalRecords")]
    pub medical_records: Vec<RecordWithChildren>,
}

#[derive(Serialize)]
pub struct PatientProfileResponse {
    pub success: bool,
    pub patient: PatientWithHistory,
}

/// How many visits the profile view embeds.
const PROFILE_HISTORY_LIMIT: i64 = 5;

/// `GET /api/medical-records/patient-profile/:patientId` — chart with
/// the last five visits. Exact lookup; an unknown user is 404 here,
/// never silently created.
pub async fn patient_profile(
    State(ctx): State<ApiContext>,
    Extension(_doctor): Extension<DoctorContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientProfileResponse>, ApiError> {
    let clinical = ctx.state.clinical()?;
    let patient = db::find_patient_by_external_id(&clinical, &patient_id)?
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))?;
    let records = db::list_patient_records(&clinical, patient.id, PROFILE_HISTORY_LIMIT, 0)?;
    let medical_records = records
        .into_iter()
        .map(|r| with_children(&clinical, r))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(PatientProfileResponse {
        success: true,
        patient: PatientWithHistory {
            patient,
            medical_records,
        },
    }))
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsPageResponse {
    pub success: bool,
    pub records: Vec<RecordWithChildren>,
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

/// `GET /api/medical-records/patient/:patientId/records` — one page
/// of a patient's history, newest visit first.
///
/// A user with no chart yet gets an empty page with success true; an
/// empty history is not an error.
pub async fn list_records(
    State(ctx): State<ApiContext>,
    Extension(_doctor): Extension<DoctorContext>,
    Path(patient_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<RecordsPageResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).max(1);

    let clinical = ctx.state.clinical()?;
    let Some(patient) = db::find_patient_by_external_id(&clinical, &patient_id)? else {
        return Ok(Json(RecordsPageResponse {
            success: true,
            records: Vec::new(),
            total_count: 0,
            total_pages: 0,
            current_page: page,
        }));
    };

    let total_count = db::count_patient_records(&clinical, patient.id)?;
    let rows = db::list_patient_records(&clinical, patient.id, limit, (page - 1) * limit)?;
    let records = rows
        .into_iter()
        .map(|r| with_children(&clinical, r))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(RecordsPageResponse {
        success: true,
        records,
        total_count,
        total_pages: (total_count + limit - 1) / limit,
        current_page: page,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    /// Directory user id; bridged to a chart on the way in.
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub doctor_id: String,
    pub appointment_id: Option<String>,
    #[serde(default)]
    pub visit_date: String,
    #[serde(default)]
    pub visit_type: String,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub follow_up_required: bool,
    pub follow_up_date: Option<String>,
}

#[derive(Serialize)]
pub struct CreateRecordResponse {
    pub success: bool,
    pub message: String,
    pub record: MedicalRecord,
}

fn parse_follow_up_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::Validation("Invalid follow-up date".into())),
    }
}

/// `POST /api/medical-records/records` — open a new visit record,
/// creating the chart on first contact.
pub async fn create_record(
    State(ctx): State<ApiContext>,
    Extension(_doctor): Extension<DoctorContext>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<Json<CreateRecordResponse>, ApiError> {
    if req.patient_id.trim().is_empty()
        || req.doctor_id.trim().is_empty()
        || req.visit_date.trim().is_empty()
        || req.visit_type.trim().is_empty()
    {
        return Err(ApiError::Validation("Missing details".into()));
    }
    let visit_type = req.visit_type.parse().map_err(ApiError::from)?;
    let visit_date = parse_visit_date(&req.visit_date)
        .ok_or_else(|| ApiError::Validation("Invalid visit date".into()))?;
    let follow_up_date = parse_follow_up_date(req.follow_up_date.as_deref())?;

    let new = NewMedicalRecord {
        doctor_id: req.doctor_id,
        appointment_id: req.appointment_id,
        visit_date,
        visit_type,
        chief_complaint: req.chief_complaint,
        diagnosis: req.diagnosis,
        treatment: req.treatment,
        notes: req.notes,
        follow_up_required: req.follow_up_required,
        follow_up_date,
    };

    let clinical = ctx.state.clinical()?;
    let patient = db::find_or_create_patient(&clinical, &req.patient_id)?;
    let record = db::insert_medical_record(&clinical, patient.id, &new)?;

    Ok(Json(CreateRecordResponse {
        success: true,
        message: "Medical record created successfully".into(),
        record,
    }))
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub record: RecordWithChildren,
}

/// `GET /api/medical-records/records/:recordId` — one record with all
/// its children.
pub async fn get_record(
    State(ctx): State<ApiContext>,
    Extension(_doctor): Extension<DoctorContext>,
    Path(raw_id): Path<String>,
) -> Result<Json<RecordResponse>, ApiError> {
    let id = record_id(&raw_id)?;
    let clinical = ctx.state.clinical()?;
    let record = fetch_record(&clinical, id)?;
    Ok(Json(RecordResponse {
        success: true,
        message: None,
        record: with_children(&clinical, record)?,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    pub visit_date: Option<String>,
    pub visit_type: Option<String>,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub follow_up_required: Option<bool>,
    pub follow_up_date: Option<String>,
    pub status: Option<String>,
}

/// `PUT /api/medical-records/records/:recordId` — partial update;
/// absent fields keep their stored values.
pub async fn update_record(
    State(ctx): State<ApiContext>,
    Extension(_doctor): Extension<DoctorContext>,
    Path(raw_id): Path<String>,
    Json(req): Json<UpdateRecordRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    let id = record_id(&raw_id)?;
    let visit_date = match req.visit_date.as_deref() {
        None => None,
        Some(s) => Some(
            parse_visit_date(s).ok_or_else(|| ApiError::Validation("Invalid visit date".into()))?,
        ),
    };
    let visit_type = match req.visit_type.as_deref() {
        None => None,
        Some(s) => Some(s.parse().map_err(ApiError::from)?),
    };
    let status = match req.status.as_deref() {
        None => None,
        Some(s) => Some(s.parse().map_err(ApiError::from)?),
    };
    let update = MedicalRecordUpdate {
        visit_date,
        visit_type,
        chief_complaint: req.chief_complaint,
        diagnosis: req.diagnosis,
        treatment: req.treatment,
        notes: req.notes,
        follow_up_required: req.follow_up_required,
        follow_up_date: parse_follow_up_date(req.follow_up_date.as_deref())?,
        status,
    };

    let clinical = ctx.state.clinical()?;
    let record = db::update_medical_record(&clinical, id, &update)?;
    Ok(Json(RecordResponse {
        success: true,
        message: Some("Medical record updated successfully".into()),
        record: with_children(&clinical, record)?,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRequest {
    #[serde(default)]
    pub medication_name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    pub instructions: Option<String>,
    pub quantity: Option<i64>,
    pub refills: Option<i64>,
}

#[derive(Serialize)]
pub struct PrescriptionResponse {
    pub success: bool,
    pub message: String,
    pub prescription: Prescription,
}

/// `POST /api/medical-records/records/:recordId/prescriptions`
pub async fn add_prescription(
    State(ctx): State<ApiContext>,
    Extension(_doctor): Extension<DoctorContext>,
    Path(raw_id): Path<String>,
    Json(req): Json<PrescriptionRequest>,
) -> Result<Json<PrescriptionResponse>, ApiError> {
    let id = record_id(&raw_id)?;
    if req.medication_name.trim().is_empty()
        || req.dosage.trim().is_empty()
        || req.frequency.trim().is_empty()
        || req.duration.trim().is_empty()
    {
        return Err(ApiError::Validation("Missing details".into()));
    }
    let new = NewPrescription {
        medication_name: req.medication_name,
        dosage: req.dosage,
        frequency: req.frequency,
        duration: req.duration,
        instructions: req.instructions,
        quantity: req.quantity,
        refills: req.refills.unwrap_or(0),
    };

    let clinical = ctx.state.clinical()?;
    fetch_record(&clinical, id)?;
    let prescription = db::insert_prescription(&clinical, id, &new)?;
    Ok(Json(PrescriptionResponse {
        success: true,
        message: "Prescription added successfully".into(),
        prescription,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSignsRequest {
    pub blood_pressure_systolic: Option<i64>,
    pub blood_pressure_diastolic: Option<i64>,
    pub heart_rate: Option<i64>,
    pub temperature: Option<f64>,
    pub respiratory_rate: Option<i64>,
    pub oxygen_saturation: Option<i64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    #[serde(default)]
    pub recorded_by: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSignsResponse {
    pub success: bool,
    pub message: String,
    pub vital_signs: VitalSigns,
}

/// `POST /api/medical-records/records/:recordId/vital-signs`
pub async fn add_vital_signs(
    State(ctx): State<ApiContext>,
    Extension(_doctor): Extension<DoctorContext>,
    Path(raw_id): Path<String>,
    Json(req): Json<VitalSignsRequest>,
) -> Result<Json<VitalSignsResponse>, ApiError> {
    let id = record_id(&raw_id)?;
    if req.recorded_by.trim().is_empty() {
        return Err(ApiError::Validation("Missing details".into()));
    }
    let new = NewVitalSigns {
        blood_pressure_systolic: req.blood_pressure_systolic,
        blood_pressure_diastolic: req.blood_pressure_diastolic,
        heart_rate: req.heart_rate,
        temperature: req.temperature,
        respiratory_rate: req.respiratory_rate,
        oxygen_saturation: req.oxygen_saturation,
        weight: req.weight,
        height: req.height,
        recorded_by: req.recorded_by,
    };

    let clinical = ctx.state.clinical()?;
    fetch_record(&clinical, id)?;
    let vital_signs = db::insert_vital_signs(&clinical, id, &new)?;
    Ok(Json(VitalSignsResponse {
        success: true,
        message: "Vital signs recorded successfully".into(),
        vital_signs,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResultRequest {
    #[serde(default)]
    pub test_name: String,
    #[serde(default)]
    pub test_category: String,
    pub test_results: Option<serde_json::Value>,
    pub normal_range: Option<String>,
    pub status: Option<String>,
    pub lab_technician: Option<String>,
    #[serde(default)]
    pub ordered_by: String,
    pub notes: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResultResponse {
    pub success: bool,
    pub message: String,
    pub lab_result: LabResult,
}

/// `POST /api/medical-records/records/:recordId/lab-results`
pub async fn add_lab_result(
    State(ctx): State<ApiContext>,
    Extension(_doctor): Extension<DoctorContext>,
    Path(raw_id): Path<String>,
    Json(req): Json<LabResultRequest>,
) -> Result<Json<LabResultResponse>, ApiError> {
    let id = record_id(&raw_id)?;
    if req.test_name.trim().is_empty()
        || req.test_category.trim().is_empty()
        || req.ordered_by.trim().is_empty()
    {
        return Err(ApiError::Validation("Missing details".into()));
    }
    let test_category = req.test_category.parse().map_err(ApiError::from)?;
    let status = match req.status.as_deref() {
        None => LabStatus::Pending,
        Some(s) => s.parse().map_err(ApiError::from)?,
    };
    let test_results = match req.test_results {
        Some(value) => {
            Some(serde_json::to_string(&value).map_err(|e| ApiError::Internal(e.to_string()))?)
        }
        None => None,
    };
    let new = NewLabResult {
        test_name: req.test_name,
        test_category,
        test_results,
        normal_range: req.normal_range,
        status,
        lab_technician: req.lab_technician,
        ordered_by: req.ordered_by,
        notes: req.notes,
        file_path: req.file_path,
    };

    let clinical = ctx.state.clinical()?;
    fetch_record(&clinical, id)?;
    let lab_result = db::insert_lab_result(&clinical, id, &new)?;
    Ok(Json(LabResultResponse {
        success: true,
        message: "Lab result added successfully".into(),
        lab_result,
    }))
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    pub created: i64,
    pub existing: i64,
}

/// `POST /api/medical-records/sync-patients` — bridge every directory
/// user into the clinical store, reporting how many were new.
pub async fn sync_patients(
    State(ctx): State<ApiContext>,
    Extension(_doctor): Extension<DoctorContext>,
) -> Result<Json<SyncResponse>, ApiError> {
    let users = {
        let directory = ctx.state.directory()?;
        db::list_users(&directory)?
    };

    let clinical = ctx.state.clinical()?;
    let mut created = 0;
    let mut existing = 0;
    for user in &users {
        let external_id = user.id.to_string();
        if db::find_patient_by_external_id(&clinical, &external_id)?.is_some() {
            existing += 1;
        } else {
            db::find_or_create_patient(&clinical, &external_id)?;
            created += 1;
        }
    }

    Ok(Json(SyncResponse {
        success: true,
        message: format!("Synced {created} new patients"),
        created,
        existing,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_must_be_numeric() {
        assert!(record_id("41").is_ok());
        assert!(matches!(record_id("forty-one"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn follow_up_dates_are_plain_dates() {
        assert_eq!(
            parse_follow_up_date(Some("2025-07-01")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 1)
        );
        assert_eq!(parse_follow_up_date(None).unwrap(), None);
        assert!(parse_follow_up_date(Some("July 1st")).is_err());
    }
}
