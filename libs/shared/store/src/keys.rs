/// Canonical storage key for a patient/date scoped entity:
/// `<entity>:<patientId>:<date>`.
pub fn scoped(entity: &str, patient_id: &str, date: &str) -> String {
    format!("{}:{}:{}", entity, patient_id, date)
}
