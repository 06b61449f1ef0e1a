use serde::{Deserialize, Serialize};

/// Profile of the signed-in patient, supplied by the widget's auth state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientProfile {
    pub id: String,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PatientProfile {
    pub fn is_complete(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Patient data sent along with a booking confirmation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetails {
    pub patient_name: Option<String>,
    pub patient_age: Option<u32>,
    pub patient_gender: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_email: Option<String>,
    pub reason: String,
}

impl PatientDetails {
    pub fn from_profile(profile: &PatientProfile, reason: String) -> Self {
        Self {
            patient_name: profile.name.clone(),
            patient_age: profile.age,
            patient_gender: profile.gender.clone(),
            patient_phone: profile.phone.clone(),
            patient_email: profile.email.clone(),
            reason,
        }
    }
}
