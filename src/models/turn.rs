use serde::{Deserialize, Serialize};

use super::DialogueStep;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: Option<String>,
    pub clinic_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub distance: Option<f64>,
    #[serde(default)]
    pub specializations: Vec<String>,
}

impl Hospital {
    /// Identifier sent to the backend when this hospital is chosen.
    pub fn selection_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or(self.clinic_id.as_deref().filter(|id| !id.is_empty()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub qualifications: String,
    pub experience: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppointmentDetails {
    pub hospital: String,
    pub doctor: String,
    pub date: String,
    pub time: String,
    pub patient: Option<String>,
}

/// Snapshot of the latest assistant message: the step it put the user in and
/// the options it offered. Replaced wholesale on every new turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantTurn {
    pub step: Option<DialogueStep>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub hospitals: Vec<Hospital>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub available_slots: Vec<String>,
    pub appointment_details: Option<AppointmentDetails>,
    pub session_id: Option<String>,
}

impl AssistantTurn {
    pub fn at(step: DialogueStep) -> Self {
        Self {
            step: Some(step),
            ..Default::default()
        }
    }
}
