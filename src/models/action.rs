use serde::{Deserialize, Serialize};

use super::{AppointmentDetails, AssistantTurn, DialogueStep, Doctor, PatientDetails};

/// An action dispatched to the booking session on the user's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    SelectHospital(String),
    SelectDoctor(String),
    /// `YYYY-MM-DD`
    SelectDate(String),
    SelectTime(String),
    ConfirmBooking {
        user_id: String,
        details: PatientDetails,
    },
    CancelBooking,
}

impl BookingAction {
    pub fn name(&self) -> &'static str {
        match self {
            BookingAction::SelectHospital(_) => "select_hospital",
            BookingAction::SelectDoctor(_) => "select_doctor",
            BookingAction::SelectDate(_) => "select_date",
            BookingAction::SelectTime(_) => "select_time",
            BookingAction::ConfirmBooking { .. } => "confirm_booking",
            BookingAction::CancelBooking => "cancel_booking",
        }
    }

    pub fn into_request(self, session_id: &str) -> ActionRequest {
        let action = self.name().to_string();
        let (value, patient) = match self {
            BookingAction::SelectHospital(v)
            | BookingAction::SelectDoctor(v)
            | BookingAction::SelectDate(v)
            | BookingAction::SelectTime(v) => (v, None),
            BookingAction::ConfirmBooking { user_id, details } => (user_id, Some(details)),
            BookingAction::CancelBooking => (String::new(), None),
        };
        ActionRequest {
            session_id: session_id.to_string(),
            action,
            value,
            patient,
        }
    }
}

/// Body of `POST /api/chat/action` on the chat backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub session_id: String,
    pub action: String,
    pub value: String,
    #[serde(flatten)]
    pub patient: Option<PatientDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub step: Option<DialogueStep>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub available_slots: Vec<String>,
    pub appointment_details: Option<AppointmentDetails>,
    pub details: Option<AppointmentDetails>,
    pub session_id: Option<String>,
}

impl ActionResponse {
    /// Build the next assistant turn, keeping the current backend session id
    /// when the response does not name one.
    pub fn into_turn(self, current_session: Option<&str>) -> AssistantTurn {
        AssistantTurn {
            step: self.step,
            message: self.message,
            hospitals: Vec::new(),
            doctors: self.doctors,
            available_slots: self.available_slots,
            appointment_details: self.appointment_details.or(self.details),
            session_id: self
                .session_id
                .or_else(|| current_session.map(str::to_string)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_request_wire_shape() {
        let req = BookingAction::SelectHospital("h-2".to_string()).into_request("s-1");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sessionId": "s-1", "action": "select_hospital", "value": "h-2"})
        );
    }

    #[test]
    fn test_confirm_request_flattens_patient() {
        let details = PatientDetails {
            patient_name: Some("Asha".to_string()),
            patient_age: Some(34),
            reason: "General consultation".to_string(),
            ..Default::default()
        };
        let req = BookingAction::ConfirmBooking {
            user_id: "u-9".to_string(),
            details,
        }
        .into_request("s-1");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["action"], "confirm_booking");
        assert_eq!(json["value"], "u-9");
        assert_eq!(json["patientName"], "Asha");
        assert_eq!(json["patientAge"], 34);
        assert_eq!(json["reason"], "General consultation");
    }

    #[test]
    fn test_response_details_fallback() {
        let json = r#"{"step":"booking_confirmed","message":"Done","details":{"hospital":"A","doctor":"B","date":"2025-03-10","time":"09:00 AM","patient":null}}"#;
        let resp: ActionResponse = serde_json::from_str(json).unwrap();
        let turn = resp.into_turn(Some("s-1"));
        assert_eq!(turn.step, Some(DialogueStep::BookingConfirmed));
        assert_eq!(turn.appointment_details.unwrap().hospital, "A");
        assert_eq!(turn.session_id.as_deref(), Some("s-1"));
    }
}
