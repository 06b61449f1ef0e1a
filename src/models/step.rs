use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Where the user stands in the booking flow, as reported by the chat backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueStep {
    HospitalSelection,
    DoctorSelection,
    DateSelection,
    TimeSelection,
    PatientDetails,
    BookingConfirmed,
    Other(String),
}

impl DialogueStep {
    pub fn as_str(&self) -> &str {
        match self {
            DialogueStep::HospitalSelection => "hospital_selection",
            DialogueStep::DoctorSelection => "doctor_selection",
            DialogueStep::DateSelection => "date_selection",
            DialogueStep::TimeSelection => "time_selection",
            DialogueStep::PatientDetails => "patient_details",
            DialogueStep::BookingConfirmed => "booking_confirmed",
            DialogueStep::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "hospital_selection" => DialogueStep::HospitalSelection,
            "doctor_selection" => DialogueStep::DoctorSelection,
            "date_selection" => DialogueStep::DateSelection,
            "time_selection" => DialogueStep::TimeSelection,
            "patient_details" => DialogueStep::PatientDetails,
            "booking_confirmed" => DialogueStep::BookingConfirmed,
            other => DialogueStep::Other(other.to_string()),
        }
    }

    /// Steps at which a spoken transcript is read as a booking command.
    pub fn accepts_commands(&self) -> bool {
        matches!(
            self,
            DialogueStep::HospitalSelection
                | DialogueStep::DoctorSelection
                | DialogueStep::DateSelection
                | DialogueStep::TimeSelection
                | DialogueStep::PatientDetails
        )
    }
}

impl Serialize for DialogueStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DialogueStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(DialogueStep::parse(&s))
    }
}
