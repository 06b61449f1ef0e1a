use chrono::{Days, NaiveDate};

use crate::models::{
    AssistantTurn, BookingAction, Command, DialogueStep, PatientDetails, PatientProfile,
};
use crate::services::parser::format_iso_date;

pub const DEFAULT_REASON: &str = "General consultation";

/// Inputs besides the command and the assistant turn that a decision needs.
#[derive(Debug, Clone)]
pub struct DriveContext<'a> {
    pub today: NaiveDate,
    pub patient: Option<&'a PatientProfile>,
    pub reason: &'a str,
    pub default_reason: &'a str,
}

impl<'a> DriveContext<'a> {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            patient: None,
            reason: "",
            default_reason: DEFAULT_REASON,
        }
    }
}

/// What the dialogue should do with a classified command.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Submit `action` to the booking session, optionally saying `announce` first.
    Dispatch {
        action: BookingAction,
        announce: Option<String>,
    },
    /// Tell the user what went wrong; the step stays where it is.
    Feedback(String),
    /// Abort the booking flow.
    Cancel,
    /// Nothing to do; the user is expected to speak again.
    Ignore,
}

/// Decide what a command means at `step`, given the options of the latest
/// assistant turn. Positions are spoken 1-based.
pub fn decide(
    command: &Command,
    step: &DialogueStep,
    turn: &AssistantTurn,
    ctx: &DriveContext<'_>,
) -> Decision {
    if *command == Command::Cancellation {
        return Decision::Cancel;
    }

    match (step, command) {
        (DialogueStep::HospitalSelection, Command::Number(n)) => {
            match pick(&turn.hospitals, *n) {
                Ok(hospital) => match hospital.selection_id() {
                    Some(id) => Decision::Dispatch {
                        action: BookingAction::SelectHospital(id.to_string()),
                        announce: Some(format!("Selecting {}", hospital.name)),
                    },
                    None => {
                        tracing::warn!(hospital = %hospital.name, "hospital has no identifier");
                        Decision::Ignore
                    }
                },
                Err(feedback) => feedback,
            }
        }

        (DialogueStep::DoctorSelection, Command::Number(n)) => match pick(&turn.doctors, *n) {
            Ok(doctor) => Decision::Dispatch {
                action: BookingAction::SelectDoctor(doctor.id.clone()),
                announce: Some(format!("Selecting Dr. {}", doctor.name)),
            },
            Err(feedback) => feedback,
        },

        (DialogueStep::DateSelection, Command::Date(date)) => Decision::Dispatch {
            action: BookingAction::SelectDate(format_iso_date(*date)),
            announce: Some(format!("Selecting date {}", date.format("%B %-d, %Y"))),
        },

        (DialogueStep::DateSelection, Command::Number(n)) => {
            match ctx.today.checked_add_days(Days::new(u64::from(*n))) {
                Some(date) => Decision::Dispatch {
                    action: BookingAction::SelectDate(format_iso_date(date)),
                    announce: Some(format!("Selecting {n} days from today")),
                },
                None => Decision::Feedback(
                    "That date is too far away. Please choose another date.".to_string(),
                ),
            }
        }

        (DialogueStep::TimeSelection, Command::Number(n)) => {
            match pick(&turn.available_slots, *n) {
                Ok(slot) => select_slot(slot),
                Err(feedback) => feedback,
            }
        }

        (DialogueStep::TimeSelection, Command::Time(time)) => {
            let wanted = time.to_lowercase();
            match turn
                .available_slots
                .iter()
                .find(|slot| slot.to_lowercase().contains(&wanted))
            {
                Some(slot) => select_slot(slot),
                None => Decision::Feedback(
                    "Time not available. Please choose from the available slots.".to_string(),
                ),
            }
        }

        (DialogueStep::PatientDetails, Command::Confirmation) => match ctx.patient {
            Some(profile) if profile.is_complete() => {
                let reason = if ctx.reason.trim().is_empty() {
                    ctx.default_reason.to_string()
                } else {
                    ctx.reason.trim().to_string()
                };
                Decision::Dispatch {
                    action: BookingAction::ConfirmBooking {
                        user_id: profile.id.clone(),
                        details: PatientDetails::from_profile(profile, reason),
                    },
                    announce: None,
                }
            }
            _ => {
                tracing::warn!("confirmation withheld, no signed-in patient profile");
                Decision::Feedback(
                    "I need your profile details to confirm. Please sign in and say yes again."
                        .to_string(),
                )
            }
        },

        _ => Decision::Ignore,
    }
}

fn select_slot(slot: &str) -> Decision {
    Decision::Dispatch {
        action: BookingAction::SelectTime(slot.to_string()),
        announce: Some(format!("Selecting {slot}")),
    }
}

/// Look up a spoken 1-based position.
fn pick<T>(options: &[T], spoken: u32) -> Result<&T, Decision> {
    let index = (spoken as usize).checked_sub(1);
    match index.and_then(|i| options.get(i)) {
        Some(option) => Ok(option),
        None if options.is_empty() => Err(Decision::Ignore),
        None => Err(Decision::Feedback(format!(
            "Invalid choice. Please say a number between 1 and {}",
            options.len()
        ))),
    }
}
