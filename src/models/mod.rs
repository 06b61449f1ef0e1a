pub mod action;
pub mod command;
pub mod patient;
pub mod step;
pub mod turn;

pub use action::{ActionRequest, ActionResponse, BookingAction};
pub use command::Command;
pub use patient::{PatientDetails, PatientProfile};
pub use step::DialogueStep;
pub use turn::{AppointmentDetails, AssistantTurn, Doctor, Hospital};
