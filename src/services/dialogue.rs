use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{AssistantTurn, BookingAction, DialogueStep, PatientProfile};
use crate::services::capture::{
    CaptureMachine, CaptureSettings, CaptureState, Effect, InputBuffer, SpeechEvent,
};
use crate::services::driver::{decide, Decision, DriveContext, DEFAULT_REASON};
use crate::services::parser::parse_on;
use crate::services::session::BookingSession;
use crate::services::speech::{SpeechOutput, Utterance};

const CANCELLED_MESSAGE: &str = "Booking cancelled. How else can I help you?";
const ACTION_FAILED_MESSAGE: &str = "Failed to process your selection.";
const NO_SESSION_MESSAGE: &str = "No active booking session. Please start the booking again.";

/// What became of one final transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// No booking step is active; the words went into the chat input.
    AppendedInput,
    Dispatched {
        action: String,
        step: Option<DialogueStep>,
        message: String,
    },
    Feedback {
        text: String,
    },
    Cancelled,
    Ignored,
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct EventReport {
    pub state: CaptureState,
    pub booking_mode: bool,
    pub effects: Vec<Effect>,
    pub outcomes: Vec<Outcome>,
    pub input: String,
}

/// Collaborators a dialogue talks to while handling an event.
pub struct Collaborators<'a> {
    pub session: &'a dyn BookingSession,
    pub speech: &'a dyn SpeechOutput,
}

/// One widget's voice session: the latest assistant turn, who is booking,
/// and the listening state. Callers must hand it one event at a time.
pub struct VoiceDialogue {
    id: String,
    locale: String,
    default_reason: String,
    capture: CaptureMachine,
    input: InputBuffer,
    turn: AssistantTurn,
    step: Option<DialogueStep>,
    patient: Option<PatientProfile>,
    reason: String,
    backend_session: Option<String>,
    last_transcript: Option<String>,
}

impl VoiceDialogue {
    pub fn new(id: String, locale: String, settings: CaptureSettings) -> Self {
        Self {
            id,
            locale,
            default_reason: DEFAULT_REASON.to_string(),
            capture: CaptureMachine::new(settings),
            input: InputBuffer::default(),
            turn: AssistantTurn::default(),
            step: None,
            patient: None,
            reason: String::new(),
            backend_session: None,
            last_transcript: None,
        }
    }

    pub fn with_default_reason(mut self, reason: impl Into<String>) -> Self {
        self.default_reason = reason.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn step(&self) -> Option<&DialogueStep> {
        self.step.as_ref()
    }

    pub fn turn(&self) -> &AssistantTurn {
        &self.turn
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// Hand over the composed free text, e.g. when the user presses send.
    pub fn take_input(&mut self) -> String {
        self.input.take()
    }

    pub fn backend_session(&self) -> Option<&str> {
        self.backend_session.as_deref()
    }

    pub fn last_transcript(&self) -> Option<&str> {
        self.last_transcript.as_deref()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    fn booking_active(&self) -> bool {
        self.step.as_ref().is_some_and(DialogueStep::accepts_commands)
    }

    /// Swap in the latest assistant turn. A turn without a step leaves the
    /// current step as it was.
    pub fn apply_turn(&mut self, turn: AssistantTurn) {
        if let Some(step) = &turn.step {
            self.step = Some(step.clone());
        }
        if let Some(session_id) = &turn.session_id {
            self.backend_session = Some(session_id.clone());
        }
        self.turn = turn;
        self.capture.set_booking_mode(self.booking_active());

        tracing::debug!(
            voice_session = %self.id,
            step = self.step.as_ref().map(DialogueStep::as_str).unwrap_or("none"),
            "assistant turn applied"
        );
    }

    pub fn set_patient(&mut self, profile: Option<PatientProfile>, reason: Option<String>) {
        self.patient = profile;
        if let Some(reason) = reason {
            self.reason = reason;
        }
    }

    /// Run a speech event through the capture machine and handle any
    /// transcript it hands over.
    pub async fn handle_event(
        &mut self,
        event: SpeechEvent,
        collab: &Collaborators<'_>,
        today: NaiveDate,
    ) -> EventReport {
        let mut effects = Vec::new();
        let mut outcomes = Vec::new();
        let mut pending = self.close_interrupted_round();
        pending.extend(self.capture.handle(event));

        while !pending.is_empty() {
            let mut next = Vec::new();
            for effect in pending {
                match &effect {
                    Effect::ShowInterim { transcript } => self.input.show_interim(transcript),
                    Effect::ClearInterim => self.input.clear_interim(),
                    Effect::Deliver { transcript } => {
                        outcomes.push(self.handle_final(transcript, collab, today).await);
                        next.extend(self.capture.handle(SpeechEvent::Processed));
                    }
                    _ => {}
                }
                effects.push(effect);
            }
            pending = next;
        }

        EventReport {
            state: self.capture.state(),
            booking_mode: self.capture.booking_mode(),
            effects,
            outcomes,
            input: self.input.display(),
        }
    }

    /// Between events capture is never left in `ProcessingFinal`; finding it
    /// there means the previous round was dropped before `Processed`. Close
    /// that round so queued and new transcripts are delivered again.
    fn close_interrupted_round(&mut self) -> Vec<Effect> {
        if self.capture.state() != CaptureState::ProcessingFinal {
            return Vec::new();
        }
        tracing::warn!(
            voice_session = %self.id,
            transcript = self.last_transcript.as_deref().unwrap_or(""),
            "previous voice command was interrupted"
        );
        self.capture.handle(SpeechEvent::Processed)
    }

    /// Classify → act for one final transcript.
    pub async fn handle_final(
        &mut self,
        transcript: &str,
        collab: &Collaborators<'_>,
        today: NaiveDate,
    ) -> Outcome {
        let step = match &self.step {
            Some(step) if step.accepts_commands() => step.clone(),
            _ => {
                self.input.append(transcript);
                return Outcome::AppendedInput;
            }
        };

        let command = parse_on(transcript, &step, today);
        self.last_transcript = Some(transcript.to_string());

        tracing::info!(
            voice_session = %self.id,
            step = step.as_str(),
            command = command.kind(),
            "voice command"
        );

        let decision = {
            let ctx = DriveContext {
                today,
                patient: self.patient.as_ref(),
                reason: &self.reason,
                default_reason: &self.default_reason,
            };
            decide(&command, &step, &self.turn, &ctx)
        };

        match decision {
            Decision::Cancel => self.cancel(collab).await,
            Decision::Feedback(text) => {
                tracing::debug!(voice_session = %self.id, feedback = %text, "voice feedback");
                self.say(collab, &text).await;
                Outcome::Feedback { text }
            }
            Decision::Ignore => Outcome::Ignored,
            Decision::Dispatch { action, announce } => {
                if let Some(announce) = announce {
                    self.say(collab, &announce).await;
                }
                self.dispatch(action, collab).await
            }
        }
    }

    async fn dispatch(&mut self, action: BookingAction, collab: &Collaborators<'_>) -> Outcome {
        let Some(session_id) = self.backend_session.clone() else {
            tracing::error!(voice_session = %self.id, action = action.name(), "no active session");
            return Outcome::Failed {
                error: NO_SESSION_MESSAGE.to_string(),
            };
        };

        let name = action.name().to_string();
        let request = action.into_request(&session_id);

        match collab.session.submit(&request).await {
            Ok(response) => {
                let turn = response.into_turn(Some(&session_id));
                let message = turn.message.clone();
                let step = turn.step.clone();
                self.apply_turn(turn);

                if step == Some(DialogueStep::BookingConfirmed) {
                    self.reason.clear();
                    self.backend_session = None;
                }

                Outcome::Dispatched {
                    action: name,
                    step,
                    message,
                }
            }
            Err(e) => {
                tracing::error!(
                    voice_session = %self.id,
                    action = %name,
                    error = %e,
                    "booking action failed"
                );
                self.say(collab, ACTION_FAILED_MESSAGE).await;
                Outcome::Failed {
                    error: ACTION_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    async fn cancel(&mut self, collab: &Collaborators<'_>) -> Outcome {
        if let Some(session_id) = self.backend_session.clone() {
            let request = BookingAction::CancelBooking.into_request(&session_id);
            if let Err(e) = collab.session.submit(&request).await {
                tracing::warn!(voice_session = %self.id, error = %e, "backend cancel failed");
            }
        }

        self.step = None;
        self.turn = AssistantTurn {
            message: CANCELLED_MESSAGE.to_string(),
            session_id: self.backend_session.clone(),
            ..Default::default()
        };
        self.capture.set_booking_mode(false);
        self.say(collab, CANCELLED_MESSAGE).await;

        tracing::info!(voice_session = %self.id, "booking cancelled by voice");
        Outcome::Cancelled
    }

    async fn say(&self, collab: &Collaborators<'_>, text: &str) {
        let utterance = Utterance {
            session_id: self.id.clone(),
            text: text.to_string(),
            locale: self.locale.clone(),
        };
        if let Err(e) = collab.speech.speak(&utterance).await {
            tracing::error!(voice_session = %self.id, error = %e, "failed to speak feedback");
        }
    }
}
