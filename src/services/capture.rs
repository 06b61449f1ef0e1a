use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const LISTENING_MARKER: &str = "[Listening...]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Idle,
    Listening,
    ProcessingFinal,
}

/// A speech-to-text event forwarded by the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeechEvent {
    Start,
    Stop,
    Interim { transcript: String },
    Final { transcript: String },
    Error { error: String },
    End,
    /// The delivered transcript has been fully handled.
    Processed,
}

/// Something the widget (or the dialogue) must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    StartRecognizer,
    StopRecognizer,
    Deliver { transcript: String },
    ShowInterim { transcript: String },
    ClearInterim,
    /// Send `Start` again once `delay_ms` has passed. Capture is already
    /// back in `Idle` when this is emitted.
    RestartAfter { delay_ms: u64 },
}

#[derive(Debug, Clone, Copy)]
pub struct CaptureSettings {
    pub restart_delay: Duration,
    pub retry_delay: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            restart_delay: Duration::from_millis(500),
            retry_delay: Duration::from_millis(300),
        }
    }
}

/// Listening lifecycle of one voice session. Knows nothing about what a
/// transcript means; it only decides when one is handed over.
#[derive(Debug, Clone)]
pub struct CaptureMachine {
    state: CaptureState,
    settings: CaptureSettings,
    booking_mode: bool,
    stop_requested: bool,
    queued: VecDeque<String>,
}

impl CaptureMachine {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            state: CaptureState::Idle,
            settings,
            booking_mode: false,
            stop_requested: false,
            queued: VecDeque::new(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn booking_mode(&self) -> bool {
        self.booking_mode
    }

    /// In booking mode interim text stays out of the input box and capture
    /// restarts after every final utterance.
    pub fn set_booking_mode(&mut self, on: bool) {
        self.booking_mode = on;
    }

    pub fn handle(&mut self, event: SpeechEvent) -> Vec<Effect> {
        use CaptureState::*;

        match (self.state, event) {
            (Idle, SpeechEvent::Start) => {
                self.state = Listening;
                vec![Effect::ClearInterim, Effect::StartRecognizer]
            }
            // Recogniser already running: stop it and try again shortly.
            (Listening, SpeechEvent::Start) => {
                self.state = Idle;
                vec![
                    Effect::StopRecognizer,
                    Effect::RestartAfter {
                        delay_ms: millis(self.settings.retry_delay),
                    },
                ]
            }
            (ProcessingFinal, SpeechEvent::Start) => {
                self.stop_requested = false;
                Vec::new()
            }

            (Idle, SpeechEvent::Stop) => Vec::new(),
            (Listening, SpeechEvent::Stop) => {
                self.state = Idle;
                vec![Effect::StopRecognizer, Effect::ClearInterim]
            }
            // The transcript in flight is still handled; only the restart is dropped.
            (ProcessingFinal, SpeechEvent::Stop) => {
                self.stop_requested = true;
                vec![Effect::StopRecognizer]
            }

            (Listening, SpeechEvent::Interim { transcript }) => {
                if self.booking_mode || transcript.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![Effect::ShowInterim { transcript }]
                }
            }
            (_, SpeechEvent::Interim { .. }) => Vec::new(),

            (state, SpeechEvent::Final { transcript }) => {
                let transcript = transcript.trim().to_string();
                if transcript.is_empty() {
                    return Vec::new();
                }
                match state {
                    ProcessingFinal => {
                        self.queued.push_back(transcript);
                        Vec::new()
                    }
                    _ => {
                        // A late final after stop is still delivered.
                        if state == Idle {
                            self.stop_requested = true;
                        }
                        self.state = ProcessingFinal;
                        vec![Effect::Deliver { transcript }]
                    }
                }
            }

            (_, SpeechEvent::Error { error }) if error == "aborted" => Vec::new(),
            (ProcessingFinal, SpeechEvent::Error { .. }) => {
                self.stop_requested = true;
                Vec::new()
            }
            (_, SpeechEvent::Error { .. }) | (_, SpeechEvent::End) => {
                if self.state == ProcessingFinal {
                    return Vec::new();
                }
                self.state = Idle;
                self.clear_unless_booking()
            }

            (ProcessingFinal, SpeechEvent::Processed) => {
                if let Some(next) = self.queued.pop_front() {
                    return vec![Effect::Deliver { transcript: next }];
                }
                self.state = Idle;
                if std::mem::take(&mut self.stop_requested) || !self.booking_mode {
                    self.clear_unless_booking()
                } else {
                    vec![Effect::RestartAfter {
                        delay_ms: millis(self.settings.restart_delay),
                    }]
                }
            }
            (_, SpeechEvent::Processed) => Vec::new(),
        }
    }

    fn clear_unless_booking(&self) -> Vec<Effect> {
        if self.booking_mode {
            Vec::new()
        } else {
            vec![Effect::ClearInterim]
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Free-text input being composed outside booking mode, with the live
/// interim preview shown after a listening marker.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    committed: String,
    interim: Option<String>,
}

impl InputBuffer {
    pub fn show_interim(&mut self, transcript: &str) {
        self.interim = Some(transcript.trim().to_string());
    }

    pub fn clear_interim(&mut self) {
        self.interim = None;
    }

    pub fn append(&mut self, transcript: &str) {
        self.interim = None;
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return;
        }
        if !self.committed.is_empty() {
            self.committed.push(' ');
        }
        self.committed.push_str(transcript);
    }

    pub fn text(&self) -> &str {
        &self.committed
    }

    pub fn display(&self) -> String {
        match &self.interim {
            Some(interim) if self.committed.is_empty() => format!("{LISTENING_MARKER} {interim}"),
            Some(interim) => format!("{} {LISTENING_MARKER} {interim}", self.committed),
            None => self.committed.clone(),
        }
    }

    /// Hand over the composed text and start afresh.
    pub fn take(&mut self) -> String {
        self.interim = None;
        std::mem::take(&mut self.committed)
    }
}
