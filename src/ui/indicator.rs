//! Status Indicator
//!
//! A passive light reflecting the session phase. While ready it pulses
//! through a sinusoidal brightness ramp, one step every 25ms. The timer is
//! cooperative: the UI context calls [`StatusIndicator::tick`] and schedules
//! its next repaint from [`StatusIndicator::next_deadline`].
//!
//! At most one animation step is pending. Each phase change bumps a
//! generation counter, and a step only fires if it carries the current
//! generation, so a step scheduled before a phase change can never repaint
//! after it.

use egui::Color32;
use std::f64::consts::TAU;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const STEP_PERIOD: Duration = Duration::from_millis(25);
pub const PULSE_STEPS: u8 = 60;

pub const LISTENING_COLOR: Color32 = Color32::from_rgb(0x34, 0x98, 0xdb);
pub const SPEAKING_COLOR: Color32 = Color32::from_rgb(0x2e, 0xcc, 0x71);
pub const OFF_COLOR: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);

/// Commands the worker sends to the indicator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndicatorCommand {
    /// Enter the ready phase and pulse from step 0
    Pulse,
    /// Solid listening colour
    Listening,
    /// Stop animating
    Halt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndicatorPhase {
    Off,
    Ready,
    Listening,
    Speaking,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingStep {
    generation: u64,
    step: u8,
    due: Instant,
}

/// Colour for one step of the ready pulse
pub fn pulse_color(step: u8) -> Color32 {
    let phase = f64::from(step % PULSE_STEPS) / 30.0 * TAU;
    // Truncate toward zero
    let brightness = (220.0 + 35.0 * phase.sin()) as i32;
    Color32::from_rgb(0xff, brightness.clamp(0, 255) as u8, 0x00)
}

#[derive(Debug)]
pub struct StatusIndicator {
    phase: IndicatorPhase,
    color: Color32,
    generation: u64,
    pending: Option<PendingStep>,
    /// Phase to restore when the current utterance ends
    resume: IndicatorPhase,
    speaking: Option<Uuid>,
    period: Duration,
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self {
            phase: IndicatorPhase::Off,
            color: OFF_COLOR,
            generation: 0,
            pending: None,
            resume: IndicatorPhase::Off,
            speaking: None,
            period: STEP_PERIOD,
        }
    }

    pub fn phase(&self) -> IndicatorPhase {
        self.phase
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Step that will be drawn next, if animating
    pub fn pending_step(&self) -> Option<u8> {
        self.pending.map(|p| p.step)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    pub fn apply(&mut self, command: IndicatorCommand, now: Instant) {
        match command {
            IndicatorCommand::Pulse if self.phase == IndicatorPhase::Speaking => {
                // Pulse once the utterance ends
                self.resume = IndicatorPhase::Ready;
            }
            IndicatorCommand::Pulse => self.enter_ready(now),
            IndicatorCommand::Listening => {
                self.speaking = None;
                self.set_solid(IndicatorPhase::Listening, LISTENING_COLOR);
            }
            IndicatorCommand::Halt => {
                self.speaking = None;
                self.set_solid(IndicatorPhase::Off, OFF_COLOR);
            }
        }
    }

    pub fn speech_started(&mut self, id: Uuid) {
        if self.phase != IndicatorPhase::Speaking {
            self.resume = self.phase;
        }
        self.speaking = Some(id);
        self.set_solid(IndicatorPhase::Speaking, SPEAKING_COLOR);
    }

    /// Restore the pre-speech phase. Ignored for superseded utterances.
    pub fn speech_ended(&mut self, id: Uuid, now: Instant) {
        if self.speaking != Some(id) {
            return;
        }
        self.speaking = None;
        match self.resume {
            IndicatorPhase::Ready => self.enter_ready(now),
            IndicatorPhase::Listening => self.set_solid(IndicatorPhase::Listening, LISTENING_COLOR),
            IndicatorPhase::Off | IndicatorPhase::Speaking => {
                self.set_solid(IndicatorPhase::Off, OFF_COLOR)
            }
        }
    }

    /// Fire the pending step if it is due. Returns whether the colour changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };
        if pending.generation != self.generation {
            self.pending = None;
            return false;
        }
        if now < pending.due {
            return false;
        }

        self.color = pulse_color(pending.step);
        // Resync instead of bursting through missed steps
        let next_due = if now.duration_since(pending.due) > self.period {
            now + self.period
        } else {
            pending.due + self.period
        };
        self.pending = Some(PendingStep {
            generation: self.generation,
            step: (pending.step + 1) % PULSE_STEPS,
            due: next_due,
        });
        true
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
    }

    fn enter_ready(&mut self, now: Instant) {
        self.invalidate();
        self.phase = IndicatorPhase::Ready;
        self.resume = IndicatorPhase::Ready;
        self.color = pulse_color(0);
        self.pending = Some(PendingStep {
            generation: self.generation,
            step: 1,
            due: now + self.period,
        });
    }

    fn set_solid(&mut self, phase: IndicatorPhase, color: Color32) {
        self.invalidate();
        self.phase = phase;
        self.color = color;
    }
}
