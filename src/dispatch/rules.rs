//! The ordered intent table
//!
//! Rules are evaluated top to bottom over the normalized transcript and the
//! first match wins. Priority numbers name the tier a rule belongs to; the
//! position in [`RULES`] is what decides ties inside a tier.

use super::transcript::Transcript;
use crate::handlers::VolumeAction;

/// Handler a rule routes to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerId {
    Interrupt,
    VolumeUp,
    VolumeDown,
    Unmute,
    Mute,
    OpenYoutube,
    SearchGoogle,
    OpenGmail,
    News,
    Launch,
    Wikipedia,
    Joke,
    Time,
    Exit,
    Conversation,
    NotUnderstood,
}

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HandlerId::Interrupt => "interrupt",
            HandlerId::VolumeUp => "volume_up",
            HandlerId::VolumeDown => "volume_down",
            HandlerId::Unmute => "unmute",
            HandlerId::Mute => "mute",
            HandlerId::OpenYoutube => "open_youtube",
            HandlerId::SearchGoogle => "search_google",
            HandlerId::OpenGmail => "open_gmail",
            HandlerId::News => "news",
            HandlerId::Launch => "launch",
            HandlerId::Wikipedia => "wikipedia",
            HandlerId::Joke => "joke",
            HandlerId::Time => "time",
            HandlerId::Exit => "exit",
            HandlerId::Conversation => "conversation",
            HandlerId::NotUnderstood => "not_understood",
        };
        f.write_str(name)
    }
}

pub struct IntentRule {
    pub priority: u8,
    pub handler: HandlerId,
    pub predicate: fn(&Transcript) -> bool,
}

impl std::fmt::Debug for IntentRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentRule")
            .field("priority", &self.priority)
            .field("handler", &self.handler)
            .finish()
    }
}

/// Words whose presence keeps a short transcript out of the conversational
/// fallback
pub const RESERVED_KEYWORDS: [&str; 8] = [
    "open", "search", "wikipedia", "news", "volume", "mute", "joke", "time",
];

const OPEN_PREFIXES: [&str; 2] = ["open ", "start "];
/// Stripped anywhere in a launch request to get the application name
const LAUNCH_NOISE: [&str; 3] = ["open ", "start ", "jarvis "];

fn is_interrupt(t: &Transcript) -> bool {
    t.contains_any(&["cancel", "stop talking", "interrupt"])
}

fn is_volume_up(t: &Transcript) -> bool {
    t.contains_any(&["volume up", "turn up the volume"])
}

fn is_volume_down(t: &Transcript) -> bool {
    t.contains_any(&["volume down", "turn down the volume"])
}

fn is_unmute(t: &Transcript) -> bool {
    t.contains("unmute")
}

fn is_mute(t: &Transcript) -> bool {
    t.contains_any(&["mute", "silence"])
}

fn is_open_youtube(t: &Transcript) -> bool {
    t.contains("open youtube")
}

fn is_search_google(t: &Transcript) -> bool {
    t.contains("search google for")
}

fn is_open_gmail(t: &Transcript) -> bool {
    t.contains("open gmail")
}

fn is_news(t: &Transcript) -> bool {
    t.contains_any(&["what's the news", "read the news"])
}

fn is_launch(t: &Transcript) -> bool {
    OPEN_PREFIXES.iter().any(|p| t.starts_with(p))
}

fn is_wikipedia(t: &Transcript) -> bool {
    t.contains("wikipedia")
}

fn is_joke(t: &Transcript) -> bool {
    t.contains("joke")
}

fn is_time(t: &Transcript) -> bool {
    t.contains("time")
}

fn is_exit(t: &Transcript) -> bool {
    t.contains_any(&["exit", "quit"])
}

fn is_conversation(t: &Transcript) -> bool {
    t.token_count() > 2 || !t.contains_any(&RESERVED_KEYWORDS)
}

fn always(_: &Transcript) -> bool {
    true
}

pub static RULES: [IntentRule; 16] = [
    IntentRule { priority: 1, handler: HandlerId::Interrupt, predicate: is_interrupt },
    IntentRule { priority: 2, handler: HandlerId::VolumeUp, predicate: is_volume_up },
    IntentRule { priority: 2, handler: HandlerId::VolumeDown, predicate: is_volume_down },
    // "unmute" contains "mute"
    IntentRule { priority: 2, handler: HandlerId::Unmute, predicate: is_unmute },
    IntentRule { priority: 2, handler: HandlerId::Mute, predicate: is_mute },
    IntentRule { priority: 3, handler: HandlerId::OpenYoutube, predicate: is_open_youtube },
    IntentRule { priority: 3, handler: HandlerId::SearchGoogle, predicate: is_search_google },
    IntentRule { priority: 3, handler: HandlerId::OpenGmail, predicate: is_open_gmail },
    IntentRule { priority: 3, handler: HandlerId::News, predicate: is_news },
    IntentRule { priority: 4, handler: HandlerId::Launch, predicate: is_launch },
    IntentRule { priority: 5, handler: HandlerId::Wikipedia, predicate: is_wikipedia },
    IntentRule { priority: 5, handler: HandlerId::Joke, predicate: is_joke },
    IntentRule { priority: 5, handler: HandlerId::Time, predicate: is_time },
    IntentRule { priority: 6, handler: HandlerId::Exit, predicate: is_exit },
    IntentRule { priority: 7, handler: HandlerId::Conversation, predicate: is_conversation },
    IntentRule { priority: 8, handler: HandlerId::NotUnderstood, predicate: always },
];

/// A matched rule with its parameters extracted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Interrupt,
    Volume(VolumeAction),
    OpenYoutube,
    SearchGoogle { topic: String },
    OpenGmail,
    News,
    Launch { app: String },
    Wikipedia { topic: String },
    Joke,
    Time,
    Exit,
    Conversation { prompt: String },
    NotUnderstood,
}

impl Intent {
    fn extract(handler: HandlerId, t: &Transcript) -> Self {
        match handler {
            HandlerId::Interrupt => Intent::Interrupt,
            HandlerId::VolumeUp => Intent::Volume(VolumeAction::Up),
            HandlerId::VolumeDown => Intent::Volume(VolumeAction::Down),
            HandlerId::Unmute => Intent::Volume(VolumeAction::Unmute),
            HandlerId::Mute => Intent::Volume(VolumeAction::Mute),
            HandlerId::OpenYoutube => Intent::OpenYoutube,
            HandlerId::SearchGoogle => Intent::SearchGoogle {
                topic: t.after("search google for").unwrap_or_default().to_string(),
            },
            HandlerId::OpenGmail => Intent::OpenGmail,
            HandlerId::News => Intent::News,
            HandlerId::Launch => Intent::Launch {
                app: launch_target(t),
            },
            HandlerId::Wikipedia => Intent::Wikipedia {
                topic: t.after("wikipedia").unwrap_or_default().to_string(),
            },
            HandlerId::Joke => Intent::Joke,
            HandlerId::Time => Intent::Time,
            HandlerId::Exit => Intent::Exit,
            HandlerId::Conversation => Intent::Conversation {
                prompt: t.as_str().to_string(),
            },
            HandlerId::NotUnderstood => Intent::NotUnderstood,
        }
    }
}

fn launch_target(t: &Transcript) -> String {
    let mut name = t.as_str().to_string();
    for noise in LAUNCH_NOISE {
        name = name.replace(noise, "");
    }
    name.trim().to_string()
}

/// A rule that fired, with its extracted intent
#[derive(Debug)]
pub struct Resolution {
    pub rule: &'static IntentRule,
    pub intent: Intent,
}

/// First matching rule for `transcript`
pub fn resolve(transcript: &Transcript) -> Resolution {
    let rule = RULES
        .iter()
        .find(|rule| (rule.predicate)(transcript))
        .unwrap_or(&RULES[RULES.len() - 1]);
    Resolution {
        rule,
        intent: Intent::extract(rule.handler, transcript),
    }
}
