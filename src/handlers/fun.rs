use super::{Clock, JokeSource};
use chrono::{NaiveDateTime, Timelike};
use rand::seq::SliceRandom;

const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "There are only 10 kinds of people in this world: those who know binary and those who don't.",
    "A SQL query walks into a bar, walks up to two tables and asks: can I join you?",
    "Why did the developer go broke? Because he used up all his cache.",
    "How many programmers does it take to change a light bulb? None, that's a hardware problem.",
    "I would tell you a UDP joke, but you might not get it.",
    "Debugging is like being the detective in a crime movie where you are also the murderer.",
    "Why do Java developers wear glasses? Because they don't C sharp.",
    "The best thing about a boolean is that even if you are wrong, you are only off by a bit.",
    "To understand recursion, you must first understand recursion.",
];

/// Picks from a built-in list
#[derive(Debug, Default)]
pub struct BuiltinJokes;

impl BuiltinJokes {
    pub fn new() -> Self {
        Self
    }
}

impl JokeSource for BuiltinJokes {
    fn joke(&mut self) -> String {
        JOKES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(JOKES[0])
            .to_string()
    }
}

/// Local wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// "The current time is 03:07 PM"
pub fn time_announcement(now: NaiveDateTime) -> String {
    format!("The current time is {}", now.format("%I:%M %p"))
}

/// Opening line for the hour of day: [0,12) morning, [12,18) afternoon,
/// [18,24) evening
pub fn greeting(now: NaiveDateTime) -> String {
    let part = match now.hour() {
        0..=11 => "Morning",
        12..=17 => "Afternoon",
        _ => "Evening",
    };
    format!("Good {} sir! I am Jarvis. How can I assist you today?", part)
}
