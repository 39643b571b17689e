//! Intent Dispatcher
//!
//! Maps one transcript to exactly one handler using the ordered table in
//! [`rules`], runs it, and turns handler failures into spoken responses.

pub mod rules;
pub mod transcript;

pub use rules::{resolve, HandlerId, Intent, IntentRule, Resolution, RULES};
pub use transcript::Transcript;

use crate::handlers::fun::time_announcement;
use crate::handlers::news::headlines_sentence;
use crate::handlers::{Handlers, VolumeAction};
use crate::speech::{Emotion, SpeechOutput};
use crate::{JarvisError, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

const YOUTUBE_URL: &str = "https://youtube.com";
const GMAIL_URL: &str = "https://mail.google.com/";
const HEADLINE_COUNT: usize = 3;
const SUMMARY_SENTENCES: usize = 2;

pub const GOODBYE: &str = "Goodbye, sir! Have a great day.";
pub const CANCELED: &str = "Command canceled. What's next?";
pub const NOT_UNDERSTOOD: &str =
    "I'm not sure how to handle that command. Please be more specific.";

/// What the session loop does after a dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchResult {
    pub handler: HandlerId,
    /// `None` when no keyword rule fired
    pub priority: Option<u8>,
    pub outcome: DispatchOutcome,
}

impl DispatchResult {
    pub fn is_exit(&self) -> bool {
        self.outcome == DispatchOutcome::Exit
    }
}

pub struct Dispatcher {
    speech: Arc<SpeechOutput>,
    handlers: Handlers,
}

impl Dispatcher {
    pub fn new(speech: Arc<SpeechOutput>, handlers: Handlers) -> Self {
        Self { speech, handlers }
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Run the first matching handler for `transcript`.
    ///
    /// Handler errors are spoken and never escape.
    pub fn dispatch(&mut self, transcript: &Transcript) -> DispatchResult {
        let Resolution { rule, intent } = resolve(transcript);
        debug!(
            "[DISPATCH] {:?} -> {} (priority {})",
            transcript.as_str(),
            rule.handler,
            rule.priority
        );

        if let Err(e) = self.execute(&intent) {
            warn!("[DISPATCH] {} failed: {}", rule.handler, e);
            self.speech.speak(failure_message(&intent, &e), Emotion::Worry);
        }

        let keyword = !matches!(
            rule.handler,
            HandlerId::Conversation | HandlerId::NotUnderstood
        );
        DispatchResult {
            handler: rule.handler,
            priority: keyword.then_some(rule.priority),
            outcome: if intent == Intent::Exit {
                DispatchOutcome::Exit
            } else {
                DispatchOutcome::Continue
            },
        }
    }

    /// Give back anything the handlers were holding open
    pub fn release(&mut self) {
        if !self.handlers.browser.has_session() {
            return;
        }
        self.speech.speak("Closing the browser.", Emotion::Normal);
        if let Err(e) = self.handlers.browser.close_session() {
            warn!("Failed to close browser session: {}", e);
        }
    }

    fn say(&self, text: impl Into<String>) {
        self.speech.speak(text, Emotion::Normal);
    }

    fn execute(&mut self, intent: &Intent) -> Result<()> {
        match intent {
            Intent::Interrupt => {
                self.speech.stop();
                self.say(CANCELED);
            }
            Intent::Volume(action) => self.volume(*action)?,
            Intent::OpenYoutube => {
                self.say("Opening YouTube");
                self.handlers.browser.open_url(YOUTUBE_URL)?;
            }
            Intent::SearchGoogle { topic } => self.search(topic)?,
            Intent::OpenGmail => {
                self.say("Opening Gmail");
                self.handlers.browser.open_url(GMAIL_URL)?;
            }
            Intent::News => self.news()?,
            Intent::Launch { app } => self.launch(app)?,
            Intent::Wikipedia { topic } => self.wikipedia(topic)?,
            Intent::Joke => {
                let joke = self.handlers.jokes.joke();
                self.speech.speak(joke, Emotion::Happy);
            }
            Intent::Time => {
                let now = self.handlers.clock.now();
                self.say(time_announcement(now));
            }
            Intent::Exit => {
                info!("Exit requested");
                self.say(GOODBYE);
            }
            Intent::Conversation { prompt } => self.converse(prompt)?,
            Intent::NotUnderstood => {
                self.speech.speak(NOT_UNDERSTOOD, Emotion::Worry);
            }
        }
        Ok(())
    }

    fn volume(&mut self, action: VolumeAction) -> Result<()> {
        self.say(action.announcement());
        self.handlers.volume.apply(action)
    }

    fn search(&mut self, topic: &str) -> Result<()> {
        let browser = &mut self.handlers.browser;
        if !browser.has_session() {
            self.speech.speak("Opening browser...", Emotion::Normal);
            if let Err(e) = browser.start_session() {
                self.speech.speak(
                    format!("Failed to open the browser: {}", e.detail()),
                    Emotion::Worry,
                );
                return Ok(());
            }
        }
        self.speech
            .speak(format!("Searching Google for {}", topic), Emotion::Normal);
        browser.search(topic)
    }

    fn news(&mut self) -> Result<()> {
        if !self.handlers.news.is_configured() {
            self.speech
                .speak("News API key is not configured, sir.", Emotion::Worry);
            return Ok(());
        }
        self.say("Fetching the top news headlines for you.");
        let headlines = self.handlers.news.top_headlines(HEADLINE_COUNT)?;
        if headlines.is_empty() {
            self.speech
                .speak("I apologize, I couldn't find any recent news.", Emotion::Worry);
        } else {
            self.speech
                .speak(headlines_sentence(&headlines), Emotion::Excited);
        }
        Ok(())
    }

    fn launch(&mut self, app: &str) -> Result<()> {
        let Some(path) = self.handlers.software_path(app).cloned() else {
            self.say(format!("Sorry, I don't have a configured path for {}.", app));
            return Ok(());
        };
        if !path.exists() {
            self.speech.speak(
                format!(
                    "The file path for {} is configured but the file does not exist. Please check your software paths.",
                    app
                ),
                Emotion::Worry,
            );
            return Ok(());
        }
        self.speech
            .speak("Launching application now, sir.", Emotion::Happy);
        info!("Launching {} from {}", app, path.display());
        self.handlers.launcher.launch(&path)
    }

    fn wikipedia(&mut self, topic: &str) -> Result<()> {
        if topic.is_empty() {
            debug!("Wikipedia request without a topic");
            return Ok(());
        }
        self.say("Searching Wikipedia...");
        match self.handlers.encyclopedia.summary(topic, SUMMARY_SENTENCES)? {
            Some(summary) => self.say(format!("According to Wikipedia: {}", summary)),
            None => {
                self.speech.speak(
                    format!("Sorry, I couldn't find anything on Wikipedia about {}.", topic),
                    Emotion::Worry,
                );
            }
        }
        Ok(())
    }

    fn converse(&mut self, prompt: &str) -> Result<()> {
        if !self.handlers.chat.is_configured() {
            self.speech
                .speak("Gemini API key is not configured.", Emotion::Worry);
            return Ok(());
        }
        let reply = self.handlers.chat.reply(prompt)?;
        self.say(reply);
        Ok(())
    }
}

/// Spoken form of a handler failure
pub fn failure_message(intent: &Intent, error: &JarvisError) -> String {
    let detail = error.detail();
    match intent {
        Intent::Volume(_) => format!("I ran into an error trying to change the volume: {}", detail),
        Intent::SearchGoogle { .. } => format!("Failed to perform Google search: {}", detail),
        Intent::OpenYoutube | Intent::OpenGmail => {
            format!("Failed to open the browser: {}", detail)
        }
        Intent::News => match error {
            JarvisError::NetworkError(_) => {
                format!("A network error occurred while fetching news: {}", detail)
            }
            _ => format!("An unexpected error occurred with the news feature: {}", detail),
        },
        Intent::Launch { app } => format!(
            "Sorry, I encountered an error while trying to open {}: {}",
            app, detail
        ),
        Intent::Wikipedia { .. } => {
            format!("An error occurred while accessing Wikipedia: {}", detail)
        }
        Intent::Conversation { .. } => format!(
            "An error occurred with the Gemini API: {}. Please check your internet connection and API key.",
            detail
        ),
        _ => format!("Sorry, I ran into a problem: {}", detail),
    }
}
