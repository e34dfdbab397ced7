//! Multi-turn chat session over a single-prompt model.
//!
//! The whole transcript is replayed on every turn as one prompt:
//! `User: ...` and `AI: ...` lines joined by newlines, ending with `\nAI:`.
//! History is never pruned, so the payload grows with every turn.

use std::fmt;
use std::io::{BufRead, Write};

use colored::Colorize;
use log::{debug, warn};

use crate::error::Result;
use crate::llm::LlmClient;
use crate::router::FAILURE_MARKER;

/// Printed under a failure that came from the model server
pub const BACKEND_HINT: &str = "Is the Ollama server running? Check llm.endpoint in the config.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Ai,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "User"),
            Speaker::Ai => write!(f, "AI"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

/// Ordered transcript owned by one session
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            speaker: Speaker::User,
            text: text.into(),
        });
    }

    pub fn push_ai(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            speaker: Speaker::Ai,
            text: text.into(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Prompt sent to the model for the next AI turn
    pub fn render_prompt(&self) -> String {
        let lines: Vec<String> = self
            .turns
            .iter()
            .map(|turn| format!("{}: {}", turn.speaker, turn.text))
            .collect();
        format!("{}\nAI:", lines.join("\n"))
    }
}

pub struct ChatSession<'a> {
    llm: &'a dyn LlmClient,
    exit_token: String,
    conversation: Conversation,
}

impl<'a> ChatSession<'a> {
    pub fn new(llm: &'a dyn LlmClient, exit_token: impl Into<String>) -> Self {
        Self {
            llm,
            exit_token: exit_token.into(),
            conversation: Conversation::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    fn is_exit(&self, line: &str) -> bool {
        line.eq_ignore_ascii_case(&self.exit_token)
    }

    /// One turn. The user line stays in the transcript even if the model fails.
    pub async fn send(&mut self, line: &str) -> Result<String> {
        self.conversation.push_user(line);
        let prompt = self.conversation.render_prompt();
        debug!("Session prompt is {} bytes over {} turns", prompt.len(), self.conversation.len());

        let reply = self.llm.generate(&prompt).await?;
        let reply = reply.trim().to_string();
        self.conversation.push_ai(reply.clone());
        Ok(reply)
    }

    /// Read lines until the exit token or end of input
    pub async fn run<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        let banner = format!(
            "Chat session with {} started. Type '{}' to leave.",
            self.llm.model(),
            self.exit_token
        );
        writeln!(out, "{}", banner.dimmed())?;

        loop {
            write!(out, "{}", "You: ".green().bold())?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if self.is_exit(line) {
                break;
            }

            match self.send(line).await {
                Ok(reply) => writeln!(out, "{} {}", "AI:".cyan().bold(), reply)?,
                Err(e) => {
                    warn!("Chat turn failed: {}", e);
                    writeln!(out, "{} {}", FAILURE_MARKER, e.to_string().red())?;
                    if e.is_backend() {
                        writeln!(out, "{}", BACKEND_HINT.dimmed())?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use std::io::Cursor;

    #[test]
    fn test_render_prompt() {
        let mut convo = Conversation::new();
        convo.push_user("hi");
        convo.push_ai("hello");
        convo.push_user("how are you?");

        assert_eq!(convo.render_prompt(), "User: hi\nAI: hello\nUser: how are you?\nAI:");
    }

    #[tokio::test]
    async fn test_context_grows_with_every_turn() {
        let mock = MockLlmClient::new(vec!["one", "two", "three"]);
        let mut session = ChatSession::new(&mock, "exit");

        for msg in ["a", "b", "c"] {
            session.send(msg).await.unwrap();
        }

        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts[0], "User: a\nAI:");
        assert_eq!(prompts[2], "User: a\nAI: one\nUser: b\nAI: two\nUser: c\nAI:");
        assert_eq!(session.conversation().len(), 6);
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_user_line() {
        let mock = MockLlmClient::unavailable();
        let mut session = ChatSession::new(&mock, "exit");

        assert!(session.send("anyone there?").await.is_err());

        let turns = session.conversation().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].speaker, Speaker::User);
    }

    #[tokio::test]
    async fn test_run_transcript() {
        let mock = MockLlmClient::new(vec![" Hi there! "]);
        let mut session = ChatSession::new(&mock, "exit");
        let mut input = Cursor::new("hello\n\nEXIT\nnever read\n");
        let mut out = Vec::new();

        session.run(&mut input, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Chat session with mock-model started."));
        assert!(out.contains("Hi there!"));
        assert_eq!(mock.prompts(), vec!["User: hello\nAI:"]);
    }

    #[tokio::test]
    async fn test_run_survives_backend_failure() {
        let mock = MockLlmClient::unavailable();
        let mut session = ChatSession::new(&mock, "exit");
        let mut input = Cursor::new("one\ntwo\n");
        let mut out = Vec::new();

        session.run(&mut input, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches(FAILURE_MARKER).count(), 2);
        assert_eq!(out.matches(BACKEND_HINT).count(), 2);
        assert_eq!(session.conversation().len(), 2);
    }
}
