//! Interactive agent loop
//!
//! Reads a tool name or free-text intent per line, resolves it, asks for any
//! missing parameters and prints the result. Picking `ask_llm` opens a
//! [`ChatSession`] instead of a one-shot call when chat sessions are enabled.

use std::io::{BufRead, Write};

use colored::Colorize;
use log::{debug, info};

use crate::error::{Result, RouterError};
use crate::router::{ArgumentSource, FAILURE_MARKER, InvocationRequest, InvocationResult, ToolRouter};
use crate::session::{BACKEND_HINT, ChatSession};
use crate::tools::ASK_LLM;

/// Asks the user for parameter values on the same terminal the agent reads from
struct PromptSource<'a, R, W> {
    input: &'a mut R,
    out: &'a mut W,
}

impl<R: BufRead, W: Write> ArgumentSource for PromptSource<'_, R, W> {
    fn acquire(&mut self, tool: &str, param: &str) -> Result<String> {
        write!(self.out, "Enter value for '{}': ", param.bold())?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(RouterError::MissingArgument {
                tool: tool.to_string(),
                param: param.to_string(),
            });
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

pub struct Agent<'a> {
    router: &'a ToolRouter,
    exit_token: String,
    chat_session: bool,
}

impl<'a> Agent<'a> {
    pub fn new(router: &'a ToolRouter, exit_token: impl Into<String>) -> Self {
        Self {
            router,
            exit_token: exit_token.into(),
            chat_session: true,
        }
    }

    /// Whether `ask_llm` opens a multi-turn session (default) or runs once
    pub fn with_chat_session(mut self, enabled: bool) -> Self {
        self.chat_session = enabled;
        self
    }

    fn print_tools<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{}", "Available tools:".bold())?;
        for (name, description) in self.router.registry().list_all() {
            writeln!(out, "  • {}: {}", name.cyan(), description)?;
        }
        writeln!(out)?;
        Ok(())
    }

    pub async fn run<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<()> {
        writeln!(out, "{}", "Tool Router Agent".green().bold())?;
        self.print_tools(out)?;

        loop {
            write!(out, "Enter tool name (or '{}' to quit): ", self.exit_token)?;
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
            if line.eq_ignore_ascii_case(&self.exit_token) {
                writeln!(out, "Goodbye!")?;
                break;
            }

            let spec = match self.router.resolve(line).await {
                Ok(spec) => spec,
                Err(e) => {
                    writeln!(out, "{} {}", FAILURE_MARKER, e.to_string().red())?;
                    continue;
                }
            };
            debug!("Input '{}' resolved to '{}'", line, spec.name);

            if self.chat_session && spec.name == ASK_LLM {
                info!("Opening chat session");
                let mut session = ChatSession::new(self.router.context().llm.as_ref(), self.exit_token.clone());
                session.run(input, out).await?;
                continue;
            }

            let request = InvocationRequest::new(spec.name.clone());
            let result = {
                let mut source = PromptSource {
                    input: &mut *input,
                    out: &mut *out,
                };
                self.router.dispatch(request, &mut source).await
            };

            match result {
                InvocationResult::Success(text) => {
                    writeln!(out, "\n{}\n{}", "Result:".green().bold(), text)?;
                }
                failure @ InvocationResult::Failure(_) => {
                    writeln!(out, "\n{}\n{}", "Result:".red().bold(), failure.to_string().red())?;
                    if failure.error().is_some_and(RouterError::is_backend) {
                        writeln!(out, "{}", BACKEND_HINT.dimmed())?;
                    }
                }
            }
        }

        Ok(())
    }
}
