//! Command loop connecting terminal input, the session and the view

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedReceiver;

use av_core::{DeepLinkResolver, SessionEvent, SessionHandle, VerificationError};
use av_shared::phone::{sanitize_digits, sanitize_phone_number};
use av_shared::CountryCatalog;

use crate::commands::{self, Command, HELP};
use crate::presenter::{present, VerificationView};

/// Dial code selected before the user picks a country
pub const DEFAULT_COUNTRY_CODE: &str = "+1";

/// Whether the loop keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Runner<V: VerificationView> {
    handle: SessionHandle,
    resolver: Arc<DeepLinkResolver>,
    catalog: &'static CountryCatalog,
    country_code: String,
    view: V,
}

impl<V: VerificationView> Runner<V> {
    pub fn new(handle: SessionHandle, resolver: Arc<DeepLinkResolver>, view: V) -> Self {
        Self {
            handle,
            resolver,
            catalog: CountryCatalog::bundled(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            view,
        }
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Read commands until `quit` or end of input, rendering session events
    /// as they arrive.
    pub async fn run<R>(
        &mut self,
        input: R,
        events: &mut UnboundedReceiver<SessionEvent>,
    ) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.view.show("Type 'help' for a list of commands");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match commands::parse(&line) {
                        Ok(Some(command)) => {
                            if self.execute(command).await == Flow::Quit {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(error) => self.view.show(&error.to_string()),
                    }
                }
                Some(event) = events.recv() => present(&mut self.view, &event),
            }
        }

        if let Err(error) = self.handle.cancel().await {
            tracing::debug!(error = %error, event = "cancel_on_exit_failed", "Session already stopped");
        }
        Ok(())
    }

    /// Execute a single command
    pub async fn execute(&mut self, command: Command) -> Flow {
        tracing::debug!(command = command_name(&command), event = "command_received", "Executing command");

        match command {
            Command::Countries { query } => self.list_countries(&query),
            Command::Country { code } => self.select_country(&code),
            Command::Phone { number } => {
                let phone_number = if sanitize_digits(&number).is_empty() {
                    String::new()
                } else {
                    sanitize_phone_number(&self.country_code, &number)
                };
                let result = self.handle.submit_phone_number(phone_number).await;
                self.report(result);
            }
            Command::Code { code } => {
                let result = self.handle.submit_code(code.trim()).await;
                self.report(result);
            }
            Command::Resend => {
                let result = self.handle.resend().await;
                self.report(result);
            }
            Command::Cancel => {
                let result = self.handle.cancel().await;
                self.report(result);
                self.view.show("Verification cancelled");
            }
            Command::Link { url } => match self.resolver.resolve(&url).await {
                Ok(Some(_)) => self.view.show("Code received from link"),
                Ok(None) => self.view.show("Not a verification link, ignored"),
                Err(error) => self.view.on_error(&error.to_string(), false),
            },
            Command::Status => match serde_json::to_string_pretty(&self.handle.snapshot()) {
                Ok(json) => self.view.show(&json),
                Err(error) => {
                    tracing::warn!(error = %error, event = "snapshot_encode_failed", "Failed to encode status")
                }
            },
            Command::Help => self.view.show(HELP),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn list_countries(&mut self, query: &str) {
        let matches = self.catalog.search(query);
        if matches.is_empty() {
            self.view.show(&format!("No country matches '{query}'"));
            return;
        }
        let listing = matches
            .iter()
            .map(|entry| format!("{:<6} {:<3} {}", entry.dial_code, entry.code, entry.name))
            .collect::<Vec<_>>()
            .join("\n");
        self.view.show(&listing);
    }

    fn select_country(&mut self, code: &str) {
        let entry = if code.starts_with('+') || code.chars().all(|c| c.is_ascii_digit()) {
            self.catalog.find_by_dial_code(code)
        } else {
            self.catalog.find_by_iso_code(code)
        };

        match entry {
            Some(entry) => {
                self.country_code = entry.dial_code.clone();
                let message = format!("Country set to {} ({})", entry.name, entry.dial_code);
                self.view.show(&message);
            }
            None => self.view.show(&format!("Unknown country code '{code}'")),
        }
    }

    /// Rejections surface immediately; results of accepted commands arrive
    /// later as session events.
    fn report(&mut self, result: Result<(), VerificationError>) {
        if let Err(error) = result {
            self.view.on_error(&error.to_string(), error.is_local());
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Countries { .. } => "countries",
        Command::Country { .. } => "country",
        Command::Phone { .. } => "phone",
        Command::Code { .. } => "code",
        Command::Resend => "resend",
        Command::Cancel => "cancel",
        Command::Link { .. } => "link",
        Command::Status => "status",
        Command::Help => "help",
        Command::Quit => "quit",
    }
}
