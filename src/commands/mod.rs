/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `chat`: Interactive chat session with document uploads
- `ask`: One-shot query printed to stdout

These handlers are small and use the library components: the session,
the agent client and the document store.
*/

use crate::agent::create_agent_client;
use crate::config::Config;
use crate::conversation::Conversation;
use crate::documents::{create_document_store, UploadFile};
use crate::error::{DocQueryError, Result};
use crate::session::{Session, SessionUpdate, SubmitOutcome};
use std::path::PathBuf;

// Terminal output helpers
pub mod display;

// Special commands parser
pub mod special_commands;

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! rustyline runs on a dedicated input thread. The session loop selects
    //! between typed lines and session events (upload ticks, agent replies),
    //! so uploads keep progressing while a prompt is open. Output for those
    //! events goes through rustyline's external printer, which redraws the
    //! prompt and the partially typed line underneath it.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::documents::DocId;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::{DefaultEditor, ExternalPrinter};
    use std::collections::HashMap;
    use std::sync::mpsc as std_mpsc;
    use tokio::sync::{mpsc, oneshot};

    type BoxedPrinter = Box<dyn ExternalPrinter + Send>;

    /// Line read by the input thread
    #[derive(Debug)]
    enum InputLine {
        Line(String),
        Interrupted,
        Eof,
    }

    /// Writes session event output without clobbering an open prompt
    ///
    /// Falls back to stdout when the terminal has no external printer
    /// (for example when stdin is not a TTY).
    struct EventOutput {
        printer: Option<BoxedPrinter>,
        shown_progress: HashMap<DocId, u8>,
    }

    impl EventOutput {
        fn new(printer: Option<BoxedPrinter>) -> Self {
            Self {
                printer,
                shown_progress: HashMap::new(),
            }
        }

        fn show(&mut self, update: &SessionUpdate, follow_up_limit: usize) {
            if let Some(text) = self.format_update(update, follow_up_limit) {
                self.print(text);
            }
        }

        fn print(&mut self, text: String) {
            if let Some(printer) = self.printer.as_mut() {
                match printer.print(text.clone()) {
                    Ok(()) => return,
                    Err(e) => {
                        tracing::debug!("External printer failed, using stdout: {}", e);
                        self.printer = None;
                    }
                }
            }
            println!("{}", text);
        }

        /// Text for one update; repeated progress values print once
        fn format_update(
            &mut self,
            update: &SessionUpdate,
            follow_up_limit: usize,
        ) -> Option<String> {
            match update {
                SessionUpdate::UploadProgress { id, name, progress } => {
                    tracing::debug!("Upload progress: {} {}%", name, progress);
                    if self.shown_progress.insert(id.clone(), *progress) == Some(*progress) {
                        return None;
                    }
                    Some(
                        format!("  {} {}", display::progress_bar(*progress), name)
                            .dimmed()
                            .to_string(),
                    )
                }
                SessionUpdate::UploadCompleted(document) => {
                    self.shown_progress.remove(&document.id);
                    Some(
                        format!("✓ {} processed ({} pages)", document.name, document.pages)
                            .green()
                            .to_string(),
                    )
                }
                SessionUpdate::AgentMessage(message) => {
                    Some(format!("\n{}", display::format_message(message, follow_up_limit)))
                }
                SessionUpdate::Ignored => None,
            }
        }
    }

    /// What the loop does after handling a line
    #[derive(Debug, PartialEq, Eq)]
    enum Flow {
        Continue,
        Exit,
    }

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `documents` - PDF files to upload before the first prompt
    ///
    /// # Errors
    ///
    /// Returns error if the agent client or document store cannot be created
    pub async fn run_chat(config: Config, documents: Vec<PathBuf>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let agent = create_agent_client(&config.agent)?;
        let store = create_document_store(&config.agent)?;
        let mut session = Session::new(&config, agent, store);

        display::print_welcome_banner(&config.agent.endpoint);

        if !documents.is_empty() {
            upload_paths(&mut session, &documents);
        }

        let (line_tx, mut line_rx) = mpsc::unbounded_channel();
        let (prompt_tx, prompt_rx) = std_mpsc::channel::<String>();
        let (printer_tx, printer_rx) = oneshot::channel();
        let input_thread = spawn_input_thread(prompt_rx, line_tx, printer_tx)?;
        let mut output = EventOutput::new(printer_rx.await.unwrap_or(None));

        if prompt_tx.send(String::new()).is_err() {
            return Err(DocQueryError::Io(std::io::Error::other("input thread exited")).into());
        }

        loop {
            tokio::select! {
                line = line_rx.recv() => {
                    let flow = match line {
                        Some(InputLine::Line(text)) => handle_line(&mut session, &text).await,
                        Some(InputLine::Interrupted) => {
                            if session.cancel_query() {
                                println!("{}", "Stopped waiting for the agent".yellow());
                            } else {
                                println!("Type 'exit' to quit");
                            }
                            Flow::Continue
                        }
                        Some(InputLine::Eof) | None => Flow::Exit,
                    };

                    if flow == Flow::Exit {
                        break;
                    }
                    if prompt_tx.send(session.take_draft()).is_err() {
                        break;
                    }
                }
                Some(event) = session.next_event() => {
                    let update = session.handle_event(event);
                    output.show(&update, session.follow_up_limit());
                }
            }
        }

        drop(prompt_tx);
        if input_thread.join().is_err() {
            tracing::warn!("Input thread panicked");
        }

        println!("Goodbye!");
        Ok(())
    }

    fn spawn_input_thread(
        prompts: std_mpsc::Receiver<String>,
        lines: mpsc::UnboundedSender<InputLine>,
        printer: oneshot::Sender<Option<BoxedPrinter>>,
    ) -> Result<std::thread::JoinHandle<()>> {
        let handle = std::thread::Builder::new()
            .name("docquery-input".to_string())
            .spawn(move || {
                let mut rl = match DefaultEditor::new() {
                    Ok(rl) => rl,
                    Err(e) => {
                        tracing::error!("Failed to initialize line editor: {}", e);
                        let _ = printer.send(None);
                        let _ = lines.send(InputLine::Eof);
                        return;
                    }
                };
                let external = match rl.create_external_printer() {
                    Ok(external) => Some(Box::new(external) as BoxedPrinter),
                    Err(e) => {
                        tracing::debug!("External printer unavailable: {}", e);
                        None
                    }
                };
                let _ = printer.send(external);
                let prompt = format!("{} ", "docquery>".cyan().bold());

                while let Ok(initial) = prompts.recv() {
                    let line = match rl.readline_with_initial(&prompt, (&initial, "")) {
                        Ok(line) => {
                            if !line.trim().is_empty() {
                                if let Err(e) = rl.add_history_entry(line.as_str()) {
                                    tracing::debug!("Failed to record history: {}", e);
                                }
                            }
                            InputLine::Line(line)
                        }
                        Err(ReadlineError::Interrupted) => InputLine::Interrupted,
                        Err(ReadlineError::Eof) => InputLine::Eof,
                        Err(e) => {
                            tracing::error!("Readline error: {}", e);
                            InputLine::Eof
                        }
                    };

                    let eof = matches!(line, InputLine::Eof);
                    if lines.send(line).is_err() || eof {
                        break;
                    }
                }
            })?;
        Ok(handle)
    }

    async fn handle_line(session: &mut Session, line: &str) -> Flow {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Flow::Continue;
        }

        let command = match parse_special_command(trimmed) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e.to_string().red());
                return Flow::Continue;
            }
        };

        match command {
            SpecialCommand::Upload(paths) => upload_paths(session, &paths),
            SpecialCommand::ListDocuments => display::print_documents(session.registry()),
            SpecialCommand::Delete(key) => match session.request_delete(&key) {
                Some(confirmation) => display::print_delete_prompt(&confirmation),
                None => println!("{}", format!("No document matches '{}'", key).yellow()),
            },
            SpecialCommand::ConfirmDelete => match session.confirm_delete().await {
                Ok(Some(document)) => {
                    println!("{}", format!("Deleted {}", document.name).green())
                }
                Ok(None) => println!("No delete pending"),
                Err(e) => {
                    tracing::warn!("Delete failed: {:#}", e);
                    println!("{}", format!("Delete failed: {}", e).red());
                }
            },
            SpecialCommand::CancelDelete => {
                if session.cancel_delete() {
                    println!("Delete cancelled");
                } else {
                    println!("No delete pending");
                }
            }
            SpecialCommand::FollowUp(n) => match session.select_follow_up(n) {
                Some(_) => println!("{}", "Follow-up ready; press Enter to ask it".dimmed()),
                None => println!("{}", format!("No follow-up suggestion #{}", n).yellow()),
            },
            SpecialCommand::Citation(n) => match session.citation_detail(n) {
                Some(detail) => display::print_citation_detail(&detail),
                None => println!("{}", format!("No citation #{}", n).yellow()),
            },
            SpecialCommand::StopQuery => {
                if session.cancel_query() {
                    println!("{}", "Stopped waiting for the agent".yellow());
                } else {
                    println!("No query running");
                }
            }
            SpecialCommand::Clear => {
                session.clear();
                println!("Conversation cleared");
            }
            SpecialCommand::ShowStatus => display::print_status(session),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit => return Flow::Exit,
            SpecialCommand::None => submit(session, trimmed),
        }

        Flow::Continue
    }

    fn submit(session: &mut Session, text: &str) {
        match session.submit_query(text) {
            SubmitOutcome::Sent(ticket) => {
                tracing::debug!(?ticket, "Query submitted");
                println!("{}", "Searching your documents...".dimmed());
            }
            SubmitOutcome::Busy => {
                println!(
                    "{}",
                    "Still waiting for the previous answer (/stop to give up)".dimmed()
                );
            }
            SubmitOutcome::NoDocuments => {
                println!(
                    "{}",
                    "Upload at least one PDF with /upload <file.pdf> before asking questions"
                        .yellow()
                );
            }
            SubmitOutcome::Blank => {}
        }
    }

}

// One-shot query handler
pub mod ask {
    use super::*;

    /// Send a single query and print the answer
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `query` - Query text
    /// * `json` - Print the structured response as JSON instead of text
    ///
    /// # Errors
    ///
    /// Returns error if the query is blank, the agent client cannot be
    /// created, or the query fails
    pub async fn run_ask(config: Config, query: String, json: bool) -> Result<()> {
        tracing::info!("Sending one-shot query");

        if query.trim().is_empty() {
            return Err(DocQueryError::Config("Query cannot be empty".to_string()).into());
        }

        let agent = create_agent_client(&config.agent)?;
        let mut conversation = Conversation::new();
        let message = conversation
            .submit_query(agent.as_ref(), &query)
            .await
            .ok_or_else(|| DocQueryError::Agent("Query was not sent".to_string()))?;

        let Some(response) = message.response() else {
            return Err(DocQueryError::Agent(message.content().to_string()).into());
        };

        if json {
            println!("{}", serde_json::to_string_pretty(response)?);
        } else {
            display::print_message(message, config.chat.follow_up_limit);
        }

        Ok(())
    }
}

/// Read each path and start uploads for the PDFs among them
///
/// Unreadable paths are reported and skipped; non-PDF files are dropped
/// without feedback.
fn upload_paths(session: &mut Session, paths: &[PathBuf]) {
    use colored::Colorize;

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match UploadFile::from_path(path) {
            Ok(file) => files.push(file),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    let ids = session.upload_files(files);
    if !ids.is_empty() {
        println!(
            "{}",
            format!("Uploading {} document(s)...", ids.len()).cyan()
        );
    }
}
