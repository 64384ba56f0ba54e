//! Terminal output for chat sessions
//!
//! Formatting helpers return strings so they can be tested; the
//! `print_*` functions write them to stdout.

use crate::conversation::{ChatMessage, Role};
use crate::documents::{DeleteConfirmation, Document, DocumentRegistry};
use crate::render::{CitationDetail, SearchResponse};
use crate::session::Session;

use colored::Colorize;
use prettytable::{row, Table};

const PROGRESS_WIDTH: usize = 20;

/// Human-readable byte size, e.g. `1.5 MB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Text progress bar, e.g. `[#####...............]  25%`
pub fn progress_bar(progress: u8) -> String {
    let progress = progress.min(100) as usize;
    let filled = progress * PROGRESS_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        ".".repeat(PROGRESS_WIDTH - filled),
        progress
    )
}

/// Render a chat message with its metrics, citations and follow-ups
pub fn format_message(message: &ChatMessage, follow_up_limit: usize) -> String {
    let header = match message.role() {
        Role::User => format!("[{}] You", message.timestamp()).blue().bold(),
        Role::Agent => format!("[{}] Agent", message.timestamp()).green().bold(),
    };

    let mut out = format!("{}\n{}\n", header, message.content());
    if let Some(response) = message.response() {
        out.push_str(&format_response_details(response, follow_up_limit));
    }
    out
}

fn format_response_details(response: &SearchResponse, follow_up_limit: usize) -> String {
    let mut out = String::new();

    let metrics = response.metrics();
    out.push_str(&format!(
        "{}\n",
        format!(
            "Confidence {}% | {} documents | {} passages | {}",
            metrics.confidence_percent,
            metrics.documents_referenced,
            metrics.passages_retrieved,
            metrics.processing_time
        )
        .dimmed()
    ));

    let chips = response.citation_chips();
    if !chips.is_empty() {
        out.push_str(&format!("{}\n", "Sources:".bold()));
        for (i, chip) in chips.iter().enumerate() {
            out.push_str(&format!(
                "  [{}] {} ({}%)\n",
                i + 1,
                chip.label.cyan(),
                chip.relevance_percent
            ));
        }
    }

    let follow_ups = response.follow_ups(follow_up_limit);
    if !follow_ups.is_empty() {
        out.push_str(&format!("{}\n", "Follow-up questions:".bold()));
        for (i, suggestion) in follow_ups.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, suggestion.yellow()));
        }
    }

    out
}

/// Render the detail view of one citation
pub fn format_citation_detail(detail: &CitationDetail) -> String {
    format!(
        "{} {}\nPage {} | Relevance {}%\n\n{}\n",
        "Citation:".bold(),
        detail.document_name.cyan(),
        detail.page_number,
        detail.relevance_percent,
        detail.excerpt
    )
}

/// Build the document table
pub fn document_table(documents: &[Document]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["#", "Name", "Pages", "Size", "Uploaded", "Id"]);
    for (i, document) in documents.iter().enumerate() {
        table.add_row(row![
            i + 1,
            document.name,
            document.pages,
            format_size(document.size),
            document.upload_date(),
            document.id
        ]);
    }
    table
}

/// Print documents, running uploads and totals
pub fn print_documents(registry: &DocumentRegistry) {
    if registry.is_empty() {
        println!("\nNo documents uploaded yet. Use /upload <file.pdf> to add one.");
    } else {
        println!();
        document_table(registry.documents()).printstd();
    }

    if !registry.uploads().is_empty() {
        println!("\n{}", "Processing:".bold());
        for upload in registry.uploads() {
            println!("  {} {}", progress_bar(upload.progress), upload.name);
        }
    }

    println!(
        "\n{} documents, {} pages, {}\n",
        registry.document_count(),
        registry.total_pages(),
        format_size(registry.total_size())
    );
}

/// Print a chat message
pub fn print_message(message: &ChatMessage, follow_up_limit: usize) {
    println!("\n{}", format_message(message, follow_up_limit));
}

pub fn print_citation_detail(detail: &CitationDetail) {
    println!("\n{}", format_citation_detail(detail));
}

pub fn print_delete_prompt(confirmation: &DeleteConfirmation) {
    println!(
        "{}",
        format!(
            "Delete {}? This cannot be undone. Type /confirm to delete or /cancel to keep it.",
            confirmation.name()
        )
        .yellow()
    );
}

pub fn print_welcome_banner(endpoint: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║          DocQuery Interactive Chat Mode - Welcome!           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Agent: {}", endpoint.cyan());
    println!("Upload PDFs with '/upload <file.pdf>', then ask questions about them.");
    println!("Type '/help' for available commands, 'exit' to quit\n");
}

/// Display session totals when the user types '/status'
pub fn print_status(session: &Session) {
    let registry = session.registry();
    let conversation = session.conversation();
    let query = if conversation.is_pending() {
        "waiting for answer".yellow()
    } else {
        "idle".green()
    };

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    DocQuery Session Status                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Documents:         {}", registry.document_count());
    println!("Total Pages:       {}", registry.total_pages());
    println!("Total Size:        {}", format_size(registry.total_size()));
    println!("Uploads Running:   {}", registry.uploads().len());
    println!("Conversation Size: {} messages", conversation.len());
    println!("Query:             {}", query);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::wire::decode_reply;
    use crate::conversation::Conversation;
    use crate::documents::DocId;
    use crate::test_utils::refund_policy_body;
    use chrono::NaiveDate;

    fn answered(body: &str) -> ChatMessage {
        let mut conversation = Conversation::new();
        let pending = conversation.begin_query("question").unwrap();
        conversation
            .finish_query(pending.ticket, Ok(decode_reply(body).unwrap()))
            .unwrap()
            .clone()
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), format!("[{}]   0%", ".".repeat(20)));
        assert_eq!(
            progress_bar(50),
            format!("[{}{}]  50%", "#".repeat(10), ".".repeat(10))
        );
        assert_eq!(progress_bar(200), format!("[{}] 100%", "#".repeat(20)));
    }

    #[test]
    fn test_format_message_with_citation_and_confidence() {
        let message = answered(&refund_policy_body());
        let text = format_message(&message, 3);
        assert!(text.contains("30 days"));
        assert!(text.contains("Confidence 82%"));
        assert!(text.contains("terms.pdf p.4"));
        assert!(text.contains("(90%)"));
        assert!(!text.contains("Follow-up questions:"));
    }

    #[test]
    fn test_format_message_all_defaults() {
        let message = answered(r#"{"success":true,"response":{}}"#);
        let text = format_message(&message, 3);
        assert!(text.contains("Confidence 0% | 0 documents | 0 passages | 0s"));
        assert!(!text.contains("Sources:"));
        assert!(!text.contains("Follow-up questions:"));
    }

    #[test]
    fn test_format_message_limits_follow_ups() {
        let message = answered(
            r#"{"success":true,"response":{"follow_up_suggestions":["one","two","three","four"]}}"#,
        );
        let text = format_message(&message, 3);
        assert!(text.contains("3. "));
        assert!(text.contains("three"));
        assert!(!text.contains("four"));
    }

    #[test]
    fn test_format_citation_detail() {
        let detail = CitationDetail {
            document_name: "terms.pdf".to_string(),
            page_number: 4,
            relevance_percent: 90,
            excerpt: "Refunds are accepted within 30 days.".to_string(),
        };
        let text = format_citation_detail(&detail);
        assert!(text.contains("terms.pdf"));
        assert!(text.contains("Page 4 | Relevance 90%"));
        assert!(text.contains("Refunds are accepted within 30 days."));
    }

    #[test]
    fn test_document_table_rows() {
        let documents = vec![Document {
            id: DocId::new("terms.pdf-1"),
            name: "terms.pdf".to_string(),
            size: 2048,
            pages: 12,
            uploaded_on: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        }];
        let table = document_table(&documents);
        assert_eq!(table.len(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("terms.pdf-1"));
        assert!(rendered.contains("2.0 KB"));
        assert!(rendered.contains("2024-01-02"));
    }
}
