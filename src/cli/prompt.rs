//! Interactive prompt on standard input.
//!
//! The same line reader serves the prompt and the `reset` command during a
//! session, so nothing typed is lost between the two.

use std::io::{self, Write};
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use super::commands::SessionRequest;
use crate::types::Variant;

/// Returns true if `line` asks to stop the running session.
pub fn is_reset_command(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "reset" | "r")
}

/// Parses a variant answer. An empty answer picks the default.
pub fn parse_variant(answer: &str) -> Option<Variant> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "c" | "classic" => Some(Variant::Classic),
        "2" | "p" | "pomodoro" => Some(Variant::Pomodoro),
        _ => None,
    }
}

/// Parses a duration answer in minutes. An empty answer picks the default.
pub fn parse_minutes(answer: &str, variant: Variant) -> Option<u64> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Some(variant.default_minutes());
    }
    answer.parse().ok()
}

/// Strips whitespace and the quotes a file manager adds on paste.
pub fn parse_pdf_path(answer: &str) -> Option<PathBuf> {
    let trimmed = answer.trim().trim_matches(|c| c == '"' || c == '\'');
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

/// Line-oriented prompt over an async reader.
pub struct Prompt<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> Prompt<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// Next line of input, or `None` at end of input.
    ///
    /// Cancel safe, so it can be raced in `tokio::select!`.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    /// Asks for PDF, variant and duration.
    ///
    /// Returns `None` at end of input. An empty PDF answer is kept as
    /// `pdf: None` so the session reports it.
    pub async fn ask_request(&mut self) -> io::Result<Option<SessionRequest>> {
        let Some(answer) = self.ask("PDF to study").await? else {
            return Ok(None);
        };
        let pdf = parse_pdf_path(&answer);

        let variant = loop {
            let Some(answer) = self.ask("Mode: [1] classic  [2] pomodoro (default 1)").await?
            else {
                return Ok(None);
            };
            match parse_variant(&answer) {
                Some(variant) => break variant,
                None => println!("Please answer 1 or 2."),
            }
        };

        let question = format!(
            "Duration in minutes {:?} (default {})",
            variant.duration_options(),
            variant.default_minutes()
        );
        let minutes = loop {
            let Some(answer) = self.ask(&question).await? else {
                return Ok(None);
            };
            match parse_minutes(&answer, variant) {
                Some(minutes) => break minutes,
                None => println!("Please enter a number of minutes."),
            }
        };

        Ok(Some(SessionRequest {
            pdf,
            variant,
            minutes,
        }))
    }

    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        print!("{}: ", question);
        io::stdout().flush()?;
        self.next_line().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_reset_command() {
            assert!(is_reset_command("reset"));
            assert!(is_reset_command("  R \r"));
            assert!(is_reset_command("RESET"));
            assert!(!is_reset_command("rest"));
            assert!(!is_reset_command(""));
        }

        #[test]
        fn test_parse_variant() {
            assert_eq!(parse_variant(""), Some(Variant::Classic));
            assert_eq!(parse_variant("2"), Some(Variant::Pomodoro));
            assert_eq!(parse_variant("Pomodoro"), Some(Variant::Pomodoro));
            assert_eq!(parse_variant("3"), None);
        }

        #[test]
        fn test_parse_minutes() {
            assert_eq!(parse_minutes("", Variant::Pomodoro), Some(90));
            assert_eq!(parse_minutes(" 45 ", Variant::Classic), Some(45));
            assert_eq!(parse_minutes("soon", Variant::Classic), None);
        }

        #[test]
        fn test_parse_pdf_path() {
            assert_eq!(
                parse_pdf_path("\"C:\\Study\\notes.pdf\"\n"),
                Some(PathBuf::from("C:\\Study\\notes.pdf"))
            );
            assert_eq!(parse_pdf_path("   "), None);
        }
    }

    mod prompt_tests {
        use super::*;

        #[tokio::test]
        async fn test_full_request() {
            let mut prompt = Prompt::new(&b"notes.pdf\n2\n120\n"[..]);
            let request = prompt.ask_request().await.unwrap().unwrap();
            assert_eq!(
                request,
                SessionRequest {
                    pdf: Some(PathBuf::from("notes.pdf")),
                    variant: Variant::Pomodoro,
                    minutes: 120,
                }
            );
        }

        #[tokio::test]
        async fn test_defaults_and_retry() {
            let mut prompt = Prompt::new(&b"notes.pdf\nx\n\n\n"[..]);
            let request = prompt.ask_request().await.unwrap().unwrap();
            assert_eq!(request.variant, Variant::Classic);
            assert_eq!(request.minutes, 25);
        }

        #[tokio::test]
        async fn test_end_of_input() {
            let mut prompt = Prompt::new(&b"notes.pdf\n"[..]);
            assert_eq!(prompt.ask_request().await.unwrap(), None);

            let mut prompt = Prompt::new(tokio::io::empty());
            assert_eq!(prompt.ask_request().await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_empty_pdf_is_kept() {
            let mut prompt = Prompt::new(&b"\n1\n30\n"[..]);
            let request = prompt.ask_request().await.unwrap().unwrap();
            assert_eq!(request.pdf, None);
        }
    }
}
