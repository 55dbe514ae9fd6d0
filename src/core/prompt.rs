//! Interactive input loop for values the header cannot supply.
//!
//! The loop keeps asking until the operator enters something the keyword's
//! validity check accepts, or submits an empty line to take the default.

use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};
use crate::header::HeaderValue;
use crate::keywords::{Conversion, KeywordSpec, Validity};

/// A single value request.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub label: String,
    pub default: Option<HeaderValue>,
    pub example: String,
    pub validity: Validity,
    pub conversion: Conversion,
    /// Echo the converted value and ask for confirmation before accepting it.
    pub verify: bool,
}

impl PromptRequest {
    pub fn for_keyword(spec: &KeywordSpec, default: Option<HeaderValue>, verify: bool) -> Self {
        Self {
            label: spec.comment.to_string(),
            default,
            example: spec.example.to_string(),
            validity: spec.validity,
            conversion: spec.conversion,
            verify,
        }
    }
}

/// Source of operator-supplied values.
pub trait InputLoop {
    /// Show a message before the first question.
    fn message(&mut self, msg: &str);

    /// Block until a value is obtained. `Ok(None)` means the operator took an
    /// empty default.
    fn ask(&mut self, request: &PromptRequest) -> Result<Option<HeaderValue>>;
}

/// Used when there is no terminal: every question takes its default.
pub struct NonInteractive;

impl InputLoop for NonInteractive {
    fn message(&mut self, _msg: &str) {}

    fn ask(&mut self, request: &PromptRequest) -> Result<Option<HeaderValue>> {
        Ok(request.default.clone())
    }
}

/// Input loop over a reader/writer pair, normally stdin and stderr.
pub struct TerminalInputLoop<R, W> {
    input: R,
    output: W,
}

impl TerminalInputLoop<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalInputLoop<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| Error::internal_io(e.to_string(), Some("read input".to_string())))?;
        if read == 0 {
            return Err(Error::internal_io(
                "end of input",
                Some("read input".to_string()),
            ));
        }
        Ok(line.trim().to_string())
    }

    fn write(&mut self, text: &str) {
        write!(self.output, "{}", text).ok();
        self.output.flush().ok();
    }

    fn confirm(&mut self, value: &HeaderValue) -> Result<bool> {
        self.write(&format!("You have entered {}. Is this correct? [Y/n]: ", value));
        let answer = self.read_line()?.to_lowercase();
        Ok(answer.is_empty() || answer.starts_with('y'))
    }
}

impl<R: BufRead, W: Write> InputLoop for TerminalInputLoop<R, W> {
    fn message(&mut self, msg: &str) {
        self.write(&format!("{}\n", msg));
    }

    fn ask(&mut self, request: &PromptRequest) -> Result<Option<HeaderValue>> {
        let mut prompt = request.label.clone();
        if !request.example.is_empty() {
            prompt.push_str(&format!(" (eg: {})", request.example));
        }
        if let Some(default) = &request.default {
            prompt.push_str(&format!(" [{}]", default));
        }
        prompt.push_str(": ");

        loop {
            self.write(&prompt);
            let line = self.read_line()?;

            if line.is_empty() {
                return Ok(request.default.clone());
            }

            if !request.validity.check(&line) {
                self.write(&format!("Invalid input: '{}'. Please try again.\n", line));
                continue;
            }

            let value = match request.conversion.convert(&line) {
                Ok(value) => value,
                Err(e) => {
                    let problem = e.details["problem"].as_str().unwrap_or("Invalid input");
                    self.write(&format!("{}. Please try again.\n", problem));
                    continue;
                }
            };

            if request.verify && !self.confirm(&value)? {
                continue;
            }

            return Ok(Some(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ra_request(default: Option<HeaderValue>, verify: bool) -> PromptRequest {
        PromptRequest {
            label: "Right Ascension".to_string(),
            default,
            example: "'03:14:15' or '03 14 15'".to_string(),
            validity: Validity::RightAscension,
            conversion: Conversion::RightAscension,
            verify,
        }
    }

    fn run(input: &str, request: &PromptRequest) -> (Result<Option<HeaderValue>>, String) {
        let mut input_loop = TerminalInputLoop::new(Cursor::new(input.to_string()), Vec::new());
        let result = input_loop.ask(request);
        let output = String::from_utf8(input_loop.into_output()).unwrap();
        (result, output)
    }

    #[test]
    fn valid_input_is_converted() {
        let (result, output) = run("03 14 15\n", &ra_request(None, false));
        assert_eq!(result.unwrap(), Some(HeaderValue::from("03:14:15.00")));
        assert!(output.starts_with("Right Ascension (eg: '03:14:15' or '03 14 15'): "));
    }

    #[test]
    fn invalid_input_reprompts() {
        let (result, output) = run("25:00:00\n12:30:00\n", &ra_request(None, false));
        assert_eq!(result.unwrap(), Some(HeaderValue::from("12:30:00.00")));
        assert!(output.contains("Invalid input: '25:00:00'"));
        assert_eq!(output.matches("Right Ascension (eg:").count(), 2);
    }

    #[test]
    fn empty_line_takes_default() {
        let default = HeaderValue::from("01:02:03.00");
        let (result, output) = run("\n", &ra_request(Some(default.clone()), false));
        assert_eq!(result.unwrap(), Some(default));
        assert!(output.contains("[01:02:03.00]"));
    }

    #[test]
    fn empty_line_without_default_is_none() {
        let (result, _) = run("\n", &ra_request(None, false));
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn end_of_input_is_an_error() {
        let (result, _) = run("99:99:99\n", &ra_request(None, false));
        assert_eq!(result.unwrap_err().code.as_str(), "internal.io_error");
    }

    #[test]
    fn verify_asks_for_confirmation() {
        let (result, output) = run("03:14:15\nn\n04:00:00\ny\n", &ra_request(None, true));
        assert_eq!(result.unwrap(), Some(HeaderValue::from("04:00:00.00")));
        assert!(output.contains("You have entered 03:14:15.00. Is this correct?"));
    }

    #[test]
    fn non_interactive_returns_default() {
        let default = HeaderValue::from("Jane Doe");
        let mut request = ra_request(Some(default.clone()), false);
        assert_eq!(NonInteractive.ask(&request).unwrap(), Some(default));

        request.default = None;
        assert_eq!(NonInteractive.ask(&request).unwrap(), None);
    }

    #[test]
    fn messages_are_written() {
        let mut input_loop = TerminalInputLoop::new(Cursor::new(String::new()), Vec::new());
        input_loop.message("hello");
        assert_eq!(input_loop.into_output(), b"hello\n");
    }
}
