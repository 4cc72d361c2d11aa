//! Test doubles for the transport and interaction seams.
//!
//! [`MockTransport`] replays queued HTTP responses and records every request;
//! [`ScriptedInteraction`] answers prompts from a queue and records what was
//! shown. Neither touches the network or the console.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::github::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::interaction::{Interaction, is_affirmative, parse_selection};

// A panicking test thread must not hide the recorded state from the others.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HttpRequest {
    /// Decode the request body as JSON, if there is one.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }
}

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<std::result::Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body.
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        lock(&self.replies).push_back(Ok(HttpResponse::new(status, body.into())));
        self
    }

    /// Queue a transport failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        lock(&self.replies).push_back(Err(TransportError(message.into())));
        self
    }

    /// All requests sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Number of queued responses not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let description = format!("{} {}", request.method.as_str(), request.url);
        lock(&self.requests).push(request);
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError(format!("no mock response for {}", description))))
    }
}

/// A scripted answer for [`ScriptedInteraction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Confirm(bool),
    Text(String),
    Select(usize),
}

/// Interaction that answers from a queue and records what was shown.
///
/// Running out of answers behaves like a closed input stream: confirmations
/// are declined and inputs return `None`.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    answers: Mutex<VecDeque<Answer>>,
    transcript: Mutex<Vec<String>>,
}

impl ScriptedInteraction {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            transcript: Mutex::new(Vec::new()),
        }
    }

    /// Every message and question shown, in order.
    pub fn transcript(&self) -> Vec<String> {
        lock(&self.transcript).clone()
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.answers).len()
    }

    fn next(&self, shown: &str) -> Option<Answer> {
        lock(&self.transcript).push(shown.to_string());
        lock(&self.answers).pop_front()
    }
}

impl Interaction for ScriptedInteraction {
    fn notify(&self, message: &str) {
        lock(&self.transcript).push(message.to_string());
    }

    fn confirm(&self, question: &str) -> bool {
        match self.next(question) {
            Some(Answer::Confirm(yes)) => yes,
            Some(Answer::Text(text)) => is_affirmative(&text),
            _ => false,
        }
    }

    fn input(&self, prompt: &str) -> Option<String> {
        match self.next(prompt) {
            Some(Answer::Text(text)) => Some(text),
            _ => None,
        }
    }

    fn select(&self, prompt: &str, options: &[String]) -> Option<usize> {
        match self.next(prompt) {
            Some(Answer::Select(index)) if index < options.len() => Some(index),
            Some(Answer::Text(text)) => parse_selection(&text, options.len()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Method;

    fn request(method: Method) -> HttpRequest {
        HttpRequest {
            method,
            url: "https://api.github.com/user/repos".into(),
            headers: Vec::new(),
            body: Some(br#"{"ref":"refs/heads/x"}"#.to_vec()),
        }
    }

    #[test]
    fn test_json_body() {
        let req = request(Method::Post);

        assert_eq!(req.json_body().unwrap()["ref"], "refs/heads/x");
    }

    #[test]
    fn test_mock_replays_in_order_and_records() {
        let mock = MockTransport::new().respond(200, "first").fail("offline");

        let first = mock.send(request(Method::Get)).unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(first.body, b"first");

        let second = mock.send(request(Method::Put));
        assert_eq!(second.unwrap_err().0, "offline");

        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.requests()[1].method, Method::Put);
        assert_eq!(mock.remaining(), 0);
    }

    #[test]
    fn test_mock_without_replies_fails() {
        let mock = MockTransport::new();

        let err = mock.send(request(Method::Get)).unwrap_err();
        assert!(err.0.contains("no mock response"));
    }

    #[test]
    fn test_mock_survives_poisoned_lock() {
        let mock = std::sync::Arc::new(MockTransport::new().respond(200, "ok"));
        let shared = mock.clone();

        let _ = std::thread::spawn(move || {
            let _guard = shared.requests.lock().unwrap();
            panic!("test thread failure");
        })
        .join();

        assert_eq!(mock.send(request(Method::Get)).unwrap().status, 200);
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_scripted_answers_in_order() {
        let ui = ScriptedInteraction::new([
            Answer::Confirm(true),
            Answer::Text("feature".into()),
            Answer::Select(1),
        ]);
        let options = vec!["a".to_string(), "b".to_string()];

        assert!(ui.confirm("Retry?"));
        assert_eq!(ui.input("Name:"), Some("feature".into()));
        assert_eq!(ui.select("Pick:", &options), Some(1));
        assert_eq!(ui.transcript(), vec!["Retry?", "Name:", "Pick:"]);
        assert_eq!(ui.remaining(), 0);
    }

    #[test]
    fn test_scripted_exhausted_declines() {
        let ui = ScriptedInteraction::new([]);

        assert!(!ui.confirm("Retry?"));
        assert_eq!(ui.input("Name:"), None);
    }

    #[test]
    fn test_scripted_unrecognized_confirm_is_no() {
        let ui = ScriptedInteraction::new([Answer::Text("maybe".into())]);

        assert!(!ui.confirm("Retry?"));
    }
}
