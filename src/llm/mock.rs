// file: src/llm/mock.rs
// description: scripted chat client for unit tests

use super::{ChatMessage, LlmClient};
use crate::error::{ChronologyError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued responses in order and records every request. Once the
/// queue is drained each call fails with a transport error.
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responses(responses: &[&str]) -> Self {
        let mock = Self::new();
        for response in responses {
            mock.push_ok(response);
        }
        mock
    }

    pub fn push_ok(&self, response: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response.to_string()));
    }

    pub fn push_err(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ChronologyError::Llm(message.to_string())));
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> Vec<ChatMessage> {
        self.requests.lock().unwrap()[index].clone()
    }
}

impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChronologyError::Llm("connection refused".to_string())))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
