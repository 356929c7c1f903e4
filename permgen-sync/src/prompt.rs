//! Operator interaction port
//!
//! Confirmation and selection are asked through [`OperatorPrompt`], so the
//! reconciler runs the same way against a terminal, a script or a test.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Operator prompt trait.
pub trait OperatorPrompt: Send + Sync {
    /// Ask a yes/no question.
    fn confirm(&self, message: &str, default: bool) -> bool;

    /// Ask the operator to pick one option.
    ///
    /// Returns `None` when no choice can be made, e.g. no terminal attached.
    /// An answer that matches no option is returned as given, so the caller
    /// can reject it.
    fn select(&self, message: &str, options: &[String], default_index: usize) -> Option<String>;
}

/// Accepts every confirmation and every default selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl OperatorPrompt for AssumeYes {
    fn confirm(&self, _message: &str, _default: bool) -> bool {
        true
    }

    fn select(&self, _message: &str, options: &[String], default_index: usize) -> Option<String> {
        options.get(default_index).or_else(|| options.first()).cloned()
    }
}

/// Replays pre-recorded answers and records every question asked.
///
/// When the scripted answers run out, the prompt's default is used.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    confirmations: Mutex<VecDeque<bool>>,
    selections: Mutex<VecDeque<Option<String>>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    /// Create a prompt with no scripted answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next confirmation.
    pub fn with_confirmation(self, answer: bool) -> Self {
        if let Ok(mut queue) = self.confirmations.lock() {
            queue.push_back(answer);
        }
        self
    }

    /// Queue an answer for the next selection.
    pub fn with_selection(self, answer: Option<&str>) -> Self {
        if let Ok(mut queue) = self.selections.lock() {
            queue.push_back(answer.map(str::to_string));
        }
        self
    }

    /// Every message asked so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|asked| asked.clone()).unwrap_or_default()
    }

    fn record(&self, message: &str) {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn confirm(&self, message: &str, default: bool) -> bool {
        self.record(message);
        self.confirmations
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(default)
    }

    fn select(&self, message: &str, options: &[String], default_index: usize) -> Option<String> {
        self.record(message);
        match self.selections.lock().ok().and_then(|mut queue| queue.pop_front()) {
            Some(answer) => answer,
            None => options.get(default_index).cloned(),
        }
    }
}
