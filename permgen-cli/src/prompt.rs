//! Terminal prompt.

use std::io::{BufRead, IsTerminal, Write};

use permgen_sync::OperatorPrompt;

/// Asks the operator on stderr and reads answers from stdin.
///
/// Without a terminal on stdin every question takes its default, and
/// selection yields `None`. A typed answer that matches no option is passed
/// through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_answer(question: &str) -> Option<String> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return None;
        }
        let mut stderr = std::io::stderr();
        write!(stderr, "{question} ").ok()?;
        stderr.flush().ok()?;

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl OperatorPrompt for TerminalPrompt {
    fn confirm(&self, message: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        match Self::read_answer(&format!("{message} {hint}")) {
            Some(answer) => parse_confirmation(&answer).unwrap_or(default),
            None => default,
        }
    }

    fn select(&self, message: &str, options: &[String], default_index: usize) -> Option<String> {
        if options.is_empty() {
            return None;
        }
        let mut question = format!("{message}:");
        for (index, option) in options.iter().enumerate() {
            let marker = if index == default_index { "*" } else { " " };
            question.push_str(&format!("\n {marker} [{index}] {option}"));
        }
        question.push_str("\n>");

        let answer = Self::read_answer(&question)?;
        parse_selection(&answer, options, default_index)
    }
}

fn parse_confirmation(answer: &str) -> Option<bool> {
    match answer.to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// An empty answer picks the default; otherwise an index or an option name.
///
/// Anything else is returned as typed so the caller rejects it instead of
/// silently falling back to the default.
fn parse_selection(answer: &str, options: &[String], default_index: usize) -> Option<String> {
    if answer.is_empty() {
        return options.get(default_index).cloned();
    }
    let chosen = match answer.parse::<usize>() {
        Ok(index) => options.get(index),
        Err(_) => options.iter().find(|option| option.as_str() == answer),
    };
    Some(chosen.cloned().unwrap_or_else(|| answer.to_string()))
}
