//! Relay session
//!
//! Turns client lines into commands. Queries can be given inline
//! (`id 42`, `score 89.5 92`) or step by step, with the server prompting
//! for each argument:
//!
//! ```text
//! > id          < PROMPT  Enter the id to look up
//! > 42          < OK ...
//! > score       < PROMPT  Enter the minimum score
//! > 89.5        < PROMPT  Enter the maximum score
//! > 92          < OK ...
//! ```

use super::{Command, Response};

/// What the session expects next
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingId,
    AwaitingMinScore,
    AwaitingMaxScore { min_score: f32 },
}

/// Outcome of feeding one line to the session
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Answer directly (prompts, usage errors)
    Reply(Response),
    /// Run this command and answer with its response
    Execute(Command),
}

/// Per-connection command parser
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Consume one client line
    pub fn feed(&mut self, line: &str) -> Step {
        let input = line.trim();
        match std::mem::take(&mut self.state) {
            SessionState::Idle => self.parse_command(input),
            SessionState::AwaitingId => parse_id(input),
            SessionState::AwaitingMinScore => match parse_score(input) {
                Ok(min_score) => {
                    self.state = SessionState::AwaitingMaxScore { min_score };
                    Step::Reply(Response::prompt("Enter the maximum score"))
                }
                Err(reply) => reply,
            },
            SessionState::AwaitingMaxScore { min_score } => match parse_score(input) {
                Ok(max_score) => range_command(min_score, max_score),
                Err(reply) => reply,
            },
        }
    }

    fn parse_command(&mut self, input: &str) -> Step {
        let mut parts = input.split_whitespace();
        let keyword = parts.next().unwrap_or("").to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        match (keyword.as_str(), args.as_slice()) {
            ("id", []) => {
                self.state = SessionState::AwaitingId;
                Step::Reply(Response::prompt("Enter the id to look up"))
            }
            ("id", [id]) => parse_id(id),
            ("score", []) => {
                self.state = SessionState::AwaitingMinScore;
                Step::Reply(Response::prompt("Enter the minimum score"))
            }
            ("score", [min, max]) => match (parse_score(min), parse_score(max)) {
                (Ok(min_score), Ok(max_score)) => range_command(min_score, max_score),
                (Err(reply), _) | (_, Err(reply)) => reply,
            },
            ("id", _) => Step::Reply(Response::error("usage: id [<id>]")),
            ("score", _) => Step::Reply(Response::error("usage: score [<min> <max>]")),
            ("ping", []) => Step::Execute(Command::Ping),
            ("bye", []) | ("quit", []) => Step::Execute(Command::Quit),
            _ => Step::Execute(Command::Echo(input.to_string())),
        }
    }
}

fn parse_id(input: &str) -> Step {
    match input.parse::<i32>() {
        Ok(id) => Step::Execute(Command::PointQuery { id }),
        Err(_) => Step::Reply(Response::error(format!(
            "invalid id {:?}: expected an integer",
            input
        ))),
    }
}

fn parse_score(input: &str) -> Result<f32, Step> {
    match input.parse::<f32>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(Step::Reply(Response::error(format!(
            "invalid score {:?}: expected a number",
            input
        )))),
    }
}

fn range_command(min_score: f32, max_score: f32) -> Step {
    if min_score > max_score {
        return Step::Reply(Response::error(format!(
            "min score {} is greater than max score {}",
            min_score, max_score
        )));
    }
    Step::Execute(Command::RangeQuery {
        min_score,
        max_score,
    })
}
