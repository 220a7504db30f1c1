//! Instruction interpreter for record playbooks.
//!
//! This module provides a small DSL for driving the record core from a
//! terminal or a playbook file. Instructions follow the format:
//!
//! `ACTION resource [arguments]`
//!
//! where:
//! - ACTION := "CREATE" | "READ" | "HELP"
//! - CREATE takes a JSON object as its argument
//! - READ takes a record id and an optional comma-separated field list
//!
//! Examples:
//! - `CREATE order {"products": [1, 2, 3], "quantity": 2, "shipping_address": "X"}`
//! - `READ user_profile 1 name,email`

pub mod logging;

use std::convert::TryFrom;

use anyhow::Context;
use recordkeep_core::records::{
    RecordApiDefaultStack,
    api::{ApiRequest, ApiResponse},
    error::RecordError,
    infrastructure::selection::FieldSelection,
    init_records,
};
use serde_json::{Value, json};
use tower::Service;
use tracing::{info, warn};

/// Represents a command action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Nil,
    Create,
    Read,
    Help,
}

impl Command {
    /// Parse a command from a string
    fn parse(s: &str) -> anyhow::Result<Self> {
        match s.to_uppercase().as_str() {
            "CREATE" | "C" => Ok(Command::Create),
            "READ" | "R" => Ok(Command::Read),
            "HELP" | "H" | "?" => Ok(Command::Help),
            _ => Err(anyhow::anyhow!("Unknown command: {}", s)),
        }
    }
}

/// Represents a complete instruction: an action and the request it issues
#[derive(Debug, Clone)]
pub struct Instruction {
    pub command: Command,
    pub request: Option<ApiRequest>,
}

/// Splits off the first whitespace-separated token.
fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (s, ""),
    }
}

impl TryFrom<&str> for Instruction {
    type Error = anyhow::Error;

    /// Parse an instruction string in the format "ACTION resource [arguments]"
    ///
    /// # Examples
    /// - `CREATE user_profile {"name": "A", "email": "a@x.com"}`
    /// - `READ order 1`
    /// - `READ order 1 total,created_at`
    fn try_from(s: &str) -> Result<Instruction, Self::Error> {
        let s = s.trim();

        // Skip empty lines and comments
        if s.is_empty() || s.starts_with('#') {
            return Ok(Instruction { command: Command::Nil, request: None });
        }

        let (action, rest) = next_token(s);
        let command = Command::parse(action)?;
        let (resource, arguments) = next_token(rest);

        let request = match command {
            Command::Nil => None,
            Command::Help => {
                if !rest.is_empty() {
                    return Err(anyhow::anyhow!("HELP takes no argument, got: {}", rest));
                }
                None
            }
            Command::Create => {
                if resource.is_empty() || arguments.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Invalid number of arguments for command: {}, expected CREATE <resource> <json>",
                        action
                    ));
                }
                let payload: Value = serde_json::from_str(arguments)
                    .with_context(|| format!("Failed to parse payload for resource {}", resource))?;
                Some(ApiRequest::Create { resource: resource.to_string(), payload })
            }
            Command::Read => {
                let (id, selector) = next_token(arguments);
                if resource.is_empty() || id.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Invalid number of arguments for command: {}, expected READ <resource> <id> [fields]",
                        action
                    ));
                }
                let id = id
                    .parse::<u64>()
                    .with_context(|| format!("Failed to parse record id: {}", id))?;
                Some(ApiRequest::Read {
                    resource: resource.to_string(),
                    id,
                    fields: FieldSelection::parse(selector),
                })
            }
        };

        Ok(Instruction { command, request })
    }
}

impl TryFrom<String> for Instruction {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Instruction, anyhow::Error> {
        Instruction::try_from(s.as_str())
    }
}

/// Renders a successful response as the JSON object of the record or view.
pub fn render_response(response: &ApiResponse) -> anyhow::Result<Value> {
    let rendered = match response {
        ApiResponse::Created(record) => serde_json::to_value(record)?,
        ApiResponse::Found(partial) => serde_json::to_value(partial)?,
    };
    Ok(rendered)
}

/// Renders a request failure as `{"error": <code>, ...}`.
pub fn render_error(error: &RecordError) -> anyhow::Result<Value> {
    let rendered = match error {
        RecordError::ValidationFailed(violations) => {
            json!({"error": error.code(), "violations": serde_json::to_value(violations)?})
        }
        RecordError::RecordNotFound(id) => json!({"error": error.code(), "id": id}),
        RecordError::UnknownResource(resource) => {
            json!({"error": error.code(), "resource": resource})
        }
        RecordError::UnknownField(field) => json!({"error": error.code(), "field": field}),
        _ => json!({"error": error.code(), "message": error.to_string()}),
    };
    Ok(rendered)
}

/// Executes instructions against an in-memory record stack
#[derive(Debug, Clone)]
pub struct RecordHandler {
    api: RecordApiDefaultStack,
}

impl RecordHandler {
    /// Create a handler over the default `order` and `user_profile` stores
    pub fn new(strict: bool) -> Self {
        Self { api: init_records().with_strict_projection(strict) }
    }

    /// Registered resource names
    pub fn resources(&self) -> Vec<String> {
        self.api.resources()
    }

    /// Execute an instruction, returning the JSON to print if any.
    ///
    /// Request failures are rendered as error objects; only rendering
    /// itself can fail.
    pub async fn execute(&mut self, instruction: &Instruction) -> anyhow::Result<Option<Value>> {
        match (instruction.command, &instruction.request) {
            (Command::Nil, _) => Ok(None),
            (Command::Help, _) => {
                print_help(&self.resources());
                Ok(None)
            }
            (_, Some(request)) => match self.api.call(request.clone()).await {
                Ok(response) => {
                    info!(resource = %request.resource(), "Request succeeded");
                    render_response(&response).map(Some)
                }
                Err(error) => {
                    warn!(resource = %request.resource(), code = error.code(), "{}", error);
                    render_error(&error).map(Some)
                }
            },
            (command, None) => Err(anyhow::anyhow!("{:?} command requires a request", command)),
        }
    }
}

impl Default for RecordHandler {
    fn default() -> Self {
        Self::new(false)
    }
}

fn print_help(resources: &[String]) {
    println!("Available instructions:");
    println!(" $ CREATE <resource> <json>        # Validate and store a new record");
    println!(" $ READ <resource> <id> [fields]   # Fetch a record, optionally narrowed");
    println!(" $ HELP                            # Show this help message");
    println!(" $ # [comment]                     # Comment line");
    println!(" $                                 # No operation");
    println!();
    println!("Resources: {}", resources.join(", "));
    println!();
}
