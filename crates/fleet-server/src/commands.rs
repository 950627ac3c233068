//! Operator command dispatch with a role gate.

use std::fmt;
use std::str::FromStr;

use fleet_core::FleetRegistry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of the caller, as supplied by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorRole {
    Commander,
    Operator,
    Analyst,
}

impl OperatorRole {
    /// Analysts have read-only access.
    pub fn can_control(self) -> bool {
        matches!(self, OperatorRole::Commander | OperatorRole::Operator)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperatorRole::Commander => "commander",
            OperatorRole::Operator => "operator",
            OperatorRole::Analyst => "analyst",
        }
    }
}

impl fmt::Display for OperatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorRole {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "commander" => Ok(OperatorRole::Commander),
            "operator" => Ok(OperatorRole::Operator),
            "analyst" => Ok(OperatorRole::Analyst),
            other => Err(CommandError::UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetCommand {
    Pause,
    Resume,
    TogglePause,
    Kill,
    Rtb,
    Loiter,
}

impl FromStr for FleetCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pause" => Ok(FleetCommand::Pause),
            "resume" => Ok(FleetCommand::Resume),
            "toggle_pause" | "toggle" => Ok(FleetCommand::TogglePause),
            "kill" => Ok(FleetCommand::Kill),
            "rtb" | "return_to_base" => Ok(FleetCommand::Rtb),
            "loiter" => Ok(FleetCommand::Loiter),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("role '{0}' may not control vehicles")]
    Forbidden(OperatorRole),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

/// Apply `command` to vehicle `id` on behalf of `role`.
///
/// Returns `Ok(false)` when the vehicle does not exist.
pub fn dispatch(
    fleet: &FleetRegistry,
    role: OperatorRole,
    id: &str,
    command: FleetCommand,
) -> Result<bool, CommandError> {
    if !role.can_control() {
        tracing::warn!(vehicle = %id, role = %role, command = ?command, "Command rejected");
        return Err(CommandError::Forbidden(role));
    }

    let applied = match command {
        FleetCommand::Pause => fleet.pause(id),
        FleetCommand::Resume => fleet.resume(id),
        FleetCommand::TogglePause => fleet.toggle_pause(id),
        FleetCommand::Kill => fleet.kill(id),
        FleetCommand::Rtb => fleet.return_to_base(id),
        FleetCommand::Loiter => fleet.loiter(id),
    };

    tracing::info!(vehicle = %id, role = %role, command = ?command, applied, "Command dispatched");
    Ok(applied)
}
