//! Parser for control scripts
//!
//! Format: one command per line, OSC-style address followed by
//! whitespace-separated arguments.
//!
//! ```text
//! /read 64          # decode up to 64 amino acids
//! /step 0           # play step 0
//! /density 3 0.5    # channel 3 at half density
//! /getAminoAcidCounts
//! /reset
//! /open data/chr21.fa
//! /jump 100000
//! /status
//! /ping
//! /transport bar 3  # report transport state
//! /rtransport start # start, stop, continue or currenttime
//! ```
//!
//! The remote aliases `/rreset`, `/rjump`, `/ropen` and `/rstatus` are
//! accepted as well. `/rping` is answered on the remote address.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, ParseError};

/// One control command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Decode up to this many amino acids into the conductor
    Read(u32),
    /// Process one step and emit its events
    Step(u64),
    Density { channel: u32, density: f32 },
    AminoCounts,
    /// Clear the conductor and restart the current chromosome
    Reset,
    Open(PathBuf),
    /// Restart the current chromosome at a base offset
    Jump(u64),
    Status,
    Ping,
    RemotePing,
    /// Transport state reported by the sequencer, echoed to the remote
    Transport(Vec<String>),
    /// Transport request from the remote, forwarded to the sequencer
    RemoteTransport(TransportVerb),
}

/// Transport requests a remote may forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportVerb {
    Start,
    Stop,
    Continue,
    CurrentTime,
}

impl TransportVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportVerb::Start => "start",
            TransportVerb::Stop => "stop",
            TransportVerb::Continue => "continue",
            TransportVerb::CurrentTime => "currenttime",
        }
    }
}

impl fmt::Display for TransportVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportVerb {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(TransportVerb::Start),
            "stop" => Ok(TransportVerb::Stop),
            "continue" => Ok(TransportVerb::Continue),
            "currenttime" => Ok(TransportVerb::CurrentTime),
            _ => Err(ParseError::UnknownTransport(s.to_string())),
        }
    }
}

fn parse_number<T: FromStr>(s: &str) -> Result<T, ParseError> {
    s.parse::<T>()
        .map_err(|_| ParseError::InvalidNumber(s.to_string()))
}

fn expect_args(
    command: &str,
    args: &[&str],
    expected: &'static str,
    allowed: std::ops::RangeInclusive<usize>,
) -> Result<(), ParseError> {
    if allowed.contains(&args.len()) {
        Ok(())
    } else {
        Err(ParseError::ArgumentCount {
            command: command.to_string(),
            expected,
            got: args.len(),
        })
    }
}

/// Parse a single command line
/// Format: /<address> [args...]  # comment
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    // Remove trailing comments
    let line = line.split('#').next().unwrap_or(line).trim();

    let mut parts = line.split_whitespace();
    let address = parts
        .next()
        .ok_or_else(|| ParseError::InvalidLine("empty command".to_string()))?;
    if !address.starts_with('/') {
        return Err(ParseError::InvalidLine(format!(
            "address must start with /: {}",
            address
        )));
    }
    let args: Vec<&str> = parts.collect();

    match address {
        "/read" => {
            expect_args(address, &args, "0 or 1", 0..=1)?;
            let count = match args.first() {
                Some(n) => parse_number(n)?,
                None => 1,
            };
            Ok(Command::Read(count))
        }
        "/step" => {
            expect_args(address, &args, "1", 1..=1)?;
            Ok(Command::Step(parse_number(args[0])?))
        }
        "/density" => {
            expect_args(address, &args, "2", 2..=2)?;
            let density: f32 = parse_number(args[1])?;
            if !density.is_finite() {
                return Err(ParseError::InvalidNumber(args[1].to_string()));
            }
            Ok(Command::Density {
                channel: parse_number(args[0])?,
                density,
            })
        }
        "/getAminoAcidCounts" => {
            expect_args(address, &args, "0", 0..=0)?;
            Ok(Command::AminoCounts)
        }
        "/reset" | "/rreset" => {
            expect_args(address, &args, "0", 0..=0)?;
            Ok(Command::Reset)
        }
        "/open" | "/ropen" => {
            expect_args(address, &args, "1", 1..=1)?;
            Ok(Command::Open(PathBuf::from(args[0])))
        }
        "/jump" | "/rjump" => {
            expect_args(address, &args, "1", 1..=1)?;
            Ok(Command::Jump(parse_number(args[0])?))
        }
        "/status" | "/rstatus" => {
            expect_args(address, &args, "0", 0..=0)?;
            Ok(Command::Status)
        }
        "/ping" => {
            expect_args(address, &args, "0", 0..=0)?;
            Ok(Command::Ping)
        }
        "/rping" => {
            expect_args(address, &args, "0", 0..=0)?;
            Ok(Command::RemotePing)
        }
        "/transport" => Ok(Command::Transport(
            args.iter().map(|a| a.to_string()).collect(),
        )),
        "/rtransport" => {
            expect_args(address, &args, "1", 1..=1)?;
            Ok(Command::RemoteTransport(args[0].parse()?))
        }
        _ => Err(ParseError::UnknownCommand(address.to_string())),
    }
}

/// Parse a full control script
/// Returns the commands in order; errors carry the 1-based line number
pub fn parse_script(text: &str) -> Result<Vec<Command>, Error> {
    let mut result = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let command = parse_command(line).map_err(|source| Error::Parse {
            line: idx + 1,
            source,
        })?;
        result.push(command);
    }

    Ok(result)
}
