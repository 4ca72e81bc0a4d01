//! Control session
//!
//! Owns the reader and the conductor and applies one command at a time.
//! Callers that receive commands from several places must funnel them
//! through a single session; nothing here is shared.

use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use crate::config::ConductorConfig;
use crate::control::parser::{Command, TransportVerb};
use crate::error::Result;
use crate::genome::{ChromosomeReader, Decoded, ReaderStatus, AMINO_ACID_COUNT};
use crate::pipeline::{Conductor, DensityOutcome, NoteEvent};

/// Answer to one command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Reading finished; progress counters after the read
    Ready {
        bases_read: u64,
        amino_acids_read: u64,
    },
    Events(Vec<NoteEvent>),
    Density(DensityOutcome),
    Counts([u64; AMINO_ACID_COUNT]),
    Status(ReaderStatus),
    Pong,
    RemotePong,
    /// Transport request for the sequencer
    Transport(TransportVerb),
    /// Transport state for the remote
    TransportStatus(Vec<String>),
    Ack,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ready {
                bases_read,
                amino_acids_read,
            } => write!(f, "/ready {} {}", bases_read, amino_acids_read),
            Reply::Events(events) => {
                write!(f, "/midi")?;
                for event in events {
                    let (channel, pitch, velocity, duration) = event.to_tuple();
                    write!(f, " {} {} {} {}", channel, pitch, velocity, duration)?;
                }
                Ok(())
            }
            Reply::Density(outcome) => write!(f, "/density {:?}", outcome),
            Reply::Counts(counts) => {
                write!(f, "/aminoAcidCounts")?;
                for count in counts {
                    write!(f, " {}", count)?;
                }
                Ok(())
            }
            Reply::Status(status) => {
                write!(
                    f,
                    "/rprint status--- filename: {} aminos_read: {} estimated_aminos: ",
                    status.source_name, status.amino_acids_read
                )?;
                match status.estimated_total_aminos {
                    Some(estimate) => write!(f, "{}", estimate),
                    None => write!(f, "unknown"),
                }
            }
            Reply::Pong => write!(f, "/echo"),
            Reply::RemotePong => write!(f, "/recho"),
            Reply::Transport(verb) => write!(f, "/transport {}", verb),
            Reply::TransportStatus(args) => {
                write!(f, "/rprint transport:")?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            Reply::Ack => write!(f, "/ack"),
        }
    }
}

pub struct Session {
    reader: ChromosomeReader,
    conductor: Conductor,
}

impl Session {
    pub fn new(reader: ChromosomeReader, conductor: Conductor) -> Self {
        Self { reader, conductor }
    }

    /// Open a chromosome file with a validated configuration
    pub fn open(path: impl AsRef<Path>, config: ConductorConfig) -> Result<Self> {
        config.validate()?;
        let reader = ChromosomeReader::open(path, config.chunk_size)?;
        Ok(Self::new(reader, Conductor::new(config)))
    }

    pub fn reader(&self) -> &ChromosomeReader {
        &self.reader
    }

    pub fn conductor(&self) -> &Conductor {
        &self.conductor
    }

    /// Decode up to `count` amino acids into the conductor
    ///
    /// Returns how many were actually fed.
    pub fn read(&mut self, count: u32) -> Result<u32> {
        let mut fed = 0;
        while fed < count && self.reader.has_next() {
            match self.reader.next_amino()? {
                Decoded::Amino(aa) => {
                    self.conductor.add_amino(aa);
                    fed += 1;
                }
                Decoded::Exhausted => break,
            }
        }
        Ok(fed)
    }

    /// Apply one command
    pub fn execute(&mut self, command: &Command) -> Result<Reply> {
        debug!(?command, "executing");
        let reply = match command {
            Command::Read(count) => {
                self.read(*count)?;
                Reply::Ready {
                    bases_read: self.reader.bases_read(),
                    amino_acids_read: self.reader.amino_acids_read(),
                }
            }
            Command::Step(step) => Reply::Events(self.conductor.process_step(*step)),
            Command::Density { channel, density } => {
                Reply::Density(self.conductor.set_density(*channel, *density))
            }
            Command::AminoCounts => Reply::Counts(*self.conductor.amino_acid_counts()),
            Command::Reset => {
                info!(source = %self.reader.source_name(), "resetting");
                // the conductor is cleared even if the source cannot rewind
                self.conductor.reset();
                self.reader.reload()?;
                Reply::Ack
            }
            Command::Open(path) => {
                self.reader.load_file(path)?;
                Reply::Ack
            }
            Command::Jump(bases) => {
                self.reader.seek_bases(*bases)?;
                Reply::Ack
            }
            Command::Status => Reply::Status(self.reader.status()),
            Command::Ping => Reply::Pong,
            Command::RemotePing => Reply::RemotePong,
            Command::Transport(args) => Reply::TransportStatus(args.clone()),
            Command::RemoteTransport(verb) => Reply::Transport(*verb),
        };
        Ok(reply)
    }

    /// Apply commands in order, stopping at the first failure
    pub fn run(&mut self, commands: &[Command]) -> Result<Vec<Reply>> {
        commands.iter().map(|c| self.execute(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GroupConfig, GroupOptions, SequenceOptions};
    use crate::control::parser::parse_script;
    use crate::pipeline::SizeClass;

    /// Thresholds 1 / 3 / 5
    fn config() -> ConductorConfig {
        let group = |capacity, size, length_threshold| GroupConfig {
            capacity,
            size,
            length_threshold,
            sequence: SequenceOptions::default(),
            group: GroupOptions::default(),
        };
        ConductorConfig {
            small: group(2, 2, 1),
            medium: group(1, 4, 3),
            large: group(1, 8, 5),
            first_channel: 1,
            chunk_size: 8,
        }
    }

    // ATG (Met) GCC GCC (Ala Ala) TAA (stop): one small chain of length 2
    const GENOME: &str = ">chrTest\nATGGCCGCCTAA\nTTT\n";

    fn session() -> Session {
        let reader = ChromosomeReader::from_text("test", GENOME, 8).unwrap();
        Session::new(reader, Conductor::new(config()))
    }

    #[test]
    fn test_read_feeds_conductor() {
        let mut s = session();
        let reply = s.execute(&Command::Read(4)).unwrap();
        assert_eq!(
            reply,
            Reply::Ready {
                bases_read: 12,
                amino_acids_read: 4
            }
        );
        assert_eq!(s.conductor().group(SizeClass::Small).pending_count(), 1);
    }

    #[test]
    fn test_read_stops_at_exhaustion() {
        let mut s = session();
        assert_eq!(s.read(100).unwrap(), 5);
        assert!(!s.reader().has_next());
        assert_eq!(s.read(1).unwrap(), 0);
    }

    #[test]
    fn test_script_round() {
        let mut s = session();
        let commands = parse_script("/read 4\n/step 0\n/density 1 0\n/step 2\n/ping").unwrap();
        let replies = s.run(&commands).unwrap();

        let Reply::Events(events) = &replies[1] else {
            panic!("expected events, got {:?}", replies[1]);
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].channel, 1);
        assert_eq!(replies[2], Reply::Density(DensityOutcome::Applied));
        assert_eq!(replies[3], Reply::Events(vec![]));
        assert_eq!(replies[4], Reply::Pong);
    }

    #[test]
    fn test_reset_restarts_source_and_conductor() {
        let mut s = session();
        s.execute(&Command::Read(4)).unwrap();
        s.execute(&Command::Step(0)).unwrap();

        assert_eq!(s.execute(&Command::Reset).unwrap(), Reply::Ack);
        assert_eq!(s.reader().amino_acids_read(), 0);
        assert_eq!(s.conductor().group(SizeClass::Small).occupied_count(), 0);
        let Reply::Counts(counts) = s.execute(&Command::AminoCounts).unwrap() else {
            panic!("expected counts");
        };
        assert_eq!(counts.iter().sum::<u64>(), 0);
    }

    #[test]
    fn test_reset_clears_conductor_on_unrewindable_source() {
        // one complete small chain, then a second one left open
        let source = std::io::Cursor::new(b">pipe\nATGGCCGCCTAAATGGCC\n".to_vec());
        let reader = ChromosomeReader::from_reader("pipe", source, 8).unwrap();
        let mut s = Session::new(reader, Conductor::new(config()));
        s.execute(&Command::Read(6)).unwrap();
        s.execute(&Command::Step(0)).unwrap();
        assert_eq!(s.conductor().group(SizeClass::Small).occupied_count(), 1);
        assert!(s.conductor().is_synthesizing());

        let err = s.execute(&Command::Reset).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Reader(crate::error::ReaderError::NotSeekable(_))
        ));
        assert!(!s.conductor().is_synthesizing());
        assert_eq!(s.conductor().group(SizeClass::Small).occupied_count(), 0);
        assert_eq!(s.conductor().amino_acid_counts().iter().sum::<u64>(), 0);
    }

    #[test]
    fn test_ping_and_transport_replies() {
        let mut s = session();
        let commands =
            parse_script("/ping\n/rping\n/transport bar 3\n/rtransport continue").unwrap();
        let replies: Vec<String> = s
            .run(&commands)
            .unwrap()
            .iter()
            .map(Reply::to_string)
            .collect();
        assert_eq!(
            replies,
            vec![
                "/echo",
                "/recho",
                "/rprint transport: bar 3",
                "/transport continue"
            ]
        );
    }

    #[test]
    fn test_counts_and_status_replies() {
        let mut s = session();
        s.execute(&Command::Read(10)).unwrap();
        let counts = s.execute(&Command::AminoCounts).unwrap();
        assert_eq!(
            counts.to_string(),
            "/aminoAcidCounts 2 0 0 0 1 0 0 0 0 0 1 0 0 0 0 0 0 0 0 0"
        );

        let Reply::Status(status) = s.execute(&Command::Status).unwrap() else {
            panic!("expected status");
        };
        assert_eq!(status.source_name, "test");
        assert_eq!(status.amino_acids_read, 5);
        assert!(!status.has_next);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let mut s = session();
        let err = s.execute(&Command::Open("/nonexistent/chr0.fa".into()));
        assert!(err.is_err());
    }

    #[test]
    fn test_events_display() {
        let reply = Reply::Events(vec![NoteEvent {
            channel: 2,
            pitch: 60,
            velocity: 100,
            duration: 1,
        }]);
        assert_eq!(reply.to_string(), "/midi 2 60 100 1");
    }
}
