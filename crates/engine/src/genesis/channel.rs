//! Channel registry genesis
//!
//! Legacy section order (`channel0`, `channel1`, ...):
//!
//! 1. next channel sequence
//! 2. channel ends
//! 3. packet acknowledgements
//! 4. packet commitments
//! 5. packet receipts
//! 6. next send sequences
//! 7. next recv sequences
//! 8. next ack sequences

use ibc_snapshot_core::{BincodeCodec, ChannelStore, IdentifiedChannel, PacketSequence, PacketState};
use ibc_snapshot_durability::{SectionReader, SectionWriter, SnapshotResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ensure_identifier, ensure_unique, Subsystem};

const SECTION_CHANNELS: &str = "channels";
const SECTION_ACKS: &str = "acknowledgements";
const SECTION_COMMITMENTS: &str = "commitments";
const SECTION_RECEIPTS: &str = "receipts";
const SECTION_SEND_SEQS: &str = "send sequences";
const SECTION_RECV_SEQS: &str = "recv sequences";
const SECTION_ACK_SEQS: &str = "ack sequences";

/// Genesis state of the channel registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGenesis {
    /// Channel ends in key order
    pub channels: Vec<IdentifiedChannel>,
    /// Packet acknowledgement hashes
    pub acknowledgements: Vec<PacketState>,
    /// Packet commitment hashes
    pub commitments: Vec<PacketState>,
    /// Packet receipts
    pub receipts: Vec<PacketState>,
    /// Next send sequence per channel
    pub send_sequences: Vec<PacketSequence>,
    /// Next recv sequence per channel
    pub recv_sequences: Vec<PacketSequence>,
    /// Next ack sequence per channel
    pub ack_sequences: Vec<PacketSequence>,
    /// Next channel sequence counter
    pub next_channel_sequence: u64,
}

/// The channel registry
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelSubsystem;

fn validate_packets(table: &str, packets: &[PacketState]) -> SnapshotResult<()> {
    for packet in packets {
        ensure_identifier(table, &packet.port_id)?;
        ensure_identifier(table, &packet.channel_id)?;
    }
    ensure_unique(table, packets.iter().map(PacketState::key))
}

fn validate_sequences(table: &str, sequences: &[PacketSequence]) -> SnapshotResult<()> {
    for seq in sequences {
        ensure_identifier(table, &seq.port_id)?;
        ensure_identifier(table, &seq.channel_id)?;
    }
    ensure_unique(
        table,
        sequences
            .iter()
            .map(|s| (s.port_id.as_str(), s.channel_id.as_str())),
    )
}

impl Subsystem for ChannelSubsystem {
    const NAME: &'static str = "channel";
    type Store = dyn ChannelStore;
    type Genesis = ChannelGenesis;

    fn export_genesis(store: &Self::Store) -> SnapshotResult<ChannelGenesis> {
        Ok(ChannelGenesis {
            channels: store.get_all_channels()?,
            acknowledgements: store.get_all_packet_acks()?,
            commitments: store.get_all_packet_commitments()?,
            receipts: store.get_all_packet_receipts()?,
            send_sequences: store.get_all_packet_send_seqs()?,
            recv_sequences: store.get_all_packet_recv_seqs()?,
            ack_sequences: store.get_all_packet_ack_seqs()?,
            next_channel_sequence: store.next_channel_sequence()?,
        })
    }

    fn validate(genesis: &ChannelGenesis) -> SnapshotResult<()> {
        for channel in &genesis.channels {
            ensure_identifier("channel port", &channel.port_id)?;
            ensure_identifier("channel", &channel.channel_id)?;
        }
        ensure_unique(
            "channel",
            genesis
                .channels
                .iter()
                .map(|c| (c.port_id.as_str(), c.channel_id.as_str())),
        )?;

        validate_packets(SECTION_ACKS, &genesis.acknowledgements)?;
        validate_packets(SECTION_COMMITMENTS, &genesis.commitments)?;
        validate_packets(SECTION_RECEIPTS, &genesis.receipts)?;
        validate_sequences(SECTION_SEND_SEQS, &genesis.send_sequences)?;
        validate_sequences(SECTION_RECV_SEQS, &genesis.recv_sequences)?;
        validate_sequences(SECTION_ACK_SEQS, &genesis.ack_sequences)
    }

    fn replay(store: &Self::Store, genesis: &ChannelGenesis) -> SnapshotResult<()> {
        for channel in &genesis.channels {
            store.set_channel(&channel.port_id, &channel.channel_id, &channel.channel)?;
        }
        for ack in &genesis.acknowledgements {
            store.set_packet_acknowledgement(&ack.port_id, &ack.channel_id, ack.sequence, &ack.data)?;
        }
        for commitment in &genesis.commitments {
            store.set_packet_commitment(
                &commitment.port_id,
                &commitment.channel_id,
                commitment.sequence,
                &commitment.data,
            )?;
        }
        for receipt in &genesis.receipts {
            store.set_packet_receipt(&receipt.port_id, &receipt.channel_id, receipt.sequence)?;
        }
        for seq in &genesis.send_sequences {
            store.set_next_sequence_send(&seq.port_id, &seq.channel_id, seq.sequence)?;
        }
        for seq in &genesis.recv_sequences {
            store.set_next_sequence_recv(&seq.port_id, &seq.channel_id, seq.sequence)?;
        }
        for seq in &genesis.ack_sequences {
            store.set_next_sequence_ack(&seq.port_id, &seq.channel_id, seq.sequence)?;
        }
        store.set_next_channel_sequence(genesis.next_channel_sequence)?;

        info!(
            channels = genesis.channels.len(),
            acks = genesis.acknowledgements.len(),
            commitments = genesis.commitments.len(),
            receipts = genesis.receipts.len(),
            next_sequence = genesis.next_channel_sequence,
            "Channel genesis initialized"
        );
        Ok(())
    }

    fn write_sections(genesis: &ChannelGenesis, writer: &mut SectionWriter) -> SnapshotResult<()> {
        writer.write_sequence(genesis.next_channel_sequence)?;
        writer.write_section(SECTION_CHANNELS, &genesis.channels, &BincodeCodec::new())?;
        writer.write_section(SECTION_ACKS, &genesis.acknowledgements, &BincodeCodec::new())?;
        writer.write_section(SECTION_COMMITMENTS, &genesis.commitments, &BincodeCodec::new())?;
        writer.write_section(SECTION_RECEIPTS, &genesis.receipts, &BincodeCodec::new())?;
        writer.write_section(SECTION_SEND_SEQS, &genesis.send_sequences, &BincodeCodec::new())?;
        writer.write_section(SECTION_RECV_SEQS, &genesis.recv_sequences, &BincodeCodec::new())?;
        writer.write_section(SECTION_ACK_SEQS, &genesis.ack_sequences, &BincodeCodec::new())?;
        Ok(())
    }

    fn read_sections(reader: &mut SectionReader) -> SnapshotResult<ChannelGenesis> {
        let codec_packets = BincodeCodec::<PacketState>::new();
        let codec_sequences = BincodeCodec::<PacketSequence>::new();

        let next_channel_sequence = reader.read_sequence()?;
        let channels = reader.read_section(SECTION_CHANNELS, &BincodeCodec::new())?;
        let acknowledgements = reader.read_section(SECTION_ACKS, &codec_packets)?;
        let commitments = reader.read_section(SECTION_COMMITMENTS, &codec_packets)?;
        let receipts = reader.read_section(SECTION_RECEIPTS, &codec_packets)?;
        let send_sequences = reader.read_section(SECTION_SEND_SEQS, &codec_sequences)?;
        let recv_sequences = reader.read_section(SECTION_RECV_SEQS, &codec_sequences)?;
        let ack_sequences = reader.read_section(SECTION_ACK_SEQS, &codec_sequences)?;

        Ok(ChannelGenesis {
            channels,
            acknowledgements,
            commitments,
            receipts,
            send_sequences,
            recv_sequences,
            ack_sequences,
            next_channel_sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibc_snapshot_durability::SnapshotError;
    use ibc_snapshot_storage::{MemoryStore, RECEIPT_MARKER};

    fn genesis() -> ChannelGenesis {
        ChannelGenesis {
            channels: vec![IdentifiedChannel::new("transfer", "channel-0", vec![1; 20])],
            acknowledgements: vec![PacketState::new("transfer", "channel-0", 1, vec![0xaa; 32])],
            commitments: vec![PacketState::new("transfer", "channel-0", 2, vec![0xbb; 32])],
            receipts: vec![PacketState::new(
                "transfer",
                "channel-0",
                1,
                RECEIPT_MARKER.to_vec(),
            )],
            send_sequences: vec![PacketSequence::new("transfer", "channel-0", 3)],
            recv_sequences: vec![PacketSequence::new("transfer", "channel-0", 2)],
            ack_sequences: vec![PacketSequence::new("transfer", "channel-0", 2)],
            next_channel_sequence: 1,
        }
    }

    #[test]
    fn test_init_then_export() {
        let store = MemoryStore::new();
        ChannelSubsystem::init_genesis(&store, &genesis()).unwrap();
        assert_eq!(ChannelSubsystem::export_genesis(&store).unwrap(), genesis());
    }

    #[test]
    fn test_duplicate_commitment_rejected() {
        let mut genesis = genesis();
        genesis.commitments.push(genesis.commitments[0].clone());
        assert!(matches!(
            ChannelSubsystem::validate(&genesis),
            Err(SnapshotError::InvalidGenesis(_))
        ));
    }

    #[test]
    fn test_same_sequence_in_different_tables_is_fine() {
        let mut genesis = genesis();
        genesis
            .commitments
            .push(PacketState::new("transfer", "channel-0", 1, vec![0xcc; 32]));
        assert!(ChannelSubsystem::validate(&genesis).is_ok());
    }
}
