mod flate_codec;

pub use flate_codec::FlateSnapshotCodecAdapter;
