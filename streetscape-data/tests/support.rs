//! Builders for tiny OSM PBF files written to temporary paths.
//!
//! Blocks are stored uncompressed (`Blob.raw`) and hand-encoded from the
//! `fileformat.proto` and `osmformat.proto` message layouts, so the tests
//! need no binary fixtures.

use camino::Utf8PathBuf;
use std::io::Write;
use tempfile::{Builder, TempPath};

const GRANULARITY: i64 = 100;

/// A node to encode, in WGS84 degrees.
pub struct PbfNode {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
    pub tags: &'static [(&'static str, &'static str)],
}

/// A way to encode.
pub struct PbfWay {
    pub id: i64,
    pub refs: &'static [i64],
    pub tags: &'static [(&'static str, &'static str)],
}

#[derive(Default)]
struct Message(Vec<u8>);

impl Message {
    fn raw_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.0.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.0.push(value as u8);
    }

    fn key(&mut self, field: u32, wire_type: u8) {
        self.raw_varint(u64::from(field) << 3 | u64::from(wire_type));
    }

    fn varint(&mut self, field: u32, value: u64) -> &mut Self {
        self.key(field, 0);
        self.raw_varint(value);
        self
    }

    fn sint(&mut self, field: u32, value: i64) -> &mut Self {
        self.varint(field, zigzag(value))
    }

    fn bytes(&mut self, field: u32, value: &[u8]) -> &mut Self {
        self.key(field, 2);
        self.raw_varint(value.len() as u64);
        self.0.extend_from_slice(value);
        self
    }

    fn packed(&mut self, field: u32, values: impl IntoIterator<Item = u64>) -> &mut Self {
        let mut inner = Self::default();
        for value in values {
            inner.raw_varint(value);
        }
        self.bytes(field, &inner.0)
    }
}

const fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

fn degrees(value: f64) -> i64 {
    (value * 1e9 / GRANULARITY as f64).round() as i64
}

#[derive(Default)]
struct StringTable(Vec<&'static str>);

impl StringTable {
    fn index(&mut self, value: &'static str) -> u64 {
        if self.0.is_empty() {
            self.0.push("");
        }
        let position = self.0.iter().position(|s| *s == value).unwrap_or_else(|| {
            self.0.push(value);
            self.0.len() - 1
        });
        position as u64
    }

    fn encode(&self) -> Vec<u8> {
        let mut table = Message::default();
        for value in &self.0 {
            table.bytes(1, value.as_bytes());
        }
        table.0
    }
}

fn tag_indices(
    strings: &mut StringTable,
    tags: &[(&'static str, &'static str)],
) -> (Vec<u64>, Vec<u64>) {
    tags.iter()
        .map(|(k, v)| (strings.index(k), strings.index(v)))
        .unzip()
}

fn node_block(nodes: &[PbfNode]) -> Vec<u8> {
    let mut strings = StringTable::default();
    let mut group = Message::default();
    for node in nodes {
        let (keys, vals) = tag_indices(&mut strings, node.tags);
        let mut encoded = Message::default();
        encoded
            .sint(1, node.id)
            .packed(2, keys)
            .packed(3, vals)
            .sint(8, degrees(node.lat))
            .sint(9, degrees(node.lon));
        group.bytes(1, &encoded.0);
    }
    primitive_block(&strings, &group)
}

fn way_block(ways: &[PbfWay]) -> Vec<u8> {
    let mut strings = StringTable::default();
    let mut group = Message::default();
    for way in ways {
        let (keys, vals) = tag_indices(&mut strings, way.tags);
        let deltas = way
            .refs
            .iter()
            .scan(0_i64, |last, id| {
                let delta = id - *last;
                *last = *id;
                Some(zigzag(delta))
            })
            .collect::<Vec<_>>();
        let mut encoded = Message::default();
        encoded
            .varint(1, way.id as u64)
            .packed(2, keys)
            .packed(3, vals)
            .packed(8, deltas);
        group.bytes(3, &encoded.0);
    }
    primitive_block(&strings, &group)
}

fn primitive_block(strings: &StringTable, group: &Message) -> Vec<u8> {
    let mut block = Message::default();
    block
        .bytes(1, &strings.encode())
        .bytes(2, &group.0)
        .varint(17, GRANULARITY as u64);
    block.0
}

fn header_block() -> Vec<u8> {
    let mut header = Message::default();
    header.bytes(4, b"OsmSchema-V0.6");
    header.0
}

fn write_blob(out: &mut Vec<u8>, kind: &str, payload: &[u8]) {
    let mut blob = Message::default();
    blob.bytes(1, payload).varint(2, payload.len() as u64);
    let mut header = Message::default();
    header
        .bytes(1, kind.as_bytes())
        .varint(3, blob.0.len() as u64);
    let length = u32::try_from(header.0.len()).expect("small header");
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&header.0);
    out.extend_from_slice(&blob.0);
}

fn persist(stem: &str, bytes: &[u8]) -> TempPath {
    let mut file = Builder::new()
        .prefix(stem)
        .suffix(".osm.pbf")
        .tempfile()
        .unwrap_or_else(|err| panic!("failed to create temporary file for {stem}: {err}"));
    file.write_all(bytes)
        .unwrap_or_else(|err| panic!("failed to write {stem}: {err}"));
    file.flush()
        .unwrap_or_else(|err| panic!("failed to flush {stem}: {err}"));
    file.into_temp_path()
}

/// Encode a PBF file with the ways block written before the nodes block.
pub fn write_pbf(stem: &str, nodes: &[PbfNode], ways: &[PbfWay]) -> TempPath {
    let mut out = Vec::new();
    write_blob(&mut out, "OSMHeader", &header_block());
    if !ways.is_empty() {
        write_blob(&mut out, "OSMData", &way_block(ways));
    }
    if !nodes.is_empty() {
        write_blob(&mut out, "OSMData", &node_block(nodes));
    }
    persist(stem, &out)
}

/// A file whose first bytes announce an impossibly large blob header.
pub fn write_garbage(stem: &str) -> TempPath {
    persist(stem, b"not a protocol buffer at all")
}

/// UTF-8 view of a temporary path.
pub fn utf8(path: &TempPath) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("temporary paths are UTF-8")
}

/// Compare floating-point coordinates within a small epsilon.
pub fn assert_close(actual: f64, expected: f64) {
    let delta = (actual - expected).abs();
    assert!(delta <= 1.0e-7, "expected {expected}, got {actual} (|Δ| = {delta})");
}
