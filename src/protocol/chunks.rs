use crate::apdu::ChunkFlags;

/// Largest payload the device accepts in one packet.
pub(crate) const MAX_CHUNK_LEN: usize = 240;

/// One packet's worth of a multi-packet payload, with its P1 role flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub flags: ChunkFlags,
    pub data: &'a [u8],
}

/// Split a combined header+body payload into packets of at most
/// [`MAX_CHUNK_LEN`] bytes and assign role flags: the first packet gets
/// `HAS_HEADER`, the last gets `IS_LAST`, every other packet `HAS_DATA`.
/// A payload that fits in one packet yields a single
/// `HAS_HEADER | IS_LAST` chunk.
pub fn chunk_payload(data: &[u8]) -> Vec<Chunk<'_>> {
    if data.is_empty() {
        return vec![Chunk {
            flags: ChunkFlags::HAS_HEADER | ChunkFlags::IS_LAST,
            data,
        }];
    }

    let pieces: Vec<&[u8]> = data.chunks(MAX_CHUNK_LEN).collect();
    let last = pieces.len() - 1;

    pieces
        .into_iter()
        .enumerate()
        .map(|(i, piece)| {
            let mut flags = ChunkFlags::empty();
            if i == 0 {
                flags |= ChunkFlags::HAS_HEADER;
            }
            if i == last {
                flags |= ChunkFlags::IS_LAST;
            } else {
                flags |= ChunkFlags::HAS_DATA;
            }
            Chunk { flags, data: piece }
        })
        .collect()
}
