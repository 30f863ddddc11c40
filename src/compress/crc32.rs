//! CRC-32 checksum as used by PNG chunks (CRC-32/ISO-HDLC).
//!
//! Every chunk this crate writes carries a CRC computed here over the chunk
//! type followed by its payload. There is no code path that emits a
//! placeholder checksum.

/// Reflected form of the polynomial 0x04C11DB7.
const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Slicing-by-8 lookup tables, built on first use.
static CRC_TABLES: std::sync::LazyLock<[[u32; 256]; 8]> = std::sync::LazyLock::new(|| {
    let mut tables = [[0u32; 256]; 8];

    for (i, entry) in tables[0].iter_mut().enumerate() {
        let mut crc = i as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLYNOMIAL
            } else {
                crc >> 1
            };
        }
        *entry = crc;
    }

    for t in 1..8 {
        for i in 0..256 {
            let prev = tables[t - 1][i];
            tables[t][i] = (prev >> 8) ^ tables[0][(prev & 0xFF) as usize];
        }
    }

    tables
});

/// Compute the CRC-32 of `data` in one call.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(data);
    crc.finalize()
}

/// CRC of a PNG chunk: computed over the 4-byte type followed by the payload.
#[inline]
pub fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(chunk_type);
    crc.update(data);
    crc.finalize()
}

/// Incremental CRC-32 hasher.
#[derive(Debug, Clone)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    /// Create a new CRC32 calculator.
    pub fn new() -> Self {
        Self { crc: 0xFFFF_FFFF }
    }

    /// Feed more bytes into the checksum.
    pub fn update(&mut self, data: &[u8]) {
        let tables = &*CRC_TABLES;
        let mut crc = self.crc;

        // Process 8 bytes at a time using slicing-by-8.
        let mut chunks = data.chunks_exact(8);
        for chunk in &mut chunks {
            let low = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) ^ crc;
            let high = u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);

            crc = tables[7][(low & 0xFF) as usize]
                ^ tables[6][((low >> 8) & 0xFF) as usize]
                ^ tables[5][((low >> 16) & 0xFF) as usize]
                ^ tables[4][(low >> 24) as usize]
                ^ tables[3][(high & 0xFF) as usize]
                ^ tables[2][((high >> 8) & 0xFF) as usize]
                ^ tables[1][((high >> 16) & 0xFF) as usize]
                ^ tables[0][(high >> 24) as usize];
        }

        for &b in chunks.remainder() {
            crc = (crc >> 8) ^ tables[0][((crc ^ b as u32) & 0xFF) as usize];
        }

        self.crc = crc;
    }

    /// Finalize and return the CRC value.
    #[inline]
    pub fn finalize(self) -> u32 {
        self.crc ^ 0xFFFF_FFFF
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}
