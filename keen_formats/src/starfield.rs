//! Decoder for the galaxy-explosion starfield chunk.
//!
//! The chunk stores four parallel little-endian arrays of 4000 entries each:
//! unsigned x positions, signed x velocities, unsigned y positions and signed
//! y velocities. Positions are in 1/128th of a pixel.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

pub const STAR_COUNT: usize = 4000;

/// Size of the chunk payload in bytes.
pub const CHUNK_LEN: usize = STAR_COUNT * 2 * 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Star {
    pub x: u16,
    pub dx: i16,
    pub y: u16,
    pub dy: i16,
}

#[derive(Debug, Error)]
pub enum StarfieldError {
    #[error("starfield chunk holds {actual} bytes, expected {CHUNK_LEN}")]
    Truncated { actual: usize },
    #[error("reading starfield chunk: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarField {
    stars: Vec<Star>,
}

impl StarField {
    pub fn from_stars(stars: Vec<Star>) -> Self {
        StarField { stars }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StarfieldError> {
        if bytes.len() < CHUNK_LEN {
            return Err(StarfieldError::Truncated {
                actual: bytes.len(),
            });
        }
        let mut cursor = Cursor::new(bytes);
        let xs = read_u16s(&mut cursor)?;
        let dxs = read_i16s(&mut cursor)?;
        let ys = read_u16s(&mut cursor)?;
        let dys = read_i16s(&mut cursor)?;

        let stars = (0..STAR_COUNT)
            .map(|i| Star {
                x: xs[i],
                dx: dxs[i],
                y: ys[i],
                dy: dys[i],
            })
            .collect();
        Ok(StarField { stars })
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn stars_mut(&mut self) -> &mut [Star] {
        &mut self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

fn read_u16s<R: Read>(reader: &mut R) -> Result<Vec<u16>, StarfieldError> {
    let mut values = vec![0u16; STAR_COUNT];
    reader.read_u16_into::<LittleEndian>(&mut values)?;
    Ok(values)
}

fn read_i16s<R: Read>(reader: &mut R) -> Result<Vec<i16>, StarfieldError> {
    let mut values = vec![0i16; STAR_COUNT];
    reader.read_i16_into::<LittleEndian>(&mut values)?;
    Ok(values)
}
