//! Gzip member header, written in full by the encoder and parsed incrementally by the decoder.

use std::io::{Error, ErrorKind, Result};

use flate2::Crc;

use crate::{config::Level, util::PartialBuffer};

const FHCRC: u8 = 1 << 1;
const FEXTRA: u8 = 1 << 2;
const FNAME: u8 = 1 << 3;
const FCOMMENT: u8 = 1 << 4;
const RESERVED: u8 = 0b1110_0000;

/// Minimal header: no optional fields, no mtime, unknown OS.
pub(crate) fn encode(level: Level) -> [u8; 10] {
    let level_byte = match level {
        Level::Max => 0x02,
        Level::Min => 0x04,
    };

    [0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, level_byte, 0xff]
}

#[derive(Debug)]
enum State {
    Fixed(PartialBuffer<[u8; 10]>),
    ExtraLen(PartialBuffer<[u8; 2]>),
    Extra(usize),
    Filename,
    Comment,
    HeaderCrc(PartialBuffer<[u8; 2]>),
    Done,
}

impl Default for State {
    fn default() -> Self {
        Self::Fixed(PartialBuffer::new([0; 10]))
    }
}

#[derive(Debug, Default)]
pub(crate) struct Parser {
    state: State,
    flags: u8,
    crc: Crc,
}

impl Parser {
    /// Consume header bytes from `input`, returns `Ok(true)` once the whole header was read.
    ///
    /// Bytes after the header are left in `input`.
    pub(crate) fn input(&mut self, input: &mut PartialBuffer<&[u8]>) -> Result<bool> {
        loop {
            match &mut self.state {
                State::Fixed(fixed) => {
                    copy(&mut self.crc, fixed, input);
                    if !fixed.unwritten().is_empty() {
                        return Ok(false);
                    }

                    let fixed = *fixed.get_ref();
                    if fixed[0..2] != [0x1f, 0x8b] {
                        return Err(Error::new(ErrorKind::InvalidData, "Invalid gzip header"));
                    }
                    if fixed[2] != 0x08 {
                        return Err(Error::new(
                            ErrorKind::InvalidData,
                            "unsupported gzip compression method",
                        ));
                    }
                    if fixed[3] & RESERVED != 0 {
                        return Err(Error::new(
                            ErrorKind::InvalidData,
                            "reserved gzip header flags set",
                        ));
                    }

                    self.flags = fixed[3];
                    self.state = State::ExtraLen(PartialBuffer::new([0; 2]));
                }

                State::ExtraLen(len) => {
                    if self.flags & FEXTRA == 0 {
                        self.state = State::Filename;
                        continue;
                    }

                    copy(&mut self.crc, len, input);
                    if !len.unwritten().is_empty() {
                        return Ok(false);
                    }
                    self.state = State::Extra(u16::from_le_bytes(*len.get_ref()).into());
                }

                State::Extra(remaining) => {
                    *remaining -= skip(&mut self.crc, input, *remaining);
                    if *remaining > 0 {
                        return Ok(false);
                    }
                    self.state = State::Filename;
                }

                State::Filename => {
                    if self.flags & FNAME != 0 && !skip_through_nul(&mut self.crc, input) {
                        return Ok(false);
                    }
                    self.state = State::Comment;
                }

                State::Comment => {
                    if self.flags & FCOMMENT != 0 && !skip_through_nul(&mut self.crc, input) {
                        return Ok(false);
                    }
                    self.state = State::HeaderCrc(PartialBuffer::new([0; 2]));
                }

                State::HeaderCrc(crc16) => {
                    if self.flags & FHCRC == 0 {
                        self.state = State::Done;
                        continue;
                    }

                    crc16.copy_unwritten_from(input);
                    if !crc16.unwritten().is_empty() {
                        return Ok(false);
                    }
                    if u32::from(u16::from_le_bytes(*crc16.get_ref())) != self.crc.sum() & 0xffff {
                        return Err(Error::new(
                            ErrorKind::InvalidData,
                            "gzip header CRC does not match",
                        ));
                    }
                    self.state = State::Done;
                }

                State::Done => return Ok(true),
            }
        }
    }
}

fn copy<B: AsRef<[u8]> + AsMut<[u8]>>(
    crc: &mut Crc,
    field: &mut PartialBuffer<B>,
    input: &mut PartialBuffer<&[u8]>,
) {
    let len = field.copy_unwritten_from(input);
    crc.update(&field.written()[field.written().len() - len..]);
}

fn skip(crc: &mut Crc, input: &mut PartialBuffer<&[u8]>, amount: usize) -> usize {
    let len = amount.min(input.unwritten().len());
    crc.update(&input.unwritten()[..len]);
    input.advance(len);
    len
}

/// Skip a zero-terminated field, returns whether the terminator was reached.
fn skip_through_nul(crc: &mut Crc, input: &mut PartialBuffer<&[u8]>) -> bool {
    match memchr::memchr(0, input.unwritten()) {
        Some(index) => {
            skip(crc, input, index + 1);
            true
        }
        None => {
            skip(crc, input, usize::MAX);
            false
        }
    }
}
