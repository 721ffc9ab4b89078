use std::io::{Error, ErrorKind, Result};

use flate2::{Crc, Decompress, FlushDecompress, Status};

use super::{footer, header};
use crate::{config::Framing, engine::Decode, util::PartialBuffer};

#[derive(Debug)]
enum State {
    Header(header::Parser),
    Decoding,
    Footer(PartialBuffer<[u8; 8]>),
    Done,
}

/// Deflate decompression engine.
///
/// Decodes exactly one member; anything after it is left unconsumed in the input.
#[derive(Debug)]
pub struct FlateDecoder {
    decompress: Decompress,
    crc: Crc,
    state: State,
    framing: Framing,
    total_in: u64,
    total_out: u64,
}

impl Default for FlateDecoder {
    fn default() -> Self {
        Self::new(Framing::default())
    }
}

impl FlateDecoder {
    /// Create an engine expecting data in the given framing.
    pub fn new(framing: Framing) -> Self {
        Self {
            decompress: Decompress::new(false),
            crc: Crc::new(),
            state: initial_state(framing),
            framing,
            total_in: 0,
            total_out: 0,
        }
    }

    fn do_decode(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
    ) -> Result<Status> {
        let prior_in = self.decompress.total_in();
        let prior_out = self.decompress.total_out();

        let status =
            self.decompress
                .decompress(input.unwritten(), output.unwritten_mut(), FlushDecompress::None)?;

        let in_length = (self.decompress.total_in() - prior_in) as usize;
        let out_length = (self.decompress.total_out() - prior_out) as usize;

        self.crc.update(&output.unwritten()[..out_length]);
        input.advance(in_length);
        output.advance(out_length);

        if in_length == 0 && out_length == 0 && status == Status::Ok {
            return Ok(Status::BufError);
        }

        Ok(status)
    }

    fn process(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
    ) -> Result<bool> {
        loop {
            match &mut self.state {
                State::Header(parser) => {
                    if !parser.input(input)? {
                        return Ok(false);
                    }
                    self.state = State::Decoding;
                }

                State::Decoding => match self.do_decode(input, output)? {
                    Status::StreamEnd => {
                        self.state = match self.framing {
                            Framing::Raw => State::Done,
                            Framing::Gzip | Framing::GzipNoHeader => {
                                State::Footer(PartialBuffer::new([0; 8]))
                            }
                        };
                    }
                    Status::Ok => {}
                    Status::BufError => return Ok(false),
                },

                State::Footer(trailer) => {
                    trailer.copy_unwritten_from(input);
                    if !trailer.unwritten().is_empty() {
                        return Ok(false);
                    }
                    check_footer(&self.crc, trailer.get_ref())?;
                    self.state = State::Done;
                }

                State::Done => return Ok(true),
            }

            if let State::Done = self.state {
                return Ok(true);
            }

            if output.unwritten().is_empty() {
                return Ok(false);
            }
        }
    }
}

fn initial_state(framing: Framing) -> State {
    match framing {
        Framing::Gzip => State::Header(header::Parser::default()),
        Framing::Raw | Framing::GzipNoHeader => State::Decoding,
    }
}

fn check_footer(crc: &Crc, input: &[u8; 8]) -> Result<()> {
    let expected = footer(crc);

    if expected[0..4] != input[0..4] {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "CRC computed does not match",
        ));
    }

    if expected[4..8] != input[4..8] {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "amount of bytes read does not match",
        ));
    }

    Ok(())
}

impl Decode for FlateDecoder {
    fn decode(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
    ) -> Result<bool> {
        let prior_in = input.written().len();
        let prior_out = output.written().len();

        let done = self.process(input, output);

        self.total_in += (input.written().len() - prior_in) as u64;
        self.total_out += (output.written().len() - prior_out) as u64;
        log::trace!(
            "inflate step consumed {} produced {} bytes",
            input.written().len() - prior_in,
            output.written().len() - prior_out
        );

        done
    }

    fn reset(&mut self) -> Result<()> {
        self.decompress.reset(false);
        self.crc.reset();
        self.state = initial_state(self.framing);
        self.total_in = 0;
        self.total_out = 0;
        Ok(())
    }

    fn total_in(&self) -> u64 {
        self.total_in
    }

    fn total_out(&self) -> u64 {
        self.total_out
    }
}
