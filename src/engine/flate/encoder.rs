use std::io::Result;

use flate2::{Compress, Crc, FlushCompress, Status};

use super::{footer, header};
use crate::{
    config::{Config, Flush, Framing},
    engine::Encode,
    util::PartialBuffer,
};

#[derive(Debug)]
enum State {
    Header(PartialBuffer<[u8; 10]>),
    Encoding,
    Footer(PartialBuffer<[u8; 8]>),
    Done,
}

/// Deflate compression engine.
///
/// Level, flush mode and framing are taken from the [`Config`] it is created with and stay fixed
/// until [`reinit`](FlateEncoder::reinit).
#[derive(Debug)]
pub struct FlateEncoder {
    compress: Compress,
    crc: Crc,
    state: State,
    config: Config,
    /// A sync or full flush filled the output and has to be continued.
    flushing: bool,
    /// Completed flush output not yet handed out.
    flush_tail: PartialBuffer<Vec<u8>>,
    total_in: u64,
    total_out: u64,
}

impl Default for FlateEncoder {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl FlateEncoder {
    /// Create an engine with the level, flush mode and framing of `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            compress: Compress::new(config.level().into_flate2(), false),
            crc: Crc::new(),
            state: initial_state(config),
            config: *config,
            flushing: false,
            flush_tail: PartialBuffer::default(),
            total_in: 0,
            total_out: 0,
        }
    }

    /// Discard the current stream and rebuild the engine with the settings of `config`.
    pub fn reinit(&mut self, config: &Config) {
        log::debug!(
            "reinitialising deflate encoder: level {}, flush {}, framing {}",
            config.level(),
            config.flush(),
            config.framing()
        );
        *self = Self::new(config);
    }

    fn do_encode(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
        flush: FlushCompress,
    ) -> Result<Status> {
        let prior_in = self.compress.total_in();
        let prior_out = self.compress.total_out();

        let status = self
            .compress
            .compress(input.unwritten(), output.unwritten_mut(), flush)?;

        let in_length = (self.compress.total_in() - prior_in) as usize;
        let out_length = (self.compress.total_out() - prior_out) as usize;

        self.crc.update(&input.unwritten()[..in_length]);
        input.advance(in_length);
        output.advance(out_length);

        Ok(status)
    }

    fn flush_mode(&self) -> FlushCompress {
        match self.config.flush() {
            Flush::None => FlushCompress::None,
            Flush::Sync => FlushCompress::Sync,
            Flush::Full => FlushCompress::Full,
        }
    }

    /// Run an interrupted flush to completion into `flush_tail`.
    ///
    /// Each step gets more than 6 bytes of room, otherwise repeated flushes keep emitting empty
    /// blocks.
    fn complete_flush(&mut self) -> Result<()> {
        let flush = self.flush_mode();
        let mut tail = Vec::new();
        let mut input = PartialBuffer::new(&[][..]);

        loop {
            let start = tail.len();
            tail.resize(start + FLUSH_STEP, 0);
            let mut output = PartialBuffer::new(&mut tail[start..]);
            let status = self.do_encode(&mut input, &mut output, flush)?;
            let produced = output.written().len();
            tail.truncate(start + produced);

            if produced < FLUSH_STEP || status != Status::Ok {
                break;
            }
        }

        log::trace!("completed interrupted flush with {} bytes", tail.len());
        self.flush_tail = PartialBuffer::new(tail);
        self.flushing = false;
        Ok(())
    }

    fn process(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
        end_of_stream: bool,
    ) -> Result<bool> {
        loop {
            match &mut self.state {
                State::Header(header) => {
                    output.copy_unwritten_from(header);
                    if header.unwritten().is_empty() {
                        self.state = State::Encoding;
                    }
                }

                State::Encoding if !self.flush_tail.unwritten().is_empty() => {
                    output.copy_unwritten_from(&mut self.flush_tail);
                    if self.flush_tail.unwritten().is_empty() {
                        self.flush_tail = PartialBuffer::default();
                    }
                }

                State::Encoding => {
                    let flush = if end_of_stream {
                        FlushCompress::Finish
                    } else if !input.unwritten().is_empty() {
                        self.flush_mode()
                    } else if self.flushing {
                        self.complete_flush()?;
                        continue;
                    } else {
                        return Ok(false);
                    };

                    match self.do_encode(input, output, flush)? {
                        Status::StreamEnd => {
                            self.flushing = false;
                            self.state = match self.config.framing() {
                                Framing::Raw => State::Done,
                                Framing::Gzip | Framing::GzipNoHeader => {
                                    State::Footer(PartialBuffer::new(footer(&self.crc)))
                                }
                            };
                        }
                        Status::Ok => {
                            let flushed = matches!(flush, FlushCompress::Sync | FlushCompress::Full);
                            self.flushing = flushed && output.unwritten().is_empty();
                        }
                        Status::BufError => {
                            self.flushing = false;
                            return Ok(false);
                        }
                    }
                }

                State::Footer(footer) => {
                    output.copy_unwritten_from(footer);
                    if footer.unwritten().is_empty() {
                        self.state = State::Done;
                    }
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

const FLUSH_STEP: usize = 64;

fn initial_state(config: &Config) -> State {
    match config.framing() {
        Framing::Gzip => State::Header(PartialBuffer::new(header::encode(config.level()))),
        Framing::Raw | Framing::GzipNoHeader => State::Encoding,
    }
}

impl Encode for FlateEncoder {
    fn encode(
        &mut self,
        input: &mut PartialBuffer<&[u8]>,
        output: &mut PartialBuffer<&mut [u8]>,
        end_of_stream: bool,
    ) -> Result<bool> {
        let prior_in = input.written().len();
        let prior_out = output.written().len();

        let done = self.process(input, output, end_of_stream);

        self.total_in += (input.written().len() - prior_in) as u64;
        self.total_out += (output.written().len() - prior_out) as u64;
        log::trace!(
            "deflate step consumed {} produced {} bytes",
            input.written().len() - prior_in,
            output.written().len() - prior_out
        );

        done
    }

    fn has_pending_output(&self) -> bool {
        self.flushing || !self.flush_tail.unwritten().is_empty()
    }

    fn reset(&mut self) -> Result<()> {
        self.compress.reset();
        self.crc.reset();
        self.state = initial_state(&self.config);
        self.flushing = false;
        self.flush_tail = PartialBuffer::default();
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
