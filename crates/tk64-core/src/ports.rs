//! Conventional I/O ports and the host-side port contract.
//!
//! Port 0 is the input port (one signed decimal integer per read), port 1 is
//! the output port (one unsigned decimal integer per write, no separator).

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Port number of the conventional input port.
pub const INPUT_PORT: u64 = 0;
/// Port number of the conventional output port.
pub const OUTPUT_PORT: u64 = 1;

/// Host port transfer failure.
#[derive(Debug, Error)]
pub enum PortError {
    /// Input was exhausted before a value could be read.
    #[error("end of input")]
    EndOfInput,
    /// The next input token is not a signed 64-bit decimal integer.
    #[error("malformed input value `{0}`")]
    MalformedInput(String),
    /// The underlying stream failed.
    #[error("port stream error: {0}")]
    Io(#[from] io::Error),
}

/// Host port contract consumed by the privileged input/output sub-operations.
pub trait PortIo {
    /// Reads one signed integer from the input port. May block.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when no value can be produced.
    fn read_input(&mut self) -> Result<i64, PortError>;

    /// Writes one unsigned integer to the output port.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the value cannot be delivered.
    fn write_output(&mut self, value: u64) -> Result<(), PortError>;
}

/// Textual ports over any buffered reader and writer.
#[derive(Debug)]
pub struct StreamPorts<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamPorts<R, W> {
    /// Wraps an input reader and an output writer.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns the output writer.
    pub const fn output(&self) -> &W {
        &self.output
    }

    /// Consumes the ports, returning the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn next_token(&mut self) -> Result<String, PortError> {
        let mut token = Vec::new();
        loop {
            let buf = self.input.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            let mut consumed = 0;
            let mut complete = false;
            for &byte in buf {
                if byte.is_ascii_whitespace() {
                    if token.is_empty() {
                        consumed += 1;
                        continue;
                    }
                    complete = true;
                    break;
                }
                token.push(byte);
                consumed += 1;
            }
            self.input.consume(consumed);
            if complete {
                break;
            }
        }
        if token.is_empty() {
            return Err(PortError::EndOfInput);
        }
        String::from_utf8(token).map_err(|err| {
            PortError::MalformedInput(String::from_utf8_lossy(err.as_bytes()).into())
        })
    }
}

impl<R: BufRead, W: Write> PortIo for StreamPorts<R, W> {
    fn read_input(&mut self) -> Result<i64, PortError> {
        let token = self.next_token()?;
        token
            .parse::<i64>()
            .map_err(|_| PortError::MalformedInput(token))
    }

    fn write_output(&mut self, value: u64) -> Result<(), PortError> {
        write!(self.output, "{value}")?;
        self.output.flush()?;
        Ok(())
    }
}
