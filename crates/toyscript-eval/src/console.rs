//! Script-visible input and output streams.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// The reader/writer pair behind `read()` and `print()`.
///
/// Cloning shares the underlying streams.
#[derive(Clone)]
pub struct Console {
    pub(crate) input: Rc<RefCell<dyn BufRead>>,
    pub(crate) output: Rc<RefCell<dyn Write>>,
}

impl Console {
    pub fn new(reader: impl BufRead + 'static, writer: impl Write + 'static) -> Self {
        Self {
            input: Rc::new(RefCell::new(reader)),
            output: Rc::new(RefCell::new(writer)),
        }
    }

    /// Process stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }

    /// Next input line without its terminator, or `None` at end of input.
    pub fn read_line(&self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.borrow_mut().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdio()
    }
}

/// In-memory writer whose clones share one buffer, so a host can hand one
/// clone to a [`Console`] and read what the script printed from another.
#[derive(Clone, Default, Debug)]
pub struct OutputBuffer(Rc<RefCell<Vec<u8>>>);

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
