//! In-memory output sink

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// A cloneable `Write` target that collects program output in memory.
///
/// Hand one clone to an interpreter and keep the other to read what the
/// program printed.
///
/// # Example
///
/// ```
/// use lox::{Session, SharedOutput};
///
/// let out = SharedOutput::new();
/// let mut session = Session::with_output(out.clone());
/// session.run("print 1 + 2;").unwrap();
/// assert_eq!(out.contents(), "3\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Take everything written so far, leaving the buffer empty.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_contents() {
        let out = SharedOutput::new();
        let mut writer = out.clone();
        writeln!(writer, "hello").unwrap();
        assert_eq!(out.contents(), "hello\n");
    }

    #[test]
    fn test_take_empties() {
        let mut out = SharedOutput::new();
        write!(out, "abc").unwrap();
        assert_eq!(out.take(), "abc");
        assert_eq!(out.contents(), "");
    }
}
