use std::fmt::Write;

use crate::{numeric, MetricError, Result};

/// Streaming JSON writer over a string buffer. Tracks commas per nesting level so callers only
/// describe structure.
pub struct JsonRender<'a> {
    buf: &'a mut String,
    first: Vec<bool>,
    after_key: bool,
}

impl<'a> JsonRender<'a> {
    pub fn new(buf: &'a mut String) -> JsonRender<'a> {
        JsonRender {
            buf,
            first: Vec::new(),
            after_key: false,
        }
    }

    fn separator(&mut self) {
        if self.after_key {
            self.after_key = false;
            return;
        }

        if let Some(first) = self.first.last_mut() {
            if !*first {
                self.buf.push(',');
            }
            *first = false;
        }
    }

    fn open(&mut self, c: char) {
        self.separator();
        self.buf.push(c);
        self.first.push(true);
    }

    fn close(&mut self, c: char) {
        self.first.pop();
        self.buf.push(c);
    }

    pub fn map_open(&mut self) {
        self.open('{');
    }

    pub fn map_close(&mut self) {
        self.close('}');
    }

    pub fn array_open(&mut self) {
        self.open('[');
    }

    pub fn array_close(&mut self) {
        self.close(']');
    }

    fn quoted(&mut self, s: &str) -> Result<()> {
        let quoted = serde_json::to_string(s).map_err(|e| MetricError::invalid(e.to_string()))?;
        self.buf.push_str(&quoted);
        Ok(())
    }

    pub fn key(&mut self, key: &str) -> Result<()> {
        self.separator();
        self.quoted(key)?;
        self.buf.push(':');
        self.after_key = true;
        Ok(())
    }

    pub fn string(&mut self, s: &str) -> Result<()> {
        self.separator();
        self.quoted(s)
    }

    pub fn key_string(&mut self, key: &str, s: &str) -> Result<()> {
        self.key(key)?;
        self.string(s)
    }

    /// Numbers are spelled the way the numeric formatter spells them, including `inf` and `nan`.
    pub fn double(&mut self, x: f64) {
        self.separator();
        numeric::write(self.buf, x);
    }

    pub fn uint(&mut self, u: u64) {
        self.separator();
        let _ = write!(self.buf, "{}", u);
    }

    pub fn boolean(&mut self, b: bool) {
        self.separator();
        self.buf.push_str(if b { "true" } else { "false" });
    }
}
