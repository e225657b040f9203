//! Bounded buffer receiving `print` output

/// Default output capacity (1 MiB)
pub const DEFAULT_OUTPUT_CAPACITY: usize = 1024 * 1024;

/// Newline-terminated program output, capped at a fixed size.
///
/// A line that does not fit is dropped whole and the buffer is flagged as
/// truncated; later lines that fit are still kept.
///
/// # Examples
///
/// ```
/// use interpreter::OutputBuffer;
///
/// let mut out = OutputBuffer::with_capacity(8);
/// out.write_line("hello");
/// out.write_line("world");
/// assert_eq!(out.as_str(), "hello\n");
/// assert!(out.truncated());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBuffer {
    text: String,
    capacity: usize,
    truncated: bool,
}

impl OutputBuffer {
    /// Create a buffer holding at most `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::new(),
            capacity,
            truncated: false,
        }
    }

    /// Append `line` followed by a newline
    pub fn write_line(&mut self, line: &str) {
        if self.text.len() + line.len() + 1 > self.capacity {
            self.truncated = true;
            return;
        }
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// Everything written so far
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Take the contents, leaving the buffer empty and untruncated
    pub fn take(&mut self) -> String {
        self.truncated = false;
        std::mem::take(&mut self.text)
    }

    /// Whether any line was dropped
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Maximum size in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently held
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_CAPACITY)
    }
}
