//! Per-request deployment transcript
//!
//! One ordered text buffer per deployment request. Every pipeline step
//! appends a header line followed by the raw stdout/stderr chunks of its
//! process, in arrival order. The buffer is owned by the request's task
//! and is never shared across requests, so appends need no locking.

/// Append-only transcript of one deployment attempt
#[derive(Debug, Default)]
pub struct Transcript {
    buf: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Append a step header line, e.g. "> Cloning repository..."
    pub fn step(&mut self, header: &str) {
        self.buf.push_str(header);
        self.buf.push('\n');
    }

    /// Append a raw output chunk from a step's process
    pub fn chunk(&mut self, chunk: &str) {
        self.buf.push_str(chunk);
    }

    /// Append a plain line
    pub fn line(&mut self, line: &str) {
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    /// Append the terminal error line
    pub fn error(&mut self, message: &str) {
        self.buf.push_str(&format!("\n> Error: {}\n", message));
    }

    /// Current transcript contents
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the transcript, returning the accumulated text
    pub fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_are_ordered() {
        let mut transcript = Transcript::new();
        transcript.step("> Cloning repository...");
        transcript.chunk("Cloning into 'repo'...\n");
        transcript.step("\n> Installing dependencies...");
        transcript.error("boom");

        let text = transcript.into_string();
        let clone_pos = text.find("> Cloning repository...").unwrap();
        let install_pos = text.find("> Installing dependencies...").unwrap();
        let error_pos = text.find("> Error: boom").unwrap();
        assert!(clone_pos < install_pos);
        assert!(install_pos < error_pos);
    }
}
