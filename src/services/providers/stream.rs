/// Incremental scanner for `text/event-stream` bodies. Bytes arrive in
/// arbitrary chunk boundaries; frames are separated by a blank line and only
/// `data:` lines carry payloads. Partial frames stay buffered until the
/// separator arrives.
#[derive(Debug, Default)]
pub struct SseFrameBuffer {
    buffer: String,
}

impl SseFrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every completed `data:` payload.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(&chunk.replace("\r\n", "\n"));

        let mut payloads = Vec::new();
        while let Some(idx) = self.buffer.find("\n\n") {
            let frame = self.buffer[..idx].to_string();
            self.buffer = self.buffer[idx + 2..].to_string();
            for line in frame.lines() {
                let line = line.trim();
                if let Some(data) = line.strip_prefix("data:") {
                    payloads.push(data.trim().to_string());
                }
            }
        }
        payloads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_frames_on_blank_lines() {
        let mut buf = SseFrameBuffer::new();
        let out = buf.push("data: {\"a\":1}\n\ndata: {\"b\":2}\n\n");
        assert_eq!(out, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn carries_partial_frames_across_chunks() {
        let mut buf = SseFrameBuffer::new();
        assert!(buf.push("data: {\"a\"").is_empty());
        assert!(buf.push(":1}").is_empty());
        let out = buf.push("\n\n");
        assert_eq!(out, vec!["{\"a\":1}"]);
    }

    #[test]
    fn handles_crlf_separators_and_ignores_non_data_lines() {
        let mut buf = SseFrameBuffer::new();
        let out = buf.push("event: message\r\ndata: [DONE]\r\n\r\n");
        assert_eq!(out, vec!["[DONE]"]);
    }

    #[test]
    fn multiple_data_lines_in_one_frame() {
        let mut buf = SseFrameBuffer::new();
        let out = buf.push("data: one\ndata: two\n\n");
        assert_eq!(out, vec!["one", "two"]);
    }
}
