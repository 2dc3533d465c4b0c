//! JSON-lines output channel

use std::io::Write;

use serde::Serialize;

use lv_connector::dispatch::StdOutput;
use lv_connector::error::{ConnectorError, ConnectorResult};
use lv_connector::traits::ResultSink;

/// Writes each streamed record as one JSON document per line.
pub struct JsonLineSink<W> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of records sent so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Serialize one value and terminate it with a newline.
    pub fn write_line<T: Serialize>(&mut self, value: &T) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ResultSink<StdOutput> for JsonLineSink<W> {
    fn send(&mut self, item: StdOutput) -> ConnectorResult<()> {
        self.write_line(&item)
            .map_err(|e| ConnectorError::internal(format!("failed to write output: {e}")))?;
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lv_connector::dispatch::TestConnectionOutput;
    use lv_connector::operation::AttributeSet;
    use lv_connector::record::AccountRecord;

    #[test]
    fn test_one_line_per_record() {
        let mut sink = JsonLineSink::new(Vec::new());

        sink.send(StdOutput::TestConnection(TestConnectionOutput::default()))
            .unwrap();
        sink.send(StdOutput::Account(AccountRecord {
            identity: "7".into(),
            uuid: "jdoe".into(),
            disabled: false,
            locked: false,
            attributes: AttributeSet::new().with("user_id", "7"),
        }))
        .unwrap();

        assert_eq!(sink.written(), 2);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "{}");

        let account: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(account["identity"], "7");
        assert_eq!(account["attributes"]["user_id"], "7");
    }
}
