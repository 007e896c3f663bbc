use crate::domain::operation::Operation;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Ok,
    Error,
}

/// One line of the dispatch report.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct DispatchResult {
    /// 1-based position of the request in the input.
    pub row: usize,
    pub op: Operation,
    pub outcome: Outcome,
    pub transaction_id: Option<String>,
    pub provider: Option<String>,
    pub error: Option<String>,
}

/// Writes dispatch results as CSV, header first.
pub struct ResultWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, result: &DispatchResult) -> Result<()> {
        self.writer.serialize(result)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_header_and_empty_optionals() {
        let mut buf = Vec::new();
        {
            let mut writer = ResultWriter::new(&mut buf);
            writer
                .write(&DispatchResult {
                    row: 1,
                    op: Operation::Charge,
                    outcome: Outcome::Ok,
                    transaction_id: Some("dummy-1".into()),
                    provider: Some("dummy".into()),
                    error: None,
                })
                .unwrap();
            writer
                .write(&DispatchResult {
                    row: 2,
                    op: Operation::Void,
                    outcome: Outcome::Error,
                    transaction_id: None,
                    provider: None,
                    error: Some("missing required field transaction.transaction_id".into()),
                })
                .unwrap();
            writer.flush().unwrap();
        }

        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "row,op,outcome,transaction_id,provider,error");
        assert_eq!(lines[1], "1,charge,ok,dummy-1,dummy,");
        assert_eq!(
            lines[2],
            "2,void,error,,,missing required field transaction.transaction_id"
        );
    }
}
