//! Durable destination for iteration records.

use std::io::{self, Write};

use crate::record::{IterationRecord, RunOutcome, RunSummary};

/// Where the per-iteration records end up.
///
/// Opened once at run start by its owner, appended in iteration order,
/// closed once at run end.
pub trait RecordSink {
    /// Appends one iteration record.
    fn append(&mut self, record: &IterationRecord) -> io::Result<()>;

    /// Appends the trailer explaining why the run ended and flushes.
    fn finish(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Plain-text sink over any writer.
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    /// Wraps `out` and writes the run header.
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "distributed linear regression, synchronous gradient descent")?;
        Ok(Self { out })
    }

    /// Consumes the sink, handing back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for TextSink<W> {
    fn append(&mut self, record: &IterationRecord) -> io::Result<()> {
        writeln!(self.out, "iteration {}", record.index)?;

        if record.converged {
            writeln!(self.out, "one of the worker nodes has converged")?;
        } else {
            writeln!(self.out, "weights: {:?}", record.weights)?;
            if let Some(total_error) = record.total_error {
                writeln!(self.out, "total error: {total_error}")?;
            }
        }

        writeln!(self.out)
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        match summary.outcome {
            RunOutcome::IterationLimit => writeln!(
                self.out,
                "run ended: iteration limit reached after {} iterations",
                summary.iterations
            ),
            RunOutcome::Converged { iteration } => writeln!(
                self.out,
                "run ended: convergence detected at iteration {iteration}"
            ),
        }?;

        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_records_and_trailer() {
        let mut sink = TextSink::new(Vec::new()).unwrap();

        sink.append(&IterationRecord {
            index: 0,
            weights: vec![1.0, 1.0],
            total_error: Some(2.0),
            converged: false,
        })
        .unwrap();
        sink.append(&IterationRecord {
            index: 1,
            weights: vec![f32::NAN, 1.0],
            total_error: None,
            converged: true,
        })
        .unwrap();
        sink.finish(&RunSummary {
            iterations: 2,
            outcome: RunOutcome::Converged { iteration: 1 },
        })
        .unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains("iteration 0\nweights: [1.0, 1.0]\ntotal error: 2\n"));
        assert!(text.contains("iteration 1\none of the worker nodes has converged\n"));
        assert!(text.contains("run ended: convergence detected at iteration 1"));
    }
}
