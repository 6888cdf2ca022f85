use std::io::{self, Write};
use std::time::Duration;

/// Destination for sampled pair results and the final summary of a run.
pub trait SampleSink {
    fn record_sample(&mut self, sequence: u64, raw_dot: f64, energy: f64) -> io::Result<()>;

    fn record_summary(&mut self, total: f64, elapsed: Duration, steps: u64) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes the tab-separated sample log followed by a single summary line:
///
/// ```text
/// <sequence>\t<rawDot>\t<energy>
/// energy <total> Time <elapsed> Step <count>
/// ```
pub struct ReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SampleSink for ReportWriter<W> {
    fn record_sample(&mut self, sequence: u64, raw_dot: f64, energy: f64) -> io::Result<()> {
        writeln!(
            self.writer,
            "{}\t{}\t{}",
            sequence,
            scientific(raw_dot),
            scientific(energy)
        )
    }

    fn record_summary(&mut self, total: f64, elapsed: Duration, steps: u64) -> io::Result<()> {
        writeln!(
            self.writer,
            "energy {:e} Time {:?} Step {}",
            total, elapsed, steps
        )
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Six-digit mantissa with a signed, at least two-digit exponent (`-1.000000e+00`).
/// Non-finite values keep their plain `Display` form.
fn scientific(value: f64) -> String {
    let formatted = format!("{:.6e}", value);
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    match exponent.parse::<i32>() {
        Ok(exp) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
        }
        Err(_) => formatted,
    }
}
