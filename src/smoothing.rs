//! Exponential smoothing of acclimating quantities over irregular time
//! steps.
//!
//! Acclimated capacities (Vcmax, Jmax) track their steady-state targets
//! with a lag; [`ExpAverager`] implements the first-order relaxation
//! `f += (1 - exp(-dt/tau)) (target - f)`, which is exact for a
//! continuous exponential approach sampled at arbitrary intervals. State
//! can be persisted to and restored from a small versioned text record,
//! so a host can checkpoint mid-simulation.

use std::io::{self, BufRead, Write};

use crate::errors::PhydroError;

/// Version tag written at the head of every persisted record.
const FORMAT_TAG: &str = "ExpAverager::v1";

/// Exponentially weighted running average with a fixed timescale.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpAverager {
    t_last: f64,
    f_last: f64,
    tau: f64,
}

impl ExpAverager {
    /// Start an average at time `t0` with initial value `f0` and
    /// relaxation timescale `tau` (same units as the time axis).
    pub fn new(t0: f64, f0: f64, tau: f64) -> Result<Self, PhydroError> {
        if !(tau > 0.0 && tau.is_finite()) {
            return Err(PhydroError::domain(format!(
                "relaxation timescale must be positive, got {tau}"
            )));
        }
        Ok(Self {
            t_last: t0,
            f_last: f0,
            tau,
        })
    }

    /// Relax the average toward `f` over the interval since the previous
    /// update, then advance the clock to `t`.
    ///
    /// A repeated timestamp (`t == t_last`) leaves the average unchanged.
    /// Updating backwards in time inverts the decay and is the caller's
    /// responsibility to avoid.
    pub fn update(&mut self, t: f64, f: f64) {
        let alpha = 1.0 - (-(t - self.t_last) / self.tau).exp();
        self.f_last += alpha * (f - self.f_last);
        self.t_last = t;
    }

    /// Current value of the average.
    pub fn get(&self) -> f64 {
        self.f_last
    }

    /// Persist the full state as a versioned text record.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), PhydroError> {
        writeln!(writer, "{FORMAT_TAG}")?;
        writeln!(writer, "{} {} {}", self.t_last, self.f_last, self.tau)?;
        Ok(())
    }

    /// Restore state from a record produced by [`ExpAverager::save`].
    pub fn restore<R: BufRead>(reader: &mut R) -> Result<Self, PhydroError> {
        let mut tag = String::new();
        if reader.read_line(&mut tag)? == 0 {
            return Err(PhydroError::MalformedState(
                "empty state record".to_string(),
            ));
        }
        let tag = tag.trim_end();
        if tag != FORMAT_TAG {
            return Err(PhydroError::FormatVersionMismatch {
                expected: FORMAT_TAG.to_string(),
                found: tag.to_string(),
            });
        }

        let mut body = String::new();
        reader.read_line(&mut body)?;
        let fields: Vec<f64> = body
            .split_whitespace()
            .map(|s| {
                s.parse::<f64>().map_err(|_| {
                    PhydroError::MalformedState(format!("unparseable field {s:?}"))
                })
            })
            .collect::<Result<_, _>>()?;
        if fields.len() != 3 {
            return Err(PhydroError::MalformedState(format!(
                "expected 3 fields, found {}",
                fields.len()
            )));
        }
        if !(fields[2] > 0.0) {
            return Err(PhydroError::MalformedState(format!(
                "non-positive timescale {}",
                fields[2]
            )));
        }
        Ok(Self {
            t_last: fields[0],
            f_last: fields[1],
            tau: fields[2],
        })
    }
}

/// Convenience: persist straight to any `io::Write` sink behind a path
/// the caller opened; kept separate so save/restore stay stream-based.
impl ExpAverager {
    /// Serialize to an in-memory record.
    pub fn to_record(&self) -> Result<Vec<u8>, PhydroError> {
        let mut buf = Vec::new();
        self.save(&mut buf)?;
        Ok(buf)
    }

    /// Deserialize from an in-memory record.
    pub fn from_record(record: &[u8]) -> Result<Self, PhydroError> {
        let mut cursor = io::Cursor::new(record);
        Self::restore(&mut cursor)
    }
}
