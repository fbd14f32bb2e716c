//! Line protocol spoken with the game referee.
//!
//! Each turn arrives as a block of whitespace-separated integers:
//!
//! ```text
//! x y
//! dataCount
//! dataId dataX dataY      (dataCount lines)
//! enemyCount
//! enemyId enemyX enemyY enemyLife      (enemyCount lines)
//! ```
//!
//! and is answered with exactly one `MOVE x y` or `SHOOT id` line.

use std::io::{self, BufRead, Write};

use accountant_core::{Action, DataPoint, DataPointId, Enemy, EnemyId, Point, TurnSnapshot};
use thiserror::Error;

/// Errors raised while reading a turn block.
#[derive(Debug, Error)]
pub(crate) enum ProtocolError {
    /// The underlying stream failed.
    #[error("could not read turn input: {0}")]
    Io(#[from] io::Error),
    /// Input ended in the middle of a turn block.
    #[error("input ended while reading {0}")]
    Truncated(&'static str),
    /// A line did not hold the expected number of fields.
    #[error("expected {expected} fields for {field}, found `{line}`")]
    FieldCount {
        /// Which part of the turn block was being read.
        field: &'static str,
        /// Number of integers the line should contain.
        expected: usize,
        /// Offending line.
        line: String,
    },
    /// A token was not an integer of the expected range.
    #[error("invalid {field} `{token}`")]
    InvalidNumber {
        /// Which part of the turn block was being read.
        field: &'static str,
        /// Offending token.
        token: String,
    },
}

/// Reads turn blocks from a buffered stream.
#[derive(Debug)]
pub(crate) struct TurnReader<R> {
    input: R,
    line: String,
}

impl<R: BufRead> TurnReader<R> {
    /// Wraps the provided stream.
    pub(crate) fn new(input: R) -> Self {
        Self {
            input,
            line: String::new(),
        }
    }

    /// Reads the next turn, or `Ok(None)` when the stream ends cleanly
    /// before a new block starts.
    pub(crate) fn next_turn(&mut self) -> Result<Option<TurnSnapshot>, ProtocolError> {
        let Some(defender) = self.next_line()? else {
            return Ok(None);
        };
        let [x, y] = parse_fields::<2>(&defender, "defender position")?;
        let defender = Point::new(x, y);

        let data_count = self.count("data point count")?;
        let mut data_points = Vec::new();
        for _ in 0..data_count {
            let line = self.required_line("data point")?;
            let [id, x, y] = parse_fields::<3>(&line, "data point")?;
            data_points.push(DataPoint::new(
                DataPointId::new(identifier(id, "data point id")?),
                Point::new(x, y),
            ));
        }

        let enemy_count = self.count("enemy count")?;
        let mut enemies = Vec::new();
        for _ in 0..enemy_count {
            let line = self.required_line("enemy")?;
            let [id, x, y, life] = parse_fields::<4>(&line, "enemy")?;
            enemies.push(Enemy::new(
                EnemyId::new(identifier(id, "enemy id")?),
                Point::new(x, y),
                life,
            ));
        }

        Ok(Some(TurnSnapshot {
            defender,
            data_points,
            enemies,
        }))
    }

    fn count(&mut self, field: &'static str) -> Result<usize, ProtocolError> {
        let line = self.required_line(field)?;
        let [count] = parse_fields::<1>(&line, field)?;
        usize::try_from(count).map_err(|_| ProtocolError::InvalidNumber {
            field,
            token: count.to_string(),
        })
    }

    fn required_line(&mut self, field: &'static str) -> Result<String, ProtocolError> {
        self.next_line()?.ok_or(ProtocolError::Truncated(field))
    }

    /// Next non-blank line with surrounding whitespace removed.
    fn next_line(&mut self) -> Result<Option<String>, ProtocolError> {
        loop {
            self.line.clear();
            if self.input.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let trimmed = self.line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_owned()));
            }
        }
    }
}

/// Writes one action line and flushes so the referee sees it immediately.
pub(crate) fn write_action<W: Write>(output: &mut W, action: Action) -> io::Result<()> {
    writeln!(output, "{action}")?;
    output.flush()
}

fn parse_fields<const N: usize>(
    line: &str,
    field: &'static str,
) -> Result<[i32; N], ProtocolError> {
    let mut values = [0; N];
    let mut tokens = line.split_whitespace();
    for value in &mut values {
        let token = tokens.next().ok_or_else(|| ProtocolError::FieldCount {
            field,
            expected: N,
            line: line.to_owned(),
        })?;
        *value = token.parse().map_err(|_| ProtocolError::InvalidNumber {
            field,
            token: token.to_owned(),
        })?;
    }
    if tokens.next().is_some() {
        return Err(ProtocolError::FieldCount {
            field,
            expected: N,
            line: line.to_owned(),
        });
    }
    Ok(values)
}

fn identifier(value: i32, field: &'static str) -> Result<u32, ProtocolError> {
    u32::try_from(value).map_err(|_| ProtocolError::InvalidNumber {
        field,
        token: value.to_string(),
    })
}
