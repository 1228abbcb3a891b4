//! Accuracy reporting against gold labels

use apex_core::Finding;
use serde::Serialize;
use std::fmt;

/// Confusion counts and prevalence for one detector
///
/// A result of 1 or more is positive, -1 is negative and 0 is neutral;
/// anything else is counted as unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Reporter {
    pub tp: u32,
    pub fp: u32,
    #[serde(rename = "fn")]
    pub fn_: u32,
    pub tn: u32,
    /// Positive result that disagrees with a different positive label
    pub error: u32,
    pub pos: u32,
    pub neg: u32,
    pub neutral: u32,
    pub unk: u32,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, finding: &Finding) {
        let expected = finding.expected;
        match finding.result {
            r if r >= 1 => {
                self.pos += 1;
                match expected {
                    Some(e) if e == r => self.tp += 1,
                    Some(-1) => self.fp += 1,
                    Some(_) => self.error += 1,
                    None => {}
                }
            }
            -1 => {
                self.neg += 1;
                match expected {
                    Some(1) => self.fn_ += 1,
                    Some(-1) => self.tn += 1,
                    _ => {}
                }
            }
            0 => {
                self.neutral += 1;
                match expected {
                    Some(0) => self.tp += 1,
                    Some(-1) => self.fp += 1,
                    _ => {}
                }
            }
            _ => self.unk += 1,
        }
    }

    /// Documents counted
    pub fn total(&self) -> u32 {
        self.pos + self.neg + self.neutral + self.unk
    }
}

impl fmt::Display for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}-{} ({})/{}-{}]:{}+{}/{}:{}",
            self.tp, self.fp, self.error, self.fn_, self.tn, self.pos, self.neutral, self.neg, self.unk
        )
    }
}
