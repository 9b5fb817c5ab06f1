//! Display-only values shown next to a simulation.
//!
//! Nothing here feeds back into the calculator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const GROUP_NUMBER_MIN: u16 = 1000;
const GROUP_NUMBER_MAX: u16 = 9999;

/// Cosmetic consortium group id shown to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupNumber(u16);

impl GroupNumber {
    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for GroupNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

pub fn draw_group_number<R: Rng + ?Sized>(rng: &mut R) -> GroupNumber {
    GroupNumber(rng.gen_range(GROUP_NUMBER_MIN..=GROUP_NUMBER_MAX))
}
