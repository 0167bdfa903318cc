//! Session engine for a map quiz: players match cards (names, capitals,
//! leaders, flags or landmarks) to the subregions of a region, and are graded
//! on accuracy and speed once every card is gone.
//!
//! The engine is pure state; callers own persistence (see [`store`]) and the
//! passage of time (see [`clock`]).

#[cfg(test)]
#[macro_use]
extern crate assert_approx_eq;
#[macro_use]
extern crate log;
extern crate rand;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate thiserror;
extern crate uuid;

pub mod card;
pub mod clock;
pub mod config;
pub mod deck;
pub mod error;
pub mod gameplay;
pub mod grader;
pub mod ledger;
pub mod region;
pub mod store;

pub use card::{Card, CardId, GameType, QuizMode};
pub use clock::{Clock, ManualClock, SystemClock};
pub use deck::{build_deck, build_deck_with_rng, CardDeck};
pub use error::QuizError;
pub use gameplay::{CheckOutcome, GameInfo, GameplaySession, SkipOutcome};
pub use grader::{GradeInfo, GradeSpec, GradeTable, Grader};
pub use region::{Region, RegionCatalog, Subregion};
