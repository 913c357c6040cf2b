#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless adapter that wires the world and systems into a runnable
//! Waypoint Defence simulation.

pub mod level;
pub mod placement;
pub mod simulation;

pub use level::{load_level, parse_level};
pub use placement::{PlacementRequest, PlacementRequestError};
pub use simulation::{Simulation, Summary};
