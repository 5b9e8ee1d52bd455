//! Traffic cellular automaton library
//!
//! Rule 184 traffic flow on a grid, usable from the bundled CLI or any other front end.

pub mod simulation;
