//! Crucible engine library.
//!
//! A battle-resolution engine for multi-faction territorial conflict games.
//! The engine owns rules and state; the decisions belong to external
//! agents. It advances as a synchronous step function that suspends on
//! typed decision requests and resumes when the host supplies responses,
//! so the same core drives scripted agents, tests, and interactive hosts
//! alike.

pub mod battle;
pub mod protocol;
pub mod scripted;
pub mod world;
