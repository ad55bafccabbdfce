// src/timer/mod.rs

//! Exam clock.
//!
//! A countdown is one cooperative Tokio task that wakes about once per
//! second, reports the new remaining count to the runtime and, when the count
//! reaches zero, reports expiry exactly once and stops. Unlimited mode spawns
//! nothing.
//!
//! Time comes from `tokio::time`, so tests can pause the clock and advance it
//! deterministically instead of sleeping.

pub mod countdown;

pub use countdown::{TICK, TimerHandle, spawn_countdown, start};
