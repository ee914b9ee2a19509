//! # Overview
//! "Clinic-sim" provides a discrete event simulation engine for multi-stage
//! queueing networks, such as a clinic where patients pass through
//! registration, a doctor, an optional lab visit, and a pharmacy.
//!
//! This repository contains:
//!
//! * Random variable framework, for the exponential service and
//! interarrival times and the Bernoulli routing decisions.
//! * Network models: stations with identical servers and FIFO wait lines,
//! entity processes, a Poisson arrival source, and a probabilistic router.
//! * Output analysis framework, for time-weighted station statistics,
//! per-entity wait and response times, and replication confidence
//! intervals.
//! * Simulator engine, for configuring and executing seeded, reproducible
//! simulation runs.
//!
//! Runs are single threaded and deterministic: the same configuration and
//! seed always produce identical statistics.
pub mod input_modeling;
pub mod models;
pub mod output_analysis;
pub mod simulator;
pub mod utils;
