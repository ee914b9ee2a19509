//! The models module provides the building blocks of a queueing network:
//! stations (server pools with FIFO wait lines and time-weighted
//! accumulators), the entities that flow through them along with the
//! processes that move them, the arrival generator, and the router.

pub mod accumulator;
pub mod entity;
pub mod generator;
pub mod process;
pub mod router;
pub mod station;

pub use self::accumulator::StationAccumulator;
pub use self::entity::{Entity, EntityId, Visit};
pub use self::generator::Generator;
pub use self::process::{Departure, EntityProcess, Event, Phase};
pub use self::router::{RouteCursor, RouteStep, Router};
pub use self::station::{Acquisition, Grant, Handoff, Station, StationId};
