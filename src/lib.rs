//! Silicon surface electrostatics at a single point of a wafer: quasi-Fermi
//! levels under injection or bias, charge balance at the oxide interface,
//! and midgap-trap surface recombination.

pub mod numerics;
pub mod physics;
pub mod processing;
pub mod sweep;

pub use physics::quasi_fermi::{from_injection, from_voltage};
pub use physics::recombination::surface_recombination_rate;
pub use physics::surface::solve_surface_potential;
