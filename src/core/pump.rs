//! A single occupy/release slot.

use crate::core::{CarId, ProtocolViolation};

/// Index of a pump inside its pool.
pub type PumpId = usize;

/// One pump. Owned by [`PumpPool`](crate::core::PumpPool) and only ever touched
/// under the pool lock, so plain fields are enough.
#[derive(Debug, Default, Clone)]
pub struct Pump {
    occupant: Option<CarId>,
    service_count: u64,
}

impl Pump {
    /// Create a free pump with a zero service count.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            occupant: None,
            service_count: 0,
        }
    }

    /// Test-and-set: take the pump for `car` if it is free.
    ///
    /// Returns `false` without side effects when the pump is already occupied.
    pub fn occupy(&mut self, car: CarId) -> bool {
        if self.occupant.is_some() {
            return false;
        }
        self.occupant = Some(car);
        self.service_count += 1;
        true
    }

    /// Free the pump. Only the current occupant may do this.
    ///
    /// # Errors
    ///
    /// Returns the violated invariant when the pump is free or held by another car.
    pub fn release(&mut self, pump: PumpId, car: CarId) -> Result<(), ProtocolViolation> {
        match self.occupant {
            None => Err(ProtocolViolation::ReleaseOfFreePump { pump, car }),
            Some(occupant) if occupant != car => Err(ProtocolViolation::ReleaseByNonOccupant {
                pump,
                car,
                occupant,
            }),
            Some(_) => {
                self.occupant = None;
                Ok(())
            }
        }
    }

    /// Whether a car currently holds the pump.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// The car holding the pump, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<CarId> {
        self.occupant
    }

    /// Number of occupations since the last reset.
    #[must_use]
    pub const fn service_count(&self) -> u64 {
        self.service_count
    }

    /// Return to the free, zero-count state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
