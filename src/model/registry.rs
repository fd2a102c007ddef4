use crate::error::SimulationError;

use super::satellite::Satellite;

/// Owns every satellite in the scene, in launch order. That order is also the
/// order they're advanced and drawn in.
#[derive(Debug, Default)]
pub struct SatelliteRegistry {
    satellites: Vec<Satellite>,
}

impl SatelliteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, satellite: Satellite) -> Result<(), SimulationError> {
        if self.contains(satellite.name()) {
            return Err(SimulationError::DuplicateName(satellite.name().to_owned()));
        }
        self.satellites.push(satellite);
        Ok(())
    }

    /// Removes the satellite with this name and hands it back.
    pub fn remove_by_name(&mut self, name: &str) -> Result<Satellite, SimulationError> {
        let idx = self
            .position(name)
            .ok_or_else(|| SimulationError::UnknownSatellite(name.to_owned()))?;
        Ok(self.satellites.remove(idx))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.satellites.iter().position(|s| s.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Satellite> {
        self.satellites.iter_mut().find(|s| s.name() == name)
    }

    pub fn get_index(&self, idx: usize) -> Option<&Satellite> {
        self.satellites.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Satellite> + '_ {
        self.satellites.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Satellite> + '_ {
        self.satellites.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.satellites.iter().map(Satellite::name)
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }
}
