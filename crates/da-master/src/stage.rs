//! Stage: a minimal scene of moving targets.

use da_ir::{Scene, TargetId, Vec3};

use crate::session::TargetEntry;

#[derive(Clone, Debug, PartialEq)]
pub struct StageTarget {
    pub id: TargetId,
    pub name: String,
    pub position: Vec3,
    /// Units per second
    pub velocity: Vec3,
    pub ui: bool,
    pub despawn_at: Option<f32>,
    pub alive: bool,
}

/// Scene implementation for headless sessions. Targets move in straight
/// lines and disappear at their despawn time.
#[derive(Clone, Debug, Default)]
pub struct Stage {
    targets: Vec<StageTarget>,
    time: f32,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stage from session entries; ids follow entry order.
    pub fn from_entries(entries: &[TargetEntry]) -> Self {
        let mut stage = Self::new();
        for entry in entries {
            stage.spawn(
                &entry.name,
                to_vec3(entry.position),
                to_vec3(entry.velocity),
                entry.ui,
                entry.despawn_at,
            );
        }
        stage
    }

    pub fn spawn(
        &mut self,
        name: &str,
        position: Vec3,
        velocity: Vec3,
        ui: bool,
        despawn_at: Option<f32>,
    ) -> TargetId {
        let id = TargetId(self.targets.len() as u64);
        self.targets.push(StageTarget {
            id,
            name: name.to_string(),
            position,
            velocity,
            ui,
            despawn_at,
            alive: true,
        });
        id
    }

    pub fn despawn(&mut self, id: TargetId) {
        if let Some(target) = self.target_mut(id) {
            target.alive = false;
        }
    }

    /// Look up a live or despawned target by name.
    pub fn resolve(&self, name: &str) -> Option<TargetId> {
        self.targets.iter().find(|t| t.name == name).map(|t| t.id)
    }

    pub fn target(&self, id: TargetId) -> Option<&StageTarget> {
        self.targets.get(id.0 as usize)
    }

    fn target_mut(&mut self, id: TargetId) -> Option<&mut StageTarget> {
        self.targets.get_mut(id.0 as usize)
    }

    pub fn targets(&self) -> &[StageTarget] {
        &self.targets
    }

    pub fn alive_count(&self) -> usize {
        self.targets.iter().filter(|t| t.alive).count()
    }

    /// Move targets by `dt` seconds and despawn those whose time is up.
    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
        let now = self.time;
        for target in self.targets.iter_mut().filter(|t| t.alive) {
            target.position = target.position + target.velocity * dt;
            if target.despawn_at.is_some_and(|at| now >= at) {
                target.alive = false;
            }
        }
    }
}

impl Scene for Stage {
    fn position(&self, target: TargetId) -> Option<Vec3> {
        self.target(target).filter(|t| t.alive).map(|t| t.position)
    }

    fn is_ui_element(&self, target: TargetId) -> bool {
        self.target(target).is_some_and(|t| t.ui)
    }
}

pub(crate) fn to_vec3(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_move_with_velocity() {
        let mut stage = Stage::new();
        let id = stage.spawn("car", Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), false, None);
        stage.advance(0.5);
        assert_eq!(stage.position(id), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn despawned_target_has_no_position() {
        let mut stage = Stage::new();
        let id = stage.spawn("spark", Vec3::ZERO, Vec3::ZERO, false, Some(1.0));
        stage.advance(0.5);
        assert!(stage.position(id).is_some());
        stage.advance(0.5);
        assert_eq!(stage.position(id), None);
        assert_eq!(stage.alive_count(), 0);
        assert_eq!(stage.resolve("spark"), Some(id));
    }

    #[test]
    fn ui_flag_is_reported() {
        let mut stage = Stage::new();
        let button = stage.spawn("button", Vec3::ZERO, Vec3::ZERO, true, None);
        let crate_ = stage.spawn("crate", Vec3::ZERO, Vec3::ZERO, false, None);
        assert!(stage.is_ui_element(button));
        assert!(!stage.is_ui_element(crate_));
        assert!(!stage.is_ui_element(TargetId(99)));
    }

    #[test]
    fn explicit_despawn() {
        let mut stage = Stage::new();
        let id = stage.spawn("orb", Vec3::ZERO, Vec3::ZERO, false, None);
        stage.despawn(id);
        assert_eq!(stage.position(id), None);
    }
}
