//! Host-facing driver
//!
//! Owns one match, converts wall-clock frame time into fixed ticks and
//! exposes the commands a host UI binds to buttons and pointers.

use glam::Vec2;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::{Result, SandboxError};
use crate::platform::{InputRouter, PointerEvent};
use crate::settings::{Settings, WeaponKind};
use crate::sim::{Intent, SimulationState, Snapshot, TickReport, tick};

/// Longest frame the accumulator accepts (tab switches, breakpoints)
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct Session {
    state: SimulationState,
    router: InputRouter,
    accumulator: f32,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let state = SimulationState::new(settings);
        log::info!(
            "Session started: {} vs {} HP",
            state.settings.weapon,
            state
                .settings
                .max_hp
                .map_or_else(|| "infinite".to_string(), |hp| hp.to_string())
        );
        Self {
            state,
            router: InputRouter::new(),
            accumulator: 0.0,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(Settings::from_json(json)?))
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Start over with a different weapon, keeping every other setting
    pub fn switch_weapon(&mut self, weapon: WeaponKind) {
        let settings = Settings {
            weapon,
            ..self.state.settings.clone()
        };
        *self = Self::new(settings);
    }

    /// Feed a normalized mouse/touch event
    pub fn pointer(&mut self, event: PointerEvent) {
        self.router.pointer(event);
    }

    /// Fire or swing toward `at` on the next tick
    ///
    /// Refused immediately if the weapon could not accept it right now.
    pub fn fire_or_activate(&mut self, at: Vec2) -> Result<()> {
        let attacker = &self.state.attacker;
        let weapon = attacker.weapon.kind();
        if attacker.dragging && weapon.is_ranged() {
            return Err(SandboxError::WeaponUnavailable {
                weapon,
                reason: "attacker is being dragged",
            });
        }
        attacker
            .weapon
            .ready()
            .map_err(|reason| SandboxError::WeaponUnavailable { weapon, reason })?;

        self.router.push(Intent::Fire(at));
        Ok(())
    }

    /// Fire or swing straight at the target's resting position
    pub fn attack_target(&mut self) -> Result<()> {
        let at = self.state.target.base_pos;
        self.fire_or_activate(at)
    }

    /// Take hold of the attacker with the pointer at `at`
    pub fn begin_drag(&mut self, at: Vec2) {
        self.router.push(Intent::Grab(at));
    }

    pub fn end_drag(&mut self) {
        self.router.push(Intent::Release);
    }

    pub fn respawn(&mut self) -> Result<()> {
        self.state.respawn()
    }

    /// Run exactly one tick with whatever input is queued
    pub fn step(&mut self) -> TickReport {
        let input = self.router.take();
        tick(&mut self.state, &input)
    }

    /// Advance by `dt` seconds of wall time
    ///
    /// Queued input goes to the first tick run; later substeps get none.
    pub fn advance(&mut self, dt: f32) -> Vec<TickReport> {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut reports = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            reports.push(self.step());
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        reports
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }
}
