//! Retargeter
//!
//! [`Retargeter`] ties the pipeline together for one active avatar:
//!
//! - **Avatar selection**: [`select_avatar`](Retargeter::select_avatar)
//!   rebinds bones and recalibrates the forward axis.
//! - **Data step**: [`update`](Retargeter::update) advances the playback
//!   cursor at the sample rate and, per tick, refreshes IK targets and
//!   finger rotations.
//! - **Render step**: [`apply_render_step`](Retargeter::apply_render_step)
//!   re-applies finger rotations from the current cursor frame at render
//!   rate, independent of the data step.
//! - **IK resolve**: [`resolve_ik`](Retargeter::resolve_ik) hands the
//!   targets to the external solver.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut retargeter = Retargeter::new(RetargetSettings::default());
//! retargeter.register_avatar("male", male_root);
//! retargeter.select_avatar(&mut scene, "male")?;
//! retargeter.load_sequence(sequence);
//!
//! loop {
//!     retargeter.update(&mut scene, timer.dt_seconds());
//!     retargeter.resolve_ik(&mut ik_solver);
//!     retargeter.apply_render_step(&mut scene);
//! }
//! ```

use std::path::Path;

use glam::Affine3A;
use marionette_core::{LandmarkFrame, LandmarkSequence, MarionetteError, Result, Side};
use rustc_hash::FxHashMap;

use crate::binding::SkeletonBinding;
use crate::finger::{FingerPoseSolver, SegmentSolves};
use crate::host::SkeletonHost;
use crate::ik::{IkSolver, IkTargetDriver, IkTargetSet};
use crate::mapper::CoordinateMapper;
use crate::playback::{PlaybackScheduler, PlaybackState};
use crate::resolver::BoneResolver;
use crate::settings::RetargetSettings;

/// Avatar roots by identifier.
#[derive(Debug, Clone)]
pub struct AvatarRegistry<B> {
    avatars: FxHashMap<String, B>,
}

impl<B> Default for AvatarRegistry<B> {
    fn default() -> Self {
        Self {
            avatars: FxHashMap::default(),
        }
    }
}

impl<B: Copy> AvatarRegistry<B> {
    pub fn register(&mut self, id: &str, root: B) {
        if self.avatars.insert(id.to_string(), root).is_some() {
            log::warn!("Avatar `{id}` re-registered, previous root replaced");
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<B> {
        self.avatars.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.avatars.keys().map(String::as_str)
    }
}

pub struct Retargeter<H: SkeletonHost> {
    settings: RetargetSettings,
    mapper: CoordinateMapper,
    solver: FingerPoseSolver,
    ik: IkTargetDriver,
    scheduler: PlaybackScheduler,
    sequence: Option<LandmarkSequence>,
    avatars: AvatarRegistry<H::Bone>,
    active_avatar: Option<String>,
    binding: Option<SkeletonBinding<H::Bone>>,
}

impl<H: SkeletonHost> Retargeter<H> {
    #[must_use]
    pub fn new(settings: RetargetSettings) -> Self {
        Self {
            mapper: CoordinateMapper::new(settings.mapping),
            solver: FingerPoseSolver::new(settings.finger_mode),
            ik: IkTargetDriver::new(),
            scheduler: PlaybackScheduler::new(settings.playback),
            sequence: None,
            avatars: AvatarRegistry::default(),
            active_avatar: None,
            binding: None,
            settings,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn settings(&self) -> &RetargetSettings {
        &self.settings
    }

    #[must_use]
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    #[must_use]
    pub fn targets(&self) -> &IkTargetSet {
        self.ik.targets()
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.scheduler.state()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.scheduler.cursor()
    }

    #[must_use]
    pub fn binding(&self) -> Option<&SkeletonBinding<H::Bone>> {
        self.binding.as_ref()
    }

    #[must_use]
    pub fn active_avatar(&self) -> Option<&str> {
        self.active_avatar.as_deref()
    }

    #[must_use]
    pub fn sequence(&self) -> Option<&LandmarkSequence> {
        self.sequence.as_ref()
    }

    /// Frame under the playback cursor, if a sequence is loaded.
    #[must_use]
    pub fn current_frame(&self) -> Option<&LandmarkFrame> {
        self.sequence.as_ref()?.get(self.scheduler.cursor())
    }

    /// Sets the scene origin landmarks are mapped through.
    pub fn set_origin(&mut self, origin: Option<Affine3A>) {
        self.mapper.origin = origin;
    }

    // ========================================================================
    // Avatars
    // ========================================================================

    pub fn register_avatar(&mut self, id: &str, root: H::Bone) {
        self.avatars.register(id, root);
    }

    #[must_use]
    pub fn avatars(&self) -> &AvatarRegistry<H::Bone> {
        &self.avatars
    }

    /// Makes `id` the active avatar and rebuilds the bone binding.
    ///
    /// The previous avatar's fingers are returned to their bind pose first.
    pub fn select_avatar(&mut self, host: &mut H, id: &str) -> Result<&SkeletonBinding<H::Bone>> {
        let root = self
            .avatars
            .get(id)
            .ok_or_else(|| MarionetteError::UnknownAvatar(id.to_string()))?;

        if let Some(previous) = self.binding.take() {
            previous.restore_bind_pose(host);
        }

        let binding = BoneResolver::bind(host, root, &self.settings.naming, &self.settings.calibration);
        log::info!(
            "Avatar `{id}` bound: {} finger bones, {} missing",
            binding.bound_count(),
            binding.missing().len()
        );
        self.active_avatar = Some(id.to_string());
        Ok(&*self.binding.insert(binding))
    }

    // ========================================================================
    // Sequence
    // ========================================================================

    /// Loads a sequence and starts playback from frame 0.
    ///
    /// An empty sequence is kept but playback stays idle.
    pub fn load_sequence(&mut self, sequence: LandmarkSequence) {
        self.scheduler.load(sequence.len());
        self.sequence = Some(sequence);
    }

    /// Loads the result of a sequence loader, logging failures.
    ///
    /// Returns whether playback started.
    pub fn try_load(&mut self, loaded: Result<LandmarkSequence>) -> bool {
        match loaded {
            Ok(sequence) => {
                self.load_sequence(sequence);
                self.scheduler.is_playing()
            }
            Err(err) => {
                log::error!("Failed to load landmark sequence: {err}");
                false
            }
        }
    }

    /// Parses a JSON sequence and starts playback. Failures are logged.
    pub fn try_load_from_str(&mut self, json: &str) -> bool {
        self.try_load(marionette_assets::load_sequence_from_str(json))
    }

    /// Reads a JSON sequence file and starts playback. Failures are logged.
    pub fn try_load_from_file<P: AsRef<Path>>(&mut self, path: P) -> bool {
        self.try_load(marionette_assets::load_sequence_from_file(path))
    }

    /// Halts playback. Targets and bone rotations keep their values.
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Drops the loaded sequence.
    pub fn unload(&mut self) {
        self.scheduler.reset();
        self.sequence = None;
    }

    // ========================================================================
    // Per-frame call sites
    // ========================================================================

    /// Data step: advances playback by `dt` seconds and applies every frame
    /// that became due.
    pub fn update(&mut self, host: &mut H, dt: f32) {
        self.pin_avatar(host);

        let due = self.scheduler.advance(dt);
        for _ in 0..due {
            self.step(host);
        }
    }

    /// Applies exactly one scheduler tick. Returns the applied frame index.
    pub fn step(&mut self, host: &mut H) -> Option<usize> {
        let index = self.scheduler.tick()?;
        let frame = self.sequence.as_ref()?.get(index)?;

        self.ik.update_targets(frame, index, &self.mapper, &self.settings.ik);

        if let Some(binding) = &self.binding {
            for side in Side::ALL {
                if let Some(hand) = frame.hand(side) {
                    self.solver.apply(host, binding, hand, side, &self.mapper);
                }
            }
        }
        Some(index)
    }

    /// Render step: re-derives finger rotations from the current cursor
    /// frame, independent of the sample rate.
    ///
    /// Returns the solved segments of both hands.
    pub fn apply_render_step(&self, host: &mut H) -> SegmentSolves {
        let mut solves = SegmentSolves::new();
        let (Some(binding), Some(frame)) = (&self.binding, self.current_frame()) else {
            return solves;
        };

        for side in Side::ALL {
            match frame.hand(side) {
                Some(hand) => solves.extend(self.solver.apply(host, binding, hand, side, &self.mapper)),
                None => log::trace!("{side} hand landmark data missing or incomplete."),
            }
        }
        solves
    }

    /// IK resolve step: hands the current targets to `solver`.
    pub fn resolve_ik<S: IkSolver + ?Sized>(&self, solver: &mut S) {
        if self.binding.is_none() || self.sequence.as_ref().is_none_or(LandmarkSequence::is_empty) {
            return;
        }
        self.ik.resolve(solver, &self.settings.ik);
    }

    fn pin_avatar(&self, host: &mut H) {
        if !self.settings.pin_avatar_to_origin {
            return;
        }
        if let (Some(origin), Some(binding)) = (&self.mapper.origin, &self.binding) {
            host.set_world_position(binding.root(), origin.translation.into());
        }
    }
}
