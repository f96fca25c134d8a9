use std::sync::Arc;

use hyprviz_messages::{AudioSnapshot, BandLayout, SnapshotStore};
use log::debug;

/// The uniform primitives of whatever renderer hosts the effect.
pub trait UniformHost {
    /// Opaque handle of a linked shader program.
    type Program: Copy + Eq + std::fmt::Debug;
    /// Where a single scalar is written within one program.
    type Slot;

    /// Look up `name` in `program`. `None` if the program has no such uniform.
    fn resolve(&self, program: Self::Program, name: &str) -> Option<Self::Slot>;

    /// Write `value` into `slot` of the currently bound program.
    fn set_float(&self, slot: &Self::Slot, value: f32);
}

/// What one program activation did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InjectReport {
    /// Slots were looked up again before writing
    pub resolved: bool,
    /// Bands written to the program
    pub written: usize,
    /// Bands the program has no uniform for
    pub skipped: usize,
}

/// Per-program cache of the uniform slot for each band.
///
/// Slots only mean something for the program they were resolved against.
/// Whenever a different program is activated, or the cache is explicitly
/// invalidated, every slot is resolved again before any value is written.
pub struct UniformBindingCache<P, S> {
    names: Vec<String>,
    program: Option<P>,
    slots: Vec<Option<S>>,
}

impl<P, S> UniformBindingCache<P, S>
where
    P: Copy + Eq + std::fmt::Debug,
{
    pub fn new(layout: &BandLayout) -> Self {
        Self {
            names: layout.names().to_vec(),
            program: None,
            slots: Vec::with_capacity(layout.len()),
        }
    }

    /// The program the current slots belong to.
    pub fn bound_program(&self) -> Option<P> {
        self.program
    }

    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Forget all slots. Needed when a program is recompiled and the host
    /// may hand out the old handle again.
    pub fn invalidate(&mut self) {
        self.program = None;
        self.slots.clear();
    }

    /// Bring the slots up to date for `program` and write `snapshot` into them.
    pub fn on_program_activated<H>(
        &mut self,
        host: &H,
        program: P,
        snapshot: &AudioSnapshot,
    ) -> InjectReport
    where
        H: UniformHost<Program = P, Slot = S>,
    {
        let mut report = InjectReport::default();

        if self.program != Some(program) {
            self.resolve(host, program);
            report.resolved = true;
        }

        for (index, slot) in self.slots.iter().enumerate() {
            match (slot, snapshot.get(index)) {
                (Some(slot), Some(value)) => {
                    host.set_float(slot, value);
                    report.written += 1;
                }
                _ => report.skipped += 1,
            }
        }

        report
    }

    fn resolve<H>(&mut self, host: &H, program: P)
    where
        H: UniformHost<Program = P, Slot = S>,
    {
        self.slots.clear();
        for name in &self.names {
            let slot = host.resolve(program, name);
            if slot.is_none() {
                debug!("Program {:?} has no uniform {}", program, name);
            }
            self.slots.push(slot);
        }
        self.program = Some(program);
        debug!(
            "Resolved {}/{} band uniforms for program {:?}",
            self.resolved_count(),
            self.names.len(),
            program
        );
    }
}

/// Render-side entry point: the latest snapshot plus the uniform cache.
///
/// The host adapter calls [`on_program_activated`](Self::on_program_activated)
/// once per program bind during a frame. It never blocks: reading the
/// snapshot is a single atomic load.
pub struct Visualizer<P, S> {
    store: Arc<SnapshotStore>,
    bindings: UniformBindingCache<P, S>,
}

impl<P, S> Visualizer<P, S>
where
    P: Copy + Eq + std::fmt::Debug,
{
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        let bindings = UniformBindingCache::new(store.layout());
        Self { store, bindings }
    }

    pub fn on_program_activated<H>(&mut self, host: &H, program: P) -> InjectReport
    where
        H: UniformHost<Program = P, Slot = S>,
    {
        let snapshot = self.store.current();
        self.bindings.on_program_activated(host, program, &snapshot)
    }

    pub fn current_snapshot(&self) -> Arc<AudioSnapshot> {
        self.store.current()
    }

    pub fn invalidate(&mut self) {
        self.bindings.invalidate();
    }

    pub fn bindings(&self) -> &UniformBindingCache<P, S> {
        &self.bindings
    }
}
