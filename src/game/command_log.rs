//! Per-ship timeline of commands and snapshots, and replay from it

use tracing::trace;

use super::command::{CommandClass, CommandEvent, Timestamp};
use super::input::InputState;
use super::physics::{LocalDelta, Velocities};
use super::snapshot::Snapshot;
use super::world::WorldState;
use crate::util::time::millis_to_secs;

/// Snapshots kept after a prune
pub const MAX_SNAPSHOTS: usize = 20;
/// Extra snapshots tolerated before pruning kicks in
pub const MAX_SNAPSHOT_OVERFLOW: usize = 5;

/// Ordered history of one ship's commands and snapshots.
///
/// Both the command buckets and the snapshot list stay sorted by time.
/// Snapshots cache where their commands start in each bucket as absolute
/// indices; `index_offsets` counts what pruning has removed from the front.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    buckets: [Vec<CommandEvent>; CommandClass::COUNT],
    index_offsets: [usize; CommandClass::COUNT],
    snapshots: Vec<Snapshot>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log seeded with a first snapshot
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let mut log = Self::new();
        log.insert_snapshot(snapshot);
        log
    }

    pub fn insert_command(&mut self, event: CommandEvent) {
        insert_sorted_from_back(&mut self.buckets[event.class.index()], event, |e| e.time);
    }

    pub fn insert_snapshot(&mut self, mut snapshot: Snapshot) {
        let time = snapshot.time;
        let position = sorted_position_from_back(&self.snapshots, time, |s| s.time);

        for class in CommandClass::ALL {
            let c = class.index();
            let start = match position {
                0 => self.index_offsets[c],
                _ => self.snapshots[position - 1].bucket_indices[c].max(self.index_offsets[c]),
            };
            snapshot.bucket_indices[c] = self.first_command_at_or_after(class, start, time);
        }

        self.snapshots.insert(position, snapshot);

        if self.snapshots.len() > MAX_SNAPSHOTS + MAX_SNAPSHOT_OVERFLOW {
            self.prune();
        }
    }

    /// Reconstructs the ship's state at `time` from the newest snapshot
    /// strictly before it. `None` if there is no such snapshot yet.
    pub fn reconstruct(&self, time: Timestamp) -> Option<Snapshot> {
        let base = self.snapshots.iter().rev().find(|s| s.time < time)?;

        let class = CommandClass::Move;
        let bucket = self.commands(class);
        let start = base
            .bucket_index(class)
            .saturating_sub(self.index_offset(class))
            .min(bucket.len());

        let mut world = base.world;
        let mut input = base.input;
        let mut cursor = base.time;

        for event in bucket[start..].iter().take_while(|e| e.time <= time) {
            // Late arrivals older than the base snapshot replay with no elapsed time
            let at = event.time.max(cursor);
            world = advance(world, &input, at - cursor);
            input = input.with_command(event);
            cursor = at;
        }
        world = advance(world, &input, time - cursor);

        Some(Snapshot::new(world, input, time, base.color.clone()))
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn commands(&self, class: CommandClass) -> &[CommandEvent] {
        &self.buckets[class.index()]
    }

    /// Number of commands pruned from the front of a bucket so far
    pub fn index_offset(&self, class: CommandClass) -> usize {
        self.index_offsets[class.index()]
    }

    /// Walks forward from absolute index `from` past commands older than `time`
    fn first_command_at_or_after(&self, class: CommandClass, from: usize, time: Timestamp) -> usize {
        let offset = self.index_offset(class);
        let bucket = self.commands(class);
        let mut index = from;
        while let Some(event) = bucket.get(index - offset) {
            if event.time >= time {
                break;
            }
            index += 1;
        }
        index
    }

    fn prune(&mut self) {
        let excess = self.snapshots.len() - MAX_SNAPSHOTS;
        self.snapshots.drain(..excess);

        let Some(oldest) = self.snapshots.first().map(|s| s.time) else {
            return;
        };

        for class in CommandClass::ALL {
            let c = class.index();
            let bucket = &mut self.buckets[c];
            let stale = bucket.partition_point(|e| e.time < oldest);
            bucket.drain(..stale);
            self.index_offsets[c] += stale;

            trace!(
                class = class.as_str(),
                pruned = stale,
                remaining = bucket.len(),
                "Pruned command bucket"
            );
        }
    }
}

fn advance(world: WorldState, input: &InputState, elapsed_ms: Timestamp) -> WorldState {
    let delta = LocalDelta::integrate(millis_to_secs(elapsed_ms), &Velocities::from_input(input));
    world.apply_delta(&delta)
}

/// Index after the last item with key <= `time`, scanning from the back
fn sorted_position_from_back<T>(items: &[T], time: Timestamp, key: impl Fn(&T) -> Timestamp) -> usize {
    items
        .iter()
        .rposition(|item| key(item) <= time)
        .map_or(0, |i| i + 1)
}

/// Inserts keeping ascending order; equal keys land after existing ones
pub(crate) fn insert_sorted_from_back<T>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> Timestamp) -> usize {
    let index = sorted_position_from_back(items, key(&item), &key);
    items.insert(index, item);
    index
}
