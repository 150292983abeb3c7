use crate::{tile::ArenaId, Parallelism};
use parking_lot::{Condvar, Mutex};
use std::{
    collections::BTreeMap,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

/// How a task accesses a memory region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    /// The region is only read.
    Read,
    /// The region is overwritten without being read.
    Write,
    /// The region is read, then overwritten.
    ReadWrite,
}

impl Access {
    /// Returns `true` if the access modifies the region.
    #[inline]
    pub fn writes(self) -> bool {
        !matches!(self, Access::Read)
    }
}

/// Contiguous range of elements inside the arena of a tiled matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    arena: ArenaId,
    offset: usize,
    len: usize,
}

impl Region {
    /// Creates the region `offset..offset + len` of the arena `arena`.
    #[inline]
    pub fn new(arena: ArenaId, offset: usize, len: usize) -> Self {
        Self { arena, offset, len }
    }

    /// Returns the arena of the region.
    #[inline]
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Returns the offset of the first element of the region.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of elements of the region.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the region has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the two regions share at least one element.
    #[inline]
    pub fn overlaps(&self, other: &Region) -> bool {
        self.arena == other.arena
            && !self.is_empty()
            && !other.is_empty()
            && self.offset < other.offset + other.len
            && other.offset < self.offset + self.len
    }
}

/// Set of memory regions a task accesses, each with its access mode.
///
/// The footprint must cover every element the task touches. Two tasks conflict when one of them
/// writes to a region that overlaps a region accessed by the other.
#[derive(Clone, Debug, Default)]
pub struct Footprint {
    accesses: Vec<(Region, Access)>,
}

impl Footprint {
    /// Creates an empty footprint.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `region` with the access mode `access`.
    #[inline]
    pub fn push(&mut self, region: Region, access: Access) {
        self.accesses.push((region, access));
    }

    /// Adds `region` as read.
    #[inline]
    pub fn read(mut self, region: Region) -> Self {
        self.push(region, Access::Read);
        self
    }

    /// Adds `region` as written.
    #[inline]
    pub fn write(mut self, region: Region) -> Self {
        self.push(region, Access::Write);
        self
    }

    /// Adds `region` as read and written.
    #[inline]
    pub fn read_write(mut self, region: Region) -> Self {
        self.push(region, Access::ReadWrite);
        self
    }

    /// Returns the accessed regions.
    #[inline]
    pub fn accesses(&self) -> &[(Region, Access)] {
        &self.accesses
    }

    /// Returns `true` if a task with this footprint must not run concurrently with a task with
    /// the footprint `other`.
    pub fn conflicts_with(&self, other: &Footprint) -> bool {
        self.accesses.iter().any(|(a, a_access)| {
            other.accesses.iter().any(|(b, b_access)| {
                (a_access.writes() || b_access.writes()) && a.overlaps(b)
            })
        })
    }
}

type Body = Box<dyn FnOnce() + Send + 'static>;

struct Node {
    footprint: Footprint,
    unresolved: usize,
    dependents: Vec<u64>,
    body: Option<Body>,
}

#[derive(Default)]
struct Graph {
    next_id: u64,
    // pending and running tasks, in submission order
    live: BTreeMap<u64, Node>,
}

struct Shared {
    pool: Option<rayon::ThreadPool>,
    graph: Mutex<Graph>,
    drained: Condvar,
    panicked: AtomicUsize,
}

impl Shared {
    fn run(&self, id: u64, body: Body) {
        log::trace!(target: "faer_tile", "task {id} started");
        if catch_unwind(AssertUnwindSafe(body)).is_err() {
            log::error!(target: "faer_tile", "task {id} panicked");
            self.panicked.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn spawn(self: &Arc<Self>, id: u64, body: Body) {
        let this = self.clone();
        let job = move || {
            this.run(id, body);
            this.complete(id);
        };
        match &self.pool {
            Some(pool) => pool.spawn(job),
            None => job(),
        }
    }

    fn complete(self: &Arc<Self>, id: u64) {
        let mut ready = Vec::new();
        {
            let mut graph = self.graph.lock();
            if let Some(node) = graph.live.remove(&id) {
                for dep in node.dependents {
                    if let Some(dep_node) = graph.live.get_mut(&dep) {
                        dep_node.unresolved -= 1;
                        if dep_node.unresolved == 0 {
                            if let Some(body) = dep_node.body.take() {
                                ready.push((dep, body));
                            }
                        }
                    }
                }
            }
            if graph.live.is_empty() {
                self.drained.notify_all();
            }
        }
        log::trace!(target: "faer_tile", "task {id} completed, {} released", ready.len());
        for (dep, body) in ready {
            self.spawn(dep, body);
        }
    }
}

/// Dependency-tracking task scheduler.
///
/// Each submitted task is compared against every pending or running task. The task starts only
/// once all the earlier tasks whose footprints conflict with its own have completed, so
/// conflicting tasks run in submission order while independent ones may run concurrently on the
/// worker threads.
///
/// With [`Parallelism::None`], tasks run on the calling thread during [`Scheduler::submit`].
pub struct Scheduler {
    parallelism: Parallelism,
    shared: Arc<Shared>,
}

impl core::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scheduler")
            .field("parallelism", &self.parallelism)
            .field("live", &self.shared.graph.lock().live.len())
            .finish()
    }
}

impl Scheduler {
    /// Creates a scheduler. With [`Parallelism::Rayon`], a dedicated thread pool is built.
    pub fn new(parallelism: Parallelism) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = match parallelism {
            Parallelism::None => None,
            Parallelism::Rayon(n_threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n_threads)
                    .thread_name(|idx| format!("faer-tile-{idx}"))
                    .build()?,
            ),
        };
        Ok(Self {
            parallelism,
            shared: Arc::new(Shared {
                pool,
                graph: Mutex::new(Graph::default()),
                drained: Condvar::new(),
                panicked: AtomicUsize::new(0),
            }),
        })
    }

    /// Returns the parallelism the scheduler was created with.
    #[inline]
    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    /// Returns the number of worker threads.
    #[inline]
    pub fn num_threads(&self) -> usize {
        match &self.shared.pool {
            Some(pool) => pool.current_num_threads(),
            None => 1,
        }
    }

    /// Submits a task accessing the memory described by `footprint`.
    ///
    /// The body must not access memory outside its footprint, and must not submit tasks or wait
    /// on this scheduler.
    pub fn submit(&self, footprint: Footprint, body: impl FnOnce() + Send + 'static) {
        let body: Body = Box::new(body);
        let mut graph = self.shared.graph.lock();
        let id = graph.next_id;
        graph.next_id += 1;

        let mut unresolved = 0;
        for (&prev_id, prev) in graph.live.iter_mut() {
            if prev.footprint.conflicts_with(&footprint) {
                prev.dependents.push(id);
                unresolved += 1;
                log::trace!(target: "faer_tile", "task {id} depends on task {prev_id}");
            }
        }

        let (stored, ready) = if unresolved == 0 {
            (None, Some(body))
        } else {
            (Some(body), None)
        };
        graph.live.insert(
            id,
            Node {
                footprint,
                unresolved,
                dependents: Vec::new(),
                body: stored,
            },
        );
        drop(graph);

        if let Some(body) = ready {
            self.shared.spawn(id, body);
        }
    }

    /// Blocks until every submitted task has completed, without checking for panics.
    pub(crate) fn drain(&self) {
        let mut graph = self.shared.graph.lock();
        while !graph.live.is_empty() {
            self.shared.drained.wait(&mut graph);
        }
    }

    /// Blocks until every submitted task has completed.
    ///
    /// # Panics
    /// Panics if one of the tasks panicked.
    #[track_caller]
    pub fn wait(&self) {
        self.drain();
        let panicked = self.shared.panicked.swap(0, Ordering::Relaxed);
        if panicked > 0 {
            panic!("{panicked} task(s) panicked");
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.drain();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{TileDesc, TileMatrix};
    use rand::prelude::*;
    use std::{
        sync::atomic::AtomicBool,
        time::{Duration, Instant},
    };

    fn regions(count: usize) -> (TileMatrix<f64>, Vec<Region>) {
        let tiles = TileMatrix::<f64>::zeros(TileDesc::general(count, 1, 1, 1).unwrap());
        let regions = (0..count).map(|m| tiles.region(m, 0)).collect();
        (tiles, regions)
    }

    #[test]
    fn test_conflicts() {
        let (_tiles, r) = regions(2);
        let read = Footprint::new().read(r[0]);
        assert!(!read.conflicts_with(&Footprint::new().read(r[0])));
        assert!(read.conflicts_with(&Footprint::new().write(r[0])));
        assert!(read.conflicts_with(&Footprint::new().read(r[1]).read_write(r[0])));
        assert!(!read.conflicts_with(&Footprint::new().write(r[1])));
        assert!(!Footprint::new().conflicts_with(&read));
    }

    #[derive(Default)]
    struct Usage {
        readers: AtomicUsize,
        writers: AtomicUsize,
    }

    #[test]
    fn test_conflicting_tasks_never_overlap() {
        let rng = &mut StdRng::seed_from_u64(0);
        let (_tiles, r) = regions(4);
        let usage: Arc<Vec<Usage>> = Arc::new((0..4).map(|_| Usage::default()).collect());
        let violation = Arc::new(AtomicBool::new(false));

        let scheduler = Scheduler::new(Parallelism::Rayon(4)).unwrap();
        for _ in 0..200 {
            let mut footprint = Footprint::new();
            let mut touched = Vec::new();
            for (idx, &region) in r.iter().enumerate() {
                let access = match rng.gen_range(0..5) {
                    0 => Access::Read,
                    1 => Access::Write,
                    2 => Access::ReadWrite,
                    _ => continue,
                };
                footprint.push(region, access);
                touched.push((idx, access));
            }

            let usage = usage.clone();
            let violation = violation.clone();
            scheduler.submit(footprint, move || {
                for &(idx, access) in &touched {
                    let u = &usage[idx];
                    if access.writes() {
                        if u.writers.fetch_add(1, Ordering::SeqCst) != 0
                            || u.readers.load(Ordering::SeqCst) != 0
                        {
                            violation.store(true, Ordering::SeqCst);
                        }
                    } else {
                        u.readers.fetch_add(1, Ordering::SeqCst);
                        if u.writers.load(Ordering::SeqCst) != 0 {
                            violation.store(true, Ordering::SeqCst);
                        }
                    }
                }
                std::thread::sleep(Duration::from_micros(50));
                for &(idx, access) in &touched {
                    let u = &usage[idx];
                    if access.writes() {
                        u.writers.fetch_sub(1, Ordering::SeqCst);
                    } else {
                        u.readers.fetch_sub(1, Ordering::SeqCst);
                    }
                }
            });
        }
        scheduler.wait();
        assert!(!violation.load(Ordering::SeqCst));
    }

    #[test]
    fn test_conflicting_tasks_run_in_submission_order() {
        let (_tiles, r) = regions(3);
        let log = Arc::new(Mutex::new(Vec::new()));
        let scheduler = Scheduler::new(Parallelism::Rayon(3)).unwrap();

        for i in 0..64usize {
            let footprint = if i % 4 == 0 {
                Footprint::new().read_write(r[0])
            } else {
                Footprint::new().read(r[0]).write(r[1 + i % 2])
            };
            let log = log.clone();
            scheduler.submit(footprint, move || log.lock().push(i));
        }
        scheduler.wait();

        let log = log.lock();
        assert_eq!(log.len(), 64);
        // every writer of r[0] sees all earlier tasks completed and no later task started
        for (pos, &i) in log.iter().enumerate() {
            if i % 4 == 0 {
                assert!(log[..pos].iter().all(|&j| j < i));
                assert!(log[pos + 1..].iter().all(|&j| j > i));
            }
        }
    }

    #[test]
    fn test_disjoint_tasks_overlap() {
        let (_tiles, r) = regions(2);
        let scheduler = Scheduler::new(Parallelism::Rayon(2)).unwrap();
        let started = Arc::new(AtomicUsize::new(0));
        let overlapped = Arc::new(AtomicUsize::new(0));

        for &region in &r {
            let started = started.clone();
            let overlapped = overlapped.clone();
            scheduler.submit(Footprint::new().read_write(region), move || {
                started.fetch_add(1, Ordering::SeqCst);
                let deadline = Instant::now() + Duration::from_secs(5);
                while Instant::now() < deadline {
                    if started.load(Ordering::SeqCst) == 2 {
                        overlapped.fetch_add(1, Ordering::SeqCst);
                        return;
                    }
                    std::thread::yield_now();
                }
            });
        }
        scheduler.wait();
        assert_eq!(overlapped.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_sequential_runs_inline() {
        let (_tiles, r) = regions(1);
        let scheduler = Scheduler::new(Parallelism::None).unwrap();
        let done = Arc::new(AtomicBool::new(false));
        {
            let done = done.clone();
            scheduler.submit(Footprint::new().write(r[0]), move || {
                done.store(true, Ordering::SeqCst)
            });
        }
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(scheduler.num_threads(), 1);
        scheduler.wait();
    }

    #[test]
    #[should_panic]
    fn test_task_panic_surfaces_on_wait() {
        let (_tiles, r) = regions(2);
        let scheduler = Scheduler::new(Parallelism::Rayon(2)).unwrap();
        scheduler.submit(Footprint::new().write(r[0]), || panic!("task failure"));
        scheduler.submit(Footprint::new().read(r[0]).write(r[1]), || {});
        scheduler.wait();
    }
}
