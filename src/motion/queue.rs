use crate::motion::MotionCommand;

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

/// Error returned when pushing to a full queue.
///
/// The push has no effect: either the command is fully linked in, or the
/// queue is exactly as it was.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct QueueFull;

/// Thread-safe FIFO of pending motion commands.
///
/// The queue is the single resource shared between the planning context
/// (producer) and the step-execution context (consumer); one mutex guards
/// all mutation. The mutex type is generic so that firmware can pick a
/// critical-section mutex and host tests can run the very same queue type
/// across `std` threads.
///
/// `new` is `const`, so the queue can live in a `static` shared by both
/// execution contexts.
///
/// # Type Parameters
///
/// - `M`: Raw mutex implementation guarding the command storage.
/// - `N`: Queue capacity, in commands.
pub struct MotionQueue<M: RawMutex, const N: usize> {
    commands: Mutex<M, RefCell<Deque<MotionCommand, N>>>,
    // Advisory mirror of the deque length, readable without the lock. It is
    // only ever written while the lock is held.
    length: AtomicUsize,
    running: AtomicBool,
}

impl<M: RawMutex, const N: usize> MotionQueue<M, N> {
    /// Creates a new, empty queue with consumption enabled.
    pub const fn new() -> Self {
        Self {
            commands: Mutex::new(RefCell::new(Deque::new())),
            length: AtomicUsize::new(0),
            running: AtomicBool::new(true),
        }
    }

    /// Appends a command to the tail of the queue.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the command was linked in.
    /// - `Err(QueueFull)` if the queue was at capacity; the queue is
    ///   unchanged.
    pub fn push(&self, command: MotionCommand) -> Result<(), QueueFull> {
        self.commands.lock(|commands| {
            let mut commands = commands.borrow_mut();
            let result =
                commands.push_back(command).map_err(|_| QueueFull);
            self.length.store(commands.len(), Ordering::Relaxed);
            result
        })
    }

    /// Removes and returns the head of the queue.
    ///
    /// Popping an empty queue is not an error; `None` is the explicit
    /// empty sentinel, and the caller must branch on it.
    pub fn pop(&self) -> Option<MotionCommand> {
        self.commands.lock(|commands| {
            let mut commands = commands.borrow_mut();
            let head = commands.pop_front();
            self.length.store(commands.len(), Ordering::Relaxed);
            head
        })
    }

    /// Returns a copy of the head of the queue without removing it.
    pub fn peek(&self) -> Option<MotionCommand> {
        self.commands
            .lock(|commands| commands.borrow().front().copied())
    }

    /// Number of queued commands.
    ///
    /// Read without taking the lock; the value is advisory. Mutating
    /// operations re-check the real length under the lock, so a stale read
    /// here can never corrupt the queue (the classic check-then-act race is
    /// confined to this hint).
    pub fn len(&self) -> usize {
        self.length.load(Ordering::Relaxed)
    }

    /// Returns `true` when no commands are queued. Advisory; see
    /// [MotionQueue::len].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gates consumption.
    ///
    /// While `false`, the executor stops draining at its next
    /// between-commands check, which allows batching pushes or pausing the
    /// machine. Commands already being executed run to completion.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    /// Returns the consumption gate.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::motion::{AxisMove, Direction, MicrostepMode};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    type TestQueue = MotionQueue<CriticalSectionRawMutex, 8>;

    /// A command whose X step count tags it for identification.
    fn tagged(steps: u32) -> MotionCommand {
        let x = AxisMove {
            steps,
            direction: Direction::Positive,
        };
        MotionCommand::new(
            [x, AxisMove::zero(), AxisMove::zero()],
            MicrostepMode::Full,
        )
    }

    #[test]
    fn test_new_is_empty_and_running() {
        let queue = TestQueue::new();
        assert!(queue.is_empty());
        assert_eq!(0, queue.len());
        assert!(queue.is_running());
        assert_eq!(None, queue.peek());
    }

    #[test]
    fn test_fifo_order() {
        let queue = TestQueue::new();
        queue.push(tagged(1)).unwrap();
        queue.push(tagged(2)).unwrap();
        queue.push(tagged(3)).unwrap();
        assert_eq!(3, queue.len());

        assert_eq!(Some(tagged(1)), queue.pop());
        assert_eq!(Some(tagged(2)), queue.pop());
        assert_eq!(Some(tagged(3)), queue.pop());

        // A further pop returns the empty sentinel and leaves the length
        // at zero.
        assert_eq!(None, queue.pop());
        assert_eq!(0, queue.len());
    }

    #[test]
    fn test_peek_does_not_remove() {
        let queue = TestQueue::new();
        queue.push(tagged(7)).unwrap();
        assert_eq!(Some(tagged(7)), queue.peek());
        assert_eq!(1, queue.len());
        assert_eq!(Some(tagged(7)), queue.pop());
    }

    #[test]
    fn test_push_full_is_rejected_without_change() {
        let queue: MotionQueue<CriticalSectionRawMutex, 2> =
            MotionQueue::new();
        queue.push(tagged(1)).unwrap();
        queue.push(tagged(2)).unwrap();
        assert_eq!(Err(QueueFull), queue.push(tagged(3)));
        assert_eq!(2, queue.len());
        assert_eq!(Some(tagged(1)), queue.pop());
        assert_eq!(Some(tagged(2)), queue.pop());
        assert_eq!(None, queue.pop());
    }

    #[test]
    fn test_running_gate() {
        let queue = TestQueue::new();
        queue.set_running(false);
        assert!(!queue.is_running());
        queue.set_running(true);
        assert!(queue.is_running());
    }

    #[test]
    fn test_concurrent_push_pop_preserves_commands() {
        const PUSHES: u32 = 1000;
        static QUEUE: MotionQueue<CriticalSectionRawMutex, 16> =
            MotionQueue::new();

        let consumer = std::thread::spawn(|| {
            let mut seen: Vec<u32> = Vec::new();
            while seen.len() < PUSHES as usize {
                if let Some(command) = QUEUE.pop() {
                    seen.push(command.axis(crate::motion::Axis::X).steps);
                }
            }
            seen
        });

        let producer = std::thread::spawn(|| {
            for tag in 0..PUSHES {
                // Spin when the bounded queue is momentarily full.
                loop {
                    if QUEUE.push(tagged(tag)).is_ok() {
                        break;
                    }
                    std::thread::yield_now();
                }
            }
        });

        producer.join().unwrap();
        let seen = consumer.join().unwrap();

        // Every command arrives exactly once, in order: no duplicates and
        // no corruption of the length accounting.
        let expected: Vec<u32> = (0..PUSHES).collect();
        assert_eq!(expected, seen);
        assert_eq!(0, QUEUE.len());
        assert_eq!(None, QUEUE.pop());
    }
}
