//! # Stream
//!
//! $$
//! \text{acquire}\;\to\;\chi^2_{k_1},\,Z_1,\,\dots\;\to\;\text{release}
//! $$
//!
//! One pseudo-random stream shared by every consumer in the process. A
//! sampling session holds the stream for the whole draw sequence through a
//! [`StreamGuard`]; dropping the guard releases it, on every exit path.
use std::sync::OnceLock;

use parking_lot::Mutex;
use parking_lot::MutexGuard;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::ChiSquared;
use rand_distr::Distribution;
use rand_distr::StandardNormal;

/// Scalar variates consumed by the Bartlett construction.
pub trait VariateSource {
  /// Chi-squared variate with `shape` degrees of freedom. `NaN` when the
  /// shape is not strictly positive and finite; the stream is left untouched.
  fn chi_squared(&mut self, shape: f64) -> f64;
  fn standard_normal(&mut self) -> f64;
}

struct StreamState<R> {
  rng: R,
  draws: u64,
  sessions: u64,
}

/// A pseudo-random stream behind a mutex. Holding a [`StreamGuard`] is the
/// only way to draw from it, so concurrent sessions never interleave.
pub struct SharedStream<R: Rng = StdRng> {
  state: Mutex<StreamState<R>>,
}

impl<R: Rng> SharedStream<R> {
  pub fn new(rng: R) -> Self {
    Self {
      state: Mutex::new(StreamState {
        rng,
        draws: 0,
        sessions: 0,
      }),
    }
  }

  /// Opens the bracket, blocking until no other session holds the stream.
  pub fn acquire(&self) -> StreamGuard<'_, R> {
    StreamGuard::open(self.state.lock())
  }

  /// Opens the bracket only if the stream is free.
  pub fn try_acquire(&self) -> Option<StreamGuard<'_, R>> {
    self.state.try_lock().map(StreamGuard::open)
  }

  /// Total variates consumed since construction or the last reseed.
  ///
  /// Blocks while a guard is alive; use [`StreamGuard::draws`] from inside
  /// a bracket.
  pub fn draws(&self) -> u64 {
    self.state.lock().draws
  }

  /// Number of brackets opened so far.
  pub fn sessions(&self) -> u64 {
    self.state.lock().sessions
  }

  /// Replaces the generator and resets the draw counter.
  pub fn reseed(&self, rng: R) {
    let mut state = self.state.lock();
    state.rng = rng;
    state.draws = 0;
  }
}

impl SharedStream<StdRng> {
  pub fn seed_from_u64(seed: u64) -> Self {
    Self::new(StdRng::seed_from_u64(seed))
  }

  pub fn from_entropy() -> Self {
    Self::new(StdRng::from_entropy())
  }
}

impl Default for SharedStream<StdRng> {
  fn default() -> Self {
    Self::from_entropy()
  }
}

static GLOBAL_STREAM: OnceLock<SharedStream<StdRng>> = OnceLock::new();

/// The process-wide stream, seeded from entropy on first use.
pub fn global_stream() -> &'static SharedStream<StdRng> {
  GLOBAL_STREAM.get_or_init(SharedStream::from_entropy)
}

/// Reseeds the process-wide stream.
pub fn set_seed(seed: u64) {
  global_stream().reseed(StdRng::seed_from_u64(seed));
}

/// An open acquire/release bracket on a [`SharedStream`].
pub struct StreamGuard<'a, R: Rng> {
  state: MutexGuard<'a, StreamState<R>>,
  consumed: u64,
}

impl<'a, R: Rng> StreamGuard<'a, R> {
  fn open(mut state: MutexGuard<'a, StreamState<R>>) -> Self {
    state.sessions += 1;
    tracing::trace!(session = state.sessions, draws = state.draws, "stream acquired");
    Self { state, consumed: 0 }
  }

  /// Variates consumed inside this bracket.
  pub fn consumed(&self) -> u64 {
    self.consumed
  }

  /// Variates consumed by the stream overall.
  pub fn draws(&self) -> u64 {
    self.state.draws
  }

  fn tick(&mut self) {
    self.consumed += 1;
    self.state.draws += 1;
  }
}

impl<R: Rng> VariateSource for StreamGuard<'_, R> {
  fn chi_squared(&mut self, shape: f64) -> f64 {
    match ChiSquared::new(shape) {
      Ok(dist) if shape.is_finite() => {
        self.tick();
        dist.sample(&mut self.state.rng)
      }
      _ => f64::NAN,
    }
  }

  fn standard_normal(&mut self) -> f64 {
    self.tick();
    self.state.rng.sample(StandardNormal)
  }
}

impl<R: Rng> Drop for StreamGuard<'_, R> {
  fn drop(&mut self) {
    tracing::trace!(
      session = self.state.sessions,
      consumed = self.consumed,
      "stream released"
    );
  }
}
