//! Query Cache
//!
//! Memoizing decorator over any [`Coser`], local or remote.
//!
//! Results are keyed by [`ExprDigest`]. Expressions that failed because a
//! word is missing from the vocabulary are remembered too, so repeated bad
//! queries never reach the wrapped engine again. Entries live as long as the
//! cache; the key space is bounded by the distinct expressions queried.

mod digest;

pub use digest::ExprDigest;

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::engine::Coser;
use crate::error::{Error, Result};
use crate::model::{Expr, Match};

/// Cached top-N result and the `n` it was computed for
#[derive(Debug, Clone)]
struct RankedEntry {
    n: usize,
    matches: Vec<Match>,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub negative_hits: u64,
}

/// Caching [`Coser`] decorator.
///
/// Concurrent identical misses may both reach the wrapped engine; they
/// compute and store the same value.
pub struct Cache<C> {
    inner: C,
    pairs: DashMap<(ExprDigest, ExprDigest), f32>,
    ranked: DashMap<ExprDigest, RankedEntry>,
    /// Expression digest -> word that made it fail
    failures: DashMap<ExprDigest, String>,
    hits: AtomicU64,
    misses: AtomicU64,
    negative_hits: AtomicU64,
}

impl<C: Coser> Cache<C> {
    /// Wrap an engine
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            pairs: DashMap::new(),
            ranked: DashMap::new(),
            failures: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            negative_hits: AtomicU64::new(0),
        }
    }

    /// The wrapped engine
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Get a snapshot of hit/miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            negative_hits: self.negative_hits.load(Ordering::Relaxed),
        }
    }

    /// Number of stored entries, positive and negative
    pub fn len(&self) -> usize {
        self.pairs.len() + self.ranked.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail with the remembered error if `digest` is known to fail.
    fn check_failure(&self, digest: &ExprDigest) -> Result<()> {
        let word = self.failures.get(digest).map(|w| w.value().clone());
        match word {
            Some(word) => {
                self.negative_hits.fetch_add(1, Ordering::Relaxed);
                debug!(?digest, %word, "Negative cache hit");
                Err(Error::NotFound { word })
            }
            None => Ok(()),
        }
    }

    /// Store a top-N result unless a result for a larger `n` is already
    /// there; racing misses for different `n` keep the widest one.
    fn remember_ranked(&self, digest: ExprDigest, n: usize, matches: &[Match]) {
        let fresh = || RankedEntry {
            n,
            matches: matches.to_vec(),
        };
        self.ranked
            .entry(digest)
            .and_modify(|entry| {
                if n > entry.n {
                    *entry = fresh();
                }
            })
            .or_insert_with(fresh);
    }

    /// Record every expression containing the missing word as failing.
    fn remember_failure<'a>(
        &self,
        err: &Error,
        exprs: impl IntoIterator<Item = (&'a Expr, ExprDigest)>,
    ) {
        let Some(word) = err.missing_word() else {
            return;
        };
        for (expr, digest) in exprs {
            if expr.contains(word) {
                self.failures.insert(digest, word.to_string());
            }
        }
    }
}

impl<C: Coser> Coser for Cache<C> {
    fn cos(&self, a: &Expr, b: &Expr) -> Result<f32> {
        let ah = ExprDigest::of(a);
        self.check_failure(&ah)?;
        let bh = ExprDigest::of(b);
        self.check_failure(&bh)?;

        let cached = self.pairs.get(&(ah, bh)).map(|v| *v);
        if let Some(value) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        match self.inner.cos(a, b) {
            Ok(value) => {
                self.pairs.insert((ah, bh), value);
                Ok(value)
            }
            Err(e) => {
                self.remember_failure(&e, [(a, ah), (b, bh)]);
                Err(e)
            }
        }
    }

    fn coses(&self, pairs: &[(Expr, Expr)]) -> Result<Vec<f32>> {
        let keys: Vec<(ExprDigest, ExprDigest)> = pairs
            .iter()
            .map(|(a, b)| (ExprDigest::of(a), ExprDigest::of(b)))
            .collect();
        for (ah, bh) in &keys {
            self.check_failure(ah)?;
            self.check_failure(bh)?;
        }

        let cached: Option<Vec<f32>> = keys
            .iter()
            .map(|k| self.pairs.get(k).map(|v| *v))
            .collect();
        if let Some(values) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(values);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        match self.inner.coses(pairs) {
            Ok(values) => {
                for (key, value) in keys.iter().zip(&values) {
                    self.pairs.insert(*key, *value);
                }
                Ok(values)
            }
            Err(e) => {
                let exprs = pairs
                    .iter()
                    .zip(&keys)
                    .flat_map(|((a, b), (ah, bh))| [(a, *ah), (b, *bh)]);
                self.remember_failure(&e, exprs);
                Err(e)
            }
        }
    }

    fn cos_n(&self, expr: &Expr, n: usize) -> Result<Vec<Match>> {
        let digest = ExprDigest::of(expr);
        self.check_failure(&digest)?;

        let cached = self
            .ranked
            .get(&digest)
            .filter(|entry| entry.n >= n)
            .map(|entry| entry.matches[..n.min(entry.matches.len())].to_vec());
        if let Some(matches) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(matches);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        match self.inner.cos_n(expr, n) {
            Ok(matches) => {
                self.remember_ranked(digest, n, &matches);
                Ok(matches)
            }
            Err(e) => {
                self.remember_failure(&e, [(expr, digest)]);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::{encode, hello_world};
    use crate::model::Model;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    /// Model wrapper counting calls per operation
    struct CountingCoser {
        model: Model,
        cos_calls: AtomicUsize,
        coses_calls: AtomicUsize,
        cos_n_calls: AtomicUsize,
    }

    impl CountingCoser {
        fn new() -> Self {
            Self {
                model: hello_world(),
                cos_calls: AtomicUsize::new(0),
                coses_calls: AtomicUsize::new(0),
                cos_n_calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> (usize, usize, usize) {
            (
                self.cos_calls.load(Ordering::SeqCst),
                self.coses_calls.load(Ordering::SeqCst),
                self.cos_n_calls.load(Ordering::SeqCst),
            )
        }
    }

    impl Coser for CountingCoser {
        fn cos(&self, a: &Expr, b: &Expr) -> Result<f32> {
            self.cos_calls.fetch_add(1, Ordering::SeqCst);
            self.model.cos(a, b)
        }

        fn coses(&self, pairs: &[(Expr, Expr)]) -> Result<Vec<f32>> {
            self.coses_calls.fetch_add(1, Ordering::SeqCst);
            self.model.coses(pairs)
        }

        fn cos_n(&self, expr: &Expr, n: usize) -> Result<Vec<Match>> {
            self.cos_n_calls.fetch_add(1, Ordering::SeqCst);
            self.model.cos_n(expr, n)
        }
    }

    #[test]
    fn test_cos_cached() {
        let cache = Cache::new(CountingCoser::new());
        let x = Expr::single("hello");
        let y = Expr::single("world");

        let first = cache.cos(&x, &y).unwrap();
        let second = cache.cos(&x, &y).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.inner().calls(), (1, 0, 0));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                negative_hits: 0
            }
        );
    }

    #[test]
    fn test_cos_key_ignores_term_order() {
        let cache = Cache::new(CountingCoser::new());
        let x = Expr::single("hello").with(0.5, "world");
        let x_reordered = Expr::new().with(0.5, "world").with(1.0, "hello");
        let y = Expr::single("world");

        cache.cos(&x, &y).unwrap();
        cache.cos(&x_reordered, &y).unwrap();
        assert_eq!(cache.inner().calls(), (1, 0, 0));

        // Pair keys are ordered
        cache.cos(&y, &x).unwrap();
        assert_eq!(cache.inner().calls(), (2, 0, 0));
    }

    #[test]
    fn test_negative_cache() {
        let cache = Cache::new(CountingCoser::new());
        let x = Expr::single("hello").with(1.0, "missing");
        let y = Expr::single("world");
        let z = Expr::single("other-missing");

        let err = cache.cos(&x, &y).unwrap_err();
        assert_eq!(err.missing_word(), Some("missing"));
        assert_eq!(cache.inner().calls(), (1, 0, 0));

        // x is remembered as failing; z is never evaluated
        let err = cache.cos(&x, &z).unwrap_err();
        assert_eq!(err.missing_word(), Some("missing"));
        let err = cache.cos_n(&x, 3).unwrap_err();
        assert_eq!(err.missing_word(), Some("missing"));
        assert_eq!(cache.inner().calls(), (1, 0, 0));
        assert_eq!(cache.stats().negative_hits, 2);

        // y did not contain the missing word
        assert_eq!(cache.cos(&y, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_other_errors_not_cached() {
        let cache = Cache::new(CountingCoser::new());
        let empty = Expr::new();
        let y = Expr::single("world");

        assert!(matches!(cache.cos(&empty, &y), Err(Error::EmptyExpression)));
        assert!(matches!(cache.cos(&empty, &y), Err(Error::EmptyExpression)));
        assert_eq!(cache.inner().calls(), (2, 0, 0));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cos_n_cached_by_expression() {
        let cache = Cache::new(CountingCoser::new());
        let x = Expr::single("hello");

        let two = cache.cos_n(&x, 2).unwrap();
        assert_eq!(two, vec![Match::new("hello", 1.0), Match::new("world", 0.0)]);

        assert_eq!(cache.cos_n(&x, 2).unwrap(), two);
        assert_eq!(cache.cos_n(&x, 1).unwrap(), vec![Match::new("hello", 1.0)]);
        assert_eq!(cache.inner().calls(), (0, 0, 1));

        // Larger n recomputes
        cache.cos_n(&x, 5).unwrap();
        cache.cos_n(&x, 3).unwrap();
        assert_eq!(cache.inner().calls(), (0, 0, 2));
    }

    #[test]
    fn test_cos_n_zero_then_larger() {
        let cache = Cache::new(CountingCoser::new());
        let x = Expr::single("hello");

        assert!(cache.cos_n(&x, 0).unwrap().is_empty());
        assert!(cache.cos_n(&x, 0).unwrap().is_empty());
        assert_eq!(cache.inner().calls(), (0, 0, 1));

        assert_eq!(cache.cos_n(&x, 2).unwrap().len(), 2);
        assert_eq!(cache.inner().calls(), (0, 0, 2));
        assert_eq!(cache.cos_n(&x, 1).unwrap(), vec![Match::new("hello", 1.0)]);
        assert!(cache.cos_n(&x, 0).unwrap().is_empty());
        assert_eq!(cache.inner().calls(), (0, 0, 2));
    }

    #[test]
    fn test_ranked_keeps_larger_n() {
        let cache = Cache::new(CountingCoser::new());
        let x = Expr::single("hello");
        let digest = ExprDigest::of(&x);
        let wide = cache.inner().model.cos_n(&x, 2).unwrap();
        let narrow = cache.inner().model.cos_n(&x, 1).unwrap();

        // A slower miss for a smaller n finishes after the wider one
        cache.remember_ranked(digest, 2, &wide);
        cache.remember_ranked(digest, 1, &narrow);

        assert_eq!(cache.cos_n(&x, 2).unwrap(), wide);
        assert_eq!(cache.inner().calls(), (0, 0, 0));
    }

    #[test]
    fn test_similar_expressions_do_not_share_failures() {
        let raw = encode(2, &[("a", &[1.0, 0.0]), ("b", &[0.0, 1.0])]);
        let cache = Cache::new(Model::from_reader(&raw[..]).unwrap());

        let missing = Expr::new().with(2.0, "a1");
        let err = cache.cos_n(&missing, 1).unwrap_err();
        assert_eq!(err.missing_word(), Some("a1"));

        let present = Expr::new().with(12.0, "a");
        assert_eq!(
            cache.cos_n(&present, 1).unwrap(),
            vec![Match::new("a", 1.0)]
        );
    }

    #[test]
    fn test_cos_n_negative_cache() {
        let cache = Cache::new(CountingCoser::new());
        let x = Expr::single("missing");

        assert!(cache.cos_n(&x, 2).is_err());
        assert!(cache.cos_n(&x, 2).is_err());
        assert!(cache.cos(&Expr::single("hello"), &x).is_err());
        assert_eq!(cache.inner().calls(), (0, 0, 1));
    }

    #[test]
    fn test_coses() {
        let cache = Cache::new(CountingCoser::new());
        let hello = Expr::single("hello");
        let world = Expr::single("world");
        let pairs = vec![(hello.clone(), world.clone()), (world.clone(), world.clone())];

        let values = cache.coses(&pairs).unwrap();
        assert_eq!(values, vec![0.0, 1.0]);
        assert_eq!(cache.coses(&pairs).unwrap(), values);
        assert_eq!(cache.inner().calls(), (0, 1, 0));

        // Batch results also serve single lookups
        assert_eq!(cache.cos(&world, &world).unwrap(), 1.0);
        assert_eq!(cache.inner().calls(), (0, 1, 0));
    }

    #[test]
    fn test_coses_negative_cache() {
        let cache = Cache::new(CountingCoser::new());
        let hello = Expr::single("hello");
        let bad = Expr::single("hello").with(1.0, "missing");
        let pairs = vec![(hello.clone(), hello.clone()), (hello.clone(), bad.clone())];

        assert!(cache.coses(&pairs).is_err());
        assert!(cache.coses(&pairs).is_err());
        assert!(cache.cos(&bad, &hello).is_err());
        assert_eq!(cache.inner().calls(), (0, 1, 0));
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(Cache::new(CountingCoser::new()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let c = cache.clone();
                thread::spawn(move || {
                    let word = if i % 2 == 0 { "hello" } else { "world" };
                    for _ in 0..50 {
                        let m = c.cos_n(&Expr::single(word), 1).unwrap();
                        assert_eq!(m[0].word, word);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 400);
        assert!(cache.inner().calls().2 >= 2);
    }
}
