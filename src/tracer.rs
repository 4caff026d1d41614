//! Tracer trait for observing how query methods are described.
//!
//! This module defines the [`Tracer`] trait and related types for observing
//! descriptor construction. The default [`NoopTracer`] discards everything.
//!
//! # Example
//!
//! ```
//! use query_shape::{DescribeOutcome, MethodSignature, QueryMethodAnalyzer, SpanId, Tracer};
//!
//! struct PrintTracer;
//!
//! impl Tracer for PrintTracer {
//!     fn new_span_id(&self) -> SpanId {
//!         SpanId(1)
//!     }
//!
//!     fn on_describe_end(&self, _span_id: SpanId, method: &MethodSignature, outcome: &DescribeOutcome) {
//!         println!("{method}: {outcome:?}");
//!     }
//! }
//!
//! let analyzer = QueryMethodAnalyzer::builder().tracer(PrintTracer).build();
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ValidationError;
use crate::parameter::ParameterList;
use crate::shape::{ReturnShape, ShapeKind};
use crate::signature::{MethodKey, MethodSignature};

/// Identifier correlating the events of one describe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(pub u64);

/// How a describe call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescribeOutcome {
    /// A descriptor was built.
    Described {
        /// The resolved return shape.
        shape: ShapeKind,
    },
    /// The signature was rejected.
    Rejected {
        /// The validation failure.
        error: ValidationError,
    },
}

/// Tracer trait for observing descriptor construction.
///
/// Implementations can collect events for testing, forward them to a logging
/// backend, or feed diagnostics tooling.
///
/// All methods except [`new_span_id`](Tracer::new_span_id) have empty default
/// implementations, so only the interesting events need overriding.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: an analyzer is shared across
/// threads and so is its tracer.
pub trait Tracer: Send + Sync + 'static {
    /// Generate a new span ID. Called once per describe call.
    fn new_span_id(&self) -> SpanId;

    /// Called before anything is derived from the signature.
    #[inline]
    fn on_describe_start(&self, _span_id: SpanId, _method: &MethodSignature) {}

    /// Called once the parameter roles are known.
    #[inline]
    fn on_parameters_classified(&self, _span_id: SpanId, _parameters: &ParameterList) {}

    /// Called once the return shape is resolved, before validation.
    #[inline]
    fn on_return_shape_resolved(&self, _span_id: SpanId, _shape: &ReturnShape) {}

    /// Called when the describe call ends, successfully or not.
    #[inline]
    fn on_describe_end(
        &self,
        _span_id: SpanId,
        _method: &MethodSignature,
        _outcome: &DescribeOutcome,
    ) {
    }

    /// Called when a repository method cache returns an existing descriptor.
    #[inline]
    fn on_cache_hit(&self, _key: &MethodKey) {}
}

/// Tracer that discards all events.
///
/// This is the default tracer of [`QueryMethodAnalyzer`](crate::QueryMethodAnalyzer).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

static NOOP_SPAN_COUNTER: AtomicU64 = AtomicU64::new(1);

impl Tracer for NoopTracer {
    #[inline(always)]
    fn new_span_id(&self) -> SpanId {
        SpanId(NOOP_SPAN_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    struct CountingTracer {
        start_count: AtomicUsize,
        end_count: AtomicUsize,
    }

    impl Tracer for CountingTracer {
        fn new_span_id(&self) -> SpanId {
            SpanId(1)
        }

        fn on_describe_start(&self, _span_id: SpanId, _method: &MethodSignature) {
            self.start_count.fetch_add(1, Ordering::Relaxed);
        }

        fn on_describe_end(
            &self,
            _span_id: SpanId,
            _method: &MethodSignature,
            _outcome: &DescribeOutcome,
        ) {
            self.end_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_noop_tracer_span_id() {
        let tracer = NoopTracer;
        let id1 = tracer.new_span_id();
        let id2 = tracer.new_span_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_counting_tracer() {
        let tracer = CountingTracer {
            start_count: AtomicUsize::new(0),
            end_count: AtomicUsize::new(0),
        };
        let method = MethodSignature::new("find_all");

        tracer.on_describe_start(SpanId(1), &method);
        tracer.on_describe_start(SpanId(2), &method);
        tracer.on_describe_end(
            SpanId(1),
            &method,
            &DescribeOutcome::Described {
                shape: ShapeKind::Single,
            },
        );

        assert_eq!(tracer.start_count.load(Ordering::Relaxed), 2);
        assert_eq!(tracer.end_count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_tracer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoopTracer>();
        assert_send_sync::<Arc<CountingTracer>>();
    }
}
