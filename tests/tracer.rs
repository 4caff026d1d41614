//! Tests for tracer events emitted while describing query methods.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use query_shape::{
    DescribeOutcome, MethodKey, MethodSignature, ParameterList, QueryMethodAnalyzer,
    RepositoryInfo, RepositoryMethods, ReturnShape, ShapeKind, SpanId, Tracer, TypeRef,
    ValidationError,
};

// ============================================================================
// Recording Tracer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Start(SpanId, String),
    Parameters(SpanId, usize),
    Shape(SpanId, ShapeKind),
    End(SpanId, String, DescribeOutcome),
    CacheHit(String),
}

#[derive(Clone, Default)]
struct RecordingTracer {
    next_span: Arc<AtomicU64>,
    events: Arc<Mutex<Vec<Event>>>,
}

impl Tracer for RecordingTracer {
    fn new_span_id(&self) -> SpanId {
        SpanId(self.next_span.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn on_describe_start(&self, span_id: SpanId, method: &MethodSignature) {
        self.events
            .lock()
            .push(Event::Start(span_id, method.name().to_string()));
    }

    fn on_parameters_classified(&self, span_id: SpanId, parameters: &ParameterList) {
        self.events
            .lock()
            .push(Event::Parameters(span_id, parameters.len()));
    }

    fn on_return_shape_resolved(&self, span_id: SpanId, shape: &ReturnShape) {
        self.events.lock().push(Event::Shape(span_id, shape.kind()));
    }

    fn on_describe_end(&self, span_id: SpanId, method: &MethodSignature, outcome: &DescribeOutcome) {
        self.events.lock().push(Event::End(
            span_id,
            method.name().to_string(),
            outcome.clone(),
        ));
    }

    fn on_cache_hit(&self, key: &MethodKey) {
        self.events.lock().push(Event::CacheHit(key.to_string()));
    }
}

fn setup() -> (RecordingTracer, QueryMethodAnalyzer) {
    let tracer = RecordingTracer::default();
    let analyzer = QueryMethodAnalyzer::builder().tracer(tracer.clone()).build();
    (tracer, analyzer)
}

fn users() -> Arc<RepositoryInfo> {
    Arc::new(RepositoryInfo::for_domain(TypeRef::named("User")))
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_events_for_described_method() {
    let (tracer, analyzer) = setup();
    let method = MethodSignature::new("find_all")
        .param("page", TypeRef::named("Pageable"))
        .returns(TypeRef::generic("Page", [TypeRef::named("User")]));

    analyzer.describe(method, users()).unwrap();

    let span = SpanId(1);
    assert_eq!(
        *tracer.events.lock(),
        vec![
            Event::Start(span, "find_all".to_string()),
            Event::Parameters(span, 1),
            Event::Shape(span, ShapeKind::Page),
            Event::End(
                span,
                "find_all".to_string(),
                DescribeOutcome::Described {
                    shape: ShapeKind::Page
                }
            ),
        ]
    );
}

#[test]
fn test_events_for_rejected_method() {
    let (tracer, analyzer) = setup();
    let method = MethodSignature::new("find_all")
        .param("first", TypeRef::named("Sort"))
        .param("second", TypeRef::named("Sort"));

    let err = analyzer.describe(method, users()).unwrap_err();

    let events = tracer.events.lock();
    // Classification failed, so no parameter or shape event was emitted.
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Event::Start(..)));
    assert_eq!(
        events[1],
        Event::End(
            SpanId(1),
            "find_all".to_string(),
            DescribeOutcome::Rejected { error: err.clone() }
        )
    );
    assert!(matches!(err, ValidationError::MalformedSignature { .. }));
}

#[test]
fn test_span_ids_are_distinct_per_describe() {
    let (tracer, analyzer) = setup();
    analyzer
        .describe(MethodSignature::new("count"), users())
        .unwrap();
    analyzer
        .describe(MethodSignature::new("exists"), users())
        .unwrap();

    let spans: Vec<_> = tracer
        .events
        .lock()
        .iter()
        .filter_map(|e| match e {
            Event::Start(span, _) => Some(*span),
            _ => None,
        })
        .collect();
    assert_eq!(spans, vec![SpanId(1), SpanId(2)]);
}

#[test]
fn test_cache_hit_event() {
    let (tracer, analyzer) = setup();
    let repository = RepositoryMethods::new(users(), analyzer);
    let method = MethodSignature::new("find_by_name")
        .param("name", TypeRef::named("String"))
        .returns(TypeRef::generic("Vec", [TypeRef::named("User")]));

    repository.describe(method.clone()).unwrap();
    repository.describe(method).unwrap();

    let events = tracer.events.lock();
    assert_eq!(
        events.last(),
        Some(&Event::CacheHit("find_by_name(String)".to_string()))
    );
    let starts = events
        .iter()
        .filter(|e| matches!(e, Event::Start(..)))
        .count();
    assert_eq!(starts, 1);
}
