//! Runner tests against in-memory sessions, no browser needed

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use transcheck_common::{
    Category, Corpus, FailureReason, LengthClass, RenderingSurface, ScriptRange, SettleBudget,
    SnapshotSurface, SurfaceSnapshot, TestCase, UiOutcome, Verdict, Verifier,
};
use transcheck_e2e::{
    run_ui_checks, E2eError, E2eResult, RunnerOptions, Session, SessionFactory, SuiteRunner,
    UiCheckOptions,
};

/// What the page shows once a phrase has been typed
#[derive(Clone, Default)]
struct Page {
    snapshot: SurfaceSnapshot,
    delay: Duration,
}

#[derive(Default)]
struct StubFactory {
    pages: HashMap<String, Page>,
    unreachable: bool,
    broken_inputs: Vec<String>,
    has_clear_button: bool,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

impl StubFactory {
    fn page(mut self, input: &str, output: &str, delay_ms: u64) -> Self {
        self.pages.insert(
            input.to_string(),
            Page {
                snapshot: SurfaceSnapshot {
                    controls: vec![input.to_string(), output.to_string()],
                    regions: Vec::new(),
                },
                delay: Duration::from_millis(delay_ms),
            },
        );
        self
    }
}

struct StubSession {
    pages: HashMap<String, Page>,
    broken_inputs: Vec<String>,
    has_clear_button: bool,
    input: Mutex<String>,
    surface: OnceLock<SnapshotSurface>,
    closed: Arc<AtomicUsize>,
}

static BLANK: OnceLock<SnapshotSurface> = OnceLock::new();

#[async_trait]
impl Session for StubSession {
    async fn fill_input(&self, text: &str) -> E2eResult<()> {
        if self.broken_inputs.iter().any(|b| b == text) {
            return Err(E2eError::Driver(format!("fill rejected {:?}", text)));
        }
        *self.input.lock().unwrap() = text.to_string();
        let page = self.pages.get(text).cloned().unwrap_or_default();
        let _ = self.surface.set(SnapshotSurface::new(page.snapshot));
        Ok(())
    }

    async fn settle(&self, _duration: Duration) -> E2eResult<()> {
        let input = self.input.lock().unwrap().clone();
        if let Some(page) = self.pages.get(&input) {
            tokio::time::sleep(page.delay).await;
        }
        Ok(())
    }

    async fn input_value(&self) -> E2eResult<String> {
        Ok(self.input.lock().unwrap().clone())
    }

    async fn click_text(&self, text: &str) -> E2eResult<bool> {
        if self.has_clear_button && text == "Clear" {
            self.input.lock().unwrap().clear();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn surface(&self) -> &dyn RenderingSurface {
        self.surface
            .get()
            .unwrap_or_else(|| BLANK.get_or_init(SnapshotSurface::default))
    }

    async fn close(self: Box<Self>) -> E2eResult<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl SessionFactory for StubFactory {
    async fn preflight(&self) -> E2eResult<()> {
        if self.unreachable {
            Err(E2eError::SurfaceUnavailable("stub target is down".into()))
        } else {
            Ok(())
        }
    }

    async fn open(&self) -> E2eResult<Box<dyn Session>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubSession {
            pages: self.pages.clone(),
            broken_inputs: self.broken_inputs.clone(),
            has_clear_button: self.has_clear_button,
            input: Mutex::new(String::new()),
            surface: OnceLock::new(),
            closed: self.closed.clone(),
        }))
    }

    fn target(&self) -> &str {
        "stub://translator"
    }
}

fn case(id: &str, input: &str, expected: &str) -> TestCase {
    TestCase {
        id: id.to_string(),
        name: format!("{} case", id),
        category: Category::Positive,
        length_class: LengthClass::S,
        input: input.to_string(),
        expected: expected.to_string(),
    }
}

fn corpus(cases: Vec<TestCase>) -> Corpus {
    Corpus::new("inline", cases).unwrap()
}

fn runner(factory: Arc<StubFactory>, concurrency: usize, fail_fast: bool) -> SuiteRunner {
    SuiteRunner::new(
        factory,
        Verifier::default(),
        RunnerOptions {
            budget: SettleBudget::immediate(),
            concurrency,
            fail_fast,
        },
    )
}

#[tokio::test]
async fn test_results_keep_corpus_order_under_concurrency() {
    let factory = Arc::new(
        StubFactory::default()
            .page("mama yanavaa", "මම යනවා", 80)
            .page("api", "අපි", 5)
            .page("oyaa", "ඔයා", 30),
    );
    let corpus = corpus(vec![
        case("A", "mama yanavaa", "මම යනවා"),
        case("B", "api", "අපි"),
        case("C", "oyaa", "ඔයා"),
    ]);

    let report = runner(factory.clone(), 3, false).run(&corpus).await.unwrap();

    let ids: Vec<_> = report.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(report.passed, 3);
    assert!(report.all_passed());
    assert_eq!(factory.opened.load(Ordering::SeqCst), 3);
    assert_eq!(factory.closed.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_failures_are_reported_not_raised() {
    let factory = Arc::new(
        StubFactory::default()
            .page("mama giyaa", "මම ගියා", 0)
            .page("hello", "hello", 0),
    );
    let corpus = corpus(vec![
        case("Mismatch", "mama giyaa", "මම යනවා"),
        case("Latin", "hello", "හෙලෝ"),
        case("Blank", "nothing renders", "අ"),
    ]);

    let report = runner(factory, 1, false).run(&corpus).await.unwrap();

    assert_eq!(report.failed, 3);
    let reasons: Vec<_> = report.failures.iter().map(|f| f.reason).collect();
    assert_eq!(
        reasons,
        vec![
            Some(FailureReason::Mismatch),
            Some(FailureReason::NoTargetScript),
            Some(FailureReason::EmptyOutput),
        ]
    );
    assert_eq!(report.failures[0].cleaned_payload, "මම ගියා");
    assert_eq!(report.failures[0].expected, "මම යනවා");
}

#[tokio::test]
async fn test_fail_fast_stops_scheduling() {
    let factory = Arc::new(
        StubFactory::default()
            .page("a", "අ", 0)
            .page("b", "බ", 0),
    );
    let corpus = corpus(vec![
        case("P1", "a", "අ"),
        case("F1", "b", "ක"),
        case("P2", "a", "අ"),
        case("P3", "a", "අ"),
    ]);

    let report = runner(factory.clone(), 1, true).run(&corpus).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[1].verdict, Verdict::Fail);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.total, 4);
    assert_eq!(factory.opened.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unreachable_target_aborts_before_any_session() {
    let factory = Arc::new(StubFactory {
        unreachable: true,
        ..Default::default()
    });
    let corpus = corpus(vec![case("A", "a", "අ")]);

    let err = runner(factory.clone(), 1, false).run(&corpus).await.unwrap_err();

    assert!(matches!(err, E2eError::SurfaceUnavailable(_)));
    assert_eq!(factory.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_fill_is_fatal() {
    let factory = Arc::new(StubFactory {
        broken_inputs: vec!["b".to_string()],
        ..Default::default()
    }.page("a", "අ", 0));
    let corpus = corpus(vec![case("A", "a", "අ"), case("B", "b", "බ")]);

    let err = runner(factory, 1, false).run(&corpus).await.unwrap_err();
    assert!(matches!(err, E2eError::Driver(_)));
}

fn ui_options() -> UiCheckOptions {
    UiCheckOptions {
        budget: SettleBudget::immediate(),
        script: ScriptRange::default(),
        clear_button_text: "Clear".to_string(),
    }
}

fn ui_corpus() -> Corpus {
    corpus(vec![
        case("Pos_UI_0001", "saamaajika gaasthu", "සාමාජික ගාස්තු"),
        case("Pos_UI_0002", "api sellam karamu", "අපි සෙල්ලම් කරමු"),
    ])
}

#[tokio::test]
async fn test_ui_checks_pass_with_clear_button() {
    let factory = StubFactory {
        has_clear_button: true,
        ..Default::default()
    }
    .page("saamaajika gaasthu", " සාමාජික ගාස්තු ", 0)
    .page("api sellam karamu", "අපි සෙල්ලම් කරමු", 0);

    let checks = run_ui_checks(&factory, &ui_corpus(), &ui_options()).await.unwrap();

    assert_eq!(checks.len(), 2);
    assert!(checks.iter().all(|c| c.outcome == UiOutcome::Passed));
}

#[tokio::test]
async fn test_ui_checks_skip_missing_button_and_flag_wrong_output() {
    let factory = StubFactory::default()
        .page("saamaajika gaasthu", "සාමාජික", 0)
        .page("api sellam karamu", "අපි සෙල්ලම් කරමු", 0);

    let checks = run_ui_checks(&factory, &ui_corpus(), &ui_options()).await.unwrap();

    assert!(matches!(checks[0].outcome, UiOutcome::Failed(_)));
    assert!(matches!(checks[1].outcome, UiOutcome::Skipped(_)));
}

#[tokio::test]
async fn test_ui_checks_skip_when_phrases_missing() {
    let factory = StubFactory::default();
    let checks = run_ui_checks(&factory, &corpus(vec![]), &ui_options()).await.unwrap();

    assert!(checks.iter().all(|c| matches!(c.outcome, UiOutcome::Skipped(_))));
    assert_eq!(factory.opened.load(Ordering::SeqCst), 0);
}
