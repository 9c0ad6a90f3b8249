//! Widget behaviour checks beyond plain transliteration

use tracing::{error, info, warn};
use transcheck_common::{Corpus, ScriptRange, SettleBudget, TestCase, UiCheckResult, UiOutcome};

use crate::error::E2eResult;
use crate::session::SessionFactory;

pub const REAL_TIME_UPDATE: &str = "real-time-update";
pub const CLEAR_RESETS_INPUT: &str = "clear-resets-input";

/// Corpus records whose phrases drive the checks
pub const REAL_TIME_CASE_ID: &str = "Pos_UI_0001";
pub const CLEAR_CASE_ID: &str = "Pos_UI_0002";

/// Output index as in the extraction chain
const OUTPUT_CONTROL: usize = 1;

#[derive(Debug, Clone)]
pub struct UiCheckOptions {
    pub budget: SettleBudget,
    pub script: ScriptRange,
    pub clear_button_text: String,
}

/// Typing updates the output field without any further action
pub async fn real_time_update(
    factory: &dyn SessionFactory,
    case: &TestCase,
    options: &UiCheckOptions,
) -> E2eResult<UiCheckResult> {
    let session = factory.open().await?;
    session.fill_input(&case.input).await?;
    session.settle(options.budget.settle).await?;

    let echoed = session.input_value().await?;
    let output = session
        .surface()
        .read_control_value(OUTPUT_CONTROL)
        .await
        .map(|v| v.trim().to_string());
    session.close().await?;

    let output = match output {
        Ok(output) => output,
        Err(e) => return Ok(UiCheckResult::skipped(REAL_TIME_UPDATE, e.to_string())),
    };

    let result = if echoed != case.input {
        UiCheckResult::failed(
            REAL_TIME_UPDATE,
            format!("input shows {:?}, typed {:?}", echoed, case.input),
        )
    } else if output.is_empty() {
        UiCheckResult::failed(REAL_TIME_UPDATE, "output control is empty")
    } else if !options.script.contains_target_script(&output) {
        UiCheckResult::failed(REAL_TIME_UPDATE, format!("output {:?} has no target script", output))
    } else if output != case.expected.trim() {
        UiCheckResult::failed(
            REAL_TIME_UPDATE,
            format!("output {:?}, expected {:?}", output, case.expected),
        )
    } else {
        UiCheckResult::passed(REAL_TIME_UPDATE)
    };
    Ok(result)
}

/// The clear button empties the input
pub async fn clear_resets_input(
    factory: &dyn SessionFactory,
    case: &TestCase,
    options: &UiCheckOptions,
) -> E2eResult<UiCheckResult> {
    let session = factory.open().await?;
    session.fill_input(&case.input).await?;
    session.settle(options.budget.settle).await?;

    if !session.click_text(&options.clear_button_text).await? {
        session.close().await?;
        return Ok(UiCheckResult::skipped(
            CLEAR_RESETS_INPUT,
            format!("no visible {:?} button", options.clear_button_text),
        ));
    }

    session.settle(options.budget.grace).await?;
    let remaining = session.input_value().await?;
    session.close().await?;

    if remaining.is_empty() {
        Ok(UiCheckResult::passed(CLEAR_RESETS_INPUT))
    } else {
        Ok(UiCheckResult::failed(
            CLEAR_RESETS_INPUT,
            format!("input still holds {:?}", remaining),
        ))
    }
}

/// Run both checks with phrases from `corpus`
pub async fn run_ui_checks(
    factory: &dyn SessionFactory,
    corpus: &Corpus,
    options: &UiCheckOptions,
) -> E2eResult<Vec<UiCheckResult>> {
    let mut results = Vec::new();

    results.push(match corpus.get(REAL_TIME_CASE_ID) {
        Some(case) => real_time_update(factory, case, options).await?,
        None => UiCheckResult::skipped(REAL_TIME_UPDATE, format!("{} not in corpus", REAL_TIME_CASE_ID)),
    });
    results.push(match corpus.get(CLEAR_CASE_ID) {
        Some(case) => clear_resets_input(factory, case, options).await?,
        None => UiCheckResult::skipped(CLEAR_RESETS_INPUT, format!("{} not in corpus", CLEAR_CASE_ID)),
    });

    for check in &results {
        match &check.outcome {
            UiOutcome::Passed => info!("✓ {}", check.name),
            UiOutcome::Failed(reason) => error!("✗ {} - {}", check.name, reason),
            UiOutcome::Skipped(reason) => warn!("- {} skipped: {}", check.name, reason),
        }
    }

    Ok(results)
}
