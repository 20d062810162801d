//! Staffing ledger smoke CLI.
//!
//! # Responsibility
//! - Without arguments: print the core linkage probe.
//! - With a scenario path: replay it through the core and print the ledger
//!   preview and commit verdict.

mod scenario;

use log::{info, warn};
use scenario::{Scenario, ScenarioError};
use staffing_core::{
    AllocationSink, CommitPlan, ExistingAllocation, InMemoryCapacitySource, LedgerPreview,
    Person, SlotWindow, StaffingService, ValueNormalizer, WorkItemContext,
};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "STAFFING_LOG_DIR";

struct PrintingSink;

impl AllocationSink for PrintingSink {
    fn submit(&self, plan: &CommitPlan) {
        println!(
            "commit mode={:?} allocations={}",
            plan.mode,
            plan.allocations.len()
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = staffing_core::init_logging(staffing_core::default_log_level(), &log_dir)
        {
            eprintln!("logging disabled: {err}");
        }
    }

    let Some(path) = std::env::args().nth(1) else {
        println!("staffing_core ping={}", staffing_core::ping());
        println!("staffing_core version={}", staffing_core::core_version());
        return ExitCode::SUCCESS;
    };

    match run(&path).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the scenario's edit was committed.
async fn run(path: &str) -> Result<bool, ScenarioError> {
    let scenario = Scenario::from_path(path)?;
    info!(
        "event=scenario_loaded module=cli status=ok work_item={} inputs={}",
        scenario.work_item.id,
        scenario.inputs.len()
    );
    let config = &scenario.config;
    let normalizer = ValueNormalizer::new(config.decimal_separator);

    let window = SlotWindow::from_period(
        scenario.work_item.start,
        scenario.work_item.end,
        config.max_window_slots,
    )?;
    let context = WorkItemContext {
        work_item_id: scenario.work_item.id,
        lifecycle: scenario.work_item.lifecycle,
        window,
    };
    let person = Person::new(
        scenario.person.display_name.clone(),
        scenario.person.contract,
    );

    let mut source = InMemoryCapacitySource::new();
    for row in &scenario.baseline {
        source.insert(person.id, row.slot, row.totals);
    }

    let existing = scenario.existing_values(normalizer);
    let mut service = if existing.is_empty() {
        StaffingService::new(config, context, source, PrintingSink)
    } else {
        StaffingService::for_existing(
            config,
            context,
            ExistingAllocation {
                person_id: person.id,
                values: existing,
            },
            source,
            PrintingSink,
        )
    };

    let outcome = service.select_and_load(person).await?;
    println!("baseline {outcome:?}");
    info!("event=scenario_baseline module=cli status=ok outcome={outcome:?}");

    if let Some(raw) = &scenario.fill_all {
        service.fill_all(raw)?;
    }
    for input in &scenario.inputs {
        let update = service.set_slot_value(input.slot, &input.raw)?;
        for crossing in &update.crossings {
            println!("advisory {} crossed {:?}", crossing.slot, crossing.direction);
        }
    }

    print_preview(&service.preview());
    match service.commit() {
        Ok(plan) => {
            info!(
                "event=scenario_committed module=cli status=ok allocations={}",
                plan.allocations.len()
            );
            Ok(true)
        }
        Err(err) => {
            warn!(
                "event=scenario_refused module=cli status=error work_item={}",
                service.session().context().work_item_id
            );
            println!("refused: {err}");
            Ok(false)
        }
    }
}

fn print_preview(preview: &LedgerPreview) {
    for row in &preview.rows {
        println!(
            "{} input={} approved={} pending={} status={}",
            row.assessment.slot,
            row.input_text,
            row.assessment.approved,
            row.assessment.pending,
            row.assessment.status.as_str()
        );
    }
    if preview.baseline_unavailable {
        println!("warning: baseline unavailable, totals assume zero");
    }
    println!("can_commit={}", preview.can_commit);
}
