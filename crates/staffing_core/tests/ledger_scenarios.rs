use rust_decimal::Decimal;
use staffing_core::{
    reconcile, BaselineAllocation, BaselineTotals, CommitError, CommitPlan, ConstraintStatus,
    ContractRegime, DecimalSeparator, EditSession, ExistingAllocation, InMemoryCapacitySource,
    LifecycleState, OccupancyValue, Person, ReconcileInput, SlotWindow, StaffingConfig,
    StaffingService, TimeSlot, ValueNormalizer, WorkItemContext,
};
use std::cell::RefCell;
use uuid::Uuid;

#[derive(Default)]
struct RecordingSink {
    plans: RefCell<Vec<CommitPlan>>,
}

impl staffing_core::AllocationSink for RecordingSink {
    fn submit(&self, plan: &CommitPlan) {
        self.plans.borrow_mut().push(plan.clone());
    }
}

fn march() -> TimeSlot {
    TimeSlot::new(3, 2025).unwrap()
}

fn context(lifecycle: LifecycleState) -> WorkItemContext {
    WorkItemContext {
        work_item_id: Uuid::new_v4(),
        lifecycle,
        window: SlotWindow::between(march(), march(), 120).unwrap(),
    }
}

fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}

fn service_with_baseline(
    lifecycle: LifecycleState,
    person: &Person,
    approved: &str,
    pending: &str,
) -> StaffingService<InMemoryCapacitySource, RecordingSink> {
    let mut service = StaffingService::new(
        &StaffingConfig::default(),
        context(lifecycle),
        InMemoryCapacitySource::new(),
        RecordingSink::default(),
    );
    let request = service.select_person(person.clone()).unwrap();
    let mut baseline = staffing_core::BaselineMap::new();
    baseline.insert(march(), BaselineTotals::new(dec(approved), dec(pending)));
    service.apply_baseline(&request, Ok(baseline));
    service
}

#[test]
fn scenario_a_near_limit_still_commits() {
    let ada = Person::new("Ada", ContractRegime::FullTime);
    let mut service = service_with_baseline(LifecycleState::Approved, &ada, "0.6", "0");

    let update = service.set_slot_value(march(), "0,3").unwrap();
    let row = &update.preview.rows[0];
    assert_eq!(row.assessment.approved, dec("0.9"));
    assert_eq!(row.assessment.status, ConstraintStatus::NearLimit);
    assert!(update.preview.can_commit);

    let plan = service.commit().unwrap();
    assert_eq!(plan.allocations.len(), 1);
    assert_eq!(plan.allocations[0].value.as_decimal(), dec("0.3"));
    assert_eq!(service.sink().plans.borrow().len(), 1);
}

#[test]
fn scenario_b_over_allocation_is_refused_naming_the_slot() {
    let ada = Person::new("Ada", ContractRegime::FullTime);
    let mut service = service_with_baseline(LifecycleState::Approved, &ada, "0.6", "0");

    let update = service.set_slot_value(march(), "0.5").unwrap();
    assert_eq!(update.preview.rows[0].assessment.approved, dec("1.1"));
    assert_eq!(
        update.preview.rows[0].assessment.status,
        ConstraintStatus::OverAllocated
    );
    assert!(!update.preview.can_commit);

    match service.commit() {
        Err(CommitError::OverAllocated(refusal)) => {
            assert_eq!(refusal.offending.len(), 1);
            assert_eq!(refusal.offending[0].slot, march());
            assert_eq!(refusal.offending[0].approved_percent, dec("110"));
        }
        other => panic!("expected refusal, got {other:?}"),
    }
    assert!(service.sink().plans.borrow().is_empty());
}

#[test]
fn scenario_c_reediting_subtracts_the_replaced_allocation() {
    let ada = Person::new("Ada", ContractRegime::FullTime);
    let mut values = BaselineAllocation::new();
    values.insert(march(), OccupancyValue::clamped(dec("0.4")));
    let mut service = StaffingService::for_existing(
        &StaffingConfig::default(),
        context(LifecycleState::Approved),
        ExistingAllocation {
            person_id: ada.id,
            values,
        },
        InMemoryCapacitySource::new(),
        RecordingSink::default(),
    );
    let request = service.select_person(ada).unwrap();
    let mut baseline = staffing_core::BaselineMap::new();
    baseline.insert(march(), BaselineTotals::new(dec("0.6"), Decimal::ZERO));
    service.apply_baseline(&request, Ok(baseline));

    let update = service.set_slot_value(march(), "0,4").unwrap();
    assert_eq!(update.preview.rows[0].assessment.approved, dec("0.6"));
    assert_eq!(update.preview.rows[0].assessment.status, ConstraintStatus::Normal);
}

#[test]
fn scenario_d_pending_bucket_never_blocks() {
    let ada = Person::new("Ada", ContractRegime::FullTime);
    let mut service = service_with_baseline(LifecycleState::Draft, &ada, "0.9", "0.2");

    let update = service.set_slot_value(march(), "0,5").unwrap();
    let row = &update.preview.rows[0];
    assert_eq!(row.assessment.pending, dec("0.7"));
    assert_eq!(row.assessment.approved, dec("0.9"));
    assert!(update.preview.can_commit);
    assert!(service.commit().is_ok());
}

#[test]
fn reconciling_identical_state_is_idempotent() {
    let normalizer = ValueNormalizer::new(DecimalSeparator::Comma);
    let mut session = EditSession::new(context(LifecycleState::InProgress), normalizer);
    let request = session
        .select_person(Person::new("Ada", ContractRegime::FullTime))
        .unwrap();
    let mut baseline = staffing_core::BaselineMap::new();
    baseline.insert(march(), BaselineTotals::new(dec("0.35"), dec("0.1")));
    session.apply_baseline(&request, Ok(baseline));
    session.set_slot_value(march(), "0,2").unwrap();

    let first = reconcile(&ReconcileInput::from_session(&session));
    let second = reconcile(&ReconcileInput::from_session(&session));
    assert_eq!(first, second);
    assert_eq!(first[0].approved, dec("0.55"));
}

#[test]
fn normalized_inputs_stay_in_unit_range() {
    let normalizer = ValueNormalizer::default();
    for raw in ["0", "1", "0,5", "0.33", ""] {
        let value = normalizer.parse(raw).as_decimal();
        assert!(value >= Decimal::ZERO && value <= Decimal::ONE, "{raw} -> {value}");
    }
}

#[test]
fn commit_after_success_closes_the_session() {
    let ada = Person::new("Ada", ContractRegime::PartTime);
    let mut service = service_with_baseline(LifecycleState::Approved, &ada, "0", "0");
    service.fill_all("0,5").unwrap();
    service.commit().unwrap();

    assert_eq!(service.commit(), Err(CommitError::NoActiveSession));
    assert!(service.set_slot_value(march(), "0,1").is_err());
}

fn deliver(
    service: &mut StaffingService<InMemoryCapacitySource, RecordingSink>,
    person: &Person,
    approved: &str,
    pending: &str,
) {
    let request = service.select_person(person.clone()).unwrap();
    let mut baseline = staffing_core::BaselineMap::new();
    baseline.insert(march(), BaselineTotals::new(dec(approved), dec(pending)));
    service.apply_baseline(&request, Ok(baseline));
}

fn existing_service(
    lifecycle: LifecycleState,
    owner: &Person,
    value: &str,
) -> StaffingService<InMemoryCapacitySource, RecordingSink> {
    let mut values = BaselineAllocation::new();
    values.insert(march(), OccupancyValue::clamped(dec(value)));
    StaffingService::for_existing(
        &StaffingConfig::default(),
        context(lifecycle),
        ExistingAllocation {
            person_id: owner.id,
            values,
        },
        InMemoryCapacitySource::new(),
        RecordingSink::default(),
    )
}

#[test]
fn reselecting_the_owner_restores_the_replaced_allocation() {
    let ada = Person::new("Ada", ContractRegime::FullTime);
    let bob = Person::new("Bob", ContractRegime::FullTime);
    let mut service = existing_service(LifecycleState::Approved, &ada, "0.4");

    deliver(&mut service, &ada, "0.6", "0");
    let first = service.set_slot_value(march(), "0,4").unwrap();
    assert_eq!(first.preview.rows[0].assessment.approved, dec("0.6"));

    deliver(&mut service, &bob, "0.6", "0");
    let other = service.preview();
    assert_eq!(other.rows[0].assessment.approved, dec("1"));
    assert!(!service.session().is_editing_existing());

    deliver(&mut service, &ada, "0.6", "0");
    let again = service.preview();
    assert_eq!(again.rows[0].assessment.approved, dec("0.6"));
    assert_eq!(again.rows[0].assessment.status, ConstraintStatus::Normal);
    assert!(service.session().is_editing_existing());

    let plan = service.commit().unwrap();
    assert_eq!(plan.mode, staffing_core::CommitMode::Replace);
    assert_eq!(plan.person_id, ada.id);
}

#[test]
fn draft_reediting_moves_only_the_pending_bucket() {
    let ada = Person::new("Ada", ContractRegime::PartTime);
    let mut service = existing_service(LifecycleState::Draft, &ada, "0.4");
    deliver(&mut service, &ada, "0.5", "0.7");

    let update = service.set_slot_value(march(), "0,1").unwrap();
    let row = &update.preview.rows[0];
    assert_eq!(row.assessment.approved, dec("0.5"));
    assert_eq!(row.assessment.pending, dec("0.4"));
    assert!(update.preview.can_commit);
}

#[test]
fn extreme_baseline_refuses_commit_instead_of_panicking() {
    let ada = Person::new("Ada", ContractRegime::FullTime);
    let mut service = StaffingService::new(
        &StaffingConfig::default(),
        context(LifecycleState::Approved),
        InMemoryCapacitySource::new(),
        RecordingSink::default(),
    );
    let request = service.select_person(ada).unwrap();
    let mut baseline = staffing_core::BaselineMap::new();
    baseline.insert(march(), BaselineTotals::new(Decimal::MAX, Decimal::MAX));
    service.apply_baseline(&request, Ok(baseline));

    let update = service.set_slot_value(march(), "1").unwrap();
    assert!(!update.preview.can_commit);
    assert!(matches!(service.commit(), Err(CommitError::OverAllocated(_))));
    assert!(service.sink().plans.borrow().is_empty());
}
