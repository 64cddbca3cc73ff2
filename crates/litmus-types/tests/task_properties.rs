//! Property tests for the task parameter model.

use litmus_types::{
    BudgetPolicy, LITMUS_HIGHEST_PRIORITY, LITMUS_LOWEST_PRIORITY, ReleasePolicy, RtTask,
    TaskClass, class_from_label, default_task_parameters,
};
use quickcheck_macros::quickcheck;

#[quickcheck]
fn only_the_three_labels_parse(label: String) -> bool {
    let known = matches!(label.as_str(), "hrt" | "srt" | "be");
    class_from_label(&label).is_ok() == known
}

#[quickcheck]
fn label_round_trips(index: u8) -> bool {
    let cls = [
        TaskClass::HardRealTime,
        TaskClass::SoftRealTime,
        TaskClass::BestEffort,
    ][usize::from(index % 3)];
    class_from_label(cls.label()) == Ok(cls)
}

#[quickcheck]
fn effective_deadline_defaults_to_period(exec_cost: u64, period: u64) -> bool {
    let task = RtTask {
        exec_cost,
        period,
        ..default_task_parameters()
    };
    task.has_implicit_deadline() && task.effective_deadline() == period
}

#[quickcheck]
fn validation_accepts_implicit_deadline_tasks(exec_cost: u32, slack: u32, priority: u16) -> bool {
    let exec_cost = u64::from(exec_cost).max(1);
    let period = exec_cost + u64::from(slack);
    let priority =
        u32::from(priority) % (LITMUS_LOWEST_PRIORITY - LITMUS_HIGHEST_PRIORITY + 1)
            + LITMUS_HIGHEST_PRIORITY;

    RtTask::builder()
        .exec_cost(exec_cost)
        .period(period)
        .priority(priority)
        .build()
        .is_ok()
}

#[quickcheck]
fn validation_rejects_deadline_shorter_than_cost(exec_cost: u32, deadline: u32) -> bool {
    let exec_cost = u64::from(exec_cost) + 2;
    let deadline = (u64::from(deadline) % (exec_cost - 1)) + 1;

    RtTask::builder()
        .exec_cost(exec_cost)
        .period(exec_cost * 2)
        .relative_deadline(deadline)
        .build()
        .is_err()
}

#[test]
fn defaults_are_stable() {
    let a = default_task_parameters();
    let b = RtTask::new();
    assert_eq!(a, b);
    assert_eq!(a.budget_policy, BudgetPolicy::NoEnforcement);
    assert_eq!(a.release_policy, ReleasePolicy::Sporadic);
}
