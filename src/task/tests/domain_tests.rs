//! Unit tests for task creation, effort tracking, and date invariants.

use crate::error::DomainError;
use crate::ids::UserId;
use crate::project::domain::ProjectId;
use crate::task::domain::{NewTaskData, ParseTaskStateError, Task, TaskState};
use eyre::ensure;
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn new_task_data(title: &str) -> NewTaskData {
    NewTaskData {
        project: ProjectId::new(),
        title: title.to_owned(),
        description: None,
        estimated_hours: 0,
        author: UserId::new(),
        assignee: None,
        due_on: None,
    }
}

#[fixture]
fn task(clock: DefaultClock) -> Result<Task, DomainError> {
    Task::new(new_task_data("Index the backlog"), &clock)
}

#[rstest]
fn new_task_opens_with_author_and_no_effort(clock: DefaultClock) -> eyre::Result<()> {
    let author = UserId::new();
    let assignee = UserId::new();
    let project = ProjectId::new();
    let due = clock.utc();

    let task = Task::new(
        NewTaskData {
            project,
            title: "Index the backlog".to_owned(),
            description: Some("Sweep stale entries".to_owned()),
            estimated_hours: 8,
            author,
            assignee: Some(assignee),
            due_on: Some(due),
        },
        &clock,
    )?;

    ensure!(task.state() == TaskState::Opened);
    ensure!(task.project() == project);
    ensure!(task.author() == Some(author));
    ensure!(task.assignee() == Some(assignee));
    ensure!(task.estimated_hours() == 8);
    ensure!(task.hours_spent() == 0);
    ensure!(task.due_on() == Some(due));
    ensure!(task.started_on().is_none());
    ensure!(task.ended_on().is_none());
    Ok(())
}

#[rstest]
#[case("")]
#[case("   ")]
fn blank_title_is_rejected(#[case] title: &str, clock: DefaultClock) {
    let result = Task::new(new_task_data(title), &clock);
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[rstest]
fn negative_estimate_is_rejected(clock: DefaultClock) {
    let mut data = new_task_data("Estimate check");
    data.estimated_hours = -1;
    let result = Task::new(data, &clock);
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[rstest]
fn logged_hours_accumulate(clock: DefaultClock, task: Result<Task, DomainError>) -> eyre::Result<()> {
    let mut task = task?;

    task.log_hours(3, &clock)?;
    task.log_hours(2, &clock)?;

    ensure!(task.hours_spent() == 5);
    Ok(())
}

#[rstest]
fn negative_logged_hours_are_rejected(
    clock: DefaultClock,
    task: Result<Task, DomainError>,
) -> eyre::Result<()> {
    let mut task = task?;
    task.log_hours(4, &clock)?;

    let result = task.log_hours(-1, &clock);
    ensure!(matches!(result, Err(DomainError::InvalidArgument(_))));
    ensure!(task.hours_spent() == 4);
    Ok(())
}

#[rstest]
fn logged_hours_saturate_instead_of_overflowing(
    clock: DefaultClock,
    task: Result<Task, DomainError>,
) -> eyre::Result<()> {
    let mut task = task?;
    task.log_hours(i32::MAX, &clock)?;
    task.log_hours(1, &clock)?;
    ensure!(task.hours_spent() == i32::MAX);
    Ok(())
}

#[rstest]
fn ending_an_unstarted_task_is_rejected(
    clock: DefaultClock,
    task: Result<Task, DomainError>,
) -> eyre::Result<()> {
    let mut task = task?;
    let result = task.end(&clock);

    ensure!(matches!(result, Err(DomainError::InvalidOperation(_))));
    ensure!(task.ended_on().is_none());
    Ok(())
}

#[rstest]
fn end_date_cannot_precede_the_start_date(
    clock: DefaultClock,
    task: Result<Task, DomainError>,
) -> eyre::Result<()> {
    let mut task = task?;
    let start = clock.utc();
    task.start_from(start, &clock);

    let result = task.end_on(start - chrono::Duration::hours(1), &clock);
    ensure!(matches!(result, Err(DomainError::InvalidOperation(_))));
    ensure!(task.ended_on().is_none());
    Ok(())
}

#[rstest]
fn start_then_end_records_both_dates(
    clock: DefaultClock,
    task: Result<Task, DomainError>,
) -> eyre::Result<()> {
    let mut task = task?;
    task.start(&clock);
    ensure!(task.started_on().is_some());

    task.end(&clock)?;
    ensure!(task.ended_on().is_some());
    Ok(())
}

#[rstest]
fn updates_replace_fields_and_touch_the_timestamp(
    clock: DefaultClock,
    task: Result<Task, DomainError>,
) -> eyre::Result<()> {
    let mut task = task?;
    let original_updated_at = task.updated_at();

    task.update_title("Renamed", &clock);
    task.update_description("New scope", &clock);

    ensure!(task.title() == "Renamed");
    ensure!(task.description() == Some("New scope"));
    ensure!(task.updated_at() >= original_updated_at);
    Ok(())
}

#[rstest]
#[case(TaskState::Opened, "opened")]
#[case(TaskState::Blocked, "blocked")]
#[case(TaskState::Closed, "closed")]
#[case(TaskState::Archived, "archived")]
#[case(TaskState::ReviewPending, "review_pending")]
fn state_round_trips_through_its_storage_form(
    #[case] state: TaskState,
    #[case] tag: &str,
) -> eyre::Result<()> {
    ensure!(state.as_str() == tag);
    ensure!(TaskState::try_from(tag)? == state);
    Ok(())
}

#[rstest]
fn unknown_state_tag_is_rejected() {
    let result = TaskState::try_from("in_progress");
    assert_eq!(result, Err(ParseTaskStateError("in_progress".to_owned())));
}

#[rstest]
fn default_state_is_opened() {
    assert_eq!(TaskState::default(), TaskState::Opened);
}
