use std::sync::Arc;
use std::time::Duration;

use jurisai_rs::executor::BriefingExecutor;
use jurisai_rs::gateway::{
    ClientIntakeSubmission, LegalQuerySubmission, Submission, SubmissionGateway,
};
use jurisai_rs::status::StatusService;
use jurisai_rs::task::{Task, TaskStatus, TaskStore};
use jurisai_rs::Error;

fn service() -> (Arc<TaskStore>, Arc<SubmissionGateway>, StatusService) {
    let store = Arc::new(TaskStore::new());
    let gateway = Arc::new(SubmissionGateway::new(
        Arc::clone(&store),
        Arc::new(BriefingExecutor),
        Duration::from_secs(30),
    ));
    let status = StatusService::new(Arc::clone(&store));
    (store, gateway, status)
}

fn legal_query(text: &str) -> Submission {
    Submission::LegalQuery(LegalQuerySubmission {
        query: Some(text.to_string()),
        ..Default::default()
    })
}

fn rank(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Pending => 0,
        TaskStatus::Processing => 1,
        TaskStatus::Completed | TaskStatus::Failed => 2,
    }
}

async fn poll_until_terminal(status: &StatusService, id: &str) -> (Task, Vec<TaskStatus>) {
    let mut observed = Vec::new();
    for _ in 0..500 {
        let task = status.status(id).expect("known id");
        if observed.last() != Some(&task.status) {
            observed.push(task.status);
        }
        if task.status.is_terminal() {
            return (task, observed);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("task {} never reached a terminal state", id);
}

#[tokio::test]
async fn submitted_query_completes_with_a_result() {
    let (_store, gateway, status) = service();
    let task = gateway
        .submit(legal_query("Is a verbal contract enforceable?"))
        .expect("accepted");
    assert_eq!(task.status, TaskStatus::Pending);

    // The record is visible the moment submit returns.
    let snapshot = status.status(&task.id).expect("known id");
    assert!(!snapshot.status.is_terminal());

    let (done, observed) = poll_until_terminal(&status, &task.id).await;
    assert_eq!(done.status, TaskStatus::Completed);
    assert!(!done.result.expect("result present").output.is_empty());
    assert!(done.error.is_none());
    assert!(done.completed_at.is_some());

    // Observed statuses only ever move forward.
    for pair in observed.windows(2) {
        assert!(
            rank(pair[0]) < rank(pair[1]),
            "status regressed: {:?}",
            observed
        );
    }
}

#[tokio::test]
async fn terminal_snapshots_are_identical_on_every_poll() {
    let (_store, gateway, status) = service();
    let task = gateway
        .submit(legal_query("What notice period applies?"))
        .expect("accepted");
    let (first, _) = poll_until_terminal(&status, &task.id).await;

    for _ in 0..5 {
        let again = status.status(&task.id).expect("known id");
        assert_eq!(
            serde_json::to_value(&again).expect("serializable"),
            serde_json::to_value(&first).expect("serializable"),
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

#[tokio::test]
async fn concurrent_identical_submissions_get_independent_records() {
    let (store, gateway, status) = service();

    let a = {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { gateway.submit(legal_query("same question")) })
    };
    let b = {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { gateway.submit(legal_query("same question")) })
    };
    let (a, b) = (
        a.await.expect("join").expect("accepted"),
        b.await.expect("join").expect("accepted"),
    );
    assert_ne!(a.id, b.id);
    assert_eq!(store.count(), 2);

    let (done_a, _) = poll_until_terminal(&status, &a.id).await;
    let (done_b, _) = poll_until_terminal(&status, &b.id).await;
    assert_eq!(done_a.status, TaskStatus::Completed);
    assert_eq!(done_b.status, TaskStatus::Completed);
}

#[tokio::test]
async fn rejected_submission_creates_no_record() {
    let (store, gateway, _status) = service();
    let err = gateway
        .submit(Submission::ClientIntake(ClientIntakeSubmission {
            case_description: Some("Pending litigation".to_string()),
            case_type: Some("appeals".to_string()),
            ..Default::default()
        }))
        .expect_err("missing client_name");
    assert!(matches!(
        err,
        Error::Validation {
            field: "client_name",
            ..
        }
    ));
    assert_eq!(store.count(), 0);
}
