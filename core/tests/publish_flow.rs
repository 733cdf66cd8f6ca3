mod common;

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dagen_core::api::{
    publish, CheckExistsPayload, DeploymentApi, Existence, Prompter, PublishError,
    PublishOptions, PublishOutcome, SubmitPayload,
};
use dagen_core::publish::{decode_opaque, TransportEnvelope};

use common::{project, ORDERS_SQL};

struct RecordingApi {
    existing: bool,
    submitted: Mutex<Vec<SubmitPayload>>,
}

#[async_trait]
impl DeploymentApi for RecordingApi {
    fn name(&self) -> &str {
        "recording"
    }

    async fn list_project_profiles(&self, _uid: &str) -> Result<Vec<String>, PublishError> {
        Ok(vec!["team-b".into(), "team-a".into()])
    }

    async fn check_exists(&self, _payload: &CheckExistsPayload) -> Result<Existence, PublishError> {
        Ok(if self.existing {
            Existence::Exists {
                message: "already deployed".into(),
            }
        } else {
            Existence::NotFound
        })
    }

    async fn submit(&self, payload: &SubmitPayload) -> Result<String, PublishError> {
        self.submitted.lock().unwrap().push(payload.clone());
        Ok("accepted".into())
    }
}

struct Answers(VecDeque<&'static str>);

impl Prompter for Answers {
    fn say(&mut self, _message: &str) -> Result<(), PublishError> {
        Ok(())
    }

    fn ask(&mut self, _question: &str) -> Result<Option<String>, PublishError> {
        Ok(self.0.pop_front().map(str::to_string))
    }
}

fn api(existing: bool) -> RecordingApi {
    RecordingApi {
        existing,
        submitted: Mutex::new(Vec::new()),
    }
}

#[tokio::test]
async fn declining_overwrite_sends_nothing() {
    let (_dir, path) = project();
    let api = api(true);
    let mut answers = Answers(VecDeque::from(["n"]));

    let outcome = publish(&path, &api, &mut answers, PublishOptions {
        project_profile: Some("team-a".into()),
        user_id: "u1".into(),
        assume_yes: false,
    })
    .await
    .unwrap();

    assert_eq!(outcome, PublishOutcome::Declined);
    assert!(api.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn submission_carries_envelope_with_exact_sql() {
    let (_dir, path) = project();
    let api = api(false);
    let mut answers = Answers(VecDeque::from(["2"]));

    let outcome = publish(&path, &api, &mut answers, PublishOptions {
        project_profile: None,
        user_id: "u1".into(),
        assume_yes: false,
    })
    .await
    .unwrap();
    assert_eq!(
        outcome,
        PublishOutcome::Published {
            message: "accepted".into()
        }
    );

    let sent = api.submitted.lock().unwrap();
    let payload = &sent[0];
    assert_eq!(payload.project_profile, "team-b");
    assert_eq!(payload.client_type, "dagen");
    assert_eq!(payload.dag_file.name, "sales_daily_PROD.py");

    let envelope: TransportEnvelope = decode_opaque(&payload.resource).unwrap();
    let sql = STANDARD.decode(&envelope.sql["load_orders"]).unwrap();
    assert_eq!(sql, ORDERS_SQL.as_bytes());
    assert_eq!(envelope.sql.len(), 1);
    assert_eq!(envelope.docs_md["load_orders"], "Loads the `orders` table.");
    assert_eq!(envelope.configuration["owner_team"], "analytics");
    assert_eq!(envelope.configuration["default_bq_dataset"], "sales");
    assert_eq!(
        envelope.configuration["workflow"][0]["bq_table_description"],
        "Orders"
    );

    let deployable: String = decode_opaque(&payload.dag_file.data).unwrap();
    assert!(deployable.contains("with airflow.DAG("));
    let local: String = decode_opaque(&payload.python_script.data).unwrap();
    assert!(local.contains("if __name__ == \"__main__\":"));
}
