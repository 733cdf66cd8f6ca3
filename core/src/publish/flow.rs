use super::envelope::{build_envelope, encode_opaque};
use super::models::{CheckExistsPayload, EncodedFile, Existence, PublishOutcome, SubmitPayload, CLIENT_TYPE};
use super::prompt::{choose_profile, confirm_overwrite};
use super::r#trait::{DeploymentApi, Prompter};
use crate::assemble::{CompiledArtifact, GENERATOR_VERSION};
use crate::error::PublishError;

/// Everything a publish needs besides the remote API and the user.
#[derive(Debug, Clone)]
pub struct PublishRequest<'a> {
    pub deployable: &'a CompiledArtifact,
    /// Full local script, shipped along for diagnostics.
    pub forced_local: &'a CompiledArtifact,
    /// Skips the interactive profile picker when set.
    pub project_profile: Option<String>,
    pub user_id: String,
    /// Overwrites an existing deployment without asking.
    pub assume_yes: bool,
}

/// Conflict check, confirmation, then submission.
///
/// Nothing is submitted when the deployment exists and the user declines.
pub async fn publish(
    api: &dyn DeploymentApi,
    prompter: &mut dyn Prompter,
    req: PublishRequest<'_>,
) -> Result<PublishOutcome, PublishError> {
    let name = req.deployable.deployment_name.clone();
    let file_name = req.deployable.file_name();

    let profile = match req.project_profile.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => {
            let profiles = api.list_project_profiles(&req.user_id).await?;
            choose_profile(prompter, &profiles)?
        }
    };

    tracing::info!(
        target: "dagen.publish",
        stage = "check",
        api = api.name(),
        deployment = %name,
        profile = %profile,
        "checking for an existing deployment"
    );
    match api
        .check_exists(&CheckExistsPayload::new(file_name.clone(), profile.clone()))
        .await?
    {
        Existence::Exists { message } => {
            tracing::info!(target: "dagen.publish", stage = "check", deployment = %name, "{message}");
            if !req.assume_yes && !confirm_overwrite(prompter, &name)? {
                tracing::info!(
                    target: "dagen.publish",
                    stage = "check",
                    deployment = %name,
                    "overwrite declined, nothing submitted"
                );
                return Ok(PublishOutcome::Declined);
            }
        }
        Existence::NotFound => {
            tracing::debug!(target: "dagen.publish", stage = "check", deployment = %name, "no existing deployment");
        }
    }

    let envelope = build_envelope(&req.deployable.spec)?;
    let payload = SubmitPayload {
        resource: encode_opaque(&envelope)?,
        dag_file: EncodedFile {
            name: file_name.clone(),
            data: encode_opaque(&req.deployable.source)?,
        },
        python_script: EncodedFile {
            name: file_name,
            data: encode_opaque(&req.forced_local.source)?,
        },
        project_profile: profile,
        uid: req.user_id,
        client_type: CLIENT_TYPE.to_string(),
        client_version: GENERATOR_VERSION.to_string(),
    };

    let message = api.submit(&payload).await?;
    tracing::info!(target: "dagen.publish", stage = "submit", deployment = %name, "{message}");
    Ok(PublishOutcome::Published { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{assemble, BuildMode};
    use crate::publish::envelope::{decode_opaque, TransportEnvelope};
    use crate::publish::prompt::tests::ScriptedPrompter;
    use crate::spec::{parse_spec, WorkflowSpec};
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Mutex;

    struct FakeApi {
        exists: bool,
        profiles: Vec<String>,
        submitted: Mutex<Vec<SubmitPayload>>,
        checked: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn new(exists: bool) -> Self {
            Self {
                exists,
                profiles: vec!["prod-profile".into(), "dev-profile".into()],
                submitted: Mutex::new(Vec::new()),
                checked: Mutex::new(Vec::new()),
            }
        }

        fn submits(&self) -> usize {
            self.submitted.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl DeploymentApi for FakeApi {
        fn name(&self) -> &str {
            "fake"
        }

        async fn list_project_profiles(&self, _uid: &str) -> Result<Vec<String>, PublishError> {
            Ok(self.profiles.clone())
        }

        async fn check_exists(
            &self,
            payload: &CheckExistsPayload,
        ) -> Result<Existence, PublishError> {
            self.checked.lock().unwrap().push(payload.project_profile.clone());
            if self.exists {
                Ok(Existence::Exists {
                    message: format!("{} is deployed", payload.dag_file.name),
                })
            } else {
                Ok(Existence::NotFound)
            }
        }

        async fn submit(&self, payload: &SubmitPayload) -> Result<String, PublishError> {
            self.submitted.lock().unwrap().push(payload.clone());
            Ok("deployed".into())
        }
    }

    fn fixture() -> (tempfile::TempDir, WorkflowSpec) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.sql"), "SELECT 1").unwrap();
        let doc = json!({
            "configuration_id": "pub_test",
            "start_date": "2020, 1, 1",
            "schedule_interval": "0 5 * * *",
            "short_description": "publish fixture",
            "default_gcp_project_id": "p",
            "default_bq_dataset": "d",
            "default_write_disposition": "WRITE_TRUNCATE",
            "task_dependencies": [],
            "workflow": [{"id": "load_a", "sql_file": "a.sql", "table_name": "a"}]
        });
        let spec =
            parse_spec(&doc.to_string(), Path::new("p.json"), dir.path().to_path_buf()).unwrap();
        (dir, spec)
    }

    fn artifacts(spec: &WorkflowSpec) -> (CompiledArtifact, CompiledArtifact) {
        (
            assemble(spec, BuildMode::Deployable, &[]).unwrap(),
            assemble(spec, BuildMode::Local, &[]).unwrap(),
        )
    }

    fn request<'a>(
        deployable: &'a CompiledArtifact,
        forced_local: &'a CompiledArtifact,
        profile: Option<&str>,
    ) -> PublishRequest<'a> {
        PublishRequest {
            deployable,
            forced_local,
            project_profile: profile.map(str::to_string),
            user_id: "user-1".into(),
            assume_yes: false,
        }
    }

    #[tokio::test]
    async fn declined_overwrite_submits_nothing() {
        let (_dir, spec) = fixture();
        let (dep, local) = artifacts(&spec);
        let api = FakeApi::new(true);
        let mut prompter = ScriptedPrompter::new(&["n"]);

        let outcome = publish(&api, &mut prompter, request(&dep, &local, Some("prod")))
            .await
            .unwrap();
        assert_eq!(outcome, PublishOutcome::Declined);
        assert_eq!(api.submits(), 0);
    }

    #[tokio::test]
    async fn confirmed_overwrite_submits_encoded_payload() {
        let (_dir, spec) = fixture();
        let (dep, local) = artifacts(&spec);
        let api = FakeApi::new(true);
        let mut prompter = ScriptedPrompter::new(&["y"]);

        let outcome = publish(&api, &mut prompter, request(&dep, &local, Some("prod")))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            PublishOutcome::Published {
                message: "deployed".into()
            }
        );

        let sent = api.submitted.lock().unwrap();
        let payload = &sent[0];
        assert_eq!(payload.dag_file.name, "pub_test_PROD.py");
        assert_eq!(payload.project_profile, "prod");
        assert_eq!(payload.uid, "user-1");
        let script: String = decode_opaque(&payload.dag_file.data).unwrap();
        assert_eq!(script, dep.source);
        let local_script: String = decode_opaque(&payload.python_script.data).unwrap();
        assert_eq!(local_script, local.source);
        let envelope: TransportEnvelope = decode_opaque(&payload.resource).unwrap();
        assert_eq!(envelope.configuration_id, "pub_test_PROD");
        assert!(envelope.sql.contains_key("load_a"));
    }

    #[tokio::test]
    async fn exhausted_confirmation_is_a_conflict() {
        let (_dir, spec) = fixture();
        let (dep, local) = artifacts(&spec);
        let api = FakeApi::new(true);
        let mut prompter = ScriptedPrompter::new(&[]);

        let err = publish(&api, &mut prompter, request(&dep, &local, Some("prod")))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::RemoteConflict(ref n) if n == "pub_test_PROD"));
        assert_eq!(api.submits(), 0);
    }

    #[tokio::test]
    async fn new_deployment_skips_confirmation_and_picks_profile() {
        let (_dir, spec) = fixture();
        let (dep, local) = artifacts(&spec);
        let api = FakeApi::new(false);
        let mut prompter = ScriptedPrompter::new(&["1"]);

        publish(&api, &mut prompter, request(&dep, &local, None))
            .await
            .unwrap();
        assert_eq!(api.checked.lock().unwrap().as_slice(), ["dev-profile"]);
        assert_eq!(api.submits(), 1);
        assert_eq!(prompter.asked, 1);
    }

    #[tokio::test]
    async fn assume_yes_overwrites_without_asking() {
        let (_dir, spec) = fixture();
        let (dep, local) = artifacts(&spec);
        let api = FakeApi::new(true);
        let mut prompter = ScriptedPrompter::new(&[]);
        let mut req = request(&dep, &local, Some("prod"));
        req.assume_yes = true;

        publish(&api, &mut prompter, req).await.unwrap();
        assert_eq!(api.submits(), 1);
        assert_eq!(prompter.asked, 0);
    }
}
