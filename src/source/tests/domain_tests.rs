//! Domain tests for source configuration and the sync status lifecycle.

use crate::source::domain::{
    EncryptedCredential, GitHubSourceConfig, GitLabSourceConfig, JiraSourceConfig, ProjectId,
    SecretToken, SourceConfig, SourceDomainError, SourceKind, SyncStatus, TaskSource,
};
use crate::task::domain::{IssueProvider, RepositoryFullName};
use chrono::{TimeDelta, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[fixture]
fn credential() -> EncryptedCredential {
    EncryptedCredential::new("enc:v1:token").expect("valid credential")
}

fn gitlab_source(credential: EncryptedCredential, clock: &DefaultClock) -> TaskSource {
    let config = GitLabSourceConfig::new("acme/widgets", credential).expect("valid path");
    TaskSource::new(ProjectId::new(), "Widgets", SourceConfig::GitLab(config), clock)
        .expect("valid source")
}

#[rstest]
#[case("gitlab_issues", SourceKind::GitlabIssues)]
#[case(" GitHub_Issues ", SourceKind::GithubIssues)]
#[case("JIRA", SourceKind::Jira)]
fn source_kind_parses_case_insensitively(#[case] raw: &str, #[case] expected: SourceKind) {
    assert_eq!(SourceKind::try_from(raw), Ok(expected));
}

#[rstest]
fn source_kind_rejects_unknown_values() {
    assert!(SourceKind::try_from("bitbucket").is_err());
}

#[rstest]
#[case(SourceKind::GitlabIssues, IssueProvider::GitLab)]
#[case(SourceKind::GithubIssues, IssueProvider::GitHub)]
#[case(SourceKind::Jira, IssueProvider::Jira)]
fn source_kind_maps_to_issue_provider(#[case] kind: SourceKind, #[case] provider: IssueProvider) {
    assert_eq!(kind.provider(), provider);
}

#[rstest]
fn sync_status_round_trips_through_storage_form() {
    for status in [
        SyncStatus::Idle,
        SyncStatus::Syncing,
        SyncStatus::Completed,
        SyncStatus::Failed,
    ] {
        assert_eq!(SyncStatus::try_from(status.as_str()), Ok(status));
    }
    assert!(SyncStatus::Completed.is_terminal());
    assert!(!SyncStatus::Syncing.is_terminal());
}

#[rstest]
#[case("widgets")]
#[case("acme//widgets")]
#[case("acme/wid gets")]
fn gitlab_config_rejects_malformed_paths(#[case] path: &str, credential: EncryptedCredential) {
    let result = GitLabSourceConfig::new(path, credential);
    assert_eq!(
        result,
        Err(SourceDomainError::InvalidProjectPath(path.to_owned()))
    );
}

#[rstest]
fn gitlab_config_accepts_nested_groups_and_hosts(credential: EncryptedCredential) {
    let config = GitLabSourceConfig::new("/acme/platform/widgets/", credential)
        .expect("valid path")
        .with_host("gitlab.internal.example/")
        .expect("valid host");

    assert_eq!(config.project_path(), "acme/platform/widgets");
    assert_eq!(config.host(), "https://gitlab.internal.example");
}

#[rstest]
fn github_config_defaults_to_public_api(credential: EncryptedCredential) {
    let repository = RepositoryFullName::new("acme/widgets").expect("valid repository");
    let config = GitHubSourceConfig::new(repository, credential)
        .with_labels(vec![" sync ".to_owned(), String::new()]);

    assert_eq!(config.api_base(), "https://api.github.com");
    assert_eq!(config.labels(), ["sync".to_owned()]);
}

#[rstest]
fn jira_config_uppercases_key_and_validates_email(credential: EncryptedCredential) {
    let config = JiraSourceConfig::new("acme.atlassian.net", "ops", "bot@acme.test", credential.clone())
        .expect("valid config")
        .with_jql("   ");
    assert_eq!(config.project_key(), "OPS");
    assert_eq!(config.host(), "https://acme.atlassian.net");
    assert_eq!(config.jql(), None);

    let missing_email = JiraSourceConfig::new("acme.atlassian.net", "OPS", " ", credential);
    assert_eq!(missing_email, Err(SourceDomainError::EmptyAccountEmail));
}

#[rstest]
fn source_config_serializes_with_kind_tag(credential: EncryptedCredential) {
    let config = SourceConfig::Jira(
        JiraSourceConfig::new("acme.atlassian.net", "OPS", "bot@acme.test", credential)
            .expect("valid config"),
    );
    let value = serde_json::to_value(&config).expect("serializable config");

    assert_eq!(value["kind"], "jira");
    assert_eq!(value["project_key"], "OPS");
    let restored: SourceConfig = serde_json::from_value(value).expect("deserializable config");
    assert_eq!(restored, config);
    assert_eq!(restored.kind(), SourceKind::Jira);
}

#[rstest]
fn provider_configs_expose_their_credential(credential: EncryptedCredential) {
    let gitlab = GitLabSourceConfig::new("acme/widgets", credential.clone()).expect("valid path");
    let github = GitHubSourceConfig::new(
        RepositoryFullName::new("acme/widgets").expect("valid repository"),
        credential.clone(),
    );
    let jira = JiraSourceConfig::new("acme.atlassian.net", "OPS", "bot@acme.test", credential.clone())
        .expect("valid config");

    assert_eq!(gitlab.credential(), &credential);
    assert_eq!(github.credential(), &credential);
    assert_eq!(jira.credential(), &credential);
    assert_eq!(SourceConfig::GitLab(gitlab).credential(), &credential);
}

#[rstest]
fn credentials_never_print_their_contents() {
    let encrypted = EncryptedCredential::new("enc:secret-blob").expect("valid credential");
    let token = SecretToken::new("glpat-123");

    assert!(!format!("{encrypted:?}").contains("secret-blob"));
    assert!(!format!("{token:?}").contains("glpat"));
    assert_eq!(token.expose(), "glpat-123");
    assert_eq!(
        EncryptedCredential::new("  "),
        Err(SourceDomainError::EmptyCredential)
    );
}

#[rstest]
fn new_source_is_enabled_and_idle(clock: DefaultClock, credential: EncryptedCredential) {
    let source = gitlab_source(credential, &clock);

    assert!(source.is_enabled());
    assert_eq!(source.sync_status(), SyncStatus::Idle);
    assert_eq!(source.kind(), SourceKind::GitlabIssues);
    assert!(source.last_synced_at().is_none());
}

#[rstest]
fn blank_source_name_is_rejected(clock: DefaultClock, credential: EncryptedCredential) {
    let config = GitLabSourceConfig::new("acme/widgets", credential).expect("valid path");
    let result = TaskSource::new(ProjectId::new(), "  ", SourceConfig::GitLab(config), &clock);
    assert_eq!(result, Err(SourceDomainError::EmptySourceName));
}

#[rstest]
fn sync_lifecycle_records_timestamps(clock: DefaultClock, credential: EncryptedCredential) {
    let mut source = gitlab_source(credential, &clock);

    let previous = source.begin_sync(&clock);
    assert_eq!(previous, SyncStatus::Idle);
    assert_eq!(source.sync_status(), SyncStatus::Syncing);
    assert!(source.sync_started_at().is_some());

    source.complete_sync(&clock);
    assert_eq!(source.sync_status(), SyncStatus::Completed);
    assert!(source.sync_started_at().is_none());
    let completed_at = source.last_synced_at().expect("completion time");

    source.begin_sync(&clock);
    source.fail_sync(&clock);
    assert_eq!(source.sync_status(), SyncStatus::Failed);
    assert_eq!(source.last_synced_at(), Some(completed_at));
}

#[rstest]
fn staleness_only_applies_to_syncing_sources(
    clock: DefaultClock,
    credential: EncryptedCredential,
) {
    let mut source = gitlab_source(credential, &clock);
    let threshold = TimeDelta::minutes(15);
    assert!(!source.is_sync_stale(Utc::now() + TimeDelta::hours(1), threshold));

    source.begin_sync(&clock);
    let started = source.sync_started_at().expect("start time");
    assert!(!source.is_sync_stale(started + TimeDelta::minutes(5), threshold));
    assert!(source.is_sync_stale(started + TimeDelta::minutes(15), threshold));
}
