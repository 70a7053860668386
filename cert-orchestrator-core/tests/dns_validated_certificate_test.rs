//! `DnsValidatedCertificate` evaluated against the in-memory providers

use std::sync::Arc;

use cert_orchestrator_core::components::dns_validated_certificate::{
    ACM_CERTIFICATE_TYPE, CERTIFICATE_VALIDATION_TYPE, DNS_RECORD_TYPE,
};
use cert_orchestrator_core::{
    CoreError, DeploymentSummary, DnsValidatedCertificate, DnsValidatedCertificateArgs, Engine,
    InMemoryStateStore, JsonFileStateStore, ResourceOptions, StateStore, StepOp,
};
use async_trait::async_trait;
use cert_orchestrator_provider::{
    CallLog, CertificateDetail, CertificateManager, CertificateRequest, CertificateStatus,
    DomainValidationOption, InMemoryCertificateManager, InMemoryDnsAdapter, IssuedCertificate,
    ProviderCall, ProviderError, RecordStore,
};

/// Providers and state shared by every evaluation of one test.
struct Fixture {
    log: CallLog,
    records: RecordStore,
    dns: Arc<InMemoryDnsAdapter>,
    manager: Arc<InMemoryCertificateManager>,
    state: Arc<dyn StateStore>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_adapter(|adapter| adapter)
    }

    fn failing_on(k: usize) -> Self {
        Self::with_adapter(|adapter| adapter.fail_on_call(k))
    }

    fn with_adapter(configure: impl FnOnce(InMemoryDnsAdapter) -> InMemoryDnsAdapter) -> Self {
        let log = CallLog::new();
        let records = RecordStore::new();
        let dns = configure(
            InMemoryDnsAdapter::new()
                .with_store(records.clone())
                .with_log(log.clone()),
        );
        let manager = InMemoryCertificateManager::new()
            .observing(records.clone())
            .with_log(log.clone());
        Self {
            log,
            records,
            dns: Arc::new(dns),
            manager: Arc::new(manager),
            state: Arc::new(InMemoryStateStore::new()),
        }
    }

    fn engine(&self) -> Engine {
        Engine::builder("site", "dev")
            .state_store(Arc::clone(&self.state))
            .certificate_manager(self.manager.clone())
            .build()
    }

    async fn deploy(
        &self,
        domain: &str,
        alternative_names: Option<Vec<String>>,
    ) -> (DnsValidatedCertificate, DeploymentSummary) {
        let engine = self.engine();
        let mut args = DnsValidatedCertificateArgs::new(domain, self.dns.clone());
        if let Some(names) = alternative_names {
            args = args.alternative_names(names);
        }
        let cert = DnsValidatedCertificate::new(&engine, "site", args, ResourceOptions::new())
            .unwrap();
        let summary = engine.finish().await;
        (cert, summary)
    }

    async fn create_record_calls(&self) -> usize {
        self.log
            .calls()
            .await
            .iter()
            .filter(|c| matches!(c, ProviderCall::CreateRecord { .. }))
            .count()
    }
}

fn names(list: &[&str]) -> Option<Vec<String>> {
    Some(list.iter().map(ToString::to_string).collect())
}

#[tokio::test]
async fn one_record_per_validation_option() {
    for n in 0..4 {
        let fixture = Fixture::new();
        let sans: Vec<String> = (0..n).map(|i| format!("s{i}.example.com")).collect();
        let (cert, summary) = fixture.deploy("example.com", Some(sans)).await;

        assert!(summary.is_success(), "n = {n}: {summary:?}");
        let options = cert.validation_options().resolve().await.unwrap();
        let records = cert.records().resolve().await.unwrap();
        assert_eq!(options.len(), n + 1);
        assert_eq!(records.len(), n + 1);
        assert_eq!(fixture.create_record_calls().await, n + 1);
        assert_eq!(fixture.records.len().await, n + 1);
    }
}

#[tokio::test]
async fn validation_starts_after_every_record() {
    let fixture = Fixture::new();
    let (_cert, summary) = fixture
        .deploy("example.com", names(&["www.example.com", "api.example.com"]))
        .await;
    assert!(summary.is_success());

    let calls = fixture.log.calls().await;
    assert!(matches!(calls[0], ProviderCall::RequestCertificate { .. }));
    let last_record = calls
        .iter()
        .rposition(|c| matches!(c, ProviderCall::CreateRecord { .. }))
        .unwrap();
    let first_describe = calls
        .iter()
        .position(|c| matches!(c, ProviderCall::DescribeCertificate { .. }))
        .unwrap();
    assert_eq!(last_record, 3);
    assert!(last_record < first_describe);
}

#[tokio::test]
async fn omitted_alternatives_request_an_empty_list() {
    let fixture = Fixture::new();
    let (cert, summary) = fixture.deploy("example.com", None).await;
    assert!(summary.is_success());

    let stored = fixture.state.list().await.unwrap();
    let certificate = stored
        .iter()
        .find(|s| s.type_token == ACM_CERTIFICATE_TYPE)
        .unwrap();
    assert_eq!(
        certificate.inputs["subjectAlternativeNames"],
        serde_json::json!([])
    );
    assert_eq!(certificate.inputs["validationMethod"], "DNS");
    assert_eq!(cert.validation_options().resolve().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_record_blocks_validation() {
    let fixture = Fixture::failing_on(2);
    let (cert, summary) = fixture
        .deploy("example.com", names(&["www.example.com", "api.example.com"]))
        .await;

    assert!(!summary.is_success());
    let err = cert.arn().resolve().await.unwrap_err();
    assert!(matches!(err, CoreError::DependencyFailed { .. }), "{err:?}");
    assert!(matches!(
        err.root_cause(),
        CoreError::Provider(ProviderError::PermissionDenied { .. })
    ));

    let calls = fixture.log.calls().await;
    assert!(
        !calls
            .iter()
            .any(|c| matches!(c, ProviderCall::DescribeCertificate { .. })),
        "validation must not start: {calls:?}"
    );
    assert!(summary
        .failures
        .iter()
        .any(|f| f.urn.type_token() == Some(CERTIFICATE_VALIDATION_TYPE)));
    assert!(summary
        .failures
        .iter()
        .any(|f| f.urn.type_token() == Some(DNS_RECORD_TYPE)));
}

#[tokio::test]
async fn apex_and_www_resolve_to_manager_arn() {
    let fixture = Fixture::new();
    let (cert, summary) = fixture
        .deploy("example.com", names(&["www.example.com"]))
        .await;
    assert!(summary.is_success());
    assert_eq!(summary.count(StepOp::Create), 4);

    let options = cert.validation_options().resolve().await.unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(fixture.create_record_calls().await, 2);

    let arn = cert.arn().resolve().await.unwrap();
    let detail = fixture.manager.describe_certificate(&arn).await.unwrap();
    assert_eq!(detail.arn, arn);
    assert_eq!(detail.status, CertificateStatus::Issued);
    assert_eq!(fixture.manager.certificate_count().await, 1);
}

#[tokio::test]
async fn apex_only_creates_one_record() {
    let fixture = Fixture::new();
    let (cert, summary) = fixture.deploy("example.com", None).await;
    assert!(summary.is_success());
    assert_eq!(cert.records().resolve().await.unwrap().len(), 1);
    assert_eq!(fixture.create_record_calls().await, 1);
}

#[tokio::test]
async fn wildcard_shares_the_apex_record() {
    let fixture = Fixture::new();
    let (cert, summary) = fixture
        .deploy("example.com", names(&["*.example.com"]))
        .await;
    assert!(summary.is_success(), "{summary:?}");
    assert_eq!(cert.records().resolve().await.unwrap().len(), 2);
    assert_eq!(fixture.records.len().await, 1);
    assert!(cert.arn().resolve().await.is_ok());
}

#[tokio::test]
async fn case_variant_alternative_is_covered_once() {
    let fixture = Fixture::new();
    let (cert, summary) = fixture
        .deploy("example.com", names(&["Example.com"]))
        .await;
    assert!(summary.is_success(), "{summary:?}");
    assert_eq!(cert.validation_options().resolve().await.unwrap().len(), 1);
    assert_eq!(cert.records().resolve().await.unwrap().len(), 1);
    assert_eq!(fixture.create_record_calls().await, 1);
    assert!(cert.arn().resolve().await.is_ok());
}

/// Reports one option per requested name, spelled as requested.
struct VerbatimOptions(Arc<InMemoryCertificateManager>);

#[async_trait]
impl CertificateManager for VerbatimOptions {
    fn id(&self) -> &'static str {
        "verbatim"
    }

    async fn request_certificate(
        &self,
        req: &CertificateRequest,
    ) -> cert_orchestrator_provider::Result<IssuedCertificate> {
        let issued = self.0.request_certificate(req).await?;
        let requested = std::iter::once(&req.domain_name).chain(&req.subject_alternative_names);
        let domain_validation_options = requested
            .filter_map(|name| {
                let option = issued
                    .domain_validation_options
                    .iter()
                    .find(|o| o.domain_name.eq_ignore_ascii_case(name))?;
                Some(DomainValidationOption {
                    domain_name: name.clone(),
                    ..option.clone()
                })
            })
            .collect();
        Ok(IssuedCertificate {
            arn: issued.arn,
            domain_validation_options,
        })
    }

    async fn describe_certificate(
        &self,
        arn: &str,
    ) -> cert_orchestrator_provider::Result<CertificateDetail> {
        self.0.describe_certificate(arn).await
    }

    async fn wait_until_validated(
        &self,
        arn: &str,
    ) -> cert_orchestrator_provider::Result<CertificateDetail> {
        self.0.wait_until_validated(arn).await
    }
}

#[tokio::test]
async fn case_variant_options_get_their_own_records() {
    let fixture = Fixture::new();
    let engine = Engine::builder("site", "dev")
        .certificate_manager(Arc::new(VerbatimOptions(fixture.manager.clone())))
        .build();
    let cert = DnsValidatedCertificate::new(
        &engine,
        "site",
        DnsValidatedCertificateArgs::new("example.com", fixture.dns.clone())
            .alternative_names(vec!["Example.com".to_string()]),
        ResourceOptions::new(),
    )
    .unwrap();
    let summary = engine.finish().await;

    assert!(summary.is_success(), "{summary:?}");
    assert_eq!(cert.validation_options().resolve().await.unwrap().len(), 2);
    assert_eq!(cert.records().resolve().await.unwrap().len(), 2);
    let record_steps: Vec<_> = summary
        .steps
        .iter()
        .filter(|s| s.urn.type_token() == Some(DNS_RECORD_TYPE))
        .map(|s| s.urn.name().unwrap().to_string())
        .collect();
    assert_eq!(record_steps.len(), 2);
    assert_ne!(record_steps[0], record_steps[1]);
    assert!(cert.arn().resolve().await.is_ok());
}

#[tokio::test]
async fn unchanged_definition_is_a_noop() {
    let fixture = Fixture::new();
    let (first, summary) = fixture
        .deploy("example.com", names(&["www.example.com"]))
        .await;
    assert!(summary.is_success());
    let calls_after_first = fixture.log.calls().await.len();

    let (second, summary) = fixture
        .deploy("example.com", names(&["www.example.com"]))
        .await;
    assert!(summary.is_noop(), "{summary:?}");
    assert_eq!(summary.count(StepOp::Same), 4);
    assert_eq!(fixture.log.calls().await.len(), calls_after_first);
    assert_eq!(
        first.arn().resolve().await.unwrap(),
        second.arn().resolve().await.unwrap()
    );
}

#[tokio::test]
async fn changed_alternatives_replace_the_certificate() {
    let fixture = Fixture::new();
    let (first, _) = fixture
        .deploy("example.com", names(&["www.example.com"]))
        .await;
    let (second, summary) = fixture
        .deploy("example.com", names(&["www.example.com", "api.example.com"]))
        .await;

    assert!(summary.is_success());
    assert!(!summary.is_noop());
    assert_eq!(summary.count(StepOp::Replace), 2); // certificate and validation
    assert_ne!(
        first.arn().resolve().await.unwrap(),
        second.arn().resolve().await.unwrap()
    );
}

#[tokio::test]
async fn malformed_domain_surfaces_provider_rejection() {
    let fixture = Fixture::new();
    let (cert, summary) = fixture.deploy("not a domain", None).await;

    assert!(!summary.is_success());
    let certificate_failure = summary
        .failures
        .iter()
        .find(|f| f.urn.type_token() == Some(ACM_CERTIFICATE_TYPE))
        .unwrap();
    assert!(matches!(
        certificate_failure.error,
        CoreError::Provider(ProviderError::InvalidParameter { .. })
    ));
    assert!(matches!(
        cert.arn().resolve().await.unwrap_err().root_cause(),
        CoreError::Provider(ProviderError::InvalidParameter { .. })
    ));
    assert_eq!(fixture.create_record_calls().await, 0);
}

#[tokio::test]
async fn state_file_makes_second_run_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let fixture = Fixture::new();

    for expect_noop in [false, true] {
        let engine = Engine::builder("site", "dev")
            .state_store(Arc::new(JsonFileStateStore::new(&path)))
            .certificate_manager(fixture.manager.clone())
            .build();
        DnsValidatedCertificate::new(
            &engine,
            "site",
            DnsValidatedCertificateArgs::new("example.com", fixture.dns.clone()),
            ResourceOptions::new(),
        )
        .unwrap();
        let summary = engine.finish().await;
        assert!(summary.is_success());
        assert_eq!(summary.is_noop(), expect_noop);
    }
    assert_eq!(fixture.manager.certificate_count().await, 1);
}

#[tokio::test]
async fn per_component_manager_overrides_engine_default() {
    let fixture = Fixture::new();
    let engine = Engine::builder("site", "dev").build();
    let cert = DnsValidatedCertificate::new(
        &engine,
        "site",
        DnsValidatedCertificateArgs::new("example.com", fixture.dns.clone()),
        ResourceOptions::new().certificate_manager(fixture.manager.clone()),
    )
    .unwrap();
    assert!(engine.finish().await.is_success());
    assert!(cert.arn().resolve().await.is_ok());
}

#[tokio::test]
async fn missing_manager_fails_the_certificate() {
    let fixture = Fixture::new();
    let engine = Engine::builder("site", "dev").build();
    let cert = DnsValidatedCertificate::new(
        &engine,
        "site",
        DnsValidatedCertificateArgs::new("example.com", fixture.dns.clone()),
        ResourceOptions::new(),
    )
    .unwrap();
    let summary = engine.finish().await;
    assert!(!summary.is_success());
    assert!(matches!(
        cert.arn().resolve().await.unwrap_err().root_cause(),
        CoreError::MissingProvider(_)
    ));
}

#[tokio::test]
async fn component_names_are_unique() {
    let fixture = Fixture::new();
    let engine = fixture.engine();
    let args = DnsValidatedCertificateArgs::new("example.com", fixture.dns.clone());
    DnsValidatedCertificate::new(&engine, "site", args.clone(), ResourceOptions::new()).unwrap();
    let err = DnsValidatedCertificate::new(&engine, "site", args, ResourceOptions::new())
        .unwrap_err();
    assert!(matches!(err, CoreError::DuplicateUrn(_)));
}

#[tokio::test]
async fn children_are_parented_to_the_component() {
    let fixture = Fixture::new();
    let (cert, summary) = fixture.deploy("example.com", None).await;
    assert!(summary.is_success());
    for step in &summary.steps {
        assert!(
            step.urn
                .qualified_type()
                .unwrap()
                .starts_with("certorch:aws:Certificate$"),
            "{}",
            step.urn
        );
    }
    assert_eq!(cert.urn().name(), Some("site"));
}
